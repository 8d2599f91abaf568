use anyhow::Result;

use crate::commands::{CommandReport, open_context};
use crate::eco::catalog::ALL_CATEGORIES;
use crate::eco::util::{format_kg, truncate_with_ellipsis};

const DESCRIPTION_WIDTH: usize = 48;

#[derive(Debug, Clone, Default)]
pub struct CatalogOptions {
    pub search: Option<String>,
    pub category: Option<String>,
}

pub fn run(opts: &CatalogOptions) -> Result<CommandReport> {
    let mut ctx = open_context()?;
    let mut report = CommandReport::new("catalog");

    let search = opts.search.as_deref().unwrap_or_default();
    let category = opts.category.as_deref().unwrap_or(ALL_CATEGORIES);
    ctx.session.set_search_term(search);
    ctx.session.set_category(category);

    if category != ALL_CATEGORIES && !ctx.session.categories().iter().any(|c| c == category) {
        report.issue(format!(
            "unknown category `{category}`; choose one of: {}",
            ctx.session.categories().join(", ")
        ));
        return Ok(report);
    }

    let matches = ctx.session.filtered_catalog();
    report.detail(format!("search={search}"));
    report.detail(format!("category={category}"));
    report.detail(format!("matches={}", matches.len()));
    for def in &matches {
        let marker = if def.is_custom { " [custom]" } else { "" };
        report.detail(format!(
            "#{} {} ({}, {} kg CO2){} - {}",
            def.id,
            def.name,
            def.category,
            format_kg(def.co2_reduction),
            marker,
            truncate_with_ellipsis(&def.description, DESCRIPTION_WIDTH),
        ));
    }
    report.attach(&matches)?;

    Ok(report)
}

pub fn run_categories() -> Result<CommandReport> {
    let ctx = open_context()?;
    let mut report = CommandReport::new("categories");

    let categories = ctx.session.categories();
    for category in &categories {
        report.detail(category.clone());
    }
    report.attach(&categories)?;

    Ok(report)
}
