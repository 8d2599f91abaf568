use anyhow::Result;

use crate::commands::{CommandReport, open_context};
use crate::eco::catalog::CustomActionDraft;
use crate::eco::util::format_kg;

pub fn run(draft: &CustomActionDraft) -> Result<CommandReport> {
    let mut ctx = open_context()?;
    let mut report = CommandReport::new("add-custom");

    match ctx.session.submit_custom_action(draft) {
        Ok(def) => {
            report.detail(format!(
                "added custom action #{} {} ({}, {} kg CO2)",
                def.id,
                def.name,
                def.category,
                format_kg(def.co2_reduction)
            ));
            report.detail(format!("description={}", def.description));
            report.attach(&def)?;
        }
        Err(rejection) => {
            report.issue(format!("custom action not added: {rejection}"));
        }
    }

    Ok(report)
}
