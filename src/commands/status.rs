use anyhow::Result;

use crate::commands::{CommandReport, open_context};

pub fn run() -> Result<CommandReport> {
    let ctx = open_context()?;
    let mut report = CommandReport::new("status");

    report.detail(format!("eco_home={}", ctx.paths.eco_home.display()));
    report.detail(format!("store_file={}", ctx.paths.store_file.display()));
    report.detail(format!("logs_dir={}", ctx.paths.logs_dir.display()));
    report.detail(format!("config_file={}", ctx.paths.config_file.display()));
    report.detail(format!(
        "config.display.recent_limit={}",
        ctx.config.display.recent_limit
    ));
    report.detail(format!(
        "config.custom.default_category={}",
        ctx.config.custom.default_category
    ));
    report.detail(format!("config.audit.enabled={}", ctx.config.audit.enabled));
    report.detail(format!("catalog.size={}", ctx.session.catalog().list().count()));
    report.detail(format!(
        "catalog.custom={}",
        ctx.session.catalog().custom().len()
    ));
    report.detail(format!("ledger.entries={}", ctx.session.all_entries().len()));

    if !ctx.paths.store_file.exists() {
        report.detail("store file not created yet; it is written on the first change");
    }
    if ctx.session.load_warnings() > 0 {
        report.issue(format!(
            "store had {} problems on load; defaults were used for the affected slots",
            ctx.session.load_warnings()
        ));
    }

    Ok(report)
}
