use anyhow::Result;

use crate::commands::{CommandReport, FileSession, open_context};
use crate::eco::catalog::ActionId;
use crate::eco::ledger::LedgerChange;
use crate::eco::util::format_kg;

fn describe(report: &mut CommandReport, id: &ActionId, change: LedgerChange) {
    match change {
        LedgerChange::Created => report.detail(format!("logged #{id} for the first time")),
        LedgerChange::Incremented { count } => report.detail(format!("logged #{id} (count={count})")),
        LedgerChange::Decremented { count } => report.detail(format!("unlogged #{id} (count={count})")),
        LedgerChange::Removed => report.detail(format!("removed #{id} from tracked actions")),
        LedgerChange::Missing => report.detail(format!("#{id} is not tracked; nothing to do")),
    }
}

fn totals(report: &mut CommandReport, session: &FileSession) {
    report.detail(format!("total_co2_kg={}", format_kg(session.total_co2())));
    report.detail(format!("actions_logged={}", session.total_actions_logged()));
    report.detail(format!("trees_saved={}", session.trees_saved()));
    if let Some(top) = session.top_action() {
        report.detail(format!("top_action={}", top.name));
    }
}

pub fn run_log(id: &ActionId) -> Result<CommandReport> {
    let mut ctx = open_context()?;
    let mut report = CommandReport::new("log");

    let change = ctx.session.increment_action(id)?;
    describe(&mut report, id, change);
    totals(&mut report, &ctx.session);
    Ok(report)
}

pub fn run_unlog(id: &ActionId) -> Result<CommandReport> {
    let mut ctx = open_context()?;
    let mut report = CommandReport::new("unlog");

    let change = ctx.session.decrement_action(id);
    describe(&mut report, id, change);
    totals(&mut report, &ctx.session);
    Ok(report)
}

pub fn run_remove(id: &ActionId) -> Result<CommandReport> {
    let mut ctx = open_context()?;
    let mut report = CommandReport::new("remove");

    let change = ctx.session.remove_action(id);
    describe(&mut report, id, change);
    totals(&mut report, &ctx.session);
    Ok(report)
}

pub fn run_clear() -> Result<CommandReport> {
    let mut ctx = open_context()?;
    let mut report = CommandReport::new("clear");

    let removed = ctx.session.clear_all();
    report.detail(format!("cleared {removed} tracked actions"));
    Ok(report)
}
