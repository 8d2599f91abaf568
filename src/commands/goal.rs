use anyhow::Result;

use crate::commands::{CommandReport, open_context};
use crate::eco::aggregate::goal_percentage;
use crate::eco::persist::parse_goal;
use crate::eco::util::format_kg;
use crate::error::EcoError;

pub fn run(value: Option<&str>) -> Result<CommandReport> {
    let mut ctx = open_context()?;
    let mut report = CommandReport::new("goal");

    if let Some(raw) = value {
        let goal = parse_goal(raw).ok_or_else(|| EcoError::InvalidGoal(raw.trim().to_string()))?;
        ctx.session.set_goal(goal)?;
        report.detail(format!("weekly goal set to {} kg", format_kg(goal)));
    }

    let progress = ctx.session.goal_progress();
    report.detail(format!("weekly_goal_kg={}", format_kg(ctx.session.weekly_goal())));
    report.detail(format!("progress_percent={}", goal_percentage(progress)));
    Ok(report)
}
