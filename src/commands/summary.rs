use anyhow::Result;
use serde::Serialize;

use crate::commands::{CommandReport, open_context};
use crate::eco::aggregate::ImpactSummary;
use crate::eco::ledger::TrackedEntry;
use crate::eco::util::{format_kg, format_millis};

#[derive(Debug, Serialize)]
struct SummaryView<'a> {
    #[serde(flatten)]
    summary: ImpactSummary,
    recent: Vec<&'a TrackedEntry>,
}

#[derive(Debug, Serialize)]
struct TrackedView<'a> {
    #[serde(flatten)]
    entry: &'a TrackedEntry,
    impact: f64,
}

pub fn run() -> Result<CommandReport> {
    let ctx = open_context()?;
    let mut report = CommandReport::new("summary");
    let session = &ctx.session;

    let summary = session.summary();
    report.detail(format!("total_co2_kg={}", format_kg(summary.total_co2)));
    report.detail(format!("actions_logged={}", summary.total_actions_logged));
    report.detail(format!("trees_saved={}", summary.trees_saved));
    report.detail(format!("impact_tier={}", summary.impact_tier.as_str()));
    match &summary.top_action {
        Some(top) => report.detail(format!(
            "top_action={} ({} kg CO2)",
            top.name,
            format_kg(top.total_impact)
        )),
        None => report.detail("top_action=none (log your first action to see this)"),
    }
    match summary.average_per_action {
        Some(avg) => report.detail(format!("average_per_action_kg={}", format_kg(avg))),
        None => report.detail("average_per_action_kg=none"),
    }
    report.detail(format!("weekly_goal_kg={}", format_kg(summary.weekly_goal)));
    report.detail(format!("goal_progress_percent={}", summary.goal_percentage));
    if summary.goal_achieved {
        report.detail("goal achieved; set a higher target");
    } else {
        report.detail(format!(
            "{:.1} kg left to hit your goal",
            summary.remaining_to_goal
        ));
    }

    let recent = session.recent_entries();
    if recent.is_empty() {
        report.detail("recent: no actions tracked yet");
    }
    for entry in &recent {
        report.detail(format!(
            "recent: {} x{} at {}",
            entry.name,
            entry.count,
            format_millis(entry.updated_at)
        ));
    }

    report.attach(&SummaryView { summary, recent })?;
    Ok(report)
}

pub fn run_tracked() -> Result<CommandReport> {
    let ctx = open_context()?;
    let mut report = CommandReport::new("tracked");

    let entries = ctx.session.all_entries();
    if entries.is_empty() {
        report.detail("no actions tracked yet");
    }
    for entry in entries {
        report.detail(format!(
            "#{} {}: {} kg CO2 - {}x (updated {})",
            entry.action_id,
            entry.name,
            format_kg(entry.impact()),
            entry.count,
            format_millis(entry.updated_at)
        ));
    }

    let views: Vec<TrackedView<'_>> = entries
        .iter()
        .map(|entry| TrackedView {
            entry,
            impact: entry.impact(),
        })
        .collect();
    report.attach(&views)?;
    Ok(report)
}
