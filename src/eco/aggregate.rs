//! Pure reductions over ledger entries and the weekly goal.

use serde::Serialize;

use crate::eco::ledger::TrackedEntry;

/// Kilograms of CO2 counted as one tree saved.
pub const KG_CO2_PER_TREE: f64 = 10.0;
const MODERATE_IMPACT_KG: f64 = 2.0;
const HIGH_IMPACT_KG: f64 = 8.0;

pub fn total_co2(entries: &[TrackedEntry]) -> f64 {
    entries.iter().map(TrackedEntry::impact).sum()
}

pub fn total_actions_logged(entries: &[TrackedEntry]) -> u64 {
    entries.iter().map(|e| u64::from(e.count)).sum()
}

pub fn trees_saved(total_co2: f64) -> u64 {
    if !total_co2.is_finite() || total_co2 <= 0.0 {
        return 0;
    }
    (total_co2 / KG_CO2_PER_TREE).floor() as u64
}

/// Entry with the largest impact; the first one wins ties.
pub fn top_action(entries: &[TrackedEntry]) -> Option<&TrackedEntry> {
    let mut top: Option<&TrackedEntry> = None;
    for entry in entries {
        match top {
            Some(best) if entry.impact() <= best.impact() => {}
            _ => top = Some(entry),
        }
    }
    top
}

/// Fraction of the goal reached, always within `[0, 1]`.
pub fn goal_progress(total_co2: f64, goal: f64) -> f64 {
    if goal.is_nan() || goal <= 0.0 || total_co2.is_nan() {
        return 0.0;
    }
    (total_co2 / goal).clamp(0.0, 1.0)
}

pub fn goal_percentage(progress: f64) -> u8 {
    (progress.clamp(0.0, 1.0) * 100.0).round() as u8
}

pub fn average_per_action(total_co2: f64, actions_logged: u64) -> Option<f64> {
    if actions_logged == 0 {
        return None;
    }
    Some(total_co2 / actions_logged as f64)
}

pub fn remaining_to_goal(total_co2: f64, goal: f64) -> f64 {
    (goal - total_co2).max(0.0)
}

/// Entries ordered by `updated_at` descending, missing timestamps last.
pub fn recent(entries: &[TrackedEntry], limit: usize) -> Vec<&TrackedEntry> {
    let mut sorted: Vec<&TrackedEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| b.updated_at.unwrap_or(0).cmp(&a.updated_at.unwrap_or(0)));
    sorted.truncate(limit);
    sorted
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactTier {
    Low,
    Moderate,
    High,
}

impl ImpactTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

pub fn impact_tier(total_co2: f64) -> ImpactTier {
    if total_co2 < MODERATE_IMPACT_KG {
        ImpactTier::Low
    } else if total_co2 < HIGH_IMPACT_KG {
        ImpactTier::Moderate
    } else {
        ImpactTier::High
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopAction {
    pub id: String,
    pub name: String,
    pub total_impact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactSummary {
    pub total_co2: f64,
    pub total_actions_logged: u64,
    pub trees_saved: u64,
    pub top_action: Option<TopAction>,
    pub weekly_goal: f64,
    pub goal_progress: f64,
    pub goal_percentage: u8,
    pub goal_achieved: bool,
    pub remaining_to_goal: f64,
    pub average_per_action: Option<f64>,
    pub impact_tier: ImpactTier,
}

impl ImpactSummary {
    pub fn compute(entries: &[TrackedEntry], goal: f64) -> Self {
        let total = total_co2(entries);
        let logged = total_actions_logged(entries);
        let progress = goal_progress(total, goal);
        Self {
            total_co2: total,
            total_actions_logged: logged,
            trees_saved: trees_saved(total),
            top_action: top_action(entries).map(|e| TopAction {
                id: e.action_id.to_string(),
                name: e.name.clone(),
                total_impact: e.impact(),
            }),
            weekly_goal: goal,
            goal_progress: progress,
            goal_percentage: goal_percentage(progress),
            goal_achieved: total >= goal,
            remaining_to_goal: remaining_to_goal(total, goal),
            average_per_action: average_per_action(total, logged),
            impact_tier: impact_tier(total),
        }
    }
}
