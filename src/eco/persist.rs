use anyhow::Result;
use serde::de::DeserializeOwned;

use crate::eco::catalog::ActionDefinition;
use crate::eco::ledger::{Ledger, TrackedEntry};
use crate::eco::storage::SlotStore;
use crate::eco::warn::{self, WarnEvent};

pub const TRACKED_ACTIONS_KEY: &str = "trackedActions";
pub const CUSTOM_ACTIONS_KEY: &str = "customActions";
pub const WEEKLY_GOAL_KEY: &str = "weeklyGoal";

pub const DEFAULT_WEEKLY_GOAL: f64 = 12.0;

/// Everything read from the store when a session opens.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedState {
    pub ledger: Ledger,
    pub custom_actions: Vec<ActionDefinition>,
    pub weekly_goal: f64,
    pub warnings: usize,
}

fn warn_slot(code: &str, key: &str, reason: &str, err: &str) {
    warn::emit(WarnEvent {
        code,
        stage: "load",
        key,
        reason,
        err,
    });
}

fn read_slot(store: &dyn SlotStore, key: &str, warnings: &mut usize) -> Option<String> {
    match store.get(key) {
        Ok(raw) => raw,
        Err(err) => {
            *warnings += 1;
            warn_slot("STORE_READ", key, "store unreadable", &format!("{err:#}"));
            None
        }
    }
}

fn read_json_slot<T: DeserializeOwned>(
    store: &dyn SlotStore,
    key: &str,
    warnings: &mut usize,
) -> Vec<T> {
    let Some(raw) = read_slot(store, key, warnings) else {
        return Vec::new();
    };
    match serde_json::from_str::<Option<Vec<T>>>(&raw) {
        Ok(parsed) => parsed.unwrap_or_default(),
        Err(err) => {
            *warnings += 1;
            warn_slot("SLOT_PARSE", key, "malformed json; using empty", &err.to_string());
            Vec::new()
        }
    }
}

/// Parses a persisted or user-supplied goal; only finite values above zero count.
pub fn parse_goal(raw: &str) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

pub fn load_state(store: &dyn SlotStore) -> LoadedState {
    let mut warnings = 0usize;

    let raw_entries: Vec<TrackedEntry> = read_json_slot(store, TRACKED_ACTIONS_KEY, &mut warnings);
    let (ledger, dropped) = Ledger::from_entries(raw_entries);
    if dropped > 0 {
        warnings += 1;
        warn_slot(
            "SLOT_REPAIR",
            TRACKED_ACTIONS_KEY,
            &format!("dropped {dropped} zero-count or duplicate entries"),
            "",
        );
    }

    let custom_actions = read_json_slot(store, CUSTOM_ACTIONS_KEY, &mut warnings);

    let weekly_goal = match read_slot(store, WEEKLY_GOAL_KEY, &mut warnings) {
        None => DEFAULT_WEEKLY_GOAL,
        Some(raw) => parse_goal(&raw).unwrap_or_else(|| {
            warnings += 1;
            warn_slot("GOAL_DISCARDED", WEEKLY_GOAL_KEY, "not a positive number", &raw);
            DEFAULT_WEEKLY_GOAL
        }),
    };

    LoadedState {
        ledger,
        custom_actions,
        weekly_goal,
        warnings,
    }
}

pub fn save_ledger(store: &dyn SlotStore, ledger: &Ledger) -> Result<()> {
    store.set(TRACKED_ACTIONS_KEY, &serde_json::to_string(ledger.entries())?)
}

pub fn save_custom_actions(store: &dyn SlotStore, custom: &[ActionDefinition]) -> Result<()> {
    store.set(CUSTOM_ACTIONS_KEY, &serde_json::to_string(custom)?)
}

pub fn save_goal(store: &dyn SlotStore, goal: f64) -> Result<()> {
    store.set(WEEKLY_GOAL_KEY, &goal.to_string())
}
