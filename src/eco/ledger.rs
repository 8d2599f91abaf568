use serde::{Deserialize, Serialize};

use crate::eco::aggregate;
use crate::eco::catalog::{ActionDefinition, ActionId};

pub const DEFAULT_RECENT_LIMIT: usize = 3;

/// A logged action. `co2_reduction`, `name` and `category` are snapshots taken
/// from the definition when the action was first logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedEntry {
    #[serde(rename = "id")]
    pub action_id: ActionId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub co2_reduction: f64,
    pub count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl TrackedEntry {
    pub fn impact(&self) -> f64 {
        self.co2_reduction * f64::from(self.count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerChange {
    Created,
    Incremented { count: u32 },
    Decremented { count: u32 },
    Removed,
    Missing,
}

impl LedgerChange {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Incremented { .. } => "incremented",
            Self::Decremented { .. } => "decremented",
            Self::Removed => "removed",
            Self::Missing => "missing",
        }
    }

    pub fn mutated(self) -> bool {
        !matches!(self, Self::Missing)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    entries: Vec<TrackedEntry>,
}

impl Ledger {
    /// Rebuilds a ledger from persisted entries, dropping zero counts and
    /// repeated ids. Returns the ledger and how many entries were dropped.
    pub fn from_entries(raw: Vec<TrackedEntry>) -> (Self, usize) {
        let total = raw.len();
        let mut ledger = Self::default();
        for entry in raw {
            if entry.count == 0 || ledger.get(&entry.action_id).is_some() {
                continue;
            }
            ledger.entries.push(entry);
        }
        let dropped = total - ledger.entries.len();
        (ledger, dropped)
    }

    pub fn entries(&self) -> &[TrackedEntry] {
        &self.entries
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &ActionId) -> Option<&TrackedEntry> {
        self.entries.iter().find(|e| &e.action_id == id)
    }

    fn position(&self, id: &ActionId) -> Option<usize> {
        self.entries.iter().position(|e| &e.action_id == id)
    }

    pub fn increment(&mut self, def: &ActionDefinition, now_millis: i64) -> LedgerChange {
        if let Some(idx) = self.position(&def.id) {
            let entry = &mut self.entries[idx];
            entry.count = entry.count.saturating_add(1);
            entry.updated_at = Some(now_millis);
            return LedgerChange::Incremented { count: entry.count };
        }

        self.entries.push(TrackedEntry {
            action_id: def.id.clone(),
            name: def.name.clone(),
            category: def.category.clone(),
            co2_reduction: def.co2_reduction,
            count: 1,
            updated_at: Some(now_millis),
        });
        LedgerChange::Created
    }

    pub fn decrement(&mut self, id: &ActionId, now_millis: i64) -> LedgerChange {
        let Some(idx) = self.position(id) else {
            return LedgerChange::Missing;
        };
        let entry = &mut self.entries[idx];
        entry.count = entry.count.saturating_sub(1);
        if entry.count == 0 {
            self.entries.remove(idx);
            return LedgerChange::Removed;
        }
        entry.updated_at = Some(now_millis);
        LedgerChange::Decremented { count: entry.count }
    }

    pub fn remove(&mut self, id: &ActionId) -> LedgerChange {
        match self.position(id) {
            Some(idx) => {
                self.entries.remove(idx);
                LedgerChange::Removed
            }
            None => LedgerChange::Missing,
        }
    }

    /// Drops every entry, returning how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    pub fn recent(&self, limit: usize) -> Vec<&TrackedEntry> {
        aggregate::recent(&self.entries, limit)
    }
}
