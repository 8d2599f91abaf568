use anyhow::Result;

use crate::eco::aggregate::{self, ImpactSummary};
use crate::eco::audit;
use crate::eco::catalog::{ALL_CATEGORIES, ActionDefinition, ActionId, CatalogStore, CustomActionDraft};
use crate::eco::clock::Clock;
use crate::eco::config::EcoConfig;
use crate::eco::ledger::{Ledger, LedgerChange, TrackedEntry};
use crate::eco::paths::EcoPaths;
use crate::eco::persist::{self, CUSTOM_ACTIONS_KEY, TRACKED_ACTIONS_KEY, WEEKLY_GOAL_KEY};
use crate::eco::storage::SlotStore;
use crate::eco::warn::{self, WarnEvent};
use crate::error::{DraftRejection, EcoError};

/// One interactive session: the catalog, the ledger and the weekly goal, plus
/// the store every committed mutation is written back to.
pub struct Session<S: SlotStore, C: Clock> {
    catalog: CatalogStore,
    ledger: Ledger,
    weekly_goal: f64,
    search_term: String,
    category: String,
    recent_limit: usize,
    load_warnings: usize,
    store: S,
    clock: C,
    audit_paths: Option<EcoPaths>,
}

impl<S: SlotStore, C: Clock> Session<S, C> {
    pub fn open(store: S, clock: C, cfg: &EcoConfig) -> Self {
        let loaded = persist::load_state(&store);
        let mut catalog = CatalogStore::new(&cfg.custom.default_category);
        let mut load_warnings = loaded.warnings;
        let skipped = catalog.restore_custom(loaded.custom_actions);
        if skipped > 0 {
            load_warnings += 1;
            warn::emit(WarnEvent {
                code: "SLOT_REPAIR",
                stage: "load",
                key: CUSTOM_ACTIONS_KEY,
                reason: &format!("skipped {skipped} custom actions with duplicate ids"),
                err: "",
            });
        }

        Self {
            catalog,
            ledger: loaded.ledger,
            weekly_goal: loaded.weekly_goal,
            search_term: String::new(),
            category: ALL_CATEGORIES.to_string(),
            recent_limit: cfg.display.recent_limit,
            load_warnings,
            store,
            clock,
            audit_paths: None,
        }
    }

    /// Appends an audit line for every committed mutation.
    pub fn with_audit(mut self, paths: EcoPaths) -> Self {
        self.audit_paths = Some(paths);
        self
    }

    pub fn load_warnings(&self) -> usize {
        self.load_warnings
    }

    fn record(&self, phase: &str, status: &str, message: &str) {
        let Some(paths) = &self.audit_paths else {
            return;
        };
        let at_epoch_secs = u64::try_from(self.clock.now_millis() / 1000).unwrap_or_default();
        if let Err(err) = audit::append_event(paths, at_epoch_secs, phase, status, message) {
            warn::emit(WarnEvent {
                code: "AUDIT_WRITE",
                stage: phase,
                key: "audit.log",
                reason: "audit append failed",
                err: &format!("{err:#}"),
            });
        }
    }

    fn report_write(&self, key: &str, written: Result<()>) {
        if let Err(err) = written {
            warn::emit(WarnEvent {
                code: "STORE_WRITE",
                stage: "save",
                key,
                reason: "write failed; in-memory state kept",
                err: &format!("{err:#}"),
            });
            self.record("save", "failed", &format!("key={key} err={err:#}"));
        }
    }

    fn persist_ledger(&self) {
        self.report_write(
            TRACKED_ACTIONS_KEY,
            persist::save_ledger(&self.store, &self.ledger),
        );
    }

    fn persist_custom_actions(&self) {
        self.report_write(
            CUSTOM_ACTIONS_KEY,
            persist::save_custom_actions(&self.store, self.catalog.custom()),
        );
    }

    fn persist_goal(&self) {
        self.report_write(WEEKLY_GOAL_KEY, persist::save_goal(&self.store, self.weekly_goal));
    }

    fn ledger_mutated(&self, phase: &str, id: &ActionId, change: LedgerChange) {
        if !change.mutated() {
            return;
        }
        self.persist_ledger();
        self.record(phase, change.as_str(), &format!("id={id}"));
    }

    /// Logs one occurrence of `def`, snapshotting its reduction on first log.
    pub fn add_action(&mut self, def: &ActionDefinition) -> LedgerChange {
        let change = self.ledger.increment(def, self.clock.now_millis());
        self.ledger_mutated("log", &def.id, change);
        change
    }

    /// Logs one occurrence by id. Entries already in the ledger can be logged
    /// again even when their definition is no longer in the catalog.
    pub fn increment_action(&mut self, id: &ActionId) -> Result<LedgerChange> {
        let def = match self.catalog.get(id) {
            Some(def) => def.clone(),
            None => {
                let entry = self
                    .ledger
                    .get(id)
                    .ok_or_else(|| EcoError::UnknownAction(id.clone()))?;
                ActionDefinition {
                    id: entry.action_id.clone(),
                    name: entry.name.clone(),
                    co2_reduction: entry.co2_reduction,
                    category: entry.category.clone(),
                    description: String::new(),
                    is_custom: true,
                }
            }
        };
        Ok(self.add_action(&def))
    }

    pub fn decrement_action(&mut self, id: &ActionId) -> LedgerChange {
        let change = self.ledger.decrement(id, self.clock.now_millis());
        self.ledger_mutated("unlog", id, change);
        change
    }

    pub fn remove_action(&mut self, id: &ActionId) -> LedgerChange {
        let change = self.ledger.remove(id);
        self.ledger_mutated("remove", id, change);
        change
    }

    /// Empties the ledger, returning how many entries were dropped.
    pub fn clear_all(&mut self) -> usize {
        let removed = self.ledger.clear();
        self.persist_ledger();
        self.record("clear", "cleared", &format!("removed={removed}"));
        removed
    }

    pub fn set_goal(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() || value <= 0.0 {
            return Err(EcoError::InvalidGoal(value.to_string()).into());
        }
        self.weekly_goal = value;
        self.persist_goal();
        self.record("goal", "set", &format!("weekly_goal={value}"));
        Ok(())
    }

    pub fn set_search_term(&mut self, term: &str) {
        self.search_term = term.to_string();
    }

    pub fn set_category(&mut self, category: &str) {
        self.category = category.to_string();
    }

    pub fn submit_custom_action(
        &mut self,
        draft: &CustomActionDraft,
    ) -> Result<ActionDefinition, DraftRejection> {
        let now = self.clock.now_millis();
        let ledger = &self.ledger;
        let added = self
            .catalog
            .add(draft, now, |id| ledger.get(id).is_some())?
            .clone();
        self.persist_custom_actions();
        self.record(
            "custom",
            "added",
            &format!("id={} name={}", added.id, added.name),
        );
        Ok(added)
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn filtered_catalog(&self) -> Vec<&ActionDefinition> {
        self.catalog
            .filter(&self.search_term, &self.category)
            .collect()
    }

    pub fn categories(&self) -> Vec<String> {
        self.catalog.categories()
    }

    pub fn weekly_goal(&self) -> f64 {
        self.weekly_goal
    }

    pub fn all_entries(&self) -> &[TrackedEntry] {
        self.ledger.entries()
    }

    pub fn recent_entries(&self) -> Vec<&TrackedEntry> {
        self.ledger.recent(self.recent_limit)
    }

    pub fn total_co2(&self) -> f64 {
        aggregate::total_co2(self.ledger.entries())
    }

    pub fn total_actions_logged(&self) -> u64 {
        aggregate::total_actions_logged(self.ledger.entries())
    }

    pub fn trees_saved(&self) -> u64 {
        aggregate::trees_saved(self.total_co2())
    }

    pub fn top_action(&self) -> Option<&TrackedEntry> {
        aggregate::top_action(self.ledger.entries())
    }

    pub fn goal_progress(&self) -> f64 {
        aggregate::goal_progress(self.total_co2(), self.weekly_goal)
    }

    pub fn summary(&self) -> ImpactSummary {
        ImpactSummary::compute(self.ledger.entries(), self.weekly_goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eco::clock::ManualClock;
    use crate::eco::storage::MemoryStore;

    fn session() -> Session<MemoryStore, ManualClock> {
        Session::open(
            MemoryStore::default(),
            ManualClock::stepping(1_000, 10),
            &EcoConfig::default(),
        )
    }

    fn bike_draft(co2: &str) -> CustomActionDraft {
        CustomActionDraft {
            name: "Bike".to_string(),
            co2_reduction: co2.to_string(),
            ..CustomActionDraft::default()
        }
    }

    #[test]
    fn fresh_session_has_empty_read_model() {
        let s = session();
        assert_eq!(s.total_co2(), 0.0);
        assert_eq!(s.trees_saved(), 0);
        assert!(s.top_action().is_none());
        assert_eq!(s.weekly_goal(), 12.0);
        assert_eq!(s.filtered_catalog().len(), 8);
        assert_eq!(s.categories()[0], "All");
    }

    #[test]
    fn logging_persists_after_each_mutation() {
        let mut s = session();
        let transport = ActionId::Num(2);
        for _ in 0..3 {
            s.increment_action(&transport).expect("log");
        }
        assert_eq!(s.all_entries()[0].count, 3);
        assert!((s.total_co2() - 7.8).abs() < 1e-9);
        assert_eq!(s.total_actions_logged(), 3);
        assert!((s.goal_progress() - 0.65).abs() < 1e-9);

        let stored = s.store.get(TRACKED_ACTIONS_KEY).expect("get").expect("slot");
        assert!(stored.contains("\"count\":3"));

        assert_eq!(s.decrement_action(&transport), LedgerChange::Decremented { count: 2 });
        assert_eq!(s.remove_action(&transport), LedgerChange::Removed);
        assert!(s.all_entries().is_empty());
        let stored = s.store.get(TRACKED_ACTIONS_KEY).expect("get").expect("slot");
        assert_eq!(stored, "[]");
    }

    #[test]
    fn unknown_id_is_rejected() {
        let mut s = session();
        let err = s.increment_action(&ActionId::Num(404)).expect_err("unknown");
        assert!(err.to_string().contains("404"));
        assert!(s.all_entries().is_empty());
    }

    #[test]
    fn noop_decrement_does_not_write() {
        let mut s = session();
        assert_eq!(s.decrement_action(&ActionId::Num(1)), LedgerChange::Missing);
        assert_eq!(s.store.get(TRACKED_ACTIONS_KEY).expect("get"), None);
    }

    #[test]
    fn custom_action_is_added_and_persisted() {
        let mut s = session();
        let bike = s.submit_custom_action(&bike_draft("1.2")).expect("accepted");
        assert!(bike.is_custom);
        assert_eq!(bike.category, "Lifestyle");
        assert_eq!(bike.description, "Custom action");
        assert_eq!(s.catalog().list().count(), 9);

        s.increment_action(&bike.id).expect("log bike");
        assert_eq!(s.top_action().map(|e| e.name.as_str()), Some("Bike"));

        let reopened = Session::open(
            MemoryStore::with_slots([
                (
                    CUSTOM_ACTIONS_KEY,
                    s.store.get(CUSTOM_ACTIONS_KEY).expect("get").expect("slot").as_str(),
                ),
                (
                    TRACKED_ACTIONS_KEY,
                    s.store.get(TRACKED_ACTIONS_KEY).expect("get").expect("slot").as_str(),
                ),
            ]),
            ManualClock::starting_at(0),
            &EcoConfig::default(),
        );
        assert_eq!(reopened.catalog(), s.catalog());
        assert_eq!(reopened.all_entries(), s.all_entries());
    }

    #[test]
    fn rejected_custom_action_leaves_catalog_unchanged() {
        let mut s = session();
        let before = s.catalog().clone();
        assert!(s.submit_custom_action(&bike_draft("-1")).is_err());
        let mut unnamed = bike_draft("1.2");
        unnamed.name = "   ".to_string();
        assert_eq!(s.submit_custom_action(&unnamed), Err(DraftRejection::EmptyName));
        assert_eq!(s.catalog(), &before);
        assert_eq!(s.store.get(CUSTOM_ACTIONS_KEY).expect("get"), None);
    }

    #[test]
    fn goal_changes_are_validated_and_persisted() {
        let mut s = session();
        s.set_goal(20.0).expect("set");
        assert_eq!(s.store.get(WEEKLY_GOAL_KEY).expect("get").as_deref(), Some("20"));
        assert!(s.set_goal(0.0).is_err());
        assert!(s.set_goal(f64::NAN).is_err());
        assert_eq!(s.weekly_goal(), 20.0);
    }

    #[test]
    fn filter_state_drives_filtered_catalog() {
        let mut s = session();
        s.set_category("Home");
        assert_eq!(s.filtered_catalog().len(), 2);
        s.set_search_term("laundry");
        let names: Vec<&str> = s.filtered_catalog().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["Air-dry laundry"]);
        s.set_category(ALL_CATEGORIES);
        s.set_search_term("");
        assert_eq!(s.filtered_catalog().len(), 8);
    }

    #[test]
    fn recent_entries_follow_clock_and_limit() {
        let mut s = session();
        for id in [1, 2, 3, 4] {
            s.increment_action(&ActionId::Num(id)).expect("log");
        }
        s.increment_action(&ActionId::Num(1)).expect("relog");
        let ids: Vec<String> = s
            .recent_entries()
            .iter()
            .map(|e| e.action_id.to_string())
            .collect();
        assert_eq!(ids, ["1", "4", "3"]);
    }

    #[test]
    fn entry_without_catalog_definition_can_still_be_logged() {
        let store = MemoryStore::with_slots([(
            TRACKED_ACTIONS_KEY,
            r#"[{"id":"gone","name":"Old habit","co2Reduction":2.0,"count":1,"updatedAt":5}]"#,
        )]);
        let mut s = Session::open(store, ManualClock::starting_at(50), &EcoConfig::default());
        let gone = ActionId::Text("gone".to_string());
        assert_eq!(
            s.increment_action(&gone).expect("relog"),
            LedgerChange::Incremented { count: 2 }
        );
        assert!((s.total_co2() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn quoted_numeric_ids_reach_their_entries() {
        let store = MemoryStore::with_slots([(
            TRACKED_ACTIONS_KEY,
            r#"[{"id":"17","name":"Old habit","co2Reduction":2.0,"count":2,"updatedAt":5}]"#,
        )]);
        let mut s = Session::open(store, ManualClock::starting_at(50), &EcoConfig::default());
        let id = ActionId::parse("17");
        assert_eq!(
            s.increment_action(&id).expect("relog"),
            LedgerChange::Incremented { count: 3 }
        );
        assert_eq!(s.decrement_action(&id), LedgerChange::Decremented { count: 2 });
        assert_eq!(s.remove_action(&id), LedgerChange::Removed);
        assert!(s.all_entries().is_empty());
    }

    #[test]
    fn custom_action_never_reuses_a_tracked_id() {
        let store = MemoryStore::with_slots([(
            TRACKED_ACTIONS_KEY,
            r#"[{"id":5000,"name":"Old habit","co2Reduction":9.0,"count":1,"updatedAt":5}]"#,
        )]);
        let mut s = Session::open(store, ManualClock::starting_at(5_000), &EcoConfig::default());
        let bike = s.submit_custom_action(&bike_draft("1.2")).expect("accepted");
        assert_eq!(bike.id, ActionId::Num(5_001));

        assert_eq!(s.increment_action(&bike.id).expect("log"), LedgerChange::Created);
        assert_eq!(s.all_entries().len(), 2);
        assert!((s.total_co2() - 10.2).abs() < 1e-9);
    }

    #[test]
    fn audit_lines_use_session_clock() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = EcoPaths {
            eco_home: dir.path().to_path_buf(),
            store_file: dir.path().join("store.json"),
            logs_dir: dir.path().join("logs"),
            config_file: dir.path().join("config.toml"),
        };
        let mut s = Session::open(
            MemoryStore::default(),
            ManualClock::starting_at(1_700_000_000_000),
            &EcoConfig::default(),
        )
        .with_audit(paths.clone());
        s.increment_action(&ActionId::Num(1)).expect("log");

        let log = std::fs::read_to_string(paths.logs_dir.join("audit.log")).expect("audit");
        assert_eq!(log.lines().count(), 1);
        assert!(log.contains("\"at_epoch_secs\":1700000000"));
        assert!(log.contains("\"phase\":\"log\""));
    }

    #[test]
    fn clear_all_empties_ledger() {
        let mut s = session();
        s.increment_action(&ActionId::Num(1)).expect("log");
        s.increment_action(&ActionId::Num(6)).expect("log");
        assert_eq!(s.clear_all(), 2);
        assert!(s.all_entries().is_empty());
        assert_eq!(s.summary().total_actions_logged, 0);
    }
}
