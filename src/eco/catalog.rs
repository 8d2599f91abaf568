use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::DraftRejection;

/// Sentinel category that matches every action when filtering.
pub const ALL_CATEGORIES: &str = "All";
pub const DEFAULT_CUSTOM_CATEGORY: &str = "Lifestyle";
pub const DEFAULT_CUSTOM_DESCRIPTION: &str = "Custom action";

/// Action identity. Built-ins and generated custom ids are numeric; ids
/// persisted as JSON strings are kept as text unless they spell a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum ActionId {
    Num(u64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredActionId {
    Num(u64),
    Text(String),
}

impl<'de> Deserialize<'de> for ActionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match StoredActionId::deserialize(deserializer)? {
            StoredActionId::Num(n) => Self::Num(n),
            StoredActionId::Text(s) => Self::parse(&s),
        })
    }
}

impl ActionId {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<u64>() {
            Ok(n) => Self::Num(n),
            Err(_) => Self::Text(trimmed.to_string()),
        }
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDefinition {
    pub id: ActionId,
    pub name: String,
    pub co2_reduction: f64,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_custom: bool,
}

/// Raw form fields for a user-authored action, validated by [`CatalogStore::add`].
#[derive(Debug, Clone, Default)]
pub struct CustomActionDraft {
    pub name: String,
    pub co2_reduction: String,
    pub category: Option<String>,
    pub description: Option<String>,
}

fn builtin(id: u64, name: &str, co2: f64, category: &str, description: &str) -> ActionDefinition {
    ActionDefinition {
        id: ActionId::Num(id),
        name: name.to_string(),
        co2_reduction: co2,
        category: category.to_string(),
        description: description.to_string(),
        is_custom: false,
    }
}

pub fn builtin_actions() -> Vec<ActionDefinition> {
    vec![
        builtin(
            1,
            "Use a reusable water bottle",
            0.5,
            "Lifestyle",
            "Replace disposable plastic bottles.",
        ),
        builtin(
            2,
            "Take public transport",
            2.6,
            "Travel",
            "Swap a car ride for a bus or train.",
        ),
        builtin(
            3,
            "Eat a plant-based meal",
            0.8,
            "Food",
            "Choose vegetarian meals a few times a week.",
        ),
        builtin(
            4,
            "Use energy-efficient light bulbs",
            0.1,
            "Home",
            "LEDs use 75% less energy.",
        ),
        builtin(5, "Recycle paper", 0.2, "Waste", "Keep paper out of landfills."),
        builtin(6, "Air-dry laundry", 1.4, "Home", "Skip the dryer for one load."),
        builtin(
            7,
            "Carpool with a friend",
            1.9,
            "Travel",
            "Share rides to cut emissions.",
        ),
        builtin(
            8,
            "Bring a reusable shopping bag",
            0.3,
            "Lifestyle",
            "Avoid single-use bags.",
        ),
    ]
}

fn parse_reduction(raw: &str) -> Result<f64, DraftRejection> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| DraftRejection::InvalidReduction(raw.trim().to_string()))?;
    if !value.is_finite() {
        return Err(DraftRejection::InvalidReduction(raw.trim().to_string()));
    }
    if value <= 0.0 {
        return Err(DraftRejection::NonPositiveReduction(value));
    }
    Ok(value)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogStore {
    builtins: Vec<ActionDefinition>,
    custom: Vec<ActionDefinition>,
    default_category: String,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new(DEFAULT_CUSTOM_CATEGORY)
    }
}

impl CatalogStore {
    pub fn new(default_category: &str) -> Self {
        Self {
            builtins: builtin_actions(),
            custom: Vec::new(),
            default_category: default_category.to_string(),
        }
    }

    /// Appends previously persisted custom definitions, skipping ids already
    /// present. Returns how many were skipped.
    pub fn restore_custom(&mut self, restored: Vec<ActionDefinition>) -> usize {
        let mut skipped = 0usize;
        for mut def in restored {
            if self.get(&def.id).is_some() {
                skipped += 1;
                continue;
            }
            def.is_custom = true;
            self.custom.push(def);
        }
        skipped
    }

    pub fn list(&self) -> impl Iterator<Item = &ActionDefinition> {
        self.builtins.iter().chain(self.custom.iter())
    }

    pub fn custom(&self) -> &[ActionDefinition] {
        &self.custom
    }

    pub fn get(&self, id: &ActionId) -> Option<&ActionDefinition> {
        self.list().find(|def| &def.id == id)
    }

    /// Validates `draft` and appends it as a custom action. On rejection the
    /// catalog is left untouched. The generated id skips catalog ids and any
    /// id `is_taken` reports as used elsewhere.
    pub fn add(
        &mut self,
        draft: &CustomActionDraft,
        now_millis: i64,
        is_taken: impl Fn(&ActionId) -> bool,
    ) -> Result<&ActionDefinition, DraftRejection> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(DraftRejection::EmptyName);
        }
        let co2_reduction = parse_reduction(&draft.co2_reduction)?;

        let def = ActionDefinition {
            id: self.next_custom_id(now_millis, &is_taken),
            name: name.to_string(),
            co2_reduction,
            category: non_blank(draft.category.as_deref())
                .unwrap_or_else(|| self.default_category.clone()),
            description: non_blank(draft.description.as_deref())
                .unwrap_or_else(|| DEFAULT_CUSTOM_DESCRIPTION.to_string()),
            is_custom: true,
        };
        self.custom.push(def);
        Ok(&self.custom[self.custom.len() - 1])
    }

    fn next_custom_id(&self, now_millis: i64, is_taken: impl Fn(&ActionId) -> bool) -> ActionId {
        let mut candidate = u64::try_from(now_millis).unwrap_or_default();
        loop {
            let id = ActionId::Num(candidate);
            if self.get(&id).is_none() && !is_taken(&id) {
                return id;
            }
            candidate = candidate.saturating_add(1);
        }
    }

    /// "All" followed by each distinct category in first-seen catalog order.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut out = vec![ALL_CATEGORIES.to_string()];
        for def in self.list() {
            if seen.insert(def.category.as_str()) {
                out.push(def.category.clone());
            }
        }
        out
    }

    pub fn filter<'a>(
        &'a self,
        search_term: &str,
        category: &'a str,
    ) -> impl Iterator<Item = &'a ActionDefinition> + 'a {
        let needle = search_term.to_lowercase();
        self.list().filter(move |def| {
            let matches_search = def.name.to_lowercase().contains(&needle);
            let matches_category = category == ALL_CATEGORIES || def.category == category;
            matches_search && matches_category
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, co2: &str) -> CustomActionDraft {
        CustomActionDraft {
            name: name.to_string(),
            co2_reduction: co2.to_string(),
            ..CustomActionDraft::default()
        }
    }

    #[test]
    fn list_starts_with_builtins_in_declaration_order() {
        let catalog = CatalogStore::default();
        let ids: Vec<String> = catalog.list().map(|d| d.id.to_string()).collect();
        assert_eq!(ids, ["1", "2", "3", "4", "5", "6", "7", "8"]);
        assert!(catalog.list().all(|d| !d.is_custom));
    }

    #[test]
    fn add_applies_defaults_for_blank_fields() {
        let mut catalog = CatalogStore::default();
        let added = catalog
            .add(&draft("  Bike  ", "1.2"), 1_700_000_000_000, |_| false)
            .expect("accepted")
            .clone();
        assert_eq!(added.name, "Bike");
        assert_eq!(added.co2_reduction, 1.2);
        assert_eq!(added.category, "Lifestyle");
        assert_eq!(added.description, "Custom action");
        assert!(added.is_custom);
        assert_eq!(catalog.list().last(), Some(&added));
    }

    #[test]
    fn add_rejects_bad_drafts_without_touching_catalog() {
        let mut catalog = CatalogStore::default();
        let before = catalog.clone();

        assert_eq!(
            catalog.add(&draft("Bike", "-1"), 1, |_| false),
            Err(DraftRejection::NonPositiveReduction(-1.0))
        );
        assert_eq!(catalog.add(&draft("   ", "1.2"), 1, |_| false), Err(DraftRejection::EmptyName));
        assert!(matches!(
            catalog.add(&draft("Bike", "lots"), 1, |_| false),
            Err(DraftRejection::InvalidReduction(_))
        ));
        assert!(matches!(
            catalog.add(&draft("Bike", "NaN"), 1, |_| false),
            Err(DraftRejection::InvalidReduction(_))
        ));
        assert_eq!(catalog.add(&draft("Bike", "0"), 1, |_| false), Err(DraftRejection::NonPositiveReduction(0.0)));
        assert_eq!(catalog, before);
    }

    #[test]
    fn custom_ids_stay_unique_within_one_millisecond() {
        let mut catalog = CatalogStore::default();
        let a = catalog.add(&draft("A", "1"), 5_000, |_| false).expect("a").id.clone();
        let b = catalog.add(&draft("B", "1"), 5_000, |_| false).expect("b").id.clone();
        assert_ne!(a, b);
        assert_eq!(b, ActionId::Num(5_001));

        let c = catalog
            .add(&draft("C", "1"), 5_000, |id| *id == ActionId::Num(5_002))
            .expect("c")
            .id
            .clone();
        assert_eq!(c, ActionId::Num(5_003));
    }

    #[test]
    fn numeric_text_ids_load_as_numbers() {
        let ids: Vec<ActionId> = serde_json::from_str(r#"[17, "17", " 42 ", "gone"]"#).expect("ids");
        assert_eq!(
            ids,
            [
                ActionId::Num(17),
                ActionId::Num(17),
                ActionId::Num(42),
                ActionId::Text("gone".to_string()),
            ]
        );
        assert_eq!(ActionId::parse("17"), ids[1]);
    }

    #[test]
    fn categories_are_prefixed_and_distinct() {
        let mut catalog = CatalogStore::default();
        let mut custom = draft("Compost", "0.4");
        custom.category = Some("Garden".to_string());
        catalog.add(&custom, 10, |_| false).expect("added");

        assert_eq!(
            catalog.categories(),
            ["All", "Lifestyle", "Travel", "Food", "Home", "Waste", "Garden"]
        );
    }

    #[test]
    fn filter_combines_search_and_category() {
        let catalog = CatalogStore::default();
        let names: Vec<&str> = catalog
            .filter("REUSABLE", ALL_CATEGORIES)
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(
            names,
            ["Use a reusable water bottle", "Bring a reusable shopping bag"]
        );

        let travel: Vec<u64> = catalog
            .filter("", "Travel")
            .filter_map(|d| match d.id {
                ActionId::Num(n) => Some(n),
                ActionId::Text(_) => None,
            })
            .collect();
        assert_eq!(travel, [2, 7]);

        assert_eq!(catalog.filter("", "Nowhere").count(), 0);
    }

    #[test]
    fn restore_custom_skips_colliding_ids() {
        let mut catalog = CatalogStore::default();
        let clash = builtin(3, "Impostor", 9.0, "Food", "");
        let fresh = ActionDefinition {
            id: ActionId::Text("bike".to_string()),
            ..builtin(0, "Bike", 1.2, "Travel", "Pedal")
        };
        let skipped = catalog.restore_custom(vec![clash, fresh]);
        assert_eq!(skipped, 1);
        assert_eq!(catalog.custom().len(), 1);
        assert!(catalog.custom()[0].is_custom);
        assert_eq!(catalog.get(&ActionId::Num(3)).map(|d| d.name.as_str()), Some("Eat a plant-based meal"));
    }

    #[test]
    fn action_id_parses_numbers_and_text() {
        assert_eq!(ActionId::parse(" 42 "), ActionId::Num(42));
        assert_eq!(ActionId::parse("bike"), ActionId::Text("bike".to_string()));
    }
}
