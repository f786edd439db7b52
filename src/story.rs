//! Story scenarios and prerequisite-gated progression.
//!
//! The scenario catalog is static configuration: a small DAG where each
//! scenario names the scenarios that must be completed before it unlocks.
//! Progress is the set of completed ids plus an optional current-scenario
//! pointer; availability is always re-derived from those, never cached.

use lazy_static::lazy_static;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One story beat in the scenario graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Ids that must all be completed before this scenario unlocks.
    pub required_previous: Vec<String>,
}

impl Scenario {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        required_previous: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            required_previous: required_previous.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// How to break ties when several scenarios are available at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// First available scenario in catalog order. Deterministic story mode.
    #[default]
    CatalogOrder,
    /// Uniform pick among the available scenarios. Replayable mode.
    UniformRandom,
}

/// Immutable, ordered scenario registry loaded once at startup.
#[derive(Debug, Clone)]
pub struct ScenarioCatalog {
    scenarios: Vec<Scenario>,
}

lazy_static! {
    /// The built-in campaign: one opening conflict gating three follow-ups.
    pub static ref STANDARD_SCENARIOS: ScenarioCatalog = ScenarioCatalog::with_scenarios(vec![
        Scenario::new(
            "starting_conflict",
            "Distress Signal from Nebula Dawn",
            "A distress signal from a rival ship tests your judgment and crew leadership.",
            &[],
        ),
        Scenario::new(
            "consortium_contract",
            "The Global Consortium's Offer",
            "The Global Consortium approaches with a lucrative but morally ambiguous contract.",
            &["starting_conflict"],
        ),
        Scenario::new(
            "resistance_contact",
            "Message from the Resistance",
            "A covert message from the Resistance seeks your aid against the Consortium.",
            &["starting_conflict"],
        ),
        Scenario::new(
            "spiritual_awakening",
            "The Ancient Temple Discovery",
            "Your crew discovers an ancient temple floating in deep space.",
            &["starting_conflict"],
        ),
    ]);
}

impl ScenarioCatalog {
    pub fn standard() -> &'static Self {
        &STANDARD_SCENARIOS
    }

    pub fn with_scenarios(scenarios: Vec<Scenario>) -> Self {
        Self { scenarios }
    }

    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

/// A player's position in the scenario graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryProgress {
    pub completed: BTreeSet<String>,
    /// The scenario the player is in the middle of, if any.
    pub current: Option<String>,
}

impl StoryProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_completed(&self, id: &str) -> bool {
        self.completed.contains(id)
    }

    /// Scenarios not yet completed whose prerequisites are all met, in
    /// catalog order.
    pub fn available<'a>(&self, catalog: &'a ScenarioCatalog) -> Vec<&'a Scenario> {
        catalog
            .iter()
            .filter(|s| !self.completed.contains(&s.id))
            .filter(|s| s.required_previous.iter().all(|r| self.completed.contains(r)))
            .collect()
    }

    /// Pick the next scenario under the given tie-break policy.
    pub fn next_available<'a>(
        &self,
        catalog: &'a ScenarioCatalog,
        mode: SelectionMode,
        rng: &mut impl Rng,
    ) -> Option<&'a Scenario> {
        let available = self.available(catalog);
        match mode {
            SelectionMode::CatalogOrder => available.first().copied(),
            SelectionMode::UniformRandom => available.choose(rng).copied(),
        }
    }

    /// Enter a scenario, remembering it as current.
    pub fn begin(&mut self, id: impl Into<String>) {
        self.current = Some(id.into());
    }

    /// Record a scenario as completed.
    ///
    /// Idempotent; also clears the current-scenario pointer so the next
    /// selection re-derives availability.
    pub fn mark_complete(&mut self, id: impl Into<String>) {
        self.completed.insert(id.into());
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unlocked_scenarios_are_available() {
        let catalog = ScenarioCatalog::standard();
        let progress = StoryProgress::new();

        let available = progress.available(catalog);
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, "starting_conflict");
    }

    #[test]
    fn test_completing_the_opener_unlocks_three_branches() {
        let catalog = ScenarioCatalog::standard();
        let mut progress = StoryProgress::new();
        progress.mark_complete("starting_conflict");

        let ids: Vec<&str> = progress
            .available(catalog)
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(
            ids,
            vec![
                "consortium_contract",
                "resistance_contact",
                "spiritual_awakening"
            ]
        );
    }

    #[test]
    fn test_catalog_order_selection_is_deterministic() {
        let catalog = ScenarioCatalog::standard();
        let mut progress = StoryProgress::new();
        progress.mark_complete("starting_conflict");
        let mut rng = StdRng::seed_from_u64(1);

        let next = progress
            .next_available(catalog, SelectionMode::CatalogOrder, &mut rng)
            .unwrap();
        assert_eq!(next.id, "consortium_contract");
    }

    #[test]
    fn test_uniform_selection_stays_within_available() {
        let catalog = ScenarioCatalog::standard();
        let mut progress = StoryProgress::new();
        progress.mark_complete("starting_conflict");
        let mut rng = StdRng::seed_from_u64(2);

        for _ in 0..50 {
            let next = progress
                .next_available(catalog, SelectionMode::UniformRandom, &mut rng)
                .unwrap();
            assert_ne!(next.id, "starting_conflict");
        }
    }

    #[test]
    fn test_mark_complete_is_idempotent_and_clears_current() {
        let mut progress = StoryProgress::new();
        progress.begin("starting_conflict");
        assert_eq!(progress.current.as_deref(), Some("starting_conflict"));

        progress.mark_complete("starting_conflict");
        progress.mark_complete("starting_conflict");
        assert_eq!(progress.completed.len(), 1);
        assert_eq!(progress.current, None);
    }

    #[test]
    fn test_exhausted_graph_yields_nothing() {
        let catalog = ScenarioCatalog::standard();
        let mut progress = StoryProgress::new();
        for scenario in catalog.iter() {
            progress.mark_complete(scenario.id.clone());
        }
        let mut rng = StdRng::seed_from_u64(3);
        assert!(progress
            .next_available(catalog, SelectionMode::CatalogOrder, &mut rng)
            .is_none());
    }

    #[test]
    fn test_progress_round_trips_through_json() {
        let mut progress = StoryProgress::new();
        progress.mark_complete("starting_conflict");
        progress.begin("resistance_contact");

        let json = serde_json::to_string(&progress).unwrap();
        let back: StoryProgress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, progress);
    }
}
