//! Events and choice resolution.
//!
//! An event is a description plus a fixed set of choices. Resolving a choice
//! applies its costs and rewards to the ledger, inventory, and crew in one
//! pass. Costs use the flooring policy: fuel clamps to its percentage range
//! and credits bottom out at zero rather than rejecting the choice.
//!
//! The catalog holds the built-in normal and morale event pools; generation
//! picks from the morale pool whenever crew morale has dropped below 50.

use crate::crew::Crew;
use crate::inventory::{Inventory, InventoryError};
use crate::items::Item;
use crate::resources::{Resource, ResourceLedger};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for an event instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors from event resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("choice {index} is out of range (event has {available} choices)")]
    ChoiceOutOfRange { index: usize, available: usize },

    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

/// Which pool an event belongs to and how drivers should treat it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// General exploration and hazard events.
    Normal,
    /// Crew-focused events surfaced when morale runs low.
    Morale,
    /// Scenario-driven story beats.
    Story,
    /// Events that open a combat encounter.
    Combat,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Normal => "normal",
            EventKind::Morale => "morale",
            EventKind::Story => "story",
            EventKind::Combat => "combat",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resource deltas a choice charges up front. Stored as signed deltas, so a
/// 20-fuel cost is `fuel: -20`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceCosts {
    #[serde(default)]
    pub fuel: i64,
    #[serde(default)]
    pub credits: i64,
}

/// What a choice pays out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceRewards {
    #[serde(default)]
    pub credits: i64,
    #[serde(default)]
    pub items: Vec<String>,
}

/// One selectable option on an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventChoice {
    pub description: String,
    /// Outcome text shown (or narrated) after the choice resolves.
    pub message: String,
    #[serde(default)]
    pub costs: ChoiceCosts,
    #[serde(default)]
    pub rewards: ChoiceRewards,
    #[serde(default)]
    pub morale_change: Option<i64>,
}

impl EventChoice {
    pub fn new(description: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            message: message.into(),
            costs: ChoiceCosts::default(),
            rewards: ChoiceRewards::default(),
            morale_change: None,
        }
    }

    pub fn with_costs(mut self, fuel: i64, credits: i64) -> Self {
        self.costs = ChoiceCosts { fuel, credits };
        self
    }

    pub fn with_rewards(mut self, credits: i64, items: &[&str]) -> Self {
        self.rewards = ChoiceRewards {
            credits,
            items: items.iter().map(|s| s.to_string()).collect(),
        };
        self
    }

    pub fn with_morale_change(mut self, delta: i64) -> Self {
        self.morale_change = Some(delta);
        self
    }
}

/// A game event awaiting a player decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEvent {
    pub id: EventId,
    pub kind: EventKind,
    pub description: String,
    pub choices: Vec<EventChoice>,
    /// Free-form context handed to the narration layer.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// The player's last free-text input during this event, if any.
    #[serde(default)]
    pub last_interaction: Option<String>,
    /// The last narrated scene for this event, if any.
    #[serde(default)]
    pub last_scene: Option<String>,
}

impl GameEvent {
    pub fn new(kind: EventKind, description: impl Into<String>, choices: Vec<EventChoice>) -> Self {
        Self {
            id: EventId::new(),
            kind,
            description: description.into(),
            choices,
            context: BTreeMap::new(),
            last_interaction: None,
            last_scene: None,
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Everything a resolved choice did, for drivers and narration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceOutcome {
    pub message: String,
    pub costs: ChoiceCosts,
    pub rewards: ChoiceRewards,
    pub morale_change: Option<i64>,
}

/// Resolve the `index`-th choice (zero-based) of an event against the
/// player's state.
///
/// Costs land first with the flooring policy, then credit rewards, then item
/// rewards as keepsakes, then the morale change clamped to [0, 100]. An
/// out-of-range index changes nothing.
pub fn resolve_choice(
    event: &GameEvent,
    index: usize,
    ledger: &mut ResourceLedger,
    inventory: &mut Inventory,
    crew: &mut Crew,
) -> Result<ChoiceOutcome, EventError> {
    let choice = event
        .choices
        .get(index)
        .ok_or(EventError::ChoiceOutOfRange {
            index,
            available: event.choices.len(),
        })?;

    // Costs. Fuel clamps inside its percentage range and credits floor at
    // zero, so a cost never fails the choice.
    if choice.costs.fuel != 0 {
        let _ = ledger.apply_delta(Resource::Fuel, choice.costs.fuel);
    }
    if choice.costs.credits != 0 {
        ledger.drain_credits(choice.costs.credits);
    }

    // Rewards.
    if choice.rewards.credits != 0 {
        ledger.drain_credits(choice.rewards.credits);
    }
    for name in &choice.rewards.items {
        inventory.add(Item::keepsake(name))?;
    }

    if let Some(delta) = choice.morale_change {
        crew.adjust_morale(delta as f64);
    }

    Ok(ChoiceOutcome {
        message: choice.message.clone(),
        costs: choice.costs.clone(),
        rewards: choice.rewards.clone(),
        morale_change: choice.morale_change,
    })
}

// ============================================================================
// Built-in event pools
// ============================================================================

/// The morale threshold below which crew events take over.
pub const LOW_MORALE_THRESHOLD: f64 = 50.0;

/// Immutable registry of the built-in event pools.
#[derive(Debug, Clone)]
pub struct EventCatalog {
    normal: Vec<GameEvent>,
    morale: Vec<GameEvent>,
}

impl EventCatalog {
    /// The built-in pools: exploration hazards and low-morale crew events.
    pub fn standard() -> Self {
        let normal = vec![GameEvent::new(
            EventKind::Normal,
            "Your ship encounters a powerful solar storm.",
            vec![
                EventChoice::new(
                    "Try to navigate through it",
                    "You bravely navigate through the storm, testing your ship's capabilities.",
                )
                .with_costs(-20, 0)
                .with_rewards(200, &["Shield Upgrade"]),
                EventChoice::new(
                    "Find shelter in a nearby asteroid field",
                    "You find refuge in the asteroid field, waiting for the storm to pass.",
                )
                .with_costs(-10, 0)
                .with_rewards(100, &["Asteroid Sample"]),
                EventChoice::new(
                    "Return to the nearest space station",
                    "You return to the station, prioritizing safety over time.",
                )
                .with_costs(-30, 0)
                .with_rewards(50, &[]),
            ],
        )];

        let morale = vec![GameEvent::new(
            EventKind::Morale,
            "Your crew's morale is low after weeks in deep space.",
            vec![
                EventChoice::new(
                    "Lead a group meditation session",
                    "The meditation session helps calm the crew's nerves.",
                )
                .with_morale_change(15),
                EventChoice::new(
                    "Make an emergency stop at a trading post",
                    "The brief respite at the trading post lifts everyone's spirits.",
                )
                .with_costs(-20, -100)
                .with_rewards(0, &["Crew Supplies"])
                .with_morale_change(25),
                EventChoice::new(
                    "Push forward to the next mission",
                    "The crew's determination is tested as you continue the mission.",
                )
                .with_costs(-5, 0)
                .with_rewards(50, &[])
                .with_morale_change(-10),
            ],
        )];

        Self { normal, morale }
    }

    /// A catalog with custom pools.
    pub fn with_pools(normal: Vec<GameEvent>, morale: Vec<GameEvent>) -> Self {
        Self { normal, morale }
    }

    /// Pick an event for the crew's current condition.
    ///
    /// Morale below [`LOW_MORALE_THRESHOLD`] selects from the morale pool,
    /// otherwise from the normal pool. Each generated event gets a fresh id.
    pub fn generate_event(&self, crew: &Crew, rng: &mut impl Rng) -> Option<GameEvent> {
        let pool = if crew.morale < LOW_MORALE_THRESHOLD {
            &self.morale
        } else {
            &self.normal
        };
        pool.choose(rng).map(|event| {
            let mut event = event.clone();
            event.id = EventId::new();
            event
        })
    }

    pub fn normal_pool(&self) -> &[GameEvent] {
        &self.normal
    }

    pub fn morale_pool(&self) -> &[GameEvent] {
        &self.morale
    }
}
