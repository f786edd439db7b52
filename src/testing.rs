//! Testing utilities for the engine.
//!
//! This module provides tools for integration testing:
//! - `ScriptedNarrator` for deterministic narration without a model
//! - sample fixtures for players and opponents
//! - Assertion helpers for verifying game state

use crate::combat::{Ability, CombatEntity};
use crate::narration::{NarrationContext, NarrationError, Narrator};
use crate::player::Player;
use crate::relationships::{Relationship, RelationshipType};
use crate::resources::ResourceLedger;

/// A narration backend that returns scripted responses in order.
///
/// Once the script runs out it keeps narrating a fixed stock line, so a
/// test can not stall on an exhausted script. Every prompt it receives is
/// recorded for later inspection.
pub struct ScriptedNarrator {
    responses: Vec<String>,
    response_index: usize,
    prompts: Vec<String>,
    fail: bool,
}

impl ScriptedNarrator {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: responses.into_iter().map(str::to_string).collect(),
            response_index: 0,
            prompts: Vec::new(),
            fail: false,
        }
    }

    /// A backend that fails every call, for exercising the fallback path.
    pub fn failing() -> Self {
        Self {
            responses: Vec::new(),
            response_index: 0,
            prompts: Vec::new(),
            fail: true,
        }
    }

    /// Append another scripted response.
    pub fn queue_response(&mut self, text: impl Into<String>) {
        self.responses.push(text.into());
    }

    /// All prompts this narrator has been asked to narrate, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn last_prompt(&self) -> Option<&str> {
        self.prompts.last().map(String::as_str)
    }
}

impl Narrator for ScriptedNarrator {
    fn narrate(&mut self, prompt: &str, _context: &NarrationContext) -> Result<String, NarrationError> {
        if self.fail {
            return Err(NarrationError::Backend("scripted failure".to_string()));
        }
        self.prompts.push(prompt.to_string());
        let response = if self.response_index < self.responses.len() {
            let r = self.responses[self.response_index].clone();
            self.response_index += 1;
            r
        } else {
            "The narrator has no more scripted responses.".to_string()
        };
        Ok(response)
    }
}

/// A fully created sample pilot, ready for event and combat tests.
pub fn sample_pilot(name: &str) -> Player {
    let mut player = Player::new(name).expect("sample name is non-empty");
    player.gender = Some("Female".to_string());
    player.race = Some("Human".to_string());
    player.time_period = Some("Future".to_string());
    player.role = Some("Pilot".to_string());
    player.initialize_inventory();
    player.initialize_relationships();
    player
}

/// A stock low-threat opponent.
pub fn sample_raider() -> CombatEntity {
    CombatEntity::new("Void Raider", 100)
        .with_ability(Ability::new("Laser Strike", 15, 25))
        .with_ability(Ability::new("Plasma Burst", 15, 25))
}

/// Assert every percentage resource sits inside [0, 100] and credits are
/// non-negative.
#[track_caller]
pub fn assert_ledger_bounds(ledger: &ResourceLedger) {
    for (name, value) in [
        ("health", ledger.health),
        ("fuel", ledger.fuel),
        ("supplies", ledger.supplies),
        ("reputation", ledger.reputation),
    ] {
        assert!(
            (0..=100).contains(&value),
            "Expected {name} within [0, 100], got {value}"
        );
    }
    assert!(
        ledger.credits >= 0,
        "Expected non-negative credits, got {}",
        ledger.credits
    );
}

/// Assert a relationship's derived type matches its affinity.
#[track_caller]
pub fn assert_relationship_consistent(relationship: &Relationship) {
    let expected = RelationshipType::from_affinity(relationship.affinity);
    assert_eq!(
        relationship.relationship_type, expected,
        "Expected {} (affinity {}) to be {expected:?}",
        relationship.npc_id, relationship.affinity
    );
}
