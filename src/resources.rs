//! Player resource ledger: bounded stats, credits, and game time.
//!
//! Percentage-style resources (health, fuel, supplies, reputation) clamp to
//! [0, 100]. Credits never go negative: the rejecting and flooring policies
//! are two distinct operations so callers must pick one explicitly.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors from ledger operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient credits: need {needed}, have {available}")]
    InsufficientCredits { needed: i64, available: i64 },
}

/// The named resources a player carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    Health,
    Credits,
    Fuel,
    Supplies,
    Reputation,
}

impl Resource {
    pub fn name(&self) -> &'static str {
        match self {
            Resource::Health => "health",
            Resource::Credits => "credits",
            Resource::Fuel => "fuel",
            Resource::Supplies => "supplies",
            Resource::Reputation => "reputation",
        }
    }

    /// Percentage resources clamp to [0, 100]; credits do not.
    pub fn is_percentage(&self) -> bool {
        !matches!(self, Resource::Credits)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Monotonically non-decreasing game clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTime {
    pub cycles: u64,
    pub hours: u64,
}

impl GameTime {
    /// Advance the clock. Time never moves backwards, so the deltas are
    /// unsigned by construction.
    pub fn advance(&mut self, cycles: u64, hours: u64) {
        self.cycles += cycles;
        self.hours += hours;
    }
}

impl fmt::Display for GameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cycle {}, hour {}", self.cycles, self.hours)
    }
}

/// Bounded numeric stats attached to a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLedger {
    pub health: i64,
    pub credits: i64,
    pub fuel: i64,
    pub supplies: i64,
    pub reputation: i64,
    pub time: GameTime,
}

impl ResourceLedger {
    /// Starting resources for a fresh character.
    pub fn new() -> Self {
        Self {
            health: 100,
            credits: 1000,
            fuel: 100,
            supplies: 100,
            reputation: 50,
            time: GameTime::default(),
        }
    }

    pub fn get(&self, resource: Resource) -> i64 {
        match resource {
            Resource::Health => self.health,
            Resource::Credits => self.credits,
            Resource::Fuel => self.fuel,
            Resource::Supplies => self.supplies,
            Resource::Reputation => self.reputation,
        }
    }

    fn set(&mut self, resource: Resource, value: i64) {
        match resource {
            Resource::Health => self.health = value,
            Resource::Credits => self.credits = value,
            Resource::Fuel => self.fuel = value,
            Resource::Supplies => self.supplies = value,
            Resource::Reputation => self.reputation = value,
        }
    }

    /// Apply a signed delta.
    ///
    /// Percentage resources clamp to [0, 100]. A credits delta that would
    /// drive the balance negative is rejected with no mutation, so purchase
    /// flows can branch on the failure.
    pub fn apply_delta(&mut self, resource: Resource, delta: i64) -> Result<(), LedgerError> {
        let current = self.get(resource);
        if resource.is_percentage() {
            self.set(resource, (current + delta).clamp(0, 100));
            return Ok(());
        }

        let next = current + delta;
        if next < 0 {
            return Err(LedgerError::InsufficientCredits {
                needed: -delta,
                available: current,
            });
        }
        self.set(resource, next);
        Ok(())
    }

    /// Apply a credits delta that floors at zero instead of rejecting.
    ///
    /// Event-choice costs use this policy; purchases use
    /// [`apply_delta`](Self::apply_delta). Returns the amount actually
    /// removed or added.
    pub fn drain_credits(&mut self, delta: i64) -> i64 {
        let before = self.credits;
        self.credits = (self.credits + delta).max(0);
        self.credits - before
    }

    /// Whether the ledger can cover a credit cost.
    pub fn can_afford(&self, cost: i64) -> bool {
        self.credits >= cost
    }
}

impl Default for ResourceLedger {
    fn default() -> Self {
        Self::new()
    }
}
