//! Crew rest/morale model and the shipboard activity catalog.
//!
//! Rest and morale decay over elapsed hours and recover through activities.
//! The derived status tier uses priority-ordered, non-exclusive thresholds;
//! when no condition matches, the previous tier sticks. That ordering is
//! load-bearing and covered by regression tests.

use crate::resources::{LedgerError, Resource, ResourceLedger};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Entries kept in the activity log before old ones are dropped.
const ACTIVITY_LOG_LIMIT: usize = 50;

/// Errors from crew operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CrewError {
    #[error("unknown crew activity: {0}")]
    UnknownActivity(String),

    #[error(transparent)]
    Credits(#[from] LedgerError),
}

/// Derived crew condition tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CrewStatus {
    #[default]
    WellRested,
    Rested,
    Tired,
    Exhausted,
}

impl CrewStatus {
    pub fn name(&self) -> &'static str {
        match self {
            CrewStatus::WellRested => "Well Rested",
            CrewStatus::Rested => "Rested",
            CrewStatus::Tired => "Tired",
            CrewStatus::Exhausted => "Exhausted",
        }
    }

    /// Multiplier applied to crew task effectiveness at this tier.
    pub fn performance_modifier(&self) -> f64 {
        match self {
            CrewStatus::WellRested => 1.2,
            CrewStatus::Rested => 1.1,
            CrewStatus::Tired => 0.9,
            CrewStatus::Exhausted => 0.7,
        }
    }

    /// Flat morale adjustment the tier contributes to derived checks.
    pub fn morale_modifier(&self) -> i32 {
        match self {
            CrewStatus::WellRested => 10,
            CrewStatus::Rested => 5,
            CrewStatus::Tired => -5,
            CrewStatus::Exhausted => -10,
        }
    }
}

impl fmt::Display for CrewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Activities
// ============================================================================

/// A crew activity definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    /// Rest delta; negative for strenuous activities.
    pub rest: f64,
    pub morale: f64,
    /// Hours the activity takes.
    pub duration: u64,
    /// Credit cost, deducted up front.
    pub cost: i64,
    pub description: String,
}

impl Activity {
    fn new(
        name: &str,
        rest: f64,
        morale: f64,
        duration: u64,
        cost: i64,
        description: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            rest,
            morale,
            duration,
            cost,
            description: description.to_string(),
        }
    }
}

lazy_static::lazy_static! {
    static ref STANDARD_ACTIVITIES: Vec<Activity> = vec![
        Activity::new(
            "Shore Leave", 40.0, 30.0, 48, 500,
            "Extended rest period at a space station or planet",
        ),
        Activity::new(
            "Recreation Time", 20.0, 15.0, 8, 100,
            "Organized recreational activities on the ship",
        ),
        Activity::new(
            "Training Exercise", -10.0, 10.0, 4, 50,
            "Group training to improve skills and teamwork",
        ),
        Activity::new(
            "Meditation Session", 15.0, 10.0, 2, 0,
            "Group meditation for mental recovery",
        ),
        Activity::new(
            "Movie Night", 10.0, 20.0, 3, 20,
            "Watch entertainment together as a crew",
        ),
        Activity::new(
            "Feast", 5.0, 25.0, 4, 200,
            "Special meal with premium provisions",
        ),
    ];
}

/// Immutable registry of crew activities.
///
/// Passed explicitly so tests can substitute alternate catalogs.
#[derive(Debug, Clone)]
pub struct ActivityCatalog {
    activities: Vec<Activity>,
}

impl ActivityCatalog {
    /// The six built-in shipboard activities.
    pub fn standard() -> Self {
        Self {
            activities: STANDARD_ACTIVITIES.clone(),
        }
    }

    pub fn with_activities(activities: Vec<Activity>) -> Self {
        Self { activities }
    }

    pub fn get(&self, name: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.name == name)
    }

    /// Activities the ledger can currently pay for.
    pub fn available<'a>(&'a self, ledger: &ResourceLedger) -> Vec<&'a Activity> {
        self.activities
            .iter()
            .filter(|a| ledger.can_afford(a.cost))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Activity> {
        self.activities.iter()
    }
}

/// One completed activity, as remembered by the crew.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub activity: String,
    pub duration: u64,
    pub rest_effect: f64,
    pub morale_effect: f64,
}

/// Outcome summary returned from a performed activity.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityOutcome {
    pub activity: String,
    pub rest_gained: f64,
    pub morale_gained: f64,
    pub credits_spent: i64,
    pub duration: u64,
    pub status: CrewStatus,
}

// ============================================================================
// Crew
// ============================================================================

/// The player's crew: rest, morale, and recent history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crew {
    pub morale: f64,
    pub rest: f64,
    pub status: CrewStatus,
    pub hours_since_rest: u64,
    pub activity_log: Vec<ActivityLogEntry>,
    pub current_activity: Option<String>,
}

impl Crew {
    /// A fresh crew at full rest and morale.
    pub fn new() -> Self {
        Self {
            morale: 100.0,
            rest: 100.0,
            status: CrewStatus::WellRested,
            hours_since_rest: 0,
            activity_log: Vec::new(),
            current_activity: None,
        }
    }

    /// Advance crew condition by elapsed hours.
    ///
    /// Rest decays at 0.5/hour and morale at 0.2/hour, both clamped to
    /// [0, 100], then the status tier is re-derived.
    pub fn update_status(&mut self, hours_passed: u64) {
        self.hours_since_rest += hours_passed;

        let hours = hours_passed as f64;
        self.rest = (self.rest - hours * 0.5).clamp(0.0, 100.0);
        self.morale = (self.morale - hours * 0.2).clamp(0.0, 100.0);

        // Priority-ordered thresholds; a later arm only applies when every
        // earlier one failed, and no match leaves the tier untouched.
        if self.rest >= 80.0 && self.morale >= 80.0 {
            self.status = CrewStatus::WellRested;
        } else if self.rest >= 60.0 && self.morale >= 60.0 {
            self.status = CrewStatus::Rested;
        } else if self.rest <= 30.0 || self.morale <= 30.0 {
            self.status = CrewStatus::Exhausted;
        } else if self.rest <= 50.0 || self.morale <= 50.0 {
            self.status = CrewStatus::Tired;
        }
    }

    /// Perform a named activity from the catalog.
    ///
    /// Validates affordability first; on success applies the rest/morale
    /// deltas, deducts the cost, resets the rest clock, logs the activity,
    /// and advances crew condition by the activity's duration.
    pub fn perform_activity(
        &mut self,
        ledger: &mut ResourceLedger,
        catalog: &ActivityCatalog,
        name: &str,
    ) -> Result<ActivityOutcome, CrewError> {
        let activity = catalog
            .get(name)
            .ok_or_else(|| CrewError::UnknownActivity(name.to_string()))?;

        ledger.apply_delta(Resource::Credits, -activity.cost)?;

        self.rest = (self.rest + activity.rest).clamp(0.0, 100.0);
        self.morale = (self.morale + activity.morale).clamp(0.0, 100.0);
        self.hours_since_rest = 0;
        self.current_activity = Some(activity.name.clone());

        self.activity_log.push(ActivityLogEntry {
            activity: activity.name.clone(),
            duration: activity.duration,
            rest_effect: activity.rest,
            morale_effect: activity.morale,
        });
        if self.activity_log.len() > ACTIVITY_LOG_LIMIT {
            let excess = self.activity_log.len() - ACTIVITY_LOG_LIMIT;
            self.activity_log.drain(..excess);
        }

        self.update_status(activity.duration);

        Ok(ActivityOutcome {
            activity: activity.name.clone(),
            rest_gained: activity.rest,
            morale_gained: activity.morale,
            credits_spent: activity.cost,
            duration: activity.duration,
            status: self.status,
        })
    }

    /// Apply a direct morale change, clamped to [0, 100].
    ///
    /// Used by event outcomes. The status tier is left alone; it is
    /// re-derived the next time crew condition advances.
    pub fn adjust_morale(&mut self, delta: f64) {
        self.morale = (self.morale + delta).clamp(0.0, 100.0);
    }

    /// The most recent `n` log entries, newest last.
    pub fn recent_activities(&self, n: usize) -> &[ActivityLogEntry] {
        let start = self.activity_log.len().saturating_sub(n);
        &self.activity_log[start..]
    }

    /// Multi-line condition report: tier and performance modifier, recent
    /// activities, and the activities the ledger can currently afford.
    pub fn status_report(&self, ledger: &ResourceLedger, catalog: &ActivityCatalog) -> String {
        let mut out = format!(
            "Crew Status: {} (performance x{:.1})\n",
            self.status.name(),
            self.status.performance_modifier()
        );
        out.push_str(&format!(
            "Morale: {:.0}/100 | Rest: {:.0}/100 | Hours since rest: {}\n",
            self.morale, self.rest, self.hours_since_rest
        ));
        if let Some(current) = &self.current_activity {
            out.push_str(&format!("Current activity: {current}\n"));
        }

        let recent = self.recent_activities(3);
        if !recent.is_empty() {
            out.push_str("Recent activities:\n");
            for entry in recent {
                out.push_str(&format!("  {} ({}h)\n", entry.activity, entry.duration));
            }
        }

        out.push_str("Available activities:\n");
        for activity in catalog.available(ledger) {
            out.push_str(&format!(
                "  {} ({} credits): {}\n",
                activity.name, activity.cost, activity.description
            ));
        }
        out
    }
}

impl Default for Crew {
    fn default() -> Self {
        Self::new()
    }
}
