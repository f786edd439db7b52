//! The player aggregate and character creation.
//!
//! A player owns every piece of per-character state: identity, ledger,
//! inventory, relationships, crew, story progress, and the event currently
//! awaiting a decision. Creation runs as a fixed step machine (gender, race,
//! time period, role); each applied step returns the next prompt so drivers
//! can stay stateless.

use crate::crew::Crew;
use crate::events::GameEvent;
use crate::inventory::Inventory;
use crate::items::Item;
use crate::relationships::{Relationship, RelationshipStore};
use crate::resources::ResourceLedger;
use crate::story::StoryProgress;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Skills offered at creation; exactly three are picked.
pub const AVAILABLE_SKILLS: &[&str] = &[
    "Lockpicking",
    "Strategy",
    "Weapons Mastery",
    "Stealth",
    "Negotiation",
];

/// Pool the three random weaknesses are drawn from.
pub const WEAKNESS_POOL: &[&str] = &[
    "Fear of Heights",
    "Weakness for Beautiful Women",
    "Allergy to Dust",
    "Claustrophobia",
    "Recklessness",
];

/// Strength options, one pick per category.
pub const STRENGTH_CATEGORIES: &[(&str, &[&str])] = &[
    ("Combat", &["Physical Strength", "Agility", "Endurance"]),
    ("Social", &["Charisma", "Leadership", "Perception"]),
    (
        "Psychological",
        &["Wisdom", "Mental Resilience", "Spiritual Guidance"],
    ),
];

/// Errors from character creation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CreationError {
    #[error("character name cannot be empty")]
    EmptyName,

    #[error("exactly 3 skills must be selected, got {0}")]
    WrongSkillCount(usize),

    #[error("unknown skill: {0}")]
    UnknownSkill(String),

    #[error("skill already selected: {0}")]
    DuplicateSkill(String),

    #[error("unknown strength category: {0}")]
    UnknownCategory(String),

    #[error("{name} is not a {category} strength")]
    UnknownStrength { category: String, name: String },

    #[error("strength already selected: {0}")]
    DuplicateStrength(String),
}

// ============================================================================
// Personality
// ============================================================================

/// Moral alignment, re-derived when alignment-bearing traits are added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Neutral,
    #[serde(rename = "Lawful Good")]
    LawfulGood,
    #[serde(rename = "Chaotic Evil")]
    ChaoticEvil,
    #[serde(rename = "True Neutral")]
    TrueNeutral,
}

impl Alignment {
    pub fn name(&self) -> &'static str {
        match self {
            Alignment::Neutral => "Neutral",
            Alignment::LawfulGood => "Lawful Good",
            Alignment::ChaoticEvil => "Chaotic Evil",
            Alignment::TrueNeutral => "True Neutral",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Alignment plus accumulated traits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personality {
    pub alignment: Alignment,
    pub traits: Vec<String>,
}

impl Personality {
    /// Record a trait (once) and remap alignment when the trait carries one.
    pub fn add_trait(&mut self, name: &str) {
        if !self.traits.iter().any(|t| t == name) {
            self.traits.push(name.to_string());
        }
        match name {
            "Altruistic" => self.alignment = Alignment::LawfulGood,
            "Selfish" => self.alignment = Alignment::ChaoticEvil,
            "Neutral" => self.alignment = Alignment::TrueNeutral,
            _ => {}
        }
    }
}

// ============================================================================
// Creation step machine
// ============================================================================

/// Steps of the creation questionnaire, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationStep {
    Gender,
    Race,
    TimePeriod,
    Role,
    Complete,
}

/// What the driver should show for the next creation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepPrompt {
    pub step: CreationStep,
    pub prompt: String,
    pub options: Vec<String>,
}

fn step_prompt(step: CreationStep, prompt: &str, options: &[&str]) -> StepPrompt {
    StepPrompt {
        step,
        prompt: prompt.to_string(),
        options: options.iter().map(|s| s.to_string()).collect(),
    }
}

// ============================================================================
// Player
// ============================================================================

/// The root per-character aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub race: Option<String>,
    #[serde(default)]
    pub time_period: Option<String>,
    #[serde(default)]
    pub setting: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub resources: ResourceLedger,
    #[serde(default)]
    pub inventory: Inventory,
    #[serde(default)]
    pub relationships: RelationshipStore,
    #[serde(default)]
    pub personality: Personality,
    #[serde(default)]
    pub crew: Crew,
    #[serde(default)]
    pub story: StoryProgress,
    /// The event awaiting a decision, if any.
    #[serde(default)]
    pub current_event: Option<GameEvent>,
}

impl Player {
    /// A fresh character with starting resources. The name is the
    /// case-insensitive persistence key and must be non-empty.
    pub fn new(name: &str) -> Result<Self, CreationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CreationError::EmptyName);
        }
        Ok(Self {
            name: name.to_string(),
            gender: None,
            race: None,
            time_period: None,
            setting: String::new(),
            role: None,
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            skills: Vec::new(),
            resources: ResourceLedger::new(),
            inventory: Inventory::new(),
            relationships: RelationshipStore::new(),
            personality: Personality::default(),
            crew: Crew::new(),
            story: StoryProgress::new(),
            current_event: None,
        })
    }

    /// The key this character is persisted under.
    pub fn storage_key(&self) -> String {
        self.name.to_lowercase()
    }

    /// The first prompt of the creation questionnaire.
    pub fn begin_creation(&self) -> StepPrompt {
        step_prompt(
            CreationStep::Gender,
            "The voice asks: 'What is your gender?'",
            &["Male", "Female", "Other"],
        )
    }

    /// Record one questionnaire answer and return the next prompt.
    ///
    /// Answers are free text; the listed options are suggestions, not a
    /// closed set. Applying `Complete` is a no-op that re-issues the
    /// welcome prompt.
    pub fn apply_creation_step(&mut self, step: CreationStep, value: &str) -> StepPrompt {
        match step {
            CreationStep::Gender => {
                self.gender = Some(value.to_string());
                step_prompt(
                    CreationStep::Race,
                    "The voice continues: 'What race are you?'",
                    &["Human", "Elf", "Dwarf", "Other"],
                )
            }
            CreationStep::Race => {
                self.race = Some(value.to_string());
                step_prompt(
                    CreationStep::TimePeriod,
                    "When are you from?",
                    &["Past", "Present", "Future"],
                )
            }
            CreationStep::TimePeriod => {
                self.time_period = Some(value.to_string());
                step_prompt(
                    CreationStep::Role,
                    "What is your role in this world?",
                    &["Warrior", "Mage", "Rogue", "Healer"],
                )
            }
            CreationStep::Role => {
                self.role = Some(value.to_string());
                self.welcome_prompt()
            }
            CreationStep::Complete => self.welcome_prompt(),
        }
    }

    fn welcome_prompt(&self) -> StepPrompt {
        StepPrompt {
            step: CreationStep::Complete,
            prompt: format!(
                "Welcome, {} the {} {}. Your journey begins...",
                self.name,
                self.race.as_deref().unwrap_or("unknown"),
                self.role.as_deref().unwrap_or("wanderer"),
            ),
            options: Vec::new(),
        }
    }

    pub fn creation_complete(&self) -> bool {
        self.gender.is_some()
            && self.race.is_some()
            && self.time_period.is_some()
            && self.role.is_some()
    }

    // ------------------------------------------------------------------
    // Creation extras
    // ------------------------------------------------------------------

    /// Select exactly three distinct skills from [`AVAILABLE_SKILLS`].
    pub fn choose_skills(&mut self, picks: &[&str]) -> Result<(), CreationError> {
        if picks.len() != 3 {
            return Err(CreationError::WrongSkillCount(picks.len()));
        }
        let mut selected = Vec::with_capacity(3);
        for pick in picks {
            if !AVAILABLE_SKILLS.contains(pick) {
                return Err(CreationError::UnknownSkill(pick.to_string()));
            }
            if selected.contains(&pick.to_string()) {
                return Err(CreationError::DuplicateSkill(pick.to_string()));
            }
            selected.push(pick.to_string());
        }
        self.skills = selected;
        Ok(())
    }

    /// Draw three distinct random weaknesses from [`WEAKNESS_POOL`].
    pub fn assign_weaknesses(&mut self, rng: &mut impl Rng) {
        self.weaknesses.extend(
            WEAKNESS_POOL
                .choose_multiple(rng, 3)
                .map(|w| w.to_string()),
        );
    }

    /// Pick one strength from a category; each may be taken only once.
    pub fn choose_strength(&mut self, category: &str, name: &str) -> Result<(), CreationError> {
        let options = STRENGTH_CATEGORIES
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, options)| *options)
            .ok_or_else(|| CreationError::UnknownCategory(category.to_string()))?;
        if !options.contains(&name) {
            return Err(CreationError::UnknownStrength {
                category: category.to_string(),
                name: name.to_string(),
            });
        }
        if self.strengths.iter().any(|s| s == name) {
            return Err(CreationError::DuplicateStrength(name.to_string()));
        }
        self.strengths.push(name.to_string());
        Ok(())
    }

    /// Stock the starting inventory for the chosen role.
    pub fn initialize_inventory(&mut self) {
        let names: &[&str] = match self.role.as_deref().map(str::to_lowercase).as_deref() {
            Some("warrior") => &["Sword", "Shield", "Health Potion"],
            Some("scientist") => &["Lab Kit", "Energy Scanner", "Tablet"],
            Some("pilot") => &["Blaster", "Toolkit", "Space Map"],
            _ => &["Basic Supplies"],
        };
        self.inventory = Inventory::new();
        for name in names {
            // Starting inventory is unlimited, the add cannot fail.
            let _ = self.inventory.add(Item::keepsake(*name));
        }
    }

    /// Seed the opening NPC relationships.
    pub fn initialize_relationships(&mut self) {
        self.relationships
            .insert(Relationship::with_affinity("Varok", -10));
        self.relationships
            .insert(Relationship::with_affinity("Lira", 20));
    }
}
