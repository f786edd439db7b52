//! Per-NPC relationship tracking.
//!
//! Relationships are keyed by NPC id, created lazily on first reference and
//! never deleted. The categorical type is derived from affinity and is
//! recomputed on every update, so it can never go stale.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Derived relationship category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RelationshipType {
    Hostile,
    #[default]
    Neutral,
    Friendly,
}

impl RelationshipType {
    /// Derive the category from an affinity score.
    ///
    /// Boundaries are inclusive: 30 is already friendly, -30 already hostile.
    pub fn from_affinity(affinity: i32) -> Self {
        if affinity >= 30 {
            RelationshipType::Friendly
        } else if affinity <= -30 {
            RelationshipType::Hostile
        } else {
            RelationshipType::Neutral
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RelationshipType::Hostile => "hostile",
            RelationshipType::Neutral => "neutral",
            RelationshipType::Friendly => "friendly",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A relationship with a single NPC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    /// The NPC this relationship is with.
    pub npc_id: String,
    /// Signed affinity score, clamped to [-100, 100].
    pub affinity: i32,
    /// Category derived from affinity.
    pub relationship_type: RelationshipType,
    /// Append-only log of shared experiences.
    pub shared_experiences: Vec<String>,
    /// Hooks the narration layer can pick up for character development.
    pub development_opportunities: Vec<String>,
}

impl Relationship {
    pub fn new(npc_id: impl Into<String>) -> Self {
        Self {
            npc_id: npc_id.into(),
            affinity: 0,
            relationship_type: RelationshipType::Neutral,
            shared_experiences: Vec::new(),
            development_opportunities: Vec::new(),
        }
    }

    /// Create a relationship with a starting affinity (used for seeded NPCs).
    pub fn with_affinity(npc_id: impl Into<String>, affinity: i32) -> Self {
        let mut rel = Self::new(npc_id);
        rel.set_affinity(affinity);
        rel
    }

    fn set_affinity(&mut self, affinity: i32) {
        self.affinity = affinity.clamp(-100, 100);
        self.relationship_type = RelationshipType::from_affinity(self.affinity);
    }

    /// Adjust affinity; the derived type follows immediately.
    pub fn adjust_affinity(&mut self, delta: i32) {
        self.set_affinity(self.affinity + delta);
    }

    /// Record a shared experience.
    pub fn add_experience(&mut self, experience: impl Into<String>) {
        self.shared_experiences.push(experience.into());
    }
}

/// All of a player's NPC relationships.
///
/// Backed by an ordered map so snapshots and saves are stable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationshipStore {
    relationships: BTreeMap<String, Relationship>,
}

impl RelationshipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the relationship for an NPC, creating a neutral one on first
    /// reference. Idempotent.
    pub fn get_or_create(&mut self, npc_id: &str) -> &mut Relationship {
        self.relationships
            .entry(npc_id.to_string())
            .or_insert_with(|| Relationship::new(npc_id))
    }

    /// Insert a pre-built relationship (seeded NPCs at character creation).
    pub fn insert(&mut self, relationship: Relationship) {
        self.relationships
            .insert(relationship.npc_id.clone(), relationship);
    }

    /// Adjust affinity with an NPC, optionally logging an experience.
    pub fn update(&mut self, npc_id: &str, affinity_delta: i32, experience: Option<&str>) {
        let rel = self.get_or_create(npc_id);
        rel.adjust_affinity(affinity_delta);
        if let Some(experience) = experience {
            rel.add_experience(experience);
        }
    }

    pub fn get(&self, npc_id: &str) -> Option<&Relationship> {
        self.relationships.get(npc_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.values()
    }

    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }
}
