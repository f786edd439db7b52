//! Narrative sci-fi RPG state engine with an LLM narration seam.
//!
//! This crate provides:
//! - A player aggregate with resources, inventory, relationships, and crew
//! - Seedable item, treasure, and quest-reward generation
//! - Turn-based combat with cooldowns, dialogue, and status effects
//! - Event and choice resolution with cost/reward bookkeeping
//! - A prerequisite-gated story scenario graph
//! - Versioned JSON persistence keyed by character name
//!
//! # Quick Start
//!
//! ```ignore
//! use starfall_core::{EchoNarrator, GameSession, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SessionConfig::new("saves");
//!     let (mut session, _) =
//!         GameSession::create_or_load("Zara", EchoNarrator, config).await?;
//!
//!     session.trigger_event();
//!     let (outcome, narrative) = session.resolve_event_choice(1)?;
//!     println!("{narrative} (+{} credits)", outcome.rewards.credits);
//!
//!     session.save().await?;
//!     Ok(())
//! }
//! ```

pub mod combat;
pub mod crew;
pub mod events;
pub mod inventory;
pub mod items;
pub mod narration;
pub mod persist;
pub mod player;
pub mod relationships;
pub mod resources;
pub mod session;
pub mod story;
pub mod testing;

// Primary public API
pub use combat::{Ability, Combat, CombatEntity, CombatError, CombatState};
pub use crew::{ActivityCatalog, Crew, CrewStatus};
pub use events::{EventCatalog, EventChoice, EventError, EventKind, GameEvent};
pub use inventory::{purchase_item, Inventory, PurchaseError};
pub use items::{Difficulty, Item, ItemGenerator, ItemType, Rarity};
pub use narration::{EchoNarrator, NarrationContext, Narrator};
pub use persist::{PersistError, SavedPlayer};
pub use player::{CreationStep, Player};
pub use relationships::{Relationship, RelationshipStore, RelationshipType};
pub use resources::{GameTime, LedgerError, Resource, ResourceLedger};
pub use session::{GameSession, LoadOutcome, SessionConfig, SessionError};
pub use story::{ScenarioCatalog, SelectionMode, StoryProgress};
pub use testing::{ScriptedNarrator, sample_pilot};
