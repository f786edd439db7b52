//! The narration seam.
//!
//! The engine never talks to a language model directly; it hands a prompt
//! and a structured context record to a [`Narrator`] and takes back prose.
//! A backend failure degrades to a fixed fallback line. State mutations are
//! always committed before narration, so a failed narration never rolls
//! anything back.

use crate::events::GameEvent;
use crate::player::Player;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Shown when the narration backend fails.
pub const FALLBACK_NARRATIVE: &str =
    "Static washes over the comms. The moment passes unremarked, and your ship sails on.";

/// Errors from a narration backend.
#[derive(Debug, Error)]
pub enum NarrationError {
    #[error("narration backend unavailable: {0}")]
    Backend(String),
}

/// The structured record handed to the backend alongside the prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NarrationContext {
    pub player_name: String,
    pub player_role: Option<String>,
    pub alignment: String,
    pub event_kind: Option<String>,
    pub event_description: Option<String>,
    pub last_interaction: Option<String>,
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl NarrationContext {
    pub fn for_player(player: &Player) -> Self {
        Self {
            player_name: player.name.clone(),
            player_role: player.role.clone(),
            alignment: player.personality.alignment.to_string(),
            ..Self::default()
        }
    }

    pub fn with_event(mut self, event: &GameEvent) -> Self {
        self.event_kind = Some(event.kind.to_string());
        self.event_description = Some(event.description.clone());
        self.last_interaction = event.last_interaction.clone();
        for (key, value) in &event.context {
            self.extra.insert(key.clone(), value.clone());
        }
        self
    }
}

/// A narration backend. Synchronous; the engine blocks on it.
pub trait Narrator {
    fn narrate(&mut self, prompt: &str, context: &NarrationContext) -> Result<String, NarrationError>;
}

/// Narrate through the backend, degrading to [`FALLBACK_NARRATIVE`] when it
/// fails.
pub fn narrate_or_fallback(
    narrator: &mut dyn Narrator,
    prompt: &str,
    context: &NarrationContext,
) -> String {
    narrator
        .narrate(prompt, context)
        .unwrap_or_else(|_| FALLBACK_NARRATIVE.to_string())
}

/// A backend that narrates every prompt as its own description text.
///
/// Keeps the engine playable with no model attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoNarrator;

impl Narrator for EchoNarrator {
    fn narrate(&mut self, prompt: &str, _context: &NarrationContext) -> Result<String, NarrationError> {
        Ok(prompt.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenNarrator;

    impl Narrator for BrokenNarrator {
        fn narrate(&mut self, _: &str, _: &NarrationContext) -> Result<String, NarrationError> {
            Err(NarrationError::Backend("connection reset".to_string()))
        }
    }

    #[test]
    fn test_backend_failure_degrades_to_fallback() {
        let mut narrator = BrokenNarrator;
        let text = narrate_or_fallback(&mut narrator, "anything", &NarrationContext::default());
        assert_eq!(text, FALLBACK_NARRATIVE);
    }

    #[test]
    fn test_echo_narrator_returns_prompt() {
        let mut narrator = EchoNarrator;
        let text = narrate_or_fallback(&mut narrator, "A storm rises.", &NarrationContext::default());
        assert_eq!(text, "A storm rises.");
    }

    #[test]
    fn test_context_pulls_event_details() {
        let player = Player::new("Zara").unwrap();
        let event = crate::events::EventCatalog::standard().normal_pool()[0]
            .clone()
            .with_context("sector", "Nebula Dawn");

        let context = NarrationContext::for_player(&player).with_event(&event);
        assert_eq!(context.player_name, "Zara");
        assert_eq!(context.event_kind.as_deref(), Some("normal"));
        assert_eq!(context.extra["sector"], "Nebula Dawn");
    }
}
