//! The driver-facing game session.
//!
//! A session owns one player, the static catalogs, the narration backend,
//! and the combat in progress, and exposes the operations a CLI or HTTP
//! driver needs: creation steps, event generation and resolution, combat
//! turns, crew activities, story progression, and persistence. Gameplay
//! state is always committed before narration runs, so a failed narration
//! never loses a resolved outcome.

use crate::combat::{Combat, CombatEntity, CombatError, CombatSnapshot, TurnOutcome};
use crate::crew::{ActivityCatalog, ActivityOutcome, CrewError};
use crate::events::{resolve_choice, ChoiceOutcome, EventCatalog, EventError, GameEvent};
use crate::narration::{narrate_or_fallback, NarrationContext, Narrator};
use crate::persist::{self, PersistError};
use crate::player::{CreationError, CreationStep, Player, StepPrompt};
use crate::story::{Scenario, ScenarioCatalog, SelectionMode, StoryProgress};
use rand::prelude::*;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Creation(#[from] CreationError),

    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    Combat(#[from] CombatError),

    #[error(transparent)]
    Crew(#[from] CrewError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error("no event is awaiting a decision")]
    NoActiveEvent,

    #[error("no combat is in progress")]
    NoActiveCombat,

    #[error("a combat is already in progress")]
    CombatAlreadyActive,
}

/// How a session came by its player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No save existed; a fresh character was created.
    Created,
    /// The character was restored from its save.
    Loaded,
    /// A save existed but could not be read; it was treated as absent.
    RecoveredFromCorrupt(String),
}

/// Session construction options.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Directory character saves live in.
    pub save_dir: PathBuf,
    /// Tie-break policy for scenario selection.
    pub selection_mode: SelectionMode,
    /// Seed for event and scenario randomness. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl SessionConfig {
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
            selection_mode: SelectionMode::CatalogOrder,
            seed: None,
        }
    }

    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// One interactive play session for one character.
pub struct GameSession<N: Narrator> {
    player: Player,
    narrator: N,
    events: EventCatalog,
    activities: ActivityCatalog,
    scenarios: ScenarioCatalog,
    selection_mode: SelectionMode,
    save_dir: PathBuf,
    combat: Option<Combat>,
    rng: StdRng,
}

impl<N: Narrator> GameSession<N> {
    /// Resume the named character, or create it fresh when no readable save
    /// exists. A corrupt save is surfaced in the outcome, not a crash.
    pub async fn create_or_load(
        name: &str,
        narrator: N,
        config: SessionConfig,
    ) -> Result<(Self, LoadOutcome), SessionError> {
        let (player, outcome) = match persist::load_player(&config.save_dir, name).await {
            Ok(Some(saved)) => (saved.player, LoadOutcome::Loaded),
            Ok(None) => (Player::new(name)?, LoadOutcome::Created),
            Err(PersistError::Json(err)) => (
                Player::new(name)?,
                LoadOutcome::RecoveredFromCorrupt(err.to_string()),
            ),
            Err(err) => return Err(err.into()),
        };

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok((
            Self {
                player,
                narrator,
                events: EventCatalog::standard(),
                activities: ActivityCatalog::standard(),
                scenarios: ScenarioCatalog::standard().clone(),
                selection_mode: config.selection_mode,
                save_dir: config.save_dir,
                combat: None,
                rng,
            },
            outcome,
        ))
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    /// Persist the current player state.
    pub async fn save(&self) -> Result<PathBuf, SessionError> {
        Ok(persist::save_player(&self.save_dir, &self.player).await?)
    }

    // ------------------------------------------------------------------
    // Character creation
    // ------------------------------------------------------------------

    pub fn begin_creation(&self) -> StepPrompt {
        self.player.begin_creation()
    }

    /// Apply one questionnaire answer, persisting after the step.
    pub async fn apply_creation_step(
        &mut self,
        step: CreationStep,
        value: &str,
    ) -> Result<StepPrompt, SessionError> {
        let prompt = self.player.apply_creation_step(step, value);
        if step == CreationStep::Role {
            self.player.initialize_inventory();
            self.player.initialize_relationships();
            self.player.assign_weaknesses(&mut self.rng);
        }
        self.save().await?;
        Ok(prompt)
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Generate a new event for the crew's current condition and make it
    /// the one awaiting a decision.
    pub fn trigger_event(&mut self) -> Option<&GameEvent> {
        let event = self.events.generate_event(&self.player.crew, &mut self.rng)?;
        self.player.current_event = Some(event);
        self.player.current_event.as_ref()
    }

    pub fn current_event(&self) -> Option<&GameEvent> {
        self.player.current_event.as_ref()
    }

    /// Resolve a choice of the active event by its 1-based number, then
    /// narrate the outcome. The event is cleared once resolved.
    pub fn resolve_event_choice(
        &mut self,
        choice_number: usize,
    ) -> Result<(ChoiceOutcome, String), SessionError> {
        let event = self
            .player
            .current_event
            .take()
            .ok_or(SessionError::NoActiveEvent)?;

        let index = match choice_number.checked_sub(1) {
            Some(index) => index,
            None => {
                // Restore the event before rejecting the out-of-range pick.
                let available = event.choices.len();
                self.player.current_event = Some(event);
                return Err(EventError::ChoiceOutOfRange {
                    index: 0,
                    available,
                }
                .into());
            }
        };

        let outcome = match resolve_choice(
            &event,
            index,
            &mut self.player.resources,
            &mut self.player.inventory,
            &mut self.player.crew,
        ) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.player.current_event = Some(event);
                return Err(err.into());
            }
        };

        // State is committed; narration failure cannot undo it.
        let context = NarrationContext::for_player(&self.player).with_event(&event);
        let narrative = narrate_or_fallback(&mut self.narrator, &outcome.message, &context);
        Ok((outcome, narrative))
    }

    /// Submit free-text action input for the active event and narrate the
    /// response. The input is remembered on the event for later context.
    pub fn submit_action(&mut self, text: &str) -> Result<String, SessionError> {
        let mut event = self
            .player
            .current_event
            .take()
            .ok_or(SessionError::NoActiveEvent)?;
        event.last_interaction = Some(text.to_string());

        let context = NarrationContext::for_player(&self.player).with_event(&event);
        let narrative = narrate_or_fallback(&mut self.narrator, text, &context);
        event.last_scene = Some(narrative.clone());
        self.player.current_event = Some(event);
        Ok(narrative)
    }

    // ------------------------------------------------------------------
    // Combat
    // ------------------------------------------------------------------

    /// Open a combat encounter against the given opponent.
    pub fn start_combat(&mut self, opponent: CombatEntity) -> Result<CombatSnapshot, SessionError> {
        if self.combat.is_some() {
            return Err(SessionError::CombatAlreadyActive);
        }
        let player_entity = CombatEntity::player_default(&self.player.name);
        let combat = Combat::from_seed(player_entity, opponent, self.rng.gen());
        let snapshot = combat.snapshot();
        self.combat = Some(combat);
        Ok(snapshot)
    }

    pub fn combat(&self) -> Option<&Combat> {
        self.combat.as_ref()
    }

    /// Resolve one combat turn. A finished combat is dropped from the
    /// session after its final turn resolves.
    pub fn resolve_combat_turn(&mut self, ability: &str) -> Result<TurnOutcome, SessionError> {
        let combat = self.combat.as_mut().ok_or(SessionError::NoActiveCombat)?;
        let outcome = combat.resolve_turn(ability)?;
        if combat.is_finished() {
            self.combat = None;
        }
        Ok(outcome)
    }

    /// Exchange words mid-combat. Never consumes a turn.
    pub fn combat_talk(&mut self, message: &str) -> Result<String, SessionError> {
        let combat = self.combat.as_mut().ok_or(SessionError::NoActiveCombat)?;
        Ok(combat.talk(message))
    }

    /// Cooldown and health report for the active combat.
    pub fn combat_status(&self) -> Result<String, SessionError> {
        let combat = self.combat.as_ref().ok_or(SessionError::NoActiveCombat)?;
        Ok(combat.status_report())
    }

    // ------------------------------------------------------------------
    // Story
    // ------------------------------------------------------------------

    pub fn story(&self) -> &StoryProgress {
        &self.player.story
    }

    /// Select the next available scenario under the configured tie-break
    /// policy and enter it.
    pub fn next_scenario(&mut self) -> Option<Scenario> {
        let scenario = self
            .player
            .story
            .next_available(&self.scenarios, self.selection_mode, &mut self.rng)?
            .clone();
        self.player.story.begin(scenario.id.clone());
        Some(scenario)
    }

    pub fn complete_scenario(&mut self, id: &str) {
        self.player.story.mark_complete(id);
    }

    // ------------------------------------------------------------------
    // Crew and time
    // ------------------------------------------------------------------

    /// Run a crew activity against the player's ledger.
    pub fn perform_crew_activity(&mut self, name: &str) -> Result<ActivityOutcome, SessionError> {
        Ok(self
            .player
            .crew
            .perform_activity(&mut self.player.resources, &self.activities, name)?)
    }

    /// Advance game time, decaying crew condition over the elapsed hours.
    pub fn advance_time(&mut self, cycles: u64, hours: u64) {
        self.player.resources.time.advance(cycles, hours);
        self.player.crew.update_status(hours);
    }

    /// Full crew condition report against the current ledger.
    pub fn crew_report(&self) -> String {
        self.player
            .crew
            .status_report(&self.player.resources, &self.activities)
    }

    /// One-line summary for status queries.
    pub fn status_line(&self) -> String {
        format!(
            "{} | credits {} | fuel {} | health {} | crew {} | cycle {}",
            self.player.name,
            self.player.resources.credits,
            self.player.resources.fuel,
            self.player.resources.health,
            self.player.crew.status.name(),
            self.player.resources.time.cycles,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::Ability;
    use crate::narration::EchoNarrator;

    async fn session(dir: &std::path::Path) -> GameSession<EchoNarrator> {
        let config = SessionConfig::new(dir).with_seed(7);
        let (session, outcome) = GameSession::create_or_load("Zara", EchoNarrator, config)
            .await
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Created);
        session
    }

    #[tokio::test]
    async fn test_creation_steps_persist() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path()).await;

        session
            .apply_creation_step(CreationStep::Gender, "Female")
            .await
            .unwrap();
        session
            .apply_creation_step(CreationStep::Race, "Human")
            .await
            .unwrap();
        session
            .apply_creation_step(CreationStep::TimePeriod, "Future")
            .await
            .unwrap();
        let done = session
            .apply_creation_step(CreationStep::Role, "Pilot")
            .await
            .unwrap();
        assert_eq!(done.step, CreationStep::Complete);
        assert_eq!(session.player().weaknesses.len(), 3);
        assert!(session.player().inventory.contains("Space Map"));

        // A second session resumes from the persisted state.
        let config = SessionConfig::new(dir.path());
        let (resumed, outcome) = GameSession::create_or_load("zara", EchoNarrator, config)
            .await
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded);
        assert!(resumed.player().creation_complete());
    }

    #[tokio::test]
    async fn test_corrupt_save_recovers_as_fresh_character() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(crate::persist::save_path(dir.path(), "Zara"), "garbage")
            .await
            .unwrap();

        let config = SessionConfig::new(dir.path());
        let (session, outcome) = GameSession::create_or_load("Zara", EchoNarrator, config)
            .await
            .unwrap();
        assert!(matches!(outcome, LoadOutcome::RecoveredFromCorrupt(_)));
        assert_eq!(session.player().resources.credits, 1000);
    }

    #[tokio::test]
    async fn test_event_choice_uses_one_based_numbering() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path()).await;

        session.trigger_event().unwrap();
        let (outcome, narrative) = session.resolve_event_choice(1).unwrap();
        assert_eq!(session.player().resources.credits, 1200);
        assert_eq!(session.player().resources.fuel, 80);
        assert!(session.player().inventory.contains("Shield Upgrade"));
        assert_eq!(narrative, outcome.message);
        assert!(session.current_event().is_none());
    }

    #[tokio::test]
    async fn test_invalid_choice_keeps_event_active() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path()).await;
        session.trigger_event().unwrap();

        assert!(session.resolve_event_choice(0).is_err());
        assert!(session.resolve_event_choice(9).is_err());
        assert!(session.current_event().is_some());
        assert_eq!(session.player().resources.credits, 1000);
    }

    #[tokio::test]
    async fn test_resolving_without_event_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path()).await;
        assert!(matches!(
            session.resolve_event_choice(1),
            Err(SessionError::NoActiveEvent)
        ));
    }

    #[tokio::test]
    async fn test_combat_lifecycle_through_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path()).await;

        let opponent = CombatEntity::new("Void Raider", 60)
            .with_ability(Ability::new("Laser Strike", 1, 2));
        let snapshot = session.start_combat(opponent.clone()).unwrap();
        assert_eq!(snapshot.opponent_hp, 60);
        assert!(matches!(
            session.start_combat(opponent),
            Err(SessionError::CombatAlreadyActive)
        ));

        while session.combat().is_some() {
            session.resolve_combat_turn("Sword Strike").unwrap();
        }
        assert!(matches!(
            session.resolve_combat_turn("Sword Strike"),
            Err(SessionError::NoActiveCombat)
        ));
    }

    #[tokio::test]
    async fn test_scenario_progression_through_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path()).await;

        let first = session.next_scenario().unwrap();
        assert_eq!(first.id, "starting_conflict");
        session.complete_scenario(&first.id);

        let second = session.next_scenario().unwrap();
        assert_eq!(second.id, "consortium_contract");
        assert_eq!(session.story().current.as_deref(), Some("consortium_contract"));
    }

    #[tokio::test]
    async fn test_time_advance_decays_crew() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path()).await;

        session.advance_time(1, 10);
        assert_eq!(session.player().resources.time.hours, 10);
        assert_eq!(session.player().crew.rest, 95.0);
        assert!(session.status_line().contains("credits 1000"));
    }
}
