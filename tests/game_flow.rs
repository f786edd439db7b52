//! Integration tests for the full play loop through `GameSession`.
//!
//! These run fully offline against a scripted narrator: character creation,
//! event resolution, combat, crew activities, and story progression.

use starfall_core::combat::{Ability, CombatEntity, CombatState};
use starfall_core::player::CreationStep;
use starfall_core::session::{GameSession, LoadOutcome, SessionConfig, SessionError};
use starfall_core::story::SelectionMode;
use starfall_core::testing::{assert_ledger_bounds, sample_raider, ScriptedNarrator};

async fn new_session(
    dir: &std::path::Path,
    narrator: ScriptedNarrator,
) -> GameSession<ScriptedNarrator> {
    let config = SessionConfig::new(dir).with_seed(42);
    let (session, outcome) = GameSession::create_or_load("Zara", narrator, config)
        .await
        .expect("session creation");
    assert_eq!(outcome, LoadOutcome::Created);
    session
}

// =============================================================================
// CREATION AND EVENT FLOW
// =============================================================================

#[tokio::test]
async fn test_creation_then_event_resolution_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let narrator = ScriptedNarrator::new(vec!["The storm howls past your hull."]);
    let mut session = new_session(dir.path(), narrator).await;

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
    session
        .apply_creation_step(CreationStep::Role, "Pilot")
        .await
        .unwrap();
    assert!(session.player().creation_complete());
    assert_eq!(session.player().skills.len(), 0);
    session
        .player_mut()
        .choose_skills(&["Stealth", "Strategy", "Negotiation"])
        .unwrap();

    // Full crew means a normal event; choice 1 is the storm run.
    let event = session.trigger_event().expect("event generated");
    assert_eq!(event.choices.len(), 3);

    let (outcome, narrative) = session.resolve_event_choice(1).unwrap();
    assert_eq!(outcome.rewards.credits, 200);
    assert_eq!(narrative, "The storm howls past your hull.");
    assert_eq!(session.player().resources.credits, 1200);
    assert_eq!(session.player().resources.fuel, 80);
    assert!(session.player().inventory.contains("Shield Upgrade"));
    assert_ledger_bounds(&session.player().resources);
}

#[tokio::test]
async fn test_low_morale_switches_to_crew_events() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = new_session(dir.path(), ScriptedNarrator::new(vec![])).await;

    session.player_mut().crew.morale = 40.0;
    let event = session.trigger_event().unwrap();
    assert_eq!(event.kind.name(), "morale");

    // Choice 1 is the free meditation session.
    session.resolve_event_choice(1).unwrap();
    assert_eq!(session.player().crew.morale, 55.0);
    assert_eq!(session.player().resources.credits, 1000);
}

#[tokio::test]
async fn test_free_text_action_is_remembered_on_the_event() {
    let dir = tempfile::tempdir().unwrap();
    let narrator = ScriptedNarrator::new(vec!["You scan the storm front."]);
    let mut session = new_session(dir.path(), narrator).await;

    session.trigger_event().unwrap();
    let narrative = session.submit_action("scan the storm").unwrap();
    assert_eq!(narrative, "You scan the storm front.");

    let event = session.current_event().unwrap();
    assert_eq!(event.last_interaction.as_deref(), Some("scan the storm"));
    assert_eq!(event.last_scene.as_deref(), Some("You scan the storm front."));
}

#[tokio::test]
async fn test_narration_failure_never_loses_committed_state() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = new_session(dir.path(), ScriptedNarrator::failing()).await;

    session.trigger_event().unwrap();
    let (outcome, narrative) = session.resolve_event_choice(2).unwrap();
    // The outcome applied even though narration degraded to the fallback.
    assert_eq!(outcome.rewards.credits, 100);
    assert_eq!(session.player().resources.credits, 1100);
    assert_ne!(narrative, outcome.message);
}

// =============================================================================
// COMBAT
// =============================================================================

#[tokio::test]
async fn test_combat_through_session_reaches_a_verdict() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = new_session(dir.path(), ScriptedNarrator::new(vec![])).await;

    session.start_combat(sample_raider()).unwrap();

    let mut last_state = CombatState::Active;
    for _ in 0..50 {
        match session.resolve_combat_turn("Sword Strike") {
            Ok(outcome) => last_state = outcome.state,
            Err(SessionError::NoActiveCombat) => break,
            Err(err) => panic!("unexpected combat error: {err}"),
        }
        if last_state != CombatState::Active {
            break;
        }
    }
    // 300 HP against a 100 HP raider always ends in a player victory.
    assert_eq!(last_state, CombatState::PlayerVictory);
    assert!(session.combat().is_none());
}

#[tokio::test]
async fn test_combat_talk_and_status_do_not_consume_turns() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = new_session(dir.path(), ScriptedNarrator::new(vec![])).await;

    let opponent = CombatEntity::new("Void Raider", 1000)
        .with_ability(Ability::new("Laser Strike", 0, 0));
    session.start_combat(opponent).unwrap();

    session.combat_talk("Surrender!").unwrap();
    let report = session.combat_status().unwrap();
    assert!(report.contains("Turn 1"));
    assert_eq!(session.combat().unwrap().turn(), 1);
}

// =============================================================================
// STORY AND CREW
// =============================================================================

#[tokio::test]
async fn test_story_graph_unlocks_and_exhausts() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = new_session(dir.path(), ScriptedNarrator::new(vec![])).await;

    let opener = session.next_scenario().unwrap();
    assert_eq!(opener.id, "starting_conflict");
    session.complete_scenario(&opener.id);

    let mut seen = Vec::new();
    while let Some(scenario) = session.next_scenario() {
        seen.push(scenario.id.clone());
        session.complete_scenario(&scenario.id);
    }
    assert_eq!(
        seen,
        vec![
            "consortium_contract",
            "resistance_contact",
            "spiritual_awakening"
        ]
    );
    assert!(session.next_scenario().is_none());
}

#[tokio::test]
async fn test_random_selection_mode_is_confined_to_unlocked_scenarios() {
    let dir = tempfile::tempdir().unwrap();
    let config = SessionConfig::new(dir.path())
        .with_seed(9)
        .with_selection_mode(SelectionMode::UniformRandom);
    let (mut session, _) =
        GameSession::create_or_load("Kel", ScriptedNarrator::new(vec![]), config)
            .await
            .unwrap();

    let first = session.next_scenario().unwrap();
    assert_eq!(first.id, "starting_conflict");
}

#[tokio::test]
async fn test_crew_activity_and_time_decay_through_session() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = new_session(dir.path(), ScriptedNarrator::new(vec![])).await;

    session.advance_time(0, 100);
    assert_eq!(session.player().crew.rest, 50.0);
    let status = session.player().crew.status;
    assert_eq!(status.name(), "Tired");

    let outcome = session.perform_crew_activity("Feast").unwrap();
    assert_eq!(outcome.credits_spent, 200);
    assert_eq!(session.player().resources.credits, 800);
    assert!(session.player().crew.rest > 50.0);
}
