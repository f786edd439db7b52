//! Integration tests for save/load round trips.
//!
//! These verify that a played character survives persistence with every
//! gameplay-relevant field intact, and that the save picker metadata can be
//! read without loading full state.

use starfall_core::persist::{self, SavedPlayer, SAVE_VERSION};
use starfall_core::player::CreationStep;
use starfall_core::session::{GameSession, LoadOutcome, SessionConfig};
use starfall_core::testing::{sample_pilot, ScriptedNarrator};

#[tokio::test]
async fn test_played_character_round_trips_exactly() {
    let dir = tempfile::tempdir().unwrap();

    let mut player = sample_pilot("Zara Vex");
    player.choose_skills(&["Stealth", "Strategy", "Lockpicking"]).unwrap();
    player.personality.add_trait("Altruistic");
    player.relationships.update("Varok", -25, Some("Refused his bribe"));
    player.resources.drain_credits(-350);
    player.resources.time.advance(3, 7);
    player.crew.update_status(12);
    player.story.mark_complete("starting_conflict");
    player.story.begin("resistance_contact");

    persist::save_player(dir.path(), &player).await.unwrap();
    let restored = persist::load_player(dir.path(), "Zara Vex")
        .await
        .unwrap()
        .expect("saved character present")
        .player;

    assert_eq!(restored.name, player.name);
    assert_eq!(restored.role, player.role);
    assert_eq!(restored.skills, player.skills);
    assert_eq!(restored.personality, player.personality);
    assert_eq!(restored.resources.credits, 650);
    assert_eq!(restored.resources.time, player.resources.time);
    assert_eq!(restored.crew.rest, player.crew.rest);
    assert_eq!(restored.crew.status, player.crew.status);
    assert_eq!(restored.story, player.story);

    let varok = restored.relationships.get("Varok").unwrap();
    assert_eq!(varok.affinity, -35);
    assert_eq!(varok.shared_experiences, vec!["Refused his bribe"]);
    assert_eq!(
        restored.inventory.items().len(),
        player.inventory.items().len()
    );
}

#[tokio::test]
async fn test_current_event_survives_the_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let config = SessionConfig::new(dir.path()).with_seed(3);
    let (mut session, _) =
        GameSession::create_or_load("Kel", ScriptedNarrator::new(vec!["ok"]), config)
            .await
            .unwrap();

    session
        .apply_creation_step(CreationStep::Gender, "Other")
        .await
        .unwrap();
    session.trigger_event().unwrap();
    session.submit_action("hail the station").unwrap();
    let event_id = session.current_event().unwrap().id;
    session.save().await.unwrap();

    let (resumed, outcome) = GameSession::create_or_load(
        "Kel",
        ScriptedNarrator::new(vec![]),
        SessionConfig::new(dir.path()),
    )
    .await
    .unwrap();
    assert_eq!(outcome, LoadOutcome::Loaded);

    let event = resumed.current_event().expect("event restored");
    assert_eq!(event.id, event_id);
    assert_eq!(event.last_interaction.as_deref(), Some("hail the station"));
}

#[tokio::test]
async fn test_save_listing_shows_metadata_only() {
    let dir = tempfile::tempdir().unwrap();
    let mut player = sample_pilot("Zara");
    player.story.mark_complete("starting_conflict");
    persist::save_player(dir.path(), &player).await.unwrap();
    persist::save_player(dir.path(), &sample_pilot("Brin"))
        .await
        .unwrap();

    let saves = persist::list_saves(dir.path()).await.unwrap();
    assert_eq!(saves.len(), 2);
    let zara = saves
        .iter()
        .find(|s| s.metadata.character_name == "Zara")
        .unwrap();
    assert_eq!(zara.metadata.scenarios_completed, 1);
    assert_eq!(zara.metadata.role.as_deref(), Some("Pilot"));
}

#[tokio::test]
async fn test_future_save_versions_are_rejected_not_misread() {
    let dir = tempfile::tempdir().unwrap();
    let mut saved = SavedPlayer::new(sample_pilot("Zara"));
    saved.version = SAVE_VERSION + 1;
    let path = persist::save_path(dir.path(), "Zara");
    saved.save_json(&path).await.unwrap();

    let err = SavedPlayer::load_json(&path).await.unwrap_err();
    assert!(err.to_string().contains("Version mismatch"));
}
