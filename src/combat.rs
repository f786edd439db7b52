//! Turn-based combat engine.
//!
//! A combat instance is a small state machine over two entities. Each
//! resolved turn rolls the player's ability damage, lets a still-standing
//! opponent retaliate, ticks cooldowns and effect durations, and checks for
//! a terminal state. Dialogue and status queries never consume a turn.
//!
//! All randomness goes through the instance's own RNG, so a seeded combat
//! replays identically end to end.

use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a combat instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatId(pub Uuid);

impl CombatId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CombatId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CombatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors from combat resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CombatError {
    #[error("{ability} is on cooldown for {remaining} more turns")]
    OnCooldown { ability: String, remaining: u32 },

    #[error("unknown combat action: {0}")]
    UnknownAction(String),

    #[error("combat is already resolved")]
    Finished,
}

// ============================================================================
// Abilities and entities
// ============================================================================

/// An attack or maneuver a combat entity can use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    pub name: String,
    /// Inclusive damage bounds, min <= max.
    pub damage_range: (i64, i64),
    /// Turns to wait before reuse. Zero means always ready.
    pub cooldown: u32,
    /// Remaining wait; the ability is usable only at zero.
    pub current_cooldown: u32,
    pub special_effect: Option<String>,
    pub description: String,
}

impl Ability {
    pub fn new(name: impl Into<String>, min_damage: i64, max_damage: i64) -> Self {
        debug_assert!(min_damage <= max_damage);
        Self {
            name: name.into(),
            damage_range: (min_damage, max_damage),
            cooldown: 0,
            current_cooldown: 0,
            special_effect: None,
            description: String::new(),
        }
    }

    pub fn with_cooldown(mut self, cooldown: u32) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_special_effect(mut self, effect: impl Into<String>) -> Self {
        self.special_effect = Some(effect.into());
        self
    }

    pub fn is_ready(&self) -> bool {
        self.current_cooldown == 0
    }
}

/// A timed buff on an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buff {
    pub effect: String,
    pub remaining: u32,
}

/// One side of a combat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatEntity {
    pub name: String,
    pub max_health: i64,
    pub current_health: i64,
    /// Ordered by name so random opponent picks are seed-stable.
    pub abilities: BTreeMap<String, Ability>,
    /// Status effect name to remaining turns.
    pub status_effects: BTreeMap<String, u32>,
    pub buffs: BTreeMap<String, Buff>,
}

impl CombatEntity {
    pub fn new(name: impl Into<String>, max_health: i64) -> Self {
        Self {
            name: name.into(),
            max_health,
            current_health: max_health,
            abilities: BTreeMap::new(),
            status_effects: BTreeMap::new(),
            buffs: BTreeMap::new(),
        }
    }

    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.abilities.insert(ability.name.clone(), ability);
        self
    }

    /// The standard player loadout.
    pub fn player_default(name: impl Into<String>) -> Self {
        Self::new(name, 300)
            .with_ability(
                Ability::new("Sword Strike", 20, 40).with_description("A powerful sword attack"),
            )
            .with_ability(
                Ability::new("Shield Bash", 10, 20)
                    .with_cooldown(3)
                    .with_special_effect("stun")
                    .with_description("A stunning shield attack"),
            )
            .with_ability(
                Ability::new("War Cry", 0, 5)
                    .with_cooldown(4)
                    .with_special_effect("damage_boost")
                    .with_description("A rallying shout that rattles the enemy"),
            )
    }

    pub fn is_alive(&self) -> bool {
        self.current_health > 0
    }

    /// Reduce health, clamped at zero.
    pub fn apply_damage(&mut self, damage: i64) {
        self.current_health = (self.current_health - damage).max(0);
    }

    /// Restore health, clamped at the maximum.
    pub fn heal(&mut self, amount: i64) {
        self.current_health = (self.current_health + amount).min(self.max_health);
    }

    pub fn apply_status_effect(&mut self, effect: impl Into<String>, duration: u32) {
        self.status_effects.insert(effect.into(), duration);
    }

    pub fn apply_buff(&mut self, name: impl Into<String>, effect: impl Into<String>, duration: u32) {
        self.buffs.insert(
            name.into(),
            Buff {
                effect: effect.into(),
                remaining: duration,
            },
        );
    }

    /// Names of abilities usable this turn.
    pub fn ready_abilities(&self) -> Vec<&str> {
        self.abilities
            .values()
            .filter(|a| a.is_ready())
            .map(|a| a.name.as_str())
            .collect()
    }

    /// Tick every cooldown down by one, flooring at zero.
    fn tick_cooldowns(&mut self) {
        for ability in self.abilities.values_mut() {
            ability.current_cooldown = ability.current_cooldown.saturating_sub(1);
        }
    }

    /// Tick status effects and buffs, removing anything that expires.
    fn tick_effects(&mut self) {
        self.status_effects.retain(|_, remaining| {
            *remaining = remaining.saturating_sub(1);
            *remaining > 0
        });
        self.buffs.retain(|_, buff| {
            buff.remaining = buff.remaining.saturating_sub(1);
            buff.remaining > 0
        });
    }
}

// ============================================================================
// Combat instance
// ============================================================================

/// Lifecycle state of a combat instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatState {
    Active,
    PlayerVictory,
    OpponentVictory,
}

impl CombatState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CombatState::Active)
    }
}

/// Who said a line of combat dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    Player,
    Opponent,
}

/// One exchange in the combat dialogue history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueEntry {
    pub speaker: Speaker,
    pub message: String,
}

/// A structured record of one resolved action, for the narration layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnLogEntry {
    pub turn: u32,
    pub actor: String,
    pub action: String,
    pub damage: i64,
    pub target_health: i64,
}

/// Summary of a fully resolved turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub turn: u32,
    pub player_ability: String,
    pub damage_dealt: i64,
    /// Absent when the opponent died before retaliating.
    pub opponent_ability: Option<String>,
    pub damage_taken: i64,
    pub state: CombatState,
}

/// Snapshot of combat state handed to the narration layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatSnapshot {
    pub turn_number: u32,
    pub player_name: String,
    pub player_hp: i64,
    pub player_max_hp: i64,
    pub opponent_name: String,
    pub opponent_hp: i64,
    pub opponent_max_hp: i64,
    /// Ready abilities plus the non-turn actions "talk" and "status".
    pub available_actions: Vec<String>,
    pub ability_descriptions: BTreeMap<String, String>,
}

/// A 1v1 turn-based combat.
#[derive(Debug)]
pub struct Combat {
    pub id: CombatId,
    player: CombatEntity,
    opponent: CombatEntity,
    turn: u32,
    state: CombatState,
    log: Vec<TurnLogEntry>,
    dialogue: Vec<DialogueEntry>,
    rng: StdRng,
}

impl Combat {
    pub fn new(player: CombatEntity, opponent: CombatEntity) -> Self {
        Self::with_rng(player, opponent, StdRng::from_entropy())
    }

    /// A seeded combat; identical seeds replay identically.
    pub fn from_seed(player: CombatEntity, opponent: CombatEntity, seed: u64) -> Self {
        Self::with_rng(player, opponent, StdRng::seed_from_u64(seed))
    }

    fn with_rng(player: CombatEntity, opponent: CombatEntity, rng: StdRng) -> Self {
        Self {
            id: CombatId::new(),
            player,
            opponent,
            turn: 1,
            state: CombatState::Active,
            log: Vec::new(),
            dialogue: Vec::new(),
            rng,
        }
    }

    pub fn state(&self) -> CombatState {
        self.state
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn player(&self) -> &CombatEntity {
        &self.player
    }

    pub fn opponent(&self) -> &CombatEntity {
        &self.opponent
    }

    pub fn log(&self) -> &[TurnLogEntry] {
        &self.log
    }

    pub fn dialogue(&self) -> &[DialogueEntry] {
        &self.dialogue
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    /// Resolve one full turn around the player's chosen ability.
    ///
    /// An ability still cooling down or an unknown name is rejected with no
    /// state change. If the opponent survives the player's hit it retaliates
    /// with a uniformly random ability; if the hit kills it the retaliation
    /// is skipped, so the player wins simultaneous-death races.
    pub fn resolve_turn(&mut self, ability_name: &str) -> Result<TurnOutcome, CombatError> {
        if self.state.is_terminal() {
            return Err(CombatError::Finished);
        }

        let ability = self
            .player
            .abilities
            .get(ability_name)
            .ok_or_else(|| CombatError::UnknownAction(ability_name.to_string()))?;
        if !ability.is_ready() {
            return Err(CombatError::OnCooldown {
                ability: ability.name.clone(),
                remaining: ability.current_cooldown,
            });
        }

        // Player strike.
        let (min, max) = ability.damage_range;
        let damage_dealt = self.rng.gen_range(min..=max);
        self.opponent.apply_damage(damage_dealt);
        let player_ability = ability.name.clone();
        if let Some(used) = self.player.abilities.get_mut(ability_name) {
            used.current_cooldown = used.cooldown;
        }
        self.log.push(TurnLogEntry {
            turn: self.turn,
            actor: self.player.name.clone(),
            action: player_ability.clone(),
            damage: damage_dealt,
            target_health: self.opponent.current_health,
        });

        // Opponent retaliation, skipped once it is already dead.
        let mut opponent_ability = None;
        let mut damage_taken = 0;
        if self.opponent.is_alive() {
            let names: Vec<&String> = self.opponent.abilities.keys().collect();
            if let Some(name) = names.choose(&mut self.rng).map(|s| s.to_string()) {
                let (min, max) = self.opponent.abilities[&name].damage_range;
                damage_taken = self.rng.gen_range(min..=max);
                self.player.apply_damage(damage_taken);
                self.log.push(TurnLogEntry {
                    turn: self.turn,
                    actor: self.opponent.name.clone(),
                    action: name.clone(),
                    damage: damage_taken,
                    target_health: self.player.current_health,
                });
                opponent_ability = Some(name);
            }
        }

        // End of turn: tick cooldowns and effect durations on both sides.
        self.player.tick_cooldowns();
        self.player.tick_effects();
        self.opponent.tick_cooldowns();
        self.opponent.tick_effects();

        self.turn += 1;

        // Terminal check, player-caused death first.
        if !self.opponent.is_alive() {
            self.state = CombatState::PlayerVictory;
        } else if !self.player.is_alive() {
            self.state = CombatState::OpponentVictory;
        }

        Ok(TurnOutcome {
            turn: self.turn - 1,
            player_ability,
            damage_dealt,
            opponent_ability,
            damage_taken,
            state: self.state,
        })
    }

    /// Exchange words with the opponent. Does not consume a turn.
    pub fn talk(&mut self, message: &str) -> String {
        self.dialogue.push(DialogueEntry {
            speaker: Speaker::Player,
            message: message.to_string(),
        });
        let response = format!("I am {}, and I shall be your doom!", self.opponent.name);
        self.dialogue.push(DialogueEntry {
            speaker: Speaker::Opponent,
            message: response.clone(),
        });
        response
    }

    /// Structured state for the narration layer and drivers.
    pub fn snapshot(&self) -> CombatSnapshot {
        let mut available_actions = vec!["talk".to_string(), "status".to_string()];
        available_actions.extend(
            self.player
                .ready_abilities()
                .into_iter()
                .map(str::to_string),
        );

        CombatSnapshot {
            turn_number: self.turn,
            player_name: self.player.name.clone(),
            player_hp: self.player.current_health,
            player_max_hp: self.player.max_health,
            opponent_name: self.opponent.name.clone(),
            opponent_hp: self.opponent.current_health,
            opponent_max_hp: self.opponent.max_health,
            available_actions,
            ability_descriptions: self
                .player
                .abilities
                .values()
                .map(|a| (a.name.clone(), a.description.clone()))
                .collect(),
        }
    }

    /// Human-readable status report. Does not consume a turn.
    pub fn status_report(&self) -> String {
        let mut out = format!("Combat Status - Turn {}\n", self.turn);
        out.push_str(&format!(
            "{}: {}/{} HP\n",
            self.player.name, self.player.current_health, self.player.max_health
        ));
        out.push_str(&format!(
            "{}: {}/{} HP\n",
            self.opponent.name, self.opponent.current_health, self.opponent.max_health
        ));
        out.push_str("\nYour abilities:\n");
        for ability in self.player.abilities.values() {
            let readiness = if ability.is_ready() {
                "(Ready)".to_string()
            } else {
                format!("(Cooldown: {})", ability.current_cooldown)
            };
            out.push_str(&format!(
                "{}: {} {}\n",
                ability.name, ability.description, readiness
            ));
        }
        if !self.player.status_effects.is_empty() {
            out.push_str("\nStatus Effects:\n");
            for (effect, remaining) in &self.player.status_effects {
                out.push_str(&format!("{effect}: {remaining} turns remaining\n"));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raider() -> CombatEntity {
        CombatEntity::new("Void Raider", 100)
            .with_ability(Ability::new("Laser Strike", 15, 25))
            .with_ability(Ability::new("Plasma Burst", 15, 25))
    }

    #[test]
    fn test_health_clamps() {
        let mut entity = CombatEntity::new("Dummy", 50);
        entity.apply_damage(80);
        assert_eq!(entity.current_health, 0);
        assert!(!entity.is_alive());
        entity.heal(200);
        assert_eq!(entity.current_health, 50);
    }

    #[test]
    fn test_is_alive_tracks_health_every_turn() {
        let player = CombatEntity::player_default("Captain");
        let mut combat = Combat::from_seed(player, raider(), 9);
        while !combat.is_finished() {
            combat.resolve_turn("Sword Strike").unwrap();
            assert_eq!(combat.player().is_alive(), combat.player().current_health > 0);
            assert_eq!(
                combat.opponent().is_alive(),
                combat.opponent().current_health > 0
            );
        }
    }

    #[test]
    fn test_cooldown_lifecycle() {
        let player = CombatEntity::player_default("Captain");
        let opponent = CombatEntity::new("Drone", 1000)
            .with_ability(Ability::new("Zap", 0, 0));
        let mut combat = Combat::from_seed(player, opponent, 1);

        // Shield Bash (cooldown 3) used on turn 1.
        combat.resolve_turn("Shield Bash").unwrap();
        assert_eq!(
            combat.player().abilities["Shield Bash"].current_cooldown,
            2
        );

        // Turns 2 and 3: still cooling down.
        let err = combat.resolve_turn("Shield Bash").unwrap_err();
        assert_eq!(
            err,
            CombatError::OnCooldown {
                ability: "Shield Bash".to_string(),
                remaining: 2
            }
        );
        combat.resolve_turn("Sword Strike").unwrap();
        assert!(matches!(
            combat.resolve_turn("Shield Bash"),
            Err(CombatError::OnCooldown { remaining: 1, .. })
        ));
        combat.resolve_turn("Sword Strike").unwrap();

        // Turn 4: ready again.
        assert!(combat.player().abilities["Shield Bash"].is_ready());
        assert_eq!(combat.turn(), 4);
        combat.resolve_turn("Shield Bash").unwrap();
    }

    #[test]
    fn test_rejected_actions_change_nothing() {
        let player = CombatEntity::player_default("Captain");
        let mut combat = Combat::from_seed(player, raider(), 2);
        let before_player = combat.player().current_health;
        let before_opponent = combat.opponent().current_health;

        assert_eq!(
            combat.resolve_turn("Warp Scream").unwrap_err(),
            CombatError::UnknownAction("Warp Scream".to_string())
        );
        assert_eq!(combat.player().current_health, before_player);
        assert_eq!(combat.opponent().current_health, before_opponent);
        assert_eq!(combat.turn(), 1);
    }

    #[test]
    fn test_dead_opponent_does_not_retaliate() {
        let player = CombatEntity::new("Captain", 10)
            .with_ability(Ability::new("Finisher", 500, 500));
        let opponent = CombatEntity::new("Raider", 5)
            .with_ability(Ability::new("Doom Blast", 500, 500));
        let mut combat = Combat::from_seed(player, opponent, 3);

        let outcome = combat.resolve_turn("Finisher").unwrap();
        assert_eq!(outcome.opponent_ability, None);
        assert_eq!(outcome.damage_taken, 0);
        assert_eq!(combat.state(), CombatState::PlayerVictory);
        assert!(combat.player().is_alive());
    }

    #[test]
    fn test_seeded_combat_is_reproducible() {
        let run = |seed: u64| {
            let mut combat = Combat::from_seed(
                CombatEntity::player_default("Captain"),
                raider(),
                seed,
            );
            let mut outcomes = Vec::new();
            while !combat.is_finished() {
                outcomes.push(combat.resolve_turn("Sword Strike").unwrap());
            }
            (outcomes, combat.state())
        };

        let (outcomes_a, state_a) = run(77);
        let (outcomes_b, state_b) = run(77);
        assert_eq!(outcomes_a, outcomes_b);
        assert_eq!(state_a, state_b);
    }

    #[test]
    fn test_finished_combat_rejects_actions() {
        let player = CombatEntity::new("Captain", 10)
            .with_ability(Ability::new("Finisher", 500, 500));
        let opponent = CombatEntity::new("Raider", 5)
            .with_ability(Ability::new("Peck", 1, 1));
        let mut combat = Combat::from_seed(player, opponent, 4);
        combat.resolve_turn("Finisher").unwrap();
        assert_eq!(
            combat.resolve_turn("Finisher").unwrap_err(),
            CombatError::Finished
        );
    }

    #[test]
    fn test_talk_does_not_consume_a_turn() {
        let mut combat = Combat::from_seed(
            CombatEntity::player_default("Captain"),
            raider(),
            5,
        );
        let response = combat.talk("Stand down!");
        assert!(response.contains("Void Raider"));
        assert_eq!(combat.turn(), 1);
        assert_eq!(combat.dialogue().len(), 2);
    }

    #[test]
    fn test_status_effects_expire() {
        let mut entity = raider();
        entity.apply_status_effect("stun", 2);
        entity.apply_buff("rally", "damage_boost", 1);
        entity.tick_effects();
        assert_eq!(entity.status_effects.get("stun"), Some(&1));
        assert!(entity.buffs.is_empty());
        entity.tick_effects();
        assert!(entity.status_effects.is_empty());
    }

    #[test]
    fn test_snapshot_lists_ready_actions() {
        let mut combat = Combat::from_seed(
            CombatEntity::player_default("Captain"),
            raider(),
            6,
        );
        combat.resolve_turn("Shield Bash").unwrap();
        let snapshot = combat.snapshot();
        assert!(snapshot.available_actions.contains(&"talk".to_string()));
        assert!(snapshot.available_actions.contains(&"status".to_string()));
        assert!(snapshot
            .available_actions
            .contains(&"Sword Strike".to_string()));
        assert!(!snapshot
            .available_actions
            .contains(&"Shield Bash".to_string()));
        assert_eq!(snapshot.turn_number, 2);
    }
}
