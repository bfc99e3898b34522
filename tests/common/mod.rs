//! Common test utilities - scripted fighters and an autopilot driver

#![allow(dead_code)]

use std::sync::Arc;

use skirmish::combat::{CombatSession, Outcome};
use skirmish::combatant::ChallengeRating;
use skirmish::{Dice, Monster, MonsterTemplate, PlayerCharacter};

/// Engine calls allowed before a test driver gives up
pub const MAX_STEPS: usize = 1_000;

/// HP 20, AC 15, +5 to hit, 1d8+3, no initiative modifier
pub fn hero(name: &str) -> PlayerCharacter {
    PlayerCharacter::new(name, 20)
        .with_armor_class(15)
        .with_attack_bonus(5)
        .with_damage("1d8+3")
}

/// HP 7, AC 12, +4 to hit, 1d6+2, CR 1/4 (50 XP)
pub fn goblin(name: &str) -> Monster {
    template(name, 7).spawn()
}

/// Goblin stats with a custom HP
pub fn template(name: &str, hit_points: u32) -> MonsterTemplate {
    MonsterTemplate {
        name: name.to_string(),
        hit_points,
        hit_dice: None,
        armor_class: 12,
        attack_bonus: 4,
        damage: "1d6+2".to_string(),
        initiative_modifier: 0,
        challenge_rating: ChallengeRating::Quarter,
    }
}

/// Dice that replay `faces` and then roll 1s
pub fn scripted(faces: &[u32]) -> Arc<Dice> {
    Arc::new(Dice::scripted(faces.iter().copied()))
}

/// Drive a started session to the end, attacking the first target each turn
///
/// Returns every outcome produced, in order. Panics on an error outcome or
/// if the fight does not end within [`MAX_STEPS`].
pub fn run_autopilot(session: &mut CombatSession<'_>) -> Vec<Outcome> {
    let mut outcomes = Vec::new();
    for _ in 0..MAX_STEPS {
        if session.is_resolved() {
            return outcomes;
        }

        let outcome = session.execute_turn();
        assert!(!outcome.is_error(), "execute_turn failed: {:?}", outcome);

        let reply = match &outcome {
            Outcome::TurnStart { targets, .. } => {
                Some(session.player_turn("attack", targets.first().map(String::as_str)))
            }
            _ => None,
        };
        outcomes.push(outcome);

        if let Some(reply) = reply {
            assert!(!reply.is_error(), "player_turn failed: {:?}", reply);
            outcomes.push(reply);
        }
    }
    panic!("combat did not finish within {} steps", MAX_STEPS);
}
