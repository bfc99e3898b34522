//! Monsters and monster templates
//!
//! A [`MonsterTemplate`] describes a kind of creature. Each encounter spawns
//! fresh [`Monster`] instances from templates and drops them when the fight
//! ends.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Combatant, HitPoints};
use crate::dice::{Dice, DiceError};

/// XP for challenge ratings 1 through 30
const XP_BY_RATING: [u32; 30] = [
    200, 450, 700, 1_100, 1_800, 2_300, 2_900, 3_900, 5_000, 5_900, 7_200, 8_400, 10_000, 11_500,
    13_000, 15_000, 18_000, 20_000, 22_000, 25_000, 33_000, 41_000, 50_000, 62_000, 75_000,
    90_000, 105_000, 120_000, 135_000, 155_000,
];

/// Highest challenge rating
pub const MAX_CHALLENGE_RATING: u8 = 30;

/// A string that is not a challenge rating
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid challenge rating: {0:?}")]
pub struct InvalidChallengeRating(pub String);

/// Monster difficulty, from 0 through 30 with fractional steps below 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ChallengeRating {
    /// CR 0
    Zero,
    /// CR 1/8
    Eighth,
    /// CR 1/4
    Quarter,
    /// CR 1/2
    Half,
    /// CR 1 through 30
    Whole(u8),
}

impl ChallengeRating {
    /// XP awarded for defeating a monster of this rating
    pub fn xp(&self) -> u32 {
        match self {
            ChallengeRating::Zero => 10,
            ChallengeRating::Eighth => 25,
            ChallengeRating::Quarter => 50,
            ChallengeRating::Half => 100,
            ChallengeRating::Whole(n) => {
                let idx = (*n).clamp(1, MAX_CHALLENGE_RATING) as usize - 1;
                XP_BY_RATING[idx]
            }
        }
    }
}

impl FromStr for ChallengeRating {
    type Err = InvalidChallengeRating;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" => Ok(ChallengeRating::Zero),
            "1/8" | "0.125" => Ok(ChallengeRating::Eighth),
            "1/4" | "0.25" => Ok(ChallengeRating::Quarter),
            "1/2" | "0.5" => Ok(ChallengeRating::Half),
            other => match other.parse::<u8>() {
                Ok(n) if (1..=MAX_CHALLENGE_RATING).contains(&n) => Ok(ChallengeRating::Whole(n)),
                _ => Err(InvalidChallengeRating(s.to_string())),
            },
        }
    }
}

impl TryFrom<String> for ChallengeRating {
    type Error = InvalidChallengeRating;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChallengeRating> for String {
    fn from(cr: ChallengeRating) -> Self {
        cr.to_string()
    }
}

impl std::fmt::Display for ChallengeRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChallengeRating::Zero => write!(f, "0"),
            ChallengeRating::Eighth => write!(f, "1/8"),
            ChallengeRating::Quarter => write!(f, "1/4"),
            ChallengeRating::Half => write!(f, "1/2"),
            ChallengeRating::Whole(n) => write!(f, "{}", n),
        }
    }
}

/// Description of a kind of monster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterTemplate {
    /// Display name
    pub name: String,
    /// Fixed hit points used by [`MonsterTemplate::spawn`]
    pub hit_points: u32,
    /// Optional hit dice rolled by [`MonsterTemplate::spawn_rolled`]
    #[serde(default)]
    pub hit_dice: Option<String>,
    /// Armor class
    pub armor_class: i32,
    /// Attack roll bonus
    pub attack_bonus: i32,
    /// Damage dice notation
    pub damage: String,
    /// Initiative modifier
    #[serde(default)]
    pub initiative_modifier: i32,
    /// Difficulty, drives the XP award
    pub challenge_rating: ChallengeRating,
}

impl MonsterTemplate {
    /// Spawn one monster with the template's name and fixed HP
    pub fn spawn(&self) -> Monster {
        self.spawn_named(self.name.clone())
    }

    /// Spawn one monster under a different name
    pub fn spawn_named(&self, name: impl Into<String>) -> Monster {
        Monster {
            name: name.into(),
            hp: HitPoints::new(self.hit_points),
            armor_class: self.armor_class,
            attack_bonus: self.attack_bonus,
            damage: self.damage.clone(),
            initiative_modifier: self.initiative_modifier,
            challenge_rating: self.challenge_rating,
        }
    }

    /// Spawn one monster, rolling its HP from the hit dice when present
    pub fn spawn_rolled(&self, dice: &Dice) -> Result<Monster, DiceError> {
        let mut monster = self.spawn();
        if let Some(hit_dice) = &self.hit_dice {
            let rolled = dice.parse(hit_dice)?.max(1) as u32;
            monster.hp = HitPoints::new(rolled);
        }
        Ok(monster)
    }

    /// Spawn `count` monsters. More than one are numbered so each stays targetable.
    pub fn spawn_group(&self, count: usize) -> Vec<Monster> {
        match count {
            0 => Vec::new(),
            1 => vec![self.spawn()],
            _ => (1..=count)
                .map(|i| self.spawn_named(format!("{} {}", self.name, i)))
                .collect(),
        }
    }

    /// Like [`MonsterTemplate::spawn_group`], rolling each monster's HP
    pub fn spawn_group_rolled(&self, count: usize, dice: &Dice) -> Result<Vec<Monster>, DiceError> {
        let mut group = self.spawn_group(count);
        if let Some(hit_dice) = &self.hit_dice {
            for monster in &mut group {
                monster.hp = HitPoints::new(dice.parse(hit_dice)?.max(1) as u32);
            }
        }
        Ok(group)
    }
}

/// A monster instance in an encounter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    name: String,
    hp: HitPoints,
    armor_class: i32,
    attack_bonus: i32,
    damage: String,
    initiative_modifier: i32,
    challenge_rating: ChallengeRating,
}

impl Monster {
    /// Difficulty rating
    pub fn challenge_rating(&self) -> ChallengeRating {
        self.challenge_rating
    }

    /// HP as a pair
    pub fn hit_points(&self) -> HitPoints {
        self.hp
    }
}

impl Combatant for Monster {
    fn name(&self) -> &str {
        &self.name
    }

    fn current_hp(&self) -> u32 {
        self.hp.current()
    }

    fn max_hp(&self) -> u32 {
        self.hp.max()
    }

    fn armor_class(&self) -> i32 {
        self.armor_class
    }

    fn attack_bonus(&self) -> i32 {
        self.attack_bonus
    }

    fn damage_formula(&self) -> &str {
        &self.damage
    }

    fn initiative_modifier(&self) -> i32 {
        self.initiative_modifier
    }

    fn apply_damage(&mut self, amount: u32) -> u32 {
        self.hp.damage(amount)
    }

    fn heal(&mut self, amount: u32) -> u32 {
        self.hp.heal(amount)
    }

    fn is_automated(&self) -> bool {
        true
    }

    fn xp_award(&self) -> u32 {
        self.challenge_rating.xp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goblin() -> MonsterTemplate {
        MonsterTemplate {
            name: "Goblin".to_string(),
            hit_points: 7,
            hit_dice: Some("2d6".to_string()),
            armor_class: 15,
            attack_bonus: 4,
            damage: "1d6+2".to_string(),
            initiative_modifier: 2,
            challenge_rating: ChallengeRating::Quarter,
        }
    }

    #[test]
    fn test_challenge_rating_parsing() {
        assert_eq!("0".parse::<ChallengeRating>(), Ok(ChallengeRating::Zero));
        assert_eq!("1/8".parse::<ChallengeRating>(), Ok(ChallengeRating::Eighth));
        assert_eq!("0.25".parse::<ChallengeRating>(), Ok(ChallengeRating::Quarter));
        assert_eq!("5".parse::<ChallengeRating>(), Ok(ChallengeRating::Whole(5)));
        assert!("31".parse::<ChallengeRating>().is_err());
        assert!("1/3".parse::<ChallengeRating>().is_err());
        assert!("goblin".parse::<ChallengeRating>().is_err());
    }

    #[test]
    fn test_challenge_rating_xp() {
        assert_eq!(ChallengeRating::Zero.xp(), 10);
        assert_eq!(ChallengeRating::Quarter.xp(), 50);
        assert_eq!(ChallengeRating::Whole(1).xp(), 200);
        assert_eq!(ChallengeRating::Whole(5).xp(), 1_800);
        assert_eq!(ChallengeRating::Whole(30).xp(), 155_000);
    }

    #[test]
    fn test_challenge_rating_display_round_trips() {
        for s in ["0", "1/8", "1/4", "1/2", "1", "17", "30"] {
            assert_eq!(s.parse::<ChallengeRating>().unwrap().to_string(), s);
        }
    }

    #[test]
    fn test_template_deserializes() {
        let json = r#"{
            "name": "Wolf",
            "hit_points": 11,
            "armor_class": 13,
            "attack_bonus": 4,
            "damage": "2d4+2",
            "challenge_rating": "1/4"
        }"#;
        let template: MonsterTemplate = serde_json::from_str(json).unwrap();
        assert_eq!(template.initiative_modifier, 0);
        assert_eq!(template.hit_dice, None);
        assert_eq!(template.challenge_rating, ChallengeRating::Quarter);
    }

    #[test]
    fn test_spawn() {
        let monster = goblin().spawn();
        assert_eq!(monster.name(), "Goblin");
        assert_eq!(monster.current_hp(), 7);
        assert_eq!(monster.armor_class(), 15);
        assert!(monster.is_automated());
        assert_eq!(monster.xp_award(), 50);
    }

    #[test]
    fn test_spawn_rolled() {
        let dice = Dice::scripted([6, 5]);
        let monster = goblin().spawn_rolled(&dice).unwrap();
        assert_eq!(monster.max_hp(), 11);
        assert_eq!(dice.history_size(), 1);
    }

    #[test]
    fn test_spawn_group_rolled() {
        let dice = Dice::scripted([1, 1, 6, 6]);
        let group = goblin().spawn_group_rolled(2, &dice).unwrap();
        assert_eq!(group[0].name(), "Goblin 1");
        assert_eq!(group[0].max_hp(), 2);
        assert_eq!(group[1].max_hp(), 12);

        let mut fixed = goblin();
        fixed.hit_dice = None;
        let group = fixed.spawn_group_rolled(2, &dice).unwrap();
        assert!(group.iter().all(|m| m.max_hp() == 7));
    }

    #[test]
    fn test_spawn_group_numbers_duplicates() {
        let group = goblin().spawn_group(3);
        let names: Vec<&str> = group.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["Goblin 1", "Goblin 2", "Goblin 3"]);
        assert_eq!(goblin().spawn_group(1)[0].name(), "Goblin");
        assert!(goblin().spawn_group(0).is_empty());
    }

    #[test]
    fn test_monster_hp_clamps() {
        let mut monster = goblin().spawn();
        assert_eq!(monster.apply_damage(50), 7);
        assert!(monster.is_defeated());
        assert_eq!(monster.heal(50), 7);
        assert_eq!(monster.current_hp(), 7);
    }
}
