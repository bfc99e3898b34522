//! Player characters
//!
//! A player character outlives any single encounter: the game state owns it
//! and a combat session borrows it for the length of the fight.

use serde::{Deserialize, Serialize};

use super::{Combatant, HitPoints};

/// Damage dealt by a character with nothing equipped
pub const UNARMED_DAMAGE: &str = "1d4";

/// A player-controlled combatant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCharacter {
    name: String,
    hp: HitPoints,
    armor_class: i32,
    attack_bonus: i32,
    damage: String,
    initiative_modifier: i32,
    experience: u32,
}

impl PlayerCharacter {
    /// Create a character at full health with base stats (AC 10, +0, 1d4)
    pub fn new(name: impl Into<String>, max_hp: u32) -> Self {
        Self {
            name: name.into(),
            hp: HitPoints::new(max_hp),
            armor_class: 10,
            attack_bonus: 0,
            damage: UNARMED_DAMAGE.to_string(),
            initiative_modifier: 0,
            experience: 0,
        }
    }

    /// Set armor class (from worn equipment)
    pub fn with_armor_class(mut self, armor_class: i32) -> Self {
        self.armor_class = armor_class;
        self
    }

    /// Set attack bonus (from ability and weapon)
    pub fn with_attack_bonus(mut self, attack_bonus: i32) -> Self {
        self.attack_bonus = attack_bonus;
        self
    }

    /// Set the weapon damage dice
    pub fn with_damage(mut self, formula: impl Into<String>) -> Self {
        self.damage = formula.into();
        self
    }

    /// Set the initiative modifier
    pub fn with_initiative_modifier(mut self, modifier: i32) -> Self {
        self.initiative_modifier = modifier;
        self
    }

    /// Start below full health, e.g. carried over from an earlier fight
    pub fn with_current_hp(mut self, current: u32) -> Self {
        self.hp = HitPoints::with_current(current, self.hp.max());
        self
    }

    /// Total XP earned
    pub fn experience(&self) -> u32 {
        self.experience
    }

    /// HP as a pair
    pub fn hit_points(&self) -> HitPoints {
        self.hp
    }
}

impl Combatant for PlayerCharacter {
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
        false
    }

    fn award_xp(&mut self, xp: u32) {
        self.experience = self.experience.saturating_add(xp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let pc = PlayerCharacter::new("Aria", 20)
            .with_armor_class(15)
            .with_attack_bonus(5)
            .with_damage("1d8+3")
            .with_initiative_modifier(2);

        assert_eq!(pc.name(), "Aria");
        assert_eq!(pc.current_hp(), 20);
        assert_eq!(pc.max_hp(), 20);
        assert_eq!(pc.armor_class(), 15);
        assert_eq!(pc.attack_bonus(), 5);
        assert_eq!(pc.damage_formula(), "1d8+3");
        assert_eq!(pc.initiative_modifier(), 2);
        assert!(!pc.is_automated());
        assert_eq!(pc.xp_award(), 0);
    }

    #[test]
    fn test_damage_and_heal() {
        let mut pc = PlayerCharacter::new("Aria", 20).with_current_hp(5);
        assert_eq!(pc.heal(100), 15);
        assert_eq!(pc.current_hp(), 20);

        assert_eq!(pc.apply_damage(25), 20);
        assert!(pc.is_defeated());

        // Damage to a defeated character is a no-op
        assert_eq!(pc.apply_damage(3), 0);
        assert_eq!(pc.current_hp(), 0);
    }

    #[test]
    fn test_award_xp_accumulates() {
        let mut pc = PlayerCharacter::new("Aria", 20);
        pc.award_xp(50);
        pc.award_xp(200);
        assert_eq!(pc.experience(), 250);
    }
}
