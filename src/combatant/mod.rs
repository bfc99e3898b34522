//! Combatant model
//!
//! The capability set shared by player characters and monsters:
//! - Read-only stat queries (HP, AC, attack bonus, damage dice, initiative)
//! - Clamped HP mutation (`apply_damage`, `heal`)
//! - Whether the combatant acts on its own (`is_automated`)
//! - XP awarded on defeat and XP received on victory

mod bestiary;
mod monster;
mod player;

use serde::{Deserialize, Serialize};

pub use bestiary::Bestiary;
pub use monster::{ChallengeRating, InvalidChallengeRating, Monster, MonsterTemplate};
pub use player::PlayerCharacter;

/// Current and maximum hit points, clamped to `[0, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HitPoints {
    current: u32,
    max: u32,
}

impl HitPoints {
    /// Full health. A maximum of zero is raised to one.
    pub fn new(max: u32) -> Self {
        let max = max.max(1);
        Self { current: max, max }
    }

    /// Explicit current value, clamped to the maximum
    pub fn with_current(current: u32, max: u32) -> Self {
        let max = max.max(1);
        Self {
            current: current.min(max),
            max,
        }
    }

    /// Current hit points
    pub fn current(&self) -> u32 {
        self.current
    }

    /// Maximum hit points
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Whether current HP is zero
    pub fn is_zero(&self) -> bool {
        self.current == 0
    }

    /// Remove HP, stopping at zero. Returns the HP actually removed.
    pub fn damage(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.current);
        self.current -= actual;
        actual
    }

    /// Restore HP, stopping at max. Returns the HP actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.max - self.current);
        self.current += actual;
        actual
    }
}

/// Anything that can take part in a combat session
///
/// The engine reads stats and mutates HP only through this trait. Amounts are
/// unsigned so negative damage or healing cannot be expressed.
pub trait Combatant: std::fmt::Debug {
    /// Display name, also used for target resolution
    fn name(&self) -> &str;

    /// Current hit points
    fn current_hp(&self) -> u32;

    /// Maximum hit points
    fn max_hp(&self) -> u32;

    /// Armor class an attack total must meet
    fn armor_class(&self) -> i32;

    /// Bonus added to the d20 attack roll
    fn attack_bonus(&self) -> i32;

    /// Damage dice notation, e.g. "1d8+3"
    fn damage_formula(&self) -> &str;

    /// Bonus added to the d20 initiative roll
    fn initiative_modifier(&self) -> i32;

    /// Take damage. Returns the HP actually removed.
    fn apply_damage(&mut self, amount: u32) -> u32;

    /// Regain HP. Returns the HP actually restored.
    fn heal(&mut self, amount: u32) -> u32;

    /// Whether the engine resolves this combatant's turns without input
    fn is_automated(&self) -> bool;

    /// Whether HP has reached zero
    fn is_defeated(&self) -> bool {
        self.current_hp() == 0
    }

    /// XP granted to the other side when this combatant is defeated
    fn xp_award(&self) -> u32 {
        0
    }

    /// Receive XP at the end of a won encounter
    fn award_xp(&mut self, _xp: u32) {}
}

impl<C: Combatant + ?Sized> Combatant for &mut C {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn current_hp(&self) -> u32 {
        (**self).current_hp()
    }

    fn max_hp(&self) -> u32 {
        (**self).max_hp()
    }

    fn armor_class(&self) -> i32 {
        (**self).armor_class()
    }

    fn attack_bonus(&self) -> i32 {
        (**self).attack_bonus()
    }

    fn damage_formula(&self) -> &str {
        (**self).damage_formula()
    }

    fn initiative_modifier(&self) -> i32 {
        (**self).initiative_modifier()
    }

    fn apply_damage(&mut self, amount: u32) -> u32 {
        (**self).apply_damage(amount)
    }

    fn heal(&mut self, amount: u32) -> u32 {
        (**self).heal(amount)
    }

    fn is_automated(&self) -> bool {
        (**self).is_automated()
    }

    fn is_defeated(&self) -> bool {
        (**self).is_defeated()
    }

    fn xp_award(&self) -> u32 {
        (**self).xp_award()
    }

    fn award_xp(&mut self, xp: u32) {
        (**self).award_xp(xp)
    }
}
