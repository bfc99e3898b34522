//! Attack resolution
//!
//! 1. Roll 1d20 + attack bonus
//! 2. Hit if the total meets the defender's armor class
//! 3. On a hit, roll the attacker's damage dice and apply them to the defender
//!
//! Natural 20s and 1s are always reported. Whether they force a hit or a miss,
//! and whether a natural 20 doubles the damage dice, is up to [`CombatRules`];
//! by default they change nothing.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CombatError;
use crate::combatant::Combatant;
use crate::dice::{parse_dice, Dice, DiceRoll};

/// Optional house rules for attack rolls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatRules {
    /// A natural 20 hits regardless of armor class
    pub natural_twenty_always_hits: bool,
    /// A natural 1 misses regardless of armor class
    pub natural_one_always_misses: bool,
    /// A hit on a natural 20 rolls the damage dice twice
    pub critical_hits_double_dice: bool,
}

/// The d20 part of an attack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackRoll {
    /// The d20 face
    pub natural: u32,
    /// Total attack value (roll + bonus)
    pub total: i32,
    /// Target's AC
    pub target_ac: i32,
    /// Whether the attack hit
    pub hit: bool,
    /// Natural 20
    pub critical: bool,
    /// Natural 1
    pub fumble: bool,
}

impl AttackRoll {
    /// Judge a d20 face against a target
    pub fn new(natural: u32, attack_bonus: i32, target_ac: i32, rules: &CombatRules) -> Self {
        let critical = natural == 20;
        let fumble = natural == 1;
        let total = natural as i32 + attack_bonus;

        let hit = if critical && rules.natural_twenty_always_hits {
            true
        } else if fumble && rules.natural_one_always_misses {
            false
        } else {
            total >= target_ac
        };

        Self {
            natural,
            total,
            target_ac,
            hit,
            critical,
            fumble,
        }
    }
}

/// Everything the engine needs from an attacker, captured before any roll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackProfile {
    pub name: String,
    pub attack_bonus: i32,
    pub damage: DiceRoll,
}

impl AttackProfile {
    /// Capture an attacker's profile, parsing its damage dice
    pub fn of(attacker: &dyn Combatant) -> Result<Self, CombatError> {
        let damage = parse_dice(attacker.damage_formula()).map_err(|e| {
            CombatError::InvalidDamageFormula {
                combatant: attacker.name().to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            name: attacker.name().to_string(),
            attack_bonus: attacker.attack_bonus(),
            damage,
        })
    }
}

/// Fully shown result of one attack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttackReport {
    /// Who attacked
    pub attacker: String,
    /// Who was attacked
    pub defender: String,
    /// The d20 face
    pub natural: u32,
    /// Bonus added to the face
    pub attack_bonus: i32,
    /// Face plus bonus
    pub total: i32,
    /// Armor class the total had to meet
    pub target_ac: i32,
    /// Whether the attack hit
    pub hit: bool,
    /// Natural 20
    pub critical: bool,
    /// Natural 1
    pub fumble: bool,
    /// Damage dice actually rolled, on a hit
    pub damage_formula: Option<String>,
    /// Raw damage roll, on a hit (may be below zero with a negative modifier)
    pub damage_roll: Option<i32>,
    /// HP actually removed from the defender
    pub damage: u32,
    /// Defender HP after the attack
    pub defender_hp: u32,
    /// Defender maximum HP
    pub defender_max_hp: u32,
}

impl AttackReport {
    /// Whether the defender ended the attack at zero HP
    pub fn defender_defeated(&self) -> bool {
        self.defender_hp == 0
    }
}

/// Roll an attack and apply its damage
///
/// `profile` must come from [`AttackProfile::of`], which guarantees the
/// damage dice can be rolled.
pub fn resolve_attack(
    dice: &Dice,
    rules: &CombatRules,
    profile: &AttackProfile,
    defender: &mut dyn Combatant,
) -> Result<AttackReport, CombatError> {
    let to_hit = dice
        .roll_spec(&DiceRoll::new(1, 20, profile.attack_bonus))
        .map_err(|e| CombatError::InvariantViolation {
            detail: format!("attack roll for {} failed: {}", profile.name, e),
        })?;
    let natural = to_hit.dice.first().copied().unwrap_or(1);
    let roll = AttackRoll::new(natural, profile.attack_bonus, defender.armor_class(), rules);

    let mut damage_formula = None;
    let mut damage_roll = None;
    let mut damage = 0;

    if roll.hit {
        let spec = if roll.critical && rules.critical_hits_double_dice {
            profile.damage.doubled()
        } else {
            profile.damage
        };
        let rolled = dice
            .roll_spec(&spec)
            .map_err(|e| CombatError::InvalidDamageFormula {
                combatant: profile.name.clone(),
                reason: e.to_string(),
            })?;

        damage = defender.apply_damage(rolled.result.max(0) as u32);
        damage_formula = Some(rolled.formula);
        damage_roll = Some(rolled.result);
    }

    debug!(
        "{} attacks {}: {} vs AC {} -> {}",
        profile.name,
        defender.name(),
        roll.total,
        roll.target_ac,
        if roll.hit {
            format!("hit for {}", damage)
        } else {
            "miss".to_string()
        }
    );

    Ok(AttackReport {
        attacker: profile.name.clone(),
        defender: defender.name().to_string(),
        natural: roll.natural,
        attack_bonus: profile.attack_bonus,
        total: roll.total,
        target_ac: roll.target_ac,
        hit: roll.hit,
        critical: roll.critical,
        fumble: roll.fumble,
        damage_formula,
        damage_roll,
        damage,
        defender_hp: defender.current_hp(),
        defender_max_hp: defender.max_hp(),
    })
}
