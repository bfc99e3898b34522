//! Dice notation
//!
//! Parses notation like "2d6+3", "d20", "4D6-2" into a [`DiceRoll`].
//! Grammar: `[count]d<sides>[+|-modifier]`, case-insensitive.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;

use super::DiceError;

static NOTATION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d*)d(\d+)([+-]\d+)?$").unwrap());

/// Most dice a single roll may throw
pub const MAX_DICE: u32 = 1_000;

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// A parsed dice roll: count, sides and modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiceRoll {
    /// Number of dice to roll
    pub count: u32,
    /// Number of sides per die
    pub sides: u32,
    /// Modifier to add/subtract
    pub modifier: i32,
}

impl DiceRoll {
    /// Create a new dice roll
    pub fn new(count: u32, sides: u32, modifier: i32) -> Self {
        Self {
            count,
            sides,
            modifier,
        }
    }

    /// A single die with no modifier
    pub fn die(sides: u32) -> Self {
        Self::new(1, sides, 0)
    }

    /// Get the minimum possible result, saturating at the i32 range
    pub fn min(&self) -> i32 {
        clamp_i32(self.count as i64 + self.modifier as i64)
    }

    /// Get the maximum possible result, saturating at the i32 range
    pub fn max(&self) -> i32 {
        clamp_i32(self.count as i64 * self.sides as i64 + self.modifier as i64)
    }

    /// Get the expected average (rounded down)
    pub fn average(&self) -> i32 {
        let avg_per_die = (1.0 + self.sides as f64) / 2.0;
        (self.count as f64 * avg_per_die + self.modifier as f64) as i32
    }

    /// Same roll with the dice count doubled (critical damage)
    pub fn doubled(&self) -> Self {
        Self {
            count: self.count.saturating_mul(2).min(MAX_DICE),
            ..*self
        }
    }

    /// Check that the dice can actually be rolled and summed in an i32
    pub fn validate(&self) -> Result<(), DiceError> {
        let invalid = DiceError::InvalidDie {
            count: self.count as i64,
            sides: self.sides as i64,
        };

        if self.count == 0 || self.sides == 0 || self.count > MAX_DICE {
            return Err(invalid);
        }

        let max = (self.count as i64) * (self.sides as i64) + self.modifier as i64;
        if max > i32::MAX as i64 {
            return Err(invalid);
        }

        Ok(())
    }
}

impl FromStr for DiceRoll {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_dice(s)
    }
}

impl std::fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        write_modifier(f, self.modifier)
    }
}

/// Render a modifier as "+N" / "-N", or nothing when it is zero
pub(crate) fn write_modifier(f: &mut impl std::fmt::Write, modifier: i32) -> std::fmt::Result {
    match modifier {
        0 => Ok(()),
        m if m > 0 => write!(f, "+{}", m),
        m => write!(f, "{}", m),
    }
}

/// Parse a dice notation string like "2d6+3"
///
/// Surrounding whitespace is ignored. A missing count means one die and a
/// missing modifier means zero. Malformed or blank input is rejected with
/// [`DiceError::InvalidNotation`]; well-formed notation that cannot be rolled
/// ("0d6", "2d0") is rejected with [`DiceError::InvalidDie`].
pub fn parse_dice(notation: &str) -> Result<DiceRoll, DiceError> {
    let trimmed = notation.trim();
    let invalid = || DiceError::InvalidNotation(notation.to_string());

    let caps = NOTATION_REGEX.captures(trimmed).ok_or_else(invalid)?;

    let count = match caps.get(1).map(|m| m.as_str()) {
        None | Some("") => 1,
        Some(s) => s.parse::<u32>().map_err(|_| invalid())?,
    };

    let sides: u32 = caps[2].parse().map_err(|_| invalid())?;

    let modifier: i32 = match caps.get(3) {
        Some(m) => m.as_str().parse().map_err(|_| invalid())?,
        None => 0,
    };

    let roll = DiceRoll::new(count, sides, modifier);
    roll.validate()?;
    Ok(roll)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let roll = parse_dice("2d6").unwrap();
        assert_eq!(roll, DiceRoll::new(2, 6, 0));
    }

    #[test]
    fn test_parse_with_plus() {
        let roll = parse_dice("1d20+5").unwrap();
        assert_eq!(roll.count, 1);
        assert_eq!(roll.sides, 20);
        assert_eq!(roll.modifier, 5);
    }

    #[test]
    fn test_parse_with_minus() {
        let roll = parse_dice("3d8-2").unwrap();
        assert_eq!(roll.modifier, -2);
    }

    #[test]
    fn test_parse_implicit_one() {
        let roll = parse_dice("d20").unwrap();
        assert_eq!(roll.count, 1);
        assert_eq!(roll.sides, 20);
    }

    #[test]
    fn test_parse_case_insensitive_and_whitespace() {
        assert_eq!(parse_dice("  2D10+3 ").unwrap(), DiceRoll::new(2, 10, 3));
    }

    #[test]
    fn test_parse_malformed() {
        for bad in ["", "   ", "abc", "5x6", "2d", "d", "2d6+", "2d6 + 3", "d-6", "1.5d6", "2d6+3d4"] {
            assert!(
                matches!(parse_dice(bad), Err(DiceError::InvalidNotation(_))),
                "{:?} should be invalid notation",
                bad
            );
        }
    }

    #[test]
    fn test_parse_unrollable() {
        assert!(matches!(parse_dice("0d6"), Err(DiceError::InvalidDie { .. })));
        assert!(matches!(parse_dice("2d0"), Err(DiceError::InvalidDie { .. })));
        assert!(matches!(
            parse_dice("4000000000d1000"),
            Err(DiceError::InvalidDie { .. })
        ));
    }

    #[test]
    fn test_parse_overflowing_digits() {
        assert!(matches!(
            parse_dice("99999999999d6"),
            Err(DiceError::InvalidNotation(_))
        ));
    }

    #[test]
    fn test_min_max_average() {
        let roll = DiceRoll::new(2, 6, 3);
        assert_eq!(roll.min(), 5);
        assert_eq!(roll.max(), 15);
        assert_eq!(roll.average(), 10);
    }

    #[test]
    fn test_display() {
        assert_eq!(DiceRoll::new(2, 6, 0).to_string(), "2d6");
        assert_eq!(DiceRoll::new(1, 20, 5).to_string(), "1d20+5");
        assert_eq!(DiceRoll::new(3, 8, -2).to_string(), "3d8-2");
        assert_eq!("d8+3".parse::<DiceRoll>().unwrap().to_string(), "1d8+3");
    }

    #[test]
    fn test_doubled() {
        assert_eq!(DiceRoll::new(1, 8, 3).doubled(), DiceRoll::new(2, 8, 3));
        assert_eq!(DiceRoll::new(800, 6, 0).doubled().count, MAX_DICE);
    }

    #[test]
    fn test_dice_count_capped() {
        assert!(parse_dice("1000d1").is_ok());
        assert!(matches!(parse_dice("1001d1"), Err(DiceError::InvalidDie { .. })));
        assert!(matches!(
            parse_dice("2000000000d1"),
            Err(DiceError::InvalidDie { .. })
        ));
    }

    #[test]
    fn test_min_max_saturate() {
        let huge = DiceRoll::new(70_000, 70_000, 0);
        assert_eq!(huge.max(), i32::MAX);
        assert_eq!(DiceRoll::new(3_000_000_000, 1, 0).min(), i32::MAX);
        assert_eq!(DiceRoll::new(1, 6, i32::MIN).min(), i32::MIN + 1);
    }
}
