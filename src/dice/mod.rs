//! Randomness engine
//!
//! Provides:
//! - Dice notation parsing ("2d6+3", "d20")
//! - Uniform rolls from an injectable source (OS-seeded, seeded, or scripted)
//! - Advantage/disadvantage and DC checks
//! - A bounded, thread-safe log of recent rolls

mod history;
mod notation;
mod roller;
mod source;

use thiserror::Error;

pub use history::{RollHistory, RollRecord, DEFAULT_HISTORY_CAPACITY};
pub use notation::{parse_dice, DiceRoll, MAX_DICE};
pub use roller::{Check, Dice};
pub use source::{entropy_source, seeded_source, DieSource, ScriptedDice};

/// Errors from parsing or rolling dice
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("cannot roll {count}d{sides}")]
    InvalidDie { count: i64, sides: i64 },

    #[error("invalid dice notation: {0:?}")]
    InvalidNotation(String),
}
