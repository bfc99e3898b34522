//! skirmish - turn-based combat resolution core
//!
//! Dice with a bounded roll log, player characters and monsters behind one
//! `Combatant` trait, and a combat session that advances one step per call
//! and reports each step as an `Outcome`.

pub mod combat;
pub mod combatant;
pub mod config;
pub mod dice;

pub use combat::{CombatError, CombatSession, CombatStatus, Outcome, OutcomeKind, Side};
pub use combatant::{Bestiary, Combatant, Monster, MonsterTemplate, PlayerCharacter};
pub use config::{Config, ConfigError};
pub use dice::{Dice, DiceError, DiceRoll};
