//! Combat system module
//!
//! Turn-based combat between a party and hostile combatants:
//! - Initiative rolled once per fight, fixed turn order
//! - Attack resolution with to-hit against armor class and damage dice
//! - One outcome per engine call, for a renderer to present
//! - Victory, defeat and flight as terminal states

mod attack;
mod error;
mod initiative;
mod outcome;
mod session;

pub use attack::{resolve_attack, AttackProfile, AttackReport, AttackRoll, CombatRules};
pub use error::CombatError;
pub use initiative::{turn_order, InitiativeRoll};
pub use outcome::{InitiativeEntry, Outcome, OutcomeKind};
pub use session::{
    CombatSession, CombatStatus, ParticipantState, PlayerAction, SessionSnapshot, Side,
};
