//! Rejected combat invocations
//!
//! Every variant is reported to the caller as [`Outcome::Error`] and leaves
//! the session untouched, so the caller can retry with corrected input.
//!
//! [`Outcome::Error`]: super::Outcome::Error

use serde::Serialize;
use thiserror::Error;

use super::CombatStatus;

/// Why a combat call was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CombatError {
    #[error("an encounter needs at least one living enemy")]
    EmptyEncounter,

    #[error("an encounter needs at least one living party member")]
    EmptyParty,

    #[error("two combatants are named {name:?}; names must be unique")]
    DuplicateName { name: String },

    #[error("combat has already started")]
    AlreadyStarted,

    #[error("combat is not active (status: {status})")]
    NotActive { status: CombatStatus },

    #[error("it is not a player's turn ({actor} is acting)")]
    NotPlayersTurn { actor: String },

    #[error("unknown action {action:?} (expected \"attack\" or \"flee\")")]
    UnknownAction { action: String },

    #[error("choose a target: {}", .candidates.join(", "))]
    MissingTarget { candidates: Vec<String> },

    #[error("target {target:?} is ambiguous: {}", .matches.join(", "))]
    AmbiguousTarget { target: String, matches: Vec<String> },

    #[error("no living enemy named {target:?}")]
    TargetNotFound { target: String },

    #[error("{combatant} has an unusable damage formula: {reason}")]
    InvalidDamageFormula { combatant: String, reason: String },

    #[error("combat invariant violated: {detail}")]
    InvariantViolation { detail: String },
}

impl CombatError {
    /// Errors caused by a driver bug rather than bad player input
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            CombatError::InvariantViolation { .. } | CombatError::InvalidDamageFormula { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = CombatError::AmbiguousTarget {
            target: "gob".to_string(),
            matches: vec!["Goblin 1".to_string(), "Goblin 2".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "target \"gob\" is ambiguous: Goblin 1, Goblin 2"
        );

        let err = CombatError::NotActive {
            status: CombatStatus::Victory,
        };
        assert_eq!(err.to_string(), "combat is not active (status: victory)");
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let json = serde_json::to_value(CombatError::TargetNotFound {
            target: "dragon".to_string(),
        })
        .unwrap();
        assert_eq!(json["kind"], "target_not_found");
        assert_eq!(json["target"], "dragon");

        let json = serde_json::to_value(CombatError::EmptyEncounter).unwrap();
        assert_eq!(json["kind"], "empty_encounter");
    }
}
