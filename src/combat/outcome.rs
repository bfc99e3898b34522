//! Combat outcomes
//!
//! Every engine call returns exactly one [`Outcome`]. Outcomes are plain data
//! for a renderer: they carry the rolls and numbers behind each event and no
//! control flow of their own.

use serde::Serialize;

use super::attack::AttackReport;
use super::session::Side;
use super::CombatError;

/// One row of the turn order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitiativeEntry {
    /// Combatant name
    pub name: String,
    /// Which side the combatant fights on
    pub side: Side,
    /// The d20 face
    pub roll: u32,
    /// Initiative modifier
    pub modifier: i32,
    /// Face plus modifier
    pub total: i32,
}

/// Tag of an [`Outcome`], for matching without the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    CombatStart,
    TurnStart,
    AttackHit,
    AttackMiss,
    EnemyDefeated,
    PlayerDefeated,
    Victory,
    Fled,
    Info,
    Error,
}

/// What a single engine call produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    /// Initiative has been rolled and the fight begins
    CombatStart {
        turn_order: Vec<InitiativeEntry>,
        round: u32,
        first: String,
    },
    /// A player-controlled combatant must choose an action
    TurnStart {
        actor: String,
        round: u32,
        hp: u32,
        max_hp: u32,
        targets: Vec<String>,
    },
    /// An attack landed and the defender is still standing
    AttackHit { attack: AttackReport },
    /// An attack missed
    AttackMiss { attack: AttackReport },
    /// An attack dropped a hostile combatant to zero HP
    EnemyDefeated {
        attack: AttackReport,
        xp: u32,
        remaining: usize,
    },
    /// The last standing party member fell
    PlayerDefeated { attack: AttackReport, round: u32 },
    /// Every hostile combatant is down
    Victory {
        xp: u32,
        xp_each: u32,
        defeated: Vec<String>,
        survivors: Vec<String>,
        rounds: u32,
    },
    /// A party member ran, taking opportunity attacks on the way out
    Fled {
        actor: String,
        opportunity_attacks: Vec<AttackReport>,
        damage_taken: u32,
        message: String,
    },
    /// Informational message with no state change
    Info { message: String },
    /// The call was rejected and nothing changed
    Error { error: CombatError, message: String },
}

impl Outcome {
    /// Build an error outcome
    pub fn error(error: CombatError) -> Self {
        let message = error.to_string();
        Outcome::Error { error, message }
    }

    /// Build an informational outcome
    pub fn info(message: impl Into<String>) -> Self {
        Outcome::Info {
            message: message.into(),
        }
    }

    /// Build a hit or miss outcome from a report
    pub fn attack(attack: AttackReport) -> Self {
        if attack.hit {
            Outcome::AttackHit { attack }
        } else {
            Outcome::AttackMiss { attack }
        }
    }

    /// The tag of this outcome
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::CombatStart { .. } => OutcomeKind::CombatStart,
            Outcome::TurnStart { .. } => OutcomeKind::TurnStart,
            Outcome::AttackHit { .. } => OutcomeKind::AttackHit,
            Outcome::AttackMiss { .. } => OutcomeKind::AttackMiss,
            Outcome::EnemyDefeated { .. } => OutcomeKind::EnemyDefeated,
            Outcome::PlayerDefeated { .. } => OutcomeKind::PlayerDefeated,
            Outcome::Victory { .. } => OutcomeKind::Victory,
            Outcome::Fled { .. } => OutcomeKind::Fled,
            Outcome::Info { .. } => OutcomeKind::Info,
            Outcome::Error { .. } => OutcomeKind::Error,
        }
    }

    /// Whether the fight is over once this outcome has been rendered
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Outcome::Victory { .. } | Outcome::PlayerDefeated { .. } | Outcome::Fled { .. }
        )
    }

    /// Whether the call was rejected
    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error { .. })
    }

    /// The attack behind this outcome, if any
    pub fn attack_report(&self) -> Option<&AttackReport> {
        match self {
            Outcome::AttackHit { attack }
            | Outcome::AttackMiss { attack }
            | Outcome::EnemyDefeated { attack, .. }
            | Outcome::PlayerDefeated { attack, .. } => Some(attack),
            Outcome::CombatStart { .. }
            | Outcome::TurnStart { .. }
            | Outcome::Victory { .. }
            | Outcome::Fled { .. }
            | Outcome::Info { .. }
            | Outcome::Error { .. } => None,
        }
    }

    /// The rejection reason, if this is an error
    pub fn combat_error(&self) -> Option<&CombatError> {
        if let Outcome::Error { error, .. } = self {
            Some(error)
        } else {
            None
        }
    }
}
