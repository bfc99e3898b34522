//! Combat session state machine
//!
//! A session runs one encounter:
//! - `NotStarted` until [`CombatSession::start_combat`] rolls initiative
//! - `Active` while both sides have someone standing
//! - `Victory`, `Defeat` or `Fled` once it is over (terminal)
//!
//! Each call advances at most one step and returns one [`Outcome`]. Rejected
//! calls return [`Outcome::Error`] and change nothing. Defeated combatants
//! keep their place in the turn order and are skipped.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::attack::{resolve_attack, AttackProfile, AttackReport, CombatRules};
use super::initiative::{turn_order, InitiativeRoll};
use super::outcome::{InitiativeEntry, Outcome};
use super::CombatError;
use crate::combatant::{Combatant, Monster, PlayerCharacter};
use crate::dice::{Dice, DiceRoll};

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatStatus {
    /// Initiative not rolled yet
    NotStarted,
    /// Fight in progress
    Active,
    /// Every hostile combatant was defeated
    Victory,
    /// Every party member was defeated
    Defeat,
    /// A party member fled
    Fled,
}

impl CombatStatus {
    /// Whether the session can no longer change
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CombatStatus::Victory | CombatStatus::Defeat | CombatStatus::Fled
        )
    }
}

impl std::fmt::Display for CombatStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CombatStatus::NotStarted => "not started",
            CombatStatus::Active => "active",
            CombatStatus::Victory => "victory",
            CombatStatus::Defeat => "defeat",
            CombatStatus::Fled => "fled",
        };
        write!(f, "{}", s)
    }
}

/// Which side a combatant fights on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Player characters and their allies
    Party,
    /// Monsters
    Hostile,
}

impl Side {
    /// The other side
    pub fn opposing(self) -> Side {
        match self {
            Side::Party => Side::Hostile,
            Side::Hostile => Side::Party,
        }
    }
}

/// Actions a player can submit on their turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    /// Attack a living enemy
    Attack,
    /// Leave the fight, provoking opportunity attacks
    Flee,
}

impl FromStr for PlayerAction {
    type Err = CombatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "attack" => Ok(PlayerAction::Attack),
            "flee" => Ok(PlayerAction::Flee),
            _ => Err(CombatError::UnknownAction {
                action: s.to_string(),
            }),
        }
    }
}

/// HP view of one participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantState {
    pub name: String,
    pub side: Side,
    pub hp: u32,
    pub max_hp: u32,
}

/// Comparable copy of everything a session call can change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub status: CombatStatus,
    pub round: u32,
    pub current_index: usize,
    pub awaiting_input: bool,
    pub pending_outcome: bool,
    pub participants: Vec<ParticipantState>,
}

#[derive(Debug)]
struct Participant<'p> {
    combatant: Box<dyn Combatant + 'p>,
    side: Side,
    initiative: InitiativeRoll,
}

impl Participant<'_> {
    fn is_alive(&self) -> bool {
        !self.combatant.is_defeated()
    }

    fn name(&self) -> &str {
        self.combatant.name()
    }
}

/// One encounter, advanced by a single driver
///
/// The session borrows player characters for `'p` so their HP and XP carry
/// over once it is dropped. Monsters are owned and dropped with the session.
#[derive(Debug)]
pub struct CombatSession<'p> {
    id: Uuid,
    dice: Arc<Dice>,
    rules: CombatRules,
    participants: Vec<Participant<'p>>,
    current_index: usize,
    round: u32,
    status: CombatStatus,
    /// TurnStart already emitted for the current actor
    awaiting_input: bool,
    /// Terminal outcome to hand out on the next `execute_turn`
    pending: Option<Outcome>,
}

impl<'p> CombatSession<'p> {
    /// Create a session that rolls through `dice`
    pub fn new(dice: Arc<Dice>) -> Self {
        Self {
            id: Uuid::new_v4(),
            dice,
            rules: CombatRules::default(),
            participants: Vec::new(),
            current_index: 0,
            round: 1,
            status: CombatStatus::NotStarted,
            awaiting_input: false,
            pending: None,
        }
    }

    /// Use house rules for attack rolls
    pub fn with_rules(mut self, rules: CombatRules) -> Self {
        self.rules = rules;
        self
    }

    /// Session ID, used in log lines
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current status
    pub fn status(&self) -> CombatStatus {
        self.status
    }

    /// Current round, starting at 1
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Index of the acting combatant in the turn order
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The dice engine this session rolls with
    pub fn dice(&self) -> &Arc<Dice> {
        &self.dice
    }

    /// House rules in effect
    pub fn rules(&self) -> &CombatRules {
        &self.rules
    }

    /// The combatant whose turn it is, while the fight is active
    pub fn current_actor(&self) -> Option<&(dyn Combatant + 'p)> {
        if self.status != CombatStatus::Active {
            return None;
        }
        self.participants
            .get(self.current_index)
            .map(|p| p.combatant.as_ref())
    }

    /// Whether the session is waiting on `player_turn`
    pub fn is_players_turn(&self) -> bool {
        self.current_actor()
            .is_some_and(|actor| !actor.is_automated() && !actor.is_defeated())
    }

    /// Terminal, with every outcome handed out
    pub fn is_resolved(&self) -> bool {
        self.status.is_terminal() && self.pending.is_none()
    }

    /// Combatants in turn order with their sides
    pub fn participants(&self) -> impl Iterator<Item = (&(dyn Combatant + 'p), Side)> + '_ {
        self.participants
            .iter()
            .map(|p| (p.combatant.as_ref(), p.side))
    }

    /// Turn order with initiative rolls
    pub fn turn_order(&self) -> Vec<InitiativeEntry> {
        self.participants
            .iter()
            .map(|p| InitiativeEntry {
                name: p.name().to_string(),
                side: p.side,
                roll: p.initiative.natural,
                modifier: p.initiative.modifier,
                total: p.initiative.total,
            })
            .collect()
    }

    /// Names of living combatants on a side, in turn order
    pub fn living(&self, side: Side) -> Vec<String> {
        self.living_indices(side)
            .into_iter()
            .map(|i| self.participants[i].name().to_string())
            .collect()
    }

    /// Copy of all mutable session state
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            round: self.round,
            current_index: self.current_index,
            awaiting_input: self.awaiting_input,
            pending_outcome: self.pending.is_some(),
            participants: self
                .participants
                .iter()
                .map(|p| ParticipantState {
                    name: p.name().to_string(),
                    side: p.side,
                    hp: p.combatant.current_hp(),
                    max_hp: p.combatant.max_hp(),
                })
                .collect(),
        }
    }

    /// Start a fight between one player character and a group of monsters
    ///
    /// The player stays borrowed for the session's lifetime, even when the
    /// start is rejected. To retry with a corrected roster, drop this session
    /// and build a new one.
    pub fn start_combat(&mut self, player: &'p mut PlayerCharacter, enemies: Vec<Monster>) -> Outcome {
        let party: Vec<Box<dyn Combatant + 'p>> = vec![Box::new(player)];
        let hostiles = enemies
            .into_iter()
            .map(|m| Box::new(m) as Box<dyn Combatant + 'p>)
            .collect();
        self.start_party(party, hostiles)
    }

    /// Start a fight between any party and any hostiles
    ///
    /// Party members are listed before hostiles for the input-order tie-break.
    pub fn start_party(
        &mut self,
        party: Vec<Box<dyn Combatant + 'p>>,
        hostiles: Vec<Box<dyn Combatant + 'p>>,
    ) -> Outcome {
        if self.status != CombatStatus::NotStarted {
            return self.reject(CombatError::AlreadyStarted);
        }
        if hostiles.iter().all(|c| c.is_defeated()) {
            return self.reject(CombatError::EmptyEncounter);
        }
        if party.iter().all(|c| c.is_defeated()) {
            return self.reject(CombatError::EmptyParty);
        }
        let mut seen = HashSet::new();
        for combatant in party.iter().chain(hostiles.iter()) {
            if !seen.insert(combatant.name().trim().to_lowercase()) {
                return self.reject(CombatError::DuplicateName {
                    name: combatant.name().to_string(),
                });
            }
        }
        for combatant in party.iter().chain(hostiles.iter()) {
            if let Err(e) = AttackProfile::of(&**combatant) {
                return self.reject(e);
            }
        }

        let entrants: Vec<(Box<dyn Combatant + 'p>, Side)> = party
            .into_iter()
            .map(|c| (c, Side::Party))
            .chain(hostiles.into_iter().map(|c| (c, Side::Hostile)))
            .collect();

        let mut rolls = Vec::with_capacity(entrants.len());
        for (combatant, _) in &entrants {
            let modifier = combatant.initiative_modifier();
            match self.dice.roll_spec(&DiceRoll::new(1, 20, modifier)) {
                Ok(record) => {
                    let natural = record.dice.first().copied().unwrap_or(1);
                    rolls.push(InitiativeRoll::new(natural, modifier));
                }
                Err(e) => {
                    return self.reject(CombatError::InvariantViolation {
                        detail: format!("initiative roll for {} failed: {}", combatant.name(), e),
                    })
                }
            }
        }

        let order = turn_order(&rolls);
        let mut slots: Vec<Option<Participant<'p>>> = entrants
            .into_iter()
            .zip(rolls)
            .map(|((combatant, side), initiative)| {
                Some(Participant {
                    combatant,
                    side,
                    initiative,
                })
            })
            .collect();
        self.participants = order.iter().filter_map(|&i| slots[i].take()).collect();

        self.status = CombatStatus::Active;
        self.round = 1;
        self.current_index = 0;
        self.awaiting_input = false;
        if let Err(e) = self.settle() {
            return self.reject(e);
        }

        let turn_order = self.turn_order();
        info!(
            "combat {} started: {}",
            self.id,
            turn_order
                .iter()
                .map(|e| format!("{} ({})", e.name, e.total))
                .collect::<Vec<_>>()
                .join(", ")
        );

        Outcome::CombatStart {
            turn_order,
            round: self.round,
            first: self.participants[self.current_index].name().to_string(),
        }
    }

    /// Advance one step
    ///
    /// Automated combatants act immediately. A player-controlled combatant
    /// gets a `TurnStart` and the session waits for [`player_turn`].
    ///
    /// [`player_turn`]: CombatSession::player_turn
    pub fn execute_turn(&mut self) -> Outcome {
        if let Some(outcome) = self.pending.take() {
            return outcome;
        }
        if self.status != CombatStatus::Active {
            return self.reject(CombatError::NotActive {
                status: self.status,
            });
        }
        if let Err(e) = self.settle() {
            return self.reject(e);
        }

        let idx = self.current_index;
        let actor = &self.participants[idx];
        let side = actor.side;

        if !actor.combatant.is_automated() {
            let name = actor.name().to_string();
            if self.awaiting_input {
                return Outcome::info(format!("Waiting for {} to act", name));
            }

            let hp = actor.combatant.current_hp();
            let max_hp = actor.combatant.max_hp();
            self.awaiting_input = true;
            debug!("combat {}: {}'s turn (round {})", self.id, name, self.round);

            return Outcome::TurnStart {
                actor: name,
                round: self.round,
                hp,
                max_hp,
                targets: self.living(side.opposing()),
            };
        }

        let Some(target) = self.weakest_living(side.opposing()) else {
            return self.reject(CombatError::InvariantViolation {
                detail: format!("{} has no one left to attack", self.participants[idx].name()),
            });
        };
        self.attack(idx, target)
    }

    /// Resolve a player's action on their turn
    ///
    /// `action` is "attack" or "flee" (case-insensitive). An attack with no
    /// target goes to the only living enemy when there is exactly one.
    pub fn player_turn(&mut self, action: &str, target: Option<&str>) -> Outcome {
        if self.status != CombatStatus::Active {
            return self.reject(CombatError::NotActive {
                status: self.status,
            });
        }

        let idx = self.current_index;
        let Some(actor) = self.participants.get(idx) else {
            return self.reject(CombatError::InvariantViolation {
                detail: format!("turn index {} out of range", idx),
            });
        };
        if actor.combatant.is_automated() {
            return self.reject(CombatError::NotPlayersTurn {
                actor: actor.name().to_string(),
            });
        }
        if !actor.is_alive() {
            return self.reject(CombatError::InvariantViolation {
                detail: format!("defeated {} holds the turn", actor.name()),
            });
        }
        let side = actor.side;

        let action = match action.parse::<PlayerAction>() {
            Ok(action) => action,
            Err(e) => return self.reject(e),
        };

        match action {
            PlayerAction::Attack => match self.resolve_target(side.opposing(), target) {
                Ok(defender) => self.attack(idx, defender),
                Err(e) => self.reject(e),
            },
            PlayerAction::Flee => self.flee(idx),
        }
    }

    fn attack(&mut self, attacker: usize, defender: usize) -> Outcome {
        let profile = match AttackProfile::of(self.participants[attacker].combatant.as_ref()) {
            Ok(profile) => profile,
            Err(e) => return self.reject(e),
        };

        let report = match resolve_attack(
            &self.dice,
            &self.rules,
            &profile,
            self.participants[defender].combatant.as_mut(),
        ) {
            Ok(report) => report,
            Err(e) => return self.reject(e),
        };

        let outcome = self.judge_attack(defender, report);
        if self.status == CombatStatus::Active {
            if let Err(e) = self.advance() {
                return self.reject(e);
            }
        }
        outcome
    }

    fn judge_attack(&mut self, defender: usize, report: AttackReport) -> Outcome {
        if !report.defender_defeated() {
            return Outcome::attack(report);
        }

        match self.participants[defender].side {
            Side::Hostile => {
                let xp = self.participants[defender].combatant.xp_award();
                let remaining = self.living_indices(Side::Hostile).len();
                info!("combat {}: {} defeated by {}", self.id, report.defender, report.attacker);
                if remaining == 0 {
                    let victory = self.conclude_victory();
                    self.pending = Some(victory);
                }
                Outcome::EnemyDefeated {
                    attack: report,
                    xp,
                    remaining,
                }
            }
            Side::Party => {
                if !self.living_indices(Side::Party).is_empty() {
                    info!("combat {}: {} is down", self.id, report.defender);
                    return Outcome::attack(report);
                }
                self.status = CombatStatus::Defeat;
                self.awaiting_input = false;
                info!(
                    "combat {} lost in round {}: {} fell to {}",
                    self.id, self.round, report.defender, report.attacker
                );
                Outcome::PlayerDefeated {
                    attack: report,
                    round: self.round,
                }
            }
        }
    }

    fn conclude_victory(&mut self) -> Outcome {
        let hostiles = self.indices(Side::Hostile);
        let defeated: Vec<String> = hostiles
            .iter()
            .filter(|&&i| !self.participants[i].is_alive())
            .map(|&i| self.participants[i].name().to_string())
            .collect();
        let xp = hostiles
            .iter()
            .filter(|&&i| !self.participants[i].is_alive())
            .map(|&i| self.participants[i].combatant.xp_award())
            .fold(0u32, u32::saturating_add);

        let survivors = self.living_indices(Side::Party);
        let xp_each = match survivors.len() {
            0 => 0,
            n => xp / n as u32,
        };
        for &i in &survivors {
            self.participants[i].combatant.award_xp(xp_each);
        }

        self.status = CombatStatus::Victory;
        self.awaiting_input = false;
        info!(
            "combat {} won in round {}: {} XP ({} each)",
            self.id, self.round, xp, xp_each
        );

        Outcome::Victory {
            xp,
            xp_each,
            defeated,
            survivors: survivors
                .iter()
                .map(|&i| self.participants[i].name().to_string())
                .collect(),
            rounds: self.round,
        }
    }

    fn flee(&mut self, runner: usize) -> Outcome {
        let side = self.participants[runner].side;
        let mut profiles = Vec::new();
        for i in self.living_indices(side.opposing()) {
            match AttackProfile::of(self.participants[i].combatant.as_ref()) {
                Ok(profile) => profiles.push(profile),
                Err(e) => return self.reject(e),
            }
        }

        let mut attacks = Vec::with_capacity(profiles.len());
        for profile in &profiles {
            match resolve_attack(
                &self.dice,
                &self.rules,
                profile,
                self.participants[runner].combatant.as_mut(),
            ) {
                Ok(report) => attacks.push(report),
                Err(e) => warn!("combat {}: opportunity attack skipped: {}", self.id, e),
            }
        }

        let actor = self.participants[runner].name().to_string();
        let damage_taken: u32 = attacks.iter().map(|a| a.damage).sum();
        let collapsed = !self.participants[runner].is_alive();

        let mut message = if attacks.is_empty() {
            format!("{} escapes unopposed", actor)
        } else {
            let parts: Vec<String> = attacks
                .iter()
                .map(|a| {
                    if a.hit {
                        format!("{} hits for {}", a.attacker, a.damage)
                    } else {
                        format!("{} misses", a.attacker)
                    }
                })
                .collect();
            format!(
                "{} flees: {} ({} damage taken)",
                actor,
                parts.join(", "),
                damage_taken
            )
        };
        if collapsed {
            message.push_str(&format!("; {} collapses after escaping", actor));
        }

        self.status = CombatStatus::Fled;
        self.awaiting_input = false;
        info!("combat {}: {}", self.id, message);

        Outcome::Fled {
            actor,
            opportunity_attacks: attacks,
            damage_taken,
            message,
        }
    }

    fn resolve_target(&self, side: Side, target: Option<&str>) -> Result<usize, CombatError> {
        let living = self.living_indices(side);
        let names = |indices: &[usize]| -> Vec<String> {
            indices
                .iter()
                .map(|&i| self.participants[i].name().to_string())
                .collect()
        };

        let Some(wanted) = target.map(str::trim).filter(|t| !t.is_empty()) else {
            return match living.as_slice() {
                [only] => Ok(*only),
                _ => Err(CombatError::MissingTarget {
                    candidates: names(&living),
                }),
            };
        };

        let wanted_lower = wanted.to_lowercase();
        let exact: Vec<usize> = living
            .iter()
            .copied()
            .filter(|&i| self.participants[i].name().to_lowercase() == wanted_lower)
            .collect();
        let matches = if exact.is_empty() {
            living
                .iter()
                .copied()
                .filter(|&i| {
                    self.participants[i]
                        .name()
                        .to_lowercase()
                        .starts_with(&wanted_lower)
                })
                .collect()
        } else {
            exact
        };

        match matches.as_slice() {
            [only] => Ok(*only),
            [] => Err(CombatError::TargetNotFound {
                target: wanted.to_string(),
            }),
            many => Err(CombatError::AmbiguousTarget {
                target: wanted.to_string(),
                matches: names(many),
            }),
        }
    }

    /// Living combatant on `side` with the lowest HP; ties go to the earlier turn
    fn weakest_living(&self, side: Side) -> Option<usize> {
        self.living_indices(side)
            .into_iter()
            .min_by_key(|&i| self.participants[i].combatant.current_hp())
    }

    fn indices(&self, side: Side) -> Vec<usize> {
        (0..self.participants.len())
            .filter(|&i| self.participants[i].side == side)
            .collect()
    }

    fn living_indices(&self, side: Side) -> Vec<usize> {
        (0..self.participants.len())
            .filter(|&i| self.participants[i].side == side && self.participants[i].is_alive())
            .collect()
    }

    /// Move past the current actor to the next living one
    fn advance(&mut self) -> Result<(), CombatError> {
        self.step();
        self.settle()
    }

    /// Skip defeated combatants until a living one holds the turn
    fn settle(&mut self) -> Result<(), CombatError> {
        for _ in 0..=self.participants.len() {
            let alive = match self.participants.get(self.current_index) {
                Some(p) => p.is_alive(),
                None => break,
            };
            if alive {
                return Ok(());
            }
            self.step();
        }
        Err(CombatError::InvariantViolation {
            detail: "no living combatant holds the turn".to_string(),
        })
    }

    fn step(&mut self) {
        self.awaiting_input = false;
        self.current_index += 1;
        if self.current_index >= self.participants.len() {
            self.current_index = 0;
            self.round += 1;
            debug!("combat {}: round {} begins", self.id, self.round);
        }
    }

    fn reject(&self, error: CombatError) -> Outcome {
        if error.is_invariant_violation() {
            warn!("combat {}: invariant violation: {}", self.id, error);
        } else {
            warn!("combat {}: rejected: {}", self.id, error);
        }
        Outcome::error(error)
    }
}
