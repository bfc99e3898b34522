//! The dice engine
//!
//! [`Dice`] rolls through an injectable [`DieSource`] and logs every public
//! roll into its own bounded [`RollHistory`]. All methods take `&self`, so one
//! engine can be shared (`Arc<Dice>`) between a combat session and any
//! diagnostics reader.

use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use super::history::{RollHistory, RollRecord, DEFAULT_HISTORY_CAPACITY};
use super::notation::{parse_dice, write_modifier, DiceRoll};
use super::source::{entropy_source, seeded_source, DieSource, ScriptedDice};
use super::DiceError;

/// Outcome of an ability check against a difficulty class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Check {
    /// The d20 face
    pub natural: u32,
    /// Modifier added to the face
    pub modifier: i32,
    /// Face plus modifier
    pub total: i32,
    /// Difficulty class to meet
    pub dc: i32,
    /// Whether total >= dc. A natural 20 or 1 does not override this.
    pub success: bool,
}

/// Dice engine with a bounded roll log
pub struct Dice {
    source: Mutex<Box<dyn DieSource>>,
    history: RollHistory,
}

impl std::fmt::Debug for Dice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dice")
            .field("history_size", &self.history.len())
            .field("history_capacity", &self.history.capacity())
            .finish()
    }
}

impl Default for Dice {
    fn default() -> Self {
        Self::new()
    }
}

impl Dice {
    /// Create an engine backed by an OS-seeded generator
    pub fn new() -> Self {
        Self::with_source(entropy_source(), DEFAULT_HISTORY_CAPACITY)
    }

    /// Create a reproducible engine
    pub fn seeded(seed: u64) -> Self {
        Self::with_source(seeded_source(seed), DEFAULT_HISTORY_CAPACITY)
    }

    /// Create an engine that replays the given faces in order
    pub fn scripted(faces: impl IntoIterator<Item = u32>) -> Self {
        Self::with_source(ScriptedDice::new(faces), DEFAULT_HISTORY_CAPACITY)
    }

    /// Create an engine from any die source and history capacity
    pub fn with_source(source: impl DieSource + 'static, history_capacity: usize) -> Self {
        Self {
            source: Mutex::new(Box::new(source)),
            history: RollHistory::new(history_capacity),
        }
    }

    /// Roll one die with `sides` sides
    pub fn roll(&self, sides: i32) -> Result<i32, DiceError> {
        let spec = to_spec(1, sides, 0)?;
        Ok(self.roll_spec(&spec)?.result)
    }

    /// Sum `count` dice with `sides` sides
    pub fn roll_multiple(&self, count: i32, sides: i32) -> Result<i32, DiceError> {
        let spec = to_spec(count, sides, 0)?;
        Ok(self.roll_spec(&spec)?.result)
    }

    /// Roll one die and add a modifier. Logged as e.g. "1d20+5" or "1d20-1".
    pub fn roll_with_modifier(&self, sides: i32, modifier: i32) -> Result<i32, DiceError> {
        let spec = to_spec(1, sides, modifier)?;
        Ok(self.roll_spec(&spec)?.result)
    }

    /// Parse dice notation and roll it
    ///
    /// Nothing is rolled or logged when the notation is rejected.
    pub fn parse(&self, notation: &str) -> Result<i32, DiceError> {
        let spec = parse_dice(notation)?;
        Ok(self.roll_spec(&spec)?.result)
    }

    /// Roll a parsed `DiceRoll`, returning the logged record
    pub fn roll_spec(&self, spec: &DiceRoll) -> Result<RollRecord, DiceError> {
        spec.validate()?;

        let faces = self.draw(spec.count, spec.sides);
        let sum: i64 = faces.iter().map(|&f| f as i64).sum();
        let result = (sum + spec.modifier as i64) as i32;

        let record = self.history.record(spec.to_string(), result, faces);
        debug!("rolled {} = {} {:?}", record.formula, record.result, record.dice);
        Ok(record)
    }

    /// Roll two d20s and keep the higher
    pub fn roll_with_advantage(&self) -> i32 {
        self.roll_pair("advantage", |a, b| a.max(b))
    }

    /// Roll two d20s and keep the lower
    pub fn roll_with_disadvantage(&self) -> i32 {
        self.roll_pair("disadvantage", |a, b| a.min(b))
    }

    /// Roll 1d20 + modifier against a DC, returning whether it succeeds
    pub fn check_against_dc(&self, modifier: i32, dc: i32) -> bool {
        self.check(modifier, dc).success
    }

    /// Roll 1d20 + modifier against a DC with full detail
    ///
    /// Natural 20s and 1s are annotated in the log but do not change the result.
    pub fn check(&self, modifier: i32, dc: i32) -> Check {
        let natural = self.draw(1, 20)[0];
        let total = (natural as i32).saturating_add(modifier);
        let success = total >= dc;

        let mut formula = String::from("1d20");
        // Writing into a String cannot fail
        let _ = write_modifier(&mut formula, modifier);
        formula.push_str(&format!(" vs DC {}", dc));
        match natural {
            20 => formula.push_str(" (natural 20)"),
            1 => formula.push_str(" (natural 1)"),
            _ => {}
        }

        let record = self.history.record(formula, total, vec![natural]);
        debug!(
            "check {} = {} ({})",
            record.formula,
            total,
            if success { "success" } else { "failure" }
        );

        Check {
            natural,
            modifier,
            total,
            dc,
            success,
        }
    }

    /// Most recent roll
    pub fn last_roll(&self) -> Option<RollRecord> {
        self.history.last()
    }

    /// The last `n` rolls, oldest first
    pub fn recent_rolls(&self, n: usize) -> Vec<RollRecord> {
        self.history.recent(n)
    }

    /// Forget all logged rolls
    pub fn clear_history(&self) {
        self.history.clear();
    }

    /// Number of rolls currently logged
    pub fn history_size(&self) -> usize {
        self.history.len()
    }

    /// Maximum number of rolls kept
    pub fn history_capacity(&self) -> usize {
        self.history.capacity()
    }

    fn roll_pair(&self, label: &str, keep: impl Fn(u32, u32) -> u32) -> i32 {
        let faces = self.draw(2, 20);
        let result = keep(faces[0], faces[1]) as i32;
        let record = self
            .history
            .record(format!("2d20 {}", label), result, faces);
        debug!("rolled {} = {} {:?}", record.formula, result, record.dice);
        result
    }

    fn draw(&self, count: u32, sides: u32) -> Vec<u32> {
        let mut source = self.source.lock();
        (0..count).map(|_| source.roll_die(sides)).collect()
    }
}

fn to_spec(count: i32, sides: i32, modifier: i32) -> Result<DiceRoll, DiceError> {
    if count < 1 || sides < 1 {
        return Err(DiceError::InvalidDie {
            count: count as i64,
            sides: sides as i64,
        });
    }
    Ok(DiceRoll::new(count as u32, sides as u32, modifier))
}
