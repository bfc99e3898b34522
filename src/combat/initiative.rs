//! Initiative
//!
//! Each combatant rolls 1d20 + initiative modifier once at the start of a
//! fight. Turn order is highest total first; ties go to the higher modifier,
//! then to whoever was listed first.

use std::cmp::Reverse;

use serde::Serialize;

/// One combatant's initiative roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InitiativeRoll {
    /// The d20 face
    pub natural: u32,
    /// Initiative modifier
    pub modifier: i32,
    /// Face plus modifier
    pub total: i32,
}

impl InitiativeRoll {
    /// Combine a d20 face with a modifier
    pub fn new(natural: u32, modifier: i32) -> Self {
        Self {
            natural,
            modifier,
            total: natural as i32 + modifier,
        }
    }
}

/// Indices of `rolls` in turn order
///
/// The sort is stable, so combatants tied on both total and modifier keep
/// their input order.
pub fn turn_order(rolls: &[InitiativeRoll]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..rolls.len()).collect();
    order.sort_by_key(|&i| (Reverse(rolls[i].total), Reverse(rolls[i].modifier)));
    order
}
