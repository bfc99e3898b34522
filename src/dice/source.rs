//! Die sources
//!
//! Where individual die faces come from. Production code uses a seeded or
//! OS-seeded [`StdRng`]; tests and replays use [`ScriptedDice`].

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces one face of a die with the given number of sides
pub trait DieSource: Send {
    /// Roll a single die, returning a value in `[1, sides]`. `sides` is at least 1.
    fn roll_die(&mut self, sides: u32) -> u32;
}

impl DieSource for StdRng {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.random_range(1..=sides)
    }
}

/// Create an OS-seeded random source
pub fn entropy_source() -> StdRng {
    StdRng::from_os_rng()
}

/// Create a reproducible random source
pub fn seeded_source(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Replays a fixed sequence of die faces
///
/// Each face is clamped into `[1, sides]` of the die being rolled. Once the
/// script runs out it keeps returning the fallback face (1 by default).
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    faces: VecDeque<u32>,
    fallback: Option<u32>,
}

impl ScriptedDice {
    /// Create a script from faces in roll order
    pub fn new(faces: impl IntoIterator<Item = u32>) -> Self {
        Self {
            faces: faces.into_iter().collect(),
            fallback: None,
        }
    }

    /// Face to use after the script is exhausted
    pub fn with_fallback(mut self, face: u32) -> Self {
        self.fallback = Some(face);
        self
    }

    /// Faces not yet consumed
    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

impl DieSource for ScriptedDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        let face = self
            .faces
            .pop_front()
            .or(self.fallback)
            .unwrap_or(1);
        face.clamp(1, sides)
    }
}
