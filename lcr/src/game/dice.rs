//! Dice and the random sources that drive them.

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::constants::DICE_SIDES;

/// Face value of a single die, `1..=sides`.
pub type Face = u8;

/// Source of die faces.
///
/// The engine never touches a random generator directly so that tests and
/// replays can feed it exact faces.
pub trait DiceRoller: Send {
    fn roll(&mut self, sides: u8) -> Face;
}

/// Process-wide thread-local generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRoller;

impl DiceRoller for ThreadRoller {
    fn roll(&mut self, sides: u8) -> Face {
        rand::rng().random_range(1..=sides)
    }
}

/// Deterministic generator, useful for benchmarks and reproducible games.
#[derive(Debug)]
pub struct SeededRoller {
    rng: StdRng,
}

impl SeededRoller {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl DiceRoller for SeededRoller {
    fn roll(&mut self, sides: u8) -> Face {
        self.rng.random_range(1..=sides)
    }
}

/// Replays a fixed sequence of faces.
///
/// Once the sequence is exhausted every roll comes up 1, which moves no chips.
#[derive(Clone, Debug, Default)]
pub struct LoadedDice {
    faces: VecDeque<Face>,
}

impl LoadedDice {
    pub fn new(faces: impl IntoIterator<Item = Face>) -> Self {
        Self {
            faces: faces.into_iter().collect(),
        }
    }

    /// Faces not yet rolled.
    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

impl DiceRoller for LoadedDice {
    fn roll(&mut self, sides: u8) -> Face {
        self.faces.pop_front().unwrap_or(1).clamp(1, sides)
    }
}

/// The game's dice: fixed number of sides plus every face ever rolled.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Dice {
    sides: u8,
    rolls: Vec<Face>,
    /// Faces of the most recent turn.
    #[serde(default)]
    last_rolls: Vec<Face>,
}

impl Default for Dice {
    fn default() -> Self {
        Self::new()
    }
}

impl Dice {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sides: DICE_SIDES,
            rolls: Vec::new(),
            last_rolls: Vec::new(),
        }
    }

    pub fn sides(&self) -> u8 {
        self.sides
    }

    /// Every face rolled since the game started, oldest first.
    pub fn history(&self) -> &[Face] {
        &self.rolls
    }

    pub fn last_rolls(&self) -> &[Face] {
        &self.last_rolls
    }

    /// Roll `count` dice, append them to the history and return only the new
    /// faces. Rolling zero dice returns an empty vector and records nothing.
    pub fn roll(&mut self, count: usize, roller: &mut dyn DiceRoller) -> Vec<Face> {
        let faces: Vec<Face> = (0..count).map(|_| roller.roll(self.sides)).collect();
        self.rolls.extend_from_slice(&faces);
        faces
    }

    pub(crate) fn record_turn(&mut self, faces: &[Face]) {
        self.last_rolls = faces.to_vec();
    }
}
