//! Left-Center-Right game engine.
//!
//! This module provides the core of the game:
//! - Dice with an append-only roll history and pluggable randomness
//! - Players and their chip ledger
//! - The `Lobby -> Active -> Over` state machine that resolves turns,
//!   feeds the pot, rotates the turn pointer and detects the winner

pub mod constants;
pub mod dice;
pub mod engine;
pub mod entities;

pub use dice::{Dice, DiceRoller, Face, LoadedDice, SeededRoller, ThreadRoller};
pub use engine::{Game, GameError, GamePhase, TurnSummary};
pub use entities::{ChipMove, Controller, GameId, LobbyCode, OwnerId, Player, PlayerId, Pot};
