//! Fixed rules of Left-Center-Right.

/// Every die has six faces.
pub const DICE_SIDES: u8 = 6;

/// Chips each player holds when a game is created or started.
pub const STARTING_CHIPS: u32 = 3;

/// A player never rolls more dice than this, however many chips they hold.
pub const MAX_DICE_PER_TURN: u32 = 3;

/// Minimum roster size for a game to leave the lobby.
pub const MIN_PLAYERS: usize = 3;

/// Turn ceiling for automated play.
pub const DEFAULT_MAX_AUTO_TURNS: usize = 10_000;
