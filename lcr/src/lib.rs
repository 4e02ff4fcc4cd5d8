//! # LCR
//!
//! Left-Center-Right: a multiplayer dice game where every player starts with
//! three chips and rolls one die per chip (at most three) on their turn.
//! A 4 passes a chip left, a 5 drops one in the pot, a 6 passes one right;
//! the last player holding chips wins.
//!
//! The game runs as a small state machine with three phases:
//!
//! - **Lobby**: players join, get ready, bots can be added
//! - **Active**: turns rotate through the frozen roster
//! - **Over**: one player holds every chip still in play
//!
//! ## Core Modules
//!
//! - [`game`]: dice, players and the turn-resolution engine
//! - [`lobby`]: lobby codes, game creation and one session actor per game
//! - [`store`]: snapshot persistence (in-memory or PostgreSQL)
//! - [`auth`]: bearer-token verification
//!
//! ## Example
//!
//! ```
//! use lcr::game::{Game, LoadedDice, OwnerId, Player};
//!
//! let players = ["Ann", "Bo", "Cy"]
//!     .into_iter()
//!     .map(|name| Player::human(name, OwnerId::new("uid-1")))
//!     .collect();
//! let mut game = Game::new(players).unwrap();
//! game.start().unwrap();
//!
//! // Ann rolls a 4, a 5 and a 6: one chip left, one to the pot, one right
//! game.play_turn_with(&mut LoadedDice::new([4, 5, 6])).unwrap();
//! assert_eq!(game.pot(), 1);
//! assert_eq!(game.players()[0].chips, 0);
//! ```

/// Bearer-token verification.
pub mod auth;

/// Core game logic, entities, and state machine.
pub mod game;
pub use game::{
    Game, GameError, GamePhase,
    constants::{self, MIN_PLAYERS, STARTING_CHIPS},
    entities::{self, GameId, LobbyCode, OwnerId, Player, PlayerId},
};

/// Lobby codes, game sessions and the manager that routes to them.
pub mod lobby;
pub use lobby::{ErrorKind, LobbyConfig, LobbyError, LobbyManager};

/// Snapshot persistence.
pub mod store;
pub use store::{GameRepository, InMemoryGameRepository, PgGameRepository};
