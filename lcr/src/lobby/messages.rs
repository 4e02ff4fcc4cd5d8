//! Session actor message types.

use tokio::sync::oneshot;

use super::errors::LobbyResult;
use crate::game::{Game, OwnerId};

/// Reply channel carrying the committed snapshot or the reason nothing changed
pub type Reply = oneshot::Sender<LobbyResult<Game>>;

/// Commands a `GameSession` applies to its game, one at a time
#[derive(Debug)]
pub enum SessionMessage {
    /// Append a human player to the lobby
    Join {
        name: String,
        owner: OwnerId,
        response: Reply,
    },

    /// Mark one player ready by name
    SetReady { name: String, response: Reply },

    /// Append `count` bots to the lobby
    AddBots { count: usize, response: Reply },

    /// Mark every player ready
    SetAllReady { response: Reply },

    /// Start the game, optionally playing it to the end
    Start {
        auto_play: bool,
        max_turns: usize,
        response: Reply,
    },

    /// Play the current player's turn
    TakeTurn { response: Reply },
}
