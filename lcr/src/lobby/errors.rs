//! Lobby error types and their client-facing classification.

use serde::Serialize;
use thiserror::Error;

use crate::{
    game::{GameError, GameId, LobbyCode},
    store::StoreError,
};

/// Coarse error classes a transport maps onto its own status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    Forbidden,
    Unauthorized,
    UpstreamFailure,
}

/// Lobby and session errors
#[derive(Debug, Error)]
pub enum LobbyError {
    /// No game stored under this id
    #[error("Game not found: {0}")]
    GameNotFound(GameId),

    /// No game holds this lobby code
    #[error("No game with lobby code {0}")]
    LobbyNotFound(LobbyCode),

    /// No player with this name in the game
    #[error("No player named '{0}' in this game")]
    PlayerNotFound(String),

    /// Malformed request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Rejected by the engine
    #[error(transparent)]
    Game(#[from] GameError),

    /// Persistence failure
    #[error(transparent)]
    Store(StoreError),

    /// Every generated lobby code was already taken
    #[error("No free lobby code after {0} attempts")]
    CodeSpaceExhausted(usize),

    /// The game's session task is gone
    #[error("Session for game {0} is closed")]
    SessionClosed(GameId),
}

impl From<StoreError> for LobbyError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(id) => LobbyError::GameNotFound(id),
            other => LobbyError::Store(other),
        }
    }
}

impl LobbyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LobbyError::GameNotFound(_)
            | LobbyError::LobbyNotFound(_)
            | LobbyError::PlayerNotFound(_) => ErrorKind::NotFound,
            LobbyError::InvalidInput(_) => ErrorKind::InvalidInput,
            LobbyError::Game(e) => match e {
                GameError::EmptyRoster | GameError::InsufficientPlayers { .. } => {
                    ErrorKind::InvalidInput
                }
                GameError::GameOver | GameError::AlreadyStarted | GameError::RosterFrozen => {
                    ErrorKind::Forbidden
                }
                GameError::NoChipsToMove(_) | GameError::TurnLimitExceeded(_) => {
                    ErrorKind::UpstreamFailure
                }
            },
            LobbyError::Store(_)
            | LobbyError::CodeSpaceExhausted(_)
            | LobbyError::SessionClosed(_) => ErrorKind::UpstreamFailure,
        }
    }

    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Storage and session failures are reduced to a generic message.
    pub fn client_message(&self) -> String {
        match self {
            LobbyError::Store(e) => e.client_message(),
            LobbyError::SessionClosed(_) | LobbyError::CodeSpaceExhausted(_) => {
                "Internal server error".to_string()
            }
            LobbyError::Game(GameError::NoChipsToMove(_)) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for lobby operations
pub type LobbyResult<T> = Result<T, LobbyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_not_found_becomes_game_not_found() {
        let id = GameId::from("g1".to_string());
        let error = LobbyError::from(StoreError::NotFound(id.clone()));
        assert!(matches!(error, LobbyError::GameNotFound(ref found) if *found == id));
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_game_errors_classified() {
        let over = LobbyError::from(GameError::GameOver);
        assert_eq!(over.kind(), ErrorKind::Forbidden);

        let few = LobbyError::from(GameError::InsufficientPlayers {
            required: 3,
            actual: 2,
        });
        assert_eq!(few.kind(), ErrorKind::InvalidInput);
        assert_eq!(few.client_message(), "need 3+ players to start, have 2");
    }

    #[test]
    fn test_store_errors_are_sanitized() {
        let error = LobbyError::from(StoreError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(error.kind(), ErrorKind::UpstreamFailure);
        assert_eq!(error.client_message(), "Internal server error");
    }
}
