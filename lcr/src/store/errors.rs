//! Persistence error types.

use thiserror::Error;

use crate::game::GameId;

/// Persistence errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Snapshot could not be encoded or decoded
    #[error("Snapshot encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// No snapshot stored under this key
    #[error("Game not found: {0}")]
    NotFound(GameId),

    /// The game was never inserted, so it has no key to save under
    #[error("Game has no id; insert it before saving")]
    Unsaved,
}

impl StoreError {
    /// Get a client-safe error message that doesn't leak storage details
    pub fn client_message(&self) -> String {
        match self {
            StoreError::Database(_) | StoreError::Encoding(_) | StoreError::Unsaved => {
                "Internal server error".to_string()
            }
            StoreError::NotFound(_) => "Game not found".to_string(),
        }
    }
}

/// Result type for persistence operations
pub type StoreResult<T> = Result<T, StoreError>;
