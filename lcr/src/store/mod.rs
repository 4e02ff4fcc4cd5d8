//! Persistence gateway for game snapshots.
//!
//! Every game is stored as one whole snapshot keyed by its [`GameId`]; each
//! write replaces the previous snapshot. Two backends are provided:
//!
//! - [`InMemoryGameRepository`] for tests and single-process deployments
//! - [`PgGameRepository`] backed by a PostgreSQL `games` table
//!
//! Callers depend on the [`GameRepository`] trait only.

use async_trait::async_trait;

use crate::game::{Game, GameId, LobbyCode};

pub mod config;
pub mod errors;
pub mod memory;
pub mod postgres;

pub use config::DatabaseConfig;
pub use errors::{StoreError, StoreResult};
pub use memory::InMemoryGameRepository;
pub use postgres::{Database, PgGameRepository};

/// Storage operations the lobby layer needs
#[async_trait]
pub trait GameRepository: Send + Sync {
    /// Persist a new game under a fresh key, writing the key into `game.id`.
    async fn insert(&self, game: &mut Game) -> StoreResult<GameId>;

    /// Load the latest snapshot.
    ///
    /// Fails with `StoreError::NotFound` if nothing is stored under `id`.
    async fn load(&self, id: &GameId) -> StoreResult<Game>;

    /// Replace the snapshot stored under `game.id`.
    async fn save(&self, game: &Game) -> StoreResult<()>;

    /// Game holding `code`. Unfinished games win over finished ones, newer
    /// over older.
    async fn find_by_lobby_code(&self, code: &LobbyCode) -> StoreResult<Option<Game>>;

    /// Whether an unfinished game already holds `code`.
    async fn lobby_code_in_use(&self, code: &LobbyCode) -> StoreResult<bool>;

    /// Every game that is not over.
    async fn list_open(&self) -> StoreResult<Vec<Game>>;

    /// Check the backend is reachable
    async fn health_check(&self) -> StoreResult<()>;
}
