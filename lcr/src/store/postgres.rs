//! PostgreSQL snapshot store.

use async_trait::async_trait;
use sqlx::{
    Row,
    postgres::{PgPool, PgPoolOptions, PgRow},
};
use std::time::Duration;

use super::{DatabaseConfig, GameRepository, StoreError, StoreResult};
use crate::game::{Game, GameId, LobbyCode};

const CREATE_GAMES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS games (
    id          TEXT PRIMARY KEY,
    lobby_code  TEXT,
    game_over   BOOLEAN NOT NULL DEFAULT FALSE,
    snapshot    JSONB NOT NULL,
    created_at  TIMESTAMP NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMP NOT NULL DEFAULT NOW()
)
"#;

const CREATE_LOBBY_CODE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS games_lobby_code_idx ON games (lobby_code, game_over)";

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use lcr::store::{Database, DatabaseConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), sqlx::Error> {
    ///     let db = Database::new(&DatabaseConfig::development()).await?;
    ///     db.health_check().await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

/// `GameRepository` over a `games` table: one row per game, the full snapshot
/// as JSONB plus the columns the secondary lookups filter on.
pub struct PgGameRepository {
    pool: PgPool,
}

impl PgGameRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `games` table and its lobby-code index if missing.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(CREATE_GAMES_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_LOBBY_CODE_INDEX)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn decode(row: &PgRow) -> StoreResult<Game> {
        let snapshot: serde_json::Value = row.try_get("snapshot")?;
        Ok(serde_json::from_value(snapshot)?)
    }
}

#[async_trait]
impl GameRepository for PgGameRepository {
    async fn insert(&self, game: &mut Game) -> StoreResult<GameId> {
        let id = GameId::generate();
        game.id = Some(id.clone());
        let snapshot = serde_json::to_value(&*game)?;

        sqlx::query(
            "INSERT INTO games (id, lobby_code, game_over, snapshot) VALUES ($1, $2, $3, $4)",
        )
        .bind(id.as_str())
        .bind(game.lobby_code.as_ref().map(LobbyCode::as_str))
        .bind(game.is_over())
        .bind(snapshot)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn load(&self, id: &GameId) -> StoreResult<Game> {
        let row = sqlx::query("SELECT snapshot FROM games WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        Self::decode(&row)
    }

    async fn save(&self, game: &Game) -> StoreResult<()> {
        let id = game.id.as_ref().ok_or(StoreError::Unsaved)?;
        let snapshot = serde_json::to_value(game)?;

        let result = sqlx::query(
            "UPDATE games
             SET lobby_code = $2, game_over = $3, snapshot = $4, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id.as_str())
        .bind(game.lobby_code.as_ref().map(LobbyCode::as_str))
        .bind(game.is_over())
        .bind(snapshot)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn find_by_lobby_code(&self, code: &LobbyCode) -> StoreResult<Option<Game>> {
        let row = sqlx::query(
            "SELECT snapshot FROM games
             WHERE lobby_code = $1
             ORDER BY game_over ASC, created_at DESC
             LIMIT 1",
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::decode).transpose()
    }

    async fn lobby_code_in_use(&self, code: &LobbyCode) -> StoreResult<bool> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM games WHERE lobby_code = $1 AND NOT game_over) AS in_use",
        )
        .bind(code.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("in_use")?)
    }

    async fn list_open(&self) -> StoreResult<Vec<Game>> {
        let rows = sqlx::query(
            "SELECT snapshot FROM games WHERE NOT game_over ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::decode).collect()
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{OwnerId, Player};

    async fn repository() -> PgGameRepository {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://postgres@localhost/lcr_test".to_string());
        let db = Database::new(&DatabaseConfig::new(database_url))
            .await
            .expect("Failed to connect to database");
        let repo = PgGameRepository::new(db.pool().clone());
        repo.migrate().await.expect("Failed to create games table");
        repo
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a PostgreSQL instance"]
    async fn test_snapshot_round_trip() {
        let repo = repository().await;
        let players = ["A", "B", "C"]
            .into_iter()
            .map(|n| Player::human(n, OwnerId::new("owner")))
            .collect();
        let mut game = Game::new(players).unwrap();
        game.lobby_code = Some(LobbyCode::new("PGTST"));

        let id = repo.insert(&mut game).await.unwrap();
        game.start().unwrap();
        game.play_turn().unwrap();
        repo.save(&game).await.unwrap();

        assert_eq!(repo.load(&id).await.unwrap(), game);
        assert!(repo.lobby_code_in_use(&LobbyCode::new("pgtst")).await.unwrap());
        repo.health_check().await.unwrap();
    }
}
