//! In-process snapshot store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{GameRepository, StoreError, StoreResult};
use crate::game::{Game, GameId, LobbyCode};

struct StoredGame {
    /// Insertion order, used to prefer newer games on lobby-code lookups.
    seq: u64,
    game: Game,
}

#[derive(Default)]
struct Inner {
    games: HashMap<GameId, StoredGame>,
    next_seq: u64,
}

/// Snapshot store held in memory. Snapshots are cloned in and out so callers
/// never share state with the store.
#[derive(Default)]
pub struct InMemoryGameRepository {
    inner: RwLock<Inner>,
}

impl InMemoryGameRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored games, finished or not.
    pub async fn len(&self) -> usize {
        self.inner.read().await.games.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl GameRepository for InMemoryGameRepository {
    async fn insert(&self, game: &mut Game) -> StoreResult<GameId> {
        let mut inner = self.inner.write().await;
        let mut id = GameId::generate();
        while inner.games.contains_key(&id) {
            id = GameId::generate();
        }
        game.id = Some(id.clone());

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.games.insert(
            id.clone(),
            StoredGame {
                seq,
                game: game.clone(),
            },
        );
        Ok(id)
    }

    async fn load(&self, id: &GameId) -> StoreResult<Game> {
        self.inner
            .read()
            .await
            .games
            .get(id)
            .map(|stored| stored.game.clone())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn save(&self, game: &Game) -> StoreResult<()> {
        let id = game.id.as_ref().ok_or(StoreError::Unsaved)?;
        let mut inner = self.inner.write().await;
        let stored = inner
            .games
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        stored.game = game.clone();
        Ok(())
    }

    async fn find_by_lobby_code(&self, code: &LobbyCode) -> StoreResult<Option<Game>> {
        let inner = self.inner.read().await;
        let found = inner
            .games
            .values()
            .filter(|stored| stored.game.lobby_code.as_ref() == Some(code))
            .max_by_key(|stored| (!stored.game.is_over(), stored.seq))
            .map(|stored| stored.game.clone());
        Ok(found)
    }

    async fn lobby_code_in_use(&self, code: &LobbyCode) -> StoreResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner
            .games
            .values()
            .any(|stored| !stored.game.is_over() && stored.game.lobby_code.as_ref() == Some(code)))
    }

    async fn list_open(&self) -> StoreResult<Vec<Game>> {
        let inner = self.inner.read().await;
        let mut open: Vec<&StoredGame> = inner
            .games
            .values()
            .filter(|stored| !stored.game.is_over())
            .collect();
        open.sort_by_key(|stored| stored.seq);
        Ok(open.into_iter().map(|stored| stored.game.clone()).collect())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
