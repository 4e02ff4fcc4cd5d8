//! Lobby manager: game creation, lobby-code resolution and session lifecycle.

use rand::Rng;
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};
use tokio::sync::{Mutex, RwLock};

use super::{
    code::{MAX_CODE_ATTEMPTS, generate_lobby_code},
    config::LobbyConfig,
    errors::{LobbyError, LobbyResult},
    messages::{Reply, SessionMessage},
    session::{GameSession, SessionHandle},
};
use crate::{
    game::{Game, GameError, GameId, LobbyCode, OwnerId, Player},
    store::{GameRepository, InMemoryGameRepository, StoreError},
};

/// Result of creating a game
#[derive(Debug, Clone)]
pub struct CreatedGame {
    pub game_id: GameId,
    pub lobby_code: LobbyCode,
    pub creator: Player,
}

/// Entry point for every lobby and game operation.
///
/// Mutations are routed to the game's [`GameSession`], spawned on first use
/// and retired once the game is over. Queries read the store directly.
pub struct LobbyManager {
    /// Snapshot store
    repository: Arc<dyn GameRepository>,

    /// Lobby configuration
    config: LobbyConfig,

    /// Running sessions
    sessions: Arc<RwLock<HashMap<GameId, SessionHandle>>>,

    /// Serializes lobby-code allocation with the insert that claims it
    creation_lock: Mutex<()>,
}

impl LobbyManager {
    pub fn new(repository: Arc<dyn GameRepository>, config: LobbyConfig) -> Self {
        Self {
            repository,
            config,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            creation_lock: Mutex::new(()),
        }
    }

    /// Manager over a fresh in-memory store.
    pub fn in_memory(config: LobbyConfig) -> Self {
        Self::new(Arc::new(InMemoryGameRepository::new()), config)
    }

    /// Create a game owned by `creator` and give it a lobby code.
    ///
    /// # Errors
    ///
    /// - `LobbyError::InvalidInput` if `names` is empty or holds a blank name
    /// - `LobbyError::CodeSpaceExhausted` if no free lobby code was found
    pub async fn create_game(
        &self,
        names: Vec<String>,
        creator: OwnerId,
    ) -> LobbyResult<CreatedGame> {
        if names.is_empty() {
            return Err(LobbyError::InvalidInput(
                "at least one player is required".to_string(),
            ));
        }
        if names.iter().any(|name| name.trim().is_empty()) {
            return Err(LobbyError::InvalidInput(
                "player names must not be empty".to_string(),
            ));
        }

        let players = names
            .into_iter()
            .map(|name| Player::human(name, creator.clone()))
            .collect();
        let mut game = Game::new(players)?;

        let guard = self.creation_lock.lock().await;
        let lobby_code = self.allocate_lobby_code().await?;
        game.lobby_code = Some(lobby_code.clone());
        let game_id = self.repository.insert(&mut game).await?;
        drop(guard);

        let creator = game.creator().cloned().ok_or(GameError::EmptyRoster)?;

        log::info!(
            "Game {} created by {} with lobby code {} ({} players)",
            game_id,
            creator.controller.owner().map_or("<none>", OwnerId::as_str),
            lobby_code,
            game.players().len()
        );

        Ok(CreatedGame {
            game_id,
            lobby_code,
            creator,
        })
    }

    /// Add a human player to the lobby behind `code`.
    pub async fn join_game(
        &self,
        code: &LobbyCode,
        name: String,
        joiner: OwnerId,
    ) -> LobbyResult<Game> {
        let id = self.game_id_by_lobby_code(code).await?;
        if name.trim().is_empty() {
            return Err(LobbyError::InvalidInput(
                "player name must not be empty".to_string(),
            ));
        }

        self.dispatch(&id, |response| SessionMessage::Join {
            name: name.clone(),
            owner: joiner.clone(),
            response,
        })
        .await
    }

    /// Mark the first player called `name` ready.
    pub async fn set_player_ready(&self, code: &LobbyCode, name: String) -> LobbyResult<Game> {
        let id = self.game_id_by_lobby_code(code).await?;
        self.dispatch(&id, |response| SessionMessage::SetReady {
            name: name.clone(),
            response,
        })
        .await
    }

    /// Add a random number of bots, within the configured range.
    pub async fn add_bots(&self, code: &LobbyCode) -> LobbyResult<Game> {
        let count = rand::rng().random_range(self.config.min_bots..=self.config.max_bots);
        let id = self.game_id_by_lobby_code(code).await?;
        let game = self
            .dispatch(&id, |response| SessionMessage::AddBots { count, response })
            .await?;

        log::info!("Added {} bots to game {}", count, id);
        Ok(game)
    }

    /// Mark every player ready, humans included.
    pub async fn set_bots_ready(&self, code: &LobbyCode) -> LobbyResult<Game> {
        let id = self.game_id_by_lobby_code(code).await?;
        self.dispatch(&id, |response| SessionMessage::SetAllReady { response })
            .await
    }

    /// Start the game behind `code`, playing it to the end when
    /// `auto_play_on_start` is set.
    pub async fn start_game(&self, code: &LobbyCode) -> LobbyResult<Game> {
        let id = self.game_id_by_lobby_code(code).await?;
        let game = self
            .dispatch(&id, |response| SessionMessage::Start {
                auto_play: self.config.auto_play_on_start,
                max_turns: self.config.max_auto_turns,
                response,
            })
            .await?;

        log::info!(
            "Game {} started with {} players",
            id,
            game.players().len()
        );
        Ok(game)
    }

    /// Play one turn of game `id`.
    pub async fn take_turn(&self, id: &GameId) -> LobbyResult<Game> {
        let game = self
            .dispatch(id, |response| SessionMessage::TakeTurn { response })
            .await?;

        if let Some(winner) = game.winner() {
            log::info!("Game {} over: '{}' wins", id, winner.name());
        }
        Ok(game)
    }

    /// Latest stored snapshot of game `id`.
    pub async fn get_game(&self, id: &GameId) -> LobbyResult<Game> {
        Ok(self.repository.load(id).await?)
    }

    /// Every game that is not over, keyed by id.
    pub async fn available_games(&self) -> LobbyResult<BTreeMap<GameId, Game>> {
        let games = self.repository.list_open().await?;
        Ok(games
            .into_iter()
            .filter_map(|game| game.id.clone().map(|id| (id, game)))
            .collect())
    }

    /// Id of the game behind `code`.
    pub async fn game_id_by_lobby_code(&self, code: &LobbyCode) -> LobbyResult<GameId> {
        let game = self.find_by_code(code).await?;
        Ok(game.id.ok_or(StoreError::Unsaved)?)
    }

    /// Number of live sessions.
    pub async fn active_session_count(&self) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .filter(|handle| !handle.is_closed())
            .count()
    }

    /// Check the store is reachable
    pub async fn health_check(&self) -> LobbyResult<()> {
        Ok(self.repository.health_check().await?)
    }

    async fn allocate_lobby_code(&self) -> LobbyResult<LobbyCode> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_lobby_code();
            if !self.repository.lobby_code_in_use(&code).await? {
                return Ok(code);
            }
            log::warn!("Lobby code {} already in use, regenerating", code);
        }

        log::error!(
            "No free lobby code after {} attempts",
            MAX_CODE_ATTEMPTS
        );
        Err(LobbyError::CodeSpaceExhausted(MAX_CODE_ATTEMPTS))
    }

    async fn find_by_code(&self, code: &LobbyCode) -> LobbyResult<Game> {
        self.repository
            .find_by_lobby_code(code)
            .await?
            .ok_or_else(|| LobbyError::LobbyNotFound(code.clone()))
    }

    /// Send a command to the session of game `id` and wait for its reply.
    ///
    /// A session stops taking commands once its game is over, so a send that
    /// races its shutdown is retried once on a fresh session. Handles of
    /// finished games are dropped from the map.
    async fn dispatch<F>(&self, id: &GameId, build: F) -> LobbyResult<Game>
    where
        F: Fn(Reply) -> SessionMessage,
    {
        let result = match self.session(id).await?.request(&build).await {
            // `session` replaces the closed handle
            Err(LobbyError::SessionClosed(_)) => self.session(id).await?.request(&build).await,
            other => other,
        };

        let finished = match &result {
            Ok(game) => game.is_over(),
            Err(LobbyError::Game(e)) => *e == GameError::GameOver,
            Err(_) => false,
        };
        if finished {
            self.retire(id).await;
        }
        result
    }

    async fn retire(&self, id: &GameId) {
        if self.sessions.write().await.remove(id).is_some() {
            log::debug!("Retired session for game {}", id);
        }
    }

    /// Handle of the running session for `id`, spawning one from the stored
    /// snapshot if none is running.
    async fn session(&self, id: &GameId) -> LobbyResult<SessionHandle> {
        let running = self
            .sessions
            .read()
            .await
            .get(id)
            .filter(|handle| !handle.is_closed())
            .cloned();
        if let Some(handle) = running {
            return Ok(handle);
        }

        let mut sessions = self.sessions.write().await;
        if let Some(handle) = sessions.get(id).filter(|handle| !handle.is_closed()) {
            return Ok(handle.clone());
        }

        let game = self.repository.load(id).await?;
        let (session, handle) = GameSession::new(game, self.repository.clone())?;
        sessions.insert(id.clone(), handle.clone());
        drop(sessions);

        tokio::spawn(async move {
            session.run().await;
        });

        log::debug!("Spawned session for game {}", id);
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn manager() -> LobbyManager {
        LobbyManager::in_memory(LobbyConfig::default())
    }

    #[tokio::test]
    async fn test_create_game_assigns_code_and_creator() {
        let lobby = manager();
        let created = lobby
            .create_game(names(&["A", "B", "C"]), OwnerId::new("uid"))
            .await
            .unwrap();

        assert_eq!(created.creator.name(), "A");
        assert_eq!(created.lobby_code.as_str().len(), 5);

        let game = lobby.get_game(&created.game_id).await.unwrap();
        assert_eq!(game.lobby_code.as_ref(), Some(&created.lobby_code));
        assert!(game.players().iter().all(|p| p.chips == 3 && !p.lobby_ready));
        assert!(
            game.players()
                .iter()
                .all(|p| p.controller.owner() == Some(&OwnerId::new("uid")))
        );
        assert_eq!(lobby.active_session_count().await, 0);
    }

    #[tokio::test]
    async fn test_create_game_rejects_bad_rosters() {
        let lobby = manager();
        let empty = lobby.create_game(Vec::new(), OwnerId::new("uid")).await;
        assert!(matches!(empty, Err(LobbyError::InvalidInput(_))));

        let blank = lobby
            .create_game(names(&["A", " "]), OwnerId::new("uid"))
            .await;
        assert!(matches!(blank, Err(LobbyError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_unknown_lobby_code() {
        let lobby = manager();
        let result = lobby
            .join_game(&LobbyCode::new("ZZZZZ"), "D".to_string(), OwnerId::new("u"))
            .await;
        assert!(matches!(result, Err(LobbyError::LobbyNotFound(_))));
    }

    #[tokio::test]
    async fn test_unknown_code_wins_over_empty_name() {
        let lobby = manager();
        let result = lobby
            .join_game(&LobbyCode::new("ZZZZZ"), String::new(), OwnerId::new("u"))
            .await;
        assert!(matches!(result, Err(LobbyError::LobbyNotFound(_))));

        let created = lobby
            .create_game(names(&["A"]), OwnerId::new("uid"))
            .await
            .unwrap();
        let result = lobby
            .join_game(&created.lobby_code, " ".to_string(), OwnerId::new("u"))
            .await;
        assert!(matches!(result, Err(LobbyError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_finished_games_release_their_sessions() {
        let lobby = manager();
        for _ in 0..50 {
            let created = lobby
                .create_game(names(&["A", "B", "C"]), OwnerId::new("uid"))
                .await
                .unwrap();
            let game = lobby.start_game(&created.lobby_code).await.unwrap();
            assert!(game.is_over());
        }
        assert_eq!(lobby.active_session_count().await, 0);
        assert!(lobby.sessions.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_turn_after_retirement_is_still_game_over() {
        let lobby = LobbyManager::in_memory(LobbyConfig {
            auto_play_on_start: false,
            ..LobbyConfig::default()
        });
        let created = lobby
            .create_game(names(&["A", "B", "C"]), OwnerId::new("uid"))
            .await
            .unwrap();
        lobby.start_game(&created.lobby_code).await.unwrap();
        assert_eq!(lobby.active_session_count().await, 1);

        let mut game = lobby.take_turn(&created.game_id).await.unwrap();
        while !game.is_over() {
            game = lobby.take_turn(&created.game_id).await.unwrap();
        }
        assert_eq!(lobby.active_session_count().await, 0);

        let again = lobby.take_turn(&created.game_id).await;
        assert!(matches!(again, Err(LobbyError::Game(GameError::GameOver))));
        assert_eq!(lobby.active_session_count().await, 0);
        assert_eq!(lobby.get_game(&created.game_id).await.unwrap(), game);
    }

    #[tokio::test]
    async fn test_join_spawns_one_session() {
        let lobby = manager();
        let created = lobby
            .create_game(names(&["A"]), OwnerId::new("uid"))
            .await
            .unwrap();

        for name in ["B", "C"] {
            lobby
                .join_game(&created.lobby_code, name.to_string(), OwnerId::new(name))
                .await
                .unwrap();
        }

        assert_eq!(lobby.active_session_count().await, 1);
        let game = lobby.get_game(&created.game_id).await.unwrap();
        assert_eq!(game.players().len(), 3);
        assert_eq!(
            game.players()[2].controller.owner(),
            Some(&OwnerId::new("C"))
        );
    }

    #[tokio::test]
    async fn test_add_bots_within_configured_range() {
        let lobby = LobbyManager::in_memory(LobbyConfig {
            min_bots: 3,
            max_bots: 3,
            ..LobbyConfig::default()
        });
        let created = lobby
            .create_game(names(&["A"]), OwnerId::new("uid"))
            .await
            .unwrap();

        let game = lobby.add_bots(&created.lobby_code).await.unwrap();
        assert_eq!(game.players().len(), 4);
    }

    #[tokio::test]
    async fn test_game_id_by_lobby_code_is_case_insensitive() {
        let lobby = manager();
        let created = lobby
            .create_game(names(&["A"]), OwnerId::new("uid"))
            .await
            .unwrap();

        let lower = LobbyCode::new(&created.lobby_code.as_str().to_lowercase());
        assert_eq!(
            lobby.game_id_by_lobby_code(&lower).await.unwrap(),
            created.game_id
        );
    }

    #[tokio::test]
    async fn test_available_games_excludes_finished() {
        let lobby = manager();
        let finished = lobby
            .create_game(names(&["A", "B", "C"]), OwnerId::new("uid"))
            .await
            .unwrap();
        let open = lobby
            .create_game(names(&["D"]), OwnerId::new("uid"))
            .await
            .unwrap();

        let game = lobby.start_game(&finished.lobby_code).await.unwrap();
        assert!(game.is_over());

        let available = lobby.available_games().await.unwrap();
        assert_eq!(available.len(), 1);
        assert!(available.contains_key(&open.game_id));
    }
}
