//! Per-game session actor.
//!
//! A `GameSession` owns the authoritative snapshot of one game and is the
//! only writer of that game's stored snapshot. Commands arrive through an
//! mpsc inbox and are applied strictly in order. Each command is applied to a
//! copy, the copy is persisted, and only then does it replace the session's
//! snapshot, so a failed write leaves both memory and store untouched.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use super::{
    errors::{LobbyError, LobbyResult},
    messages::{Reply, SessionMessage},
};
use crate::{
    game::{Game, GameId, OwnerId, Player, ThreadRoller},
    store::{GameRepository, StoreError},
};

/// Capacity of a session's inbox
const INBOX_CAPACITY: usize = 100;

/// Session handle for sending commands
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionMessage>,
    game_id: GameId,
}

impl SessionHandle {
    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    /// Whether the session task has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Send a message to the session
    pub async fn send(&self, message: SessionMessage) -> LobbyResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| LobbyError::SessionClosed(self.game_id.clone()))
    }

    /// Send the message built around a fresh reply channel and wait for the
    /// committed snapshot.
    pub async fn request<F>(&self, build: F) -> LobbyResult<Game>
    where
        F: FnOnce(Reply) -> SessionMessage,
    {
        let (response, reply) = oneshot::channel();
        self.send(build(response)).await?;
        reply
            .await
            .map_err(|_| LobbyError::SessionClosed(self.game_id.clone()))?
    }
}

/// Single-writer actor for one game
pub struct GameSession {
    id: GameId,
    game: Game,
    inbox: mpsc::Receiver<SessionMessage>,
    repository: Arc<dyn GameRepository>,
}

impl GameSession {
    /// Create a session around a stored snapshot.
    ///
    /// # Errors
    ///
    /// `StoreError::Unsaved` if `game` has never been inserted.
    pub fn new(
        game: Game,
        repository: Arc<dyn GameRepository>,
    ) -> LobbyResult<(Self, SessionHandle)> {
        let id = game.id.clone().ok_or(StoreError::Unsaved)?;
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);

        let session = Self {
            id: id.clone(),
            game,
            inbox,
            repository,
        };
        let handle = SessionHandle {
            sender,
            game_id: id,
        };

        Ok((session, handle))
    }

    /// Run the session event loop until every handle is dropped or the game
    /// is over. A finished game stops accepting commands; the ones already
    /// queued are still answered.
    pub async fn run(mut self) {
        log::debug!("Session for game {} starting", self.id);

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message).await;
            if self.game.is_over() {
                self.inbox.close();
            }
        }

        log::debug!("Session for game {} closed", self.id);
    }

    async fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Join {
                name,
                owner,
                response,
            } => {
                let result = self.handle_join(name, owner).await;
                let _ = response.send(result);
            }

            SessionMessage::SetReady { name, response } => {
                let result = self
                    .apply(|game| {
                        game.set_ready(&name)
                            .map(|_| ())
                            .ok_or_else(|| LobbyError::PlayerNotFound(name.clone()))
                    })
                    .await;
                let _ = response.send(result);
            }

            SessionMessage::AddBots { count, response } => {
                let result = self
                    .apply(|game| {
                        for _ in 0..count {
                            let name = format!("Bot {}", game.players().len());
                            game.add_player(Player::bot(name))?;
                        }
                        Ok(())
                    })
                    .await;
                let _ = response.send(result);
            }

            SessionMessage::SetAllReady { response } => {
                let result = self
                    .apply(|game| {
                        game.set_all_ready();
                        Ok(())
                    })
                    .await;
                let _ = response.send(result);
            }

            SessionMessage::Start {
                auto_play,
                max_turns,
                response,
            } => {
                let result = self.handle_start(auto_play, max_turns).await;
                let _ = response.send(result);
            }

            SessionMessage::TakeTurn { response } => {
                let result = self
                    .apply(|game| {
                        game.play_turn()?;
                        Ok(())
                    })
                    .await;
                let _ = response.send(result);
            }
        }
    }

    async fn handle_join(&mut self, name: String, owner: OwnerId) -> LobbyResult<Game> {
        let game = self
            .apply(|game| {
                game.add_player(Player::human(name.as_str(), owner))?;
                Ok(())
            })
            .await?;

        log::info!(
            "Player '{}' joined game {} ({} players)",
            name,
            self.id,
            game.players().len()
        );
        Ok(game)
    }

    async fn handle_start(&mut self, auto_play: bool, max_turns: usize) -> LobbyResult<Game> {
        let game = self
            .apply(|game| {
                game.start()?;
                if auto_play {
                    game.auto_play(max_turns, &mut ThreadRoller)?;
                }
                Ok(())
            })
            .await?;

        if let Some(winner) = game.winner() {
            log::info!(
                "Game {} auto-played to the end after {} rolls; winner '{}'",
                self.id,
                game.dice().history().len(),
                winner.name()
            );
        }
        Ok(game)
    }

    /// Apply `op` to a copy of the game, persist the copy, then commit it.
    async fn apply<F>(&mut self, op: F) -> LobbyResult<Game>
    where
        F: FnOnce(&mut Game) -> LobbyResult<()>,
    {
        let mut next = self.game.clone();
        op(&mut next)?;

        self.repository.save(&next).await.map_err(|e| {
            log::error!("Game {}: failed to persist snapshot: {}", self.id, e);
            e
        })?;

        self.game = next;
        Ok(self.game.clone())
    }
}
