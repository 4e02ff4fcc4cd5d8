//! Lobby and session management.
//!
//! This module implements:
//! - Lobby codes: short shareable codes resolving to a joinable game
//! - `LobbyManager`: creation, join, ready state, bots, start and turns
//! - `GameSession`: one async actor per game, the single writer of its snapshot
//!
//! ## Architecture
//!
//! Each game touched by a mutation gets a session running in its own Tokio
//! task with an mpsc inbox. The `LobbyManager` spawns sessions lazily and
//! routes commands to them; callers wait on a oneshot reply carrying the
//! committed snapshot.
//!
//! ## Example
//!
//! ```
//! use lcr::game::OwnerId;
//! use lcr::lobby::{LobbyConfig, LobbyManager};
//!
//! #[tokio::main]
//! async fn main() {
//!     let lobby = LobbyManager::in_memory(LobbyConfig::default());
//!     let created = lobby
//!         .create_game(vec!["Ann".into(), "Bo".into(), "Cy".into()], OwnerId::new("uid-1"))
//!         .await
//!         .unwrap();
//!
//!     let game = lobby.start_game(&created.lobby_code).await.unwrap();
//!     assert!(game.is_over());
//! }
//! ```

pub mod code;
pub mod config;
pub mod errors;
pub mod manager;
pub mod messages;
pub mod session;

pub use code::{LOBBY_CODE_ALPHABET, LOBBY_CODE_LEN, generate_lobby_code};
pub use config::LobbyConfig;
pub use errors::{ErrorKind, LobbyError, LobbyResult};
pub use manager::{CreatedGame, LobbyManager};
pub use messages::SessionMessage;
pub use session::{GameSession, SessionHandle};
