//! Game and lobby API handlers.
//!
//! Every route under `/games/{id}` takes one path segment identifying the
//! game: a game id for reads and turns, a lobby code for lobby operations.
//!
//! # Examples
//!
//! Create a game:
//! ```bash
//! curl -X POST http://localhost:3000/games \
//!   -H "Authorization: Bearer TOKEN" \
//!   -H "Content-Type: application/json" \
//!   -d '[{"Name": "Ann"}, {"Name": "Bo"}, {"Name": "Cy"}]'
//! ```
//!
//! Start it:
//! ```bash
//! curl -X POST http://localhost:3000/games/K3QZ8/start -H "Authorization: Bearer TOKEN"
//! ```

use axum::{
    Json,
    extract::{Extension, Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use lcr::{
    Game, GameId, LobbyCode, LobbyError, OwnerId, Player,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{AppState, ErrorResponse, request_id::RequestId, status_for};
use crate::{logging::log_game_event, metrics};

/// Handler result: JSON body or status plus `{"error": ...}`
pub type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

#[derive(Debug, Deserialize)]
pub struct PlayerRequest {
    #[serde(rename = "Name", alias = "name")]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CreateGameResponse {
    #[serde(rename = "gameID")]
    pub game_id: GameId,
    #[serde(rename = "lobbyCode")]
    pub lobby_code: LobbyCode,
    pub creator: Player,
}

#[derive(Debug, Serialize)]
pub struct JoinGameResponse {
    #[serde(rename = "gameID")]
    pub game_id: GameId,
    pub game: Game,
}

#[derive(Debug, Serialize)]
pub struct GameResponse {
    pub game: Game,
}

#[derive(Debug, Serialize)]
pub struct GameIdResponse {
    #[serde(rename = "gameID")]
    pub game_id: GameId,
}

#[derive(Debug, Serialize)]
pub struct AvailableGamesResponse {
    pub games: BTreeMap<GameId, Game>,
}

fn lobby_error(e: LobbyError) -> (StatusCode, Json<ErrorResponse>) {
    let status = status_for(e.kind());
    if status.is_server_error() {
        tracing::error!(error = %e, "Lobby operation failed");
    }
    (
        status,
        Json(ErrorResponse {
            error: e.client_message(),
        }),
    )
}

fn bad_request(message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

async fn record_sessions(state: &AppState) {
    metrics::active_sessions(state.lobby.active_session_count().await);
}

/// Get the latest snapshot of a game.
///
/// # Errors
///
/// - `404 Not Found`: no game with this id
pub async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> ApiResult<GameResponse> {
    let game = state
        .lobby
        .get_game(&GameId::from(game_id))
        .await
        .map_err(lobby_error)?;
    Ok(Json(GameResponse { game }))
}

/// List every game that is not over, keyed by game id.
pub async fn available_games(State(state): State<AppState>) -> ApiResult<AvailableGamesResponse> {
    let games = state.lobby.available_games().await.map_err(lobby_error)?;
    Ok(Json(AvailableGamesResponse { games }))
}

/// Resolve a lobby code to its game id.
///
/// # Errors
///
/// - `404 Not Found`: no game holds this code
pub async fn game_id_by_lobby_code(
    State(state): State<AppState>,
    Path(lobby_code): Path<String>,
) -> ApiResult<GameIdResponse> {
    let game_id = state
        .lobby
        .game_id_by_lobby_code(&LobbyCode::new(&lobby_code))
        .await
        .map_err(lobby_error)?;
    Ok(Json(GameIdResponse { game_id }))
}

/// Create a game owned by the caller.
///
/// # Request Body
///
/// ```json
/// [{"Name": "Ann"}, {"Name": "Bo"}]
/// ```
///
/// The first player becomes the creator.
///
/// # Errors
///
/// - `400 Bad Request`: malformed body, empty list or blank name
pub async fn create_game(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    request_id: RequestId,
    body: Result<Json<Vec<PlayerRequest>>, JsonRejection>,
) -> ApiResult<CreateGameResponse> {
    let Json(players) = body.map_err(|e| bad_request(e.body_text()))?;
    let names = players.into_iter().map(|p| p.name).collect();

    let created = state
        .lobby
        .create_game(names, owner)
        .await
        .map_err(lobby_error)?;

    metrics::games_created_total();
    log_game_event(
        "game_created",
        created.game_id.as_str(),
        &format!(
            "lobby code {} (request {})",
            created.lobby_code,
            request_id.as_str()
        ),
    );

    Ok(Json(CreateGameResponse {
        game_id: created.game_id,
        lobby_code: created.lobby_code,
        creator: created.creator,
    }))
}

/// Join the lobby behind a code as the caller.
///
/// # Errors
///
/// - `400 Bad Request`: malformed body or empty name
/// - `403 Forbidden`: the game has already started
/// - `404 Not Found`: no game holds this code
pub async fn join_game(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Path(lobby_code): Path<String>,
    body: Result<Json<PlayerRequest>, JsonRejection>,
) -> ApiResult<JoinGameResponse> {
    let Json(player) = body.map_err(|e| bad_request(e.body_text()))?;

    let game = state
        .lobby
        .join_game(&LobbyCode::new(&lobby_code), player.name, owner)
        .await
        .map_err(lobby_error)?;
    record_sessions(&state).await;

    let game_id = game
        .id
        .clone()
        .ok_or_else(|| lobby_error(LobbyError::LobbyNotFound(LobbyCode::new(&lobby_code))))?;
    Ok(Json(JoinGameResponse { game_id, game }))
}

/// Mark a player ready.
///
/// # Errors
///
/// - `404 Not Found`: unknown lobby code or player name
pub async fn set_player_ready(
    State(state): State<AppState>,
    Path((lobby_code, player_name)): Path<(String, String)>,
) -> ApiResult<Game> {
    let game = state
        .lobby
        .set_player_ready(&LobbyCode::new(&lobby_code), player_name)
        .await
        .map_err(lobby_error)?;
    record_sessions(&state).await;
    Ok(Json(game))
}

/// Add 2-4 bots to a lobby. Unauthenticated.
pub async fn add_bots(
    State(state): State<AppState>,
    Path(lobby_code): Path<String>,
) -> ApiResult<Game> {
    let game = state
        .lobby
        .add_bots(&LobbyCode::new(&lobby_code))
        .await
        .map_err(lobby_error)?;
    record_sessions(&state).await;
    Ok(Json(game))
}

/// Mark every player in a lobby ready, humans included. Unauthenticated.
pub async fn set_bots_ready(
    State(state): State<AppState>,
    Path(lobby_code): Path<String>,
) -> ApiResult<Game> {
    let game = state
        .lobby
        .set_bots_ready(&LobbyCode::new(&lobby_code))
        .await
        .map_err(lobby_error)?;
    record_sessions(&state).await;
    Ok(Json(game))
}

/// Start a game; with auto-play enabled the response is the finished game.
///
/// # Errors
///
/// - `400 Bad Request`: fewer than three players
/// - `403 Forbidden`: already started
/// - `404 Not Found`: no game holds this code
pub async fn start_game(
    State(state): State<AppState>,
    Path(lobby_code): Path<String>,
) -> ApiResult<GameResponse> {
    let game = state
        .lobby
        .start_game(&LobbyCode::new(&lobby_code))
        .await
        .map_err(lobby_error)?;
    record_sessions(&state).await;

    metrics::turns_played_total(game.turns_played() as u64);
    if game.is_over() {
        metrics::games_completed_total();
    }
    if let Some(id) = &game.id {
        log_game_event(
            "game_started",
            id.as_str(),
            &format!("{} players, {} turns played", game.players().len(), game.turns_played()),
        );
    }

    Ok(Json(GameResponse { game }))
}

/// Play the current player's turn.
///
/// # Errors
///
/// - `400 Bad Request`: lobby game with fewer than three players
/// - `403 Forbidden`: the game is over
/// - `404 Not Found`: no game with this id
pub async fn take_turn(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> ApiResult<GameResponse> {
    let game = state
        .lobby
        .take_turn(&GameId::from(game_id))
        .await
        .map_err(lobby_error)?;
    record_sessions(&state).await;

    metrics::turns_played_total(1);
    if game.is_over() {
        metrics::games_completed_total();
        if let (Some(id), Some(winner)) = (&game.id, game.winner()) {
            log_game_event("game_over", id.as_str(), &format!("'{}' wins", winner.name()));
        }
    }

    Ok(Json(GameResponse { game }))
}
