//! HTTP API for LCR lobbies and games.
//!
//! # Architecture
//!
//! The API is built with:
//! - **Axum**: async web framework
//! - **Tower**: middleware for CORS, authentication, request ids and metrics
//! - **JWT**: bearer tokens identify the caller as an [`OwnerId`](lcr::OwnerId)
//! - **Actor Model**: each live game is owned by a dedicated session task
//!
//! # Modules
//!
//! - [`games`]: lobby and game endpoints
//! - [`middleware`]: authentication middleware for protected endpoints
//! - [`request_id`]: request correlation ids
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /health                                  - Health check (public)
//! GET  /games/{id}                              - Game snapshot (auth)
//! GET  /availableGames                          - Games not yet over (auth)
//! GET  /games/id/{lobby_code}                   - Lobby code to game id (auth)
//! POST /games                                   - Create game (auth)
//! POST /games/{id}/join                         - Join lobby (auth)
//! POST /games/{id}/players/{player_name}/ready  - Mark player ready (auth)
//! POST /games/{id}/addBots                      - Add 2-4 bots (public)
//! POST /games/{id}/setBotsReady                 - Ready everyone (public)
//! POST /games/{id}/start                        - Start game (auth)
//! POST /games/{id}/turn                         - Play one turn (auth)
//! ```
//!
//! `{id}` is a game id for `GET /games/{id}` and `/turn`, and a lobby code
//! everywhere else.
//!
//! # Errors
//!
//! Failures answer with `{"error": "<message>"}` and a status derived from
//! [`ErrorKind`]. Storage failures never leak driver details.

pub mod games;
pub mod middleware;
pub mod request_id;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use lcr::{ErrorKind, LobbyManager, auth::TokenVerifier};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::metrics;

/// Application state shared across all HTTP handlers.
///
/// Cloned per request; both fields are behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub lobby: Arc<LobbyManager>,
    pub verifier: Arc<dyn TokenVerifier>,
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Map a failure category onto its HTTP status.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::UpstreamFailure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Create the API router with all endpoints and middleware.
///
/// # Example
///
/// ```rust,no_run
/// # use lcr_server::api::{create_router, AppState};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let state: AppState = unimplemented!();
/// let app = create_router(state);
/// let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    // Bot management is reachable without a token
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/games/{id}/addBots", post(games::add_bots))
        .route("/games/{id}/setBotsReady", post(games::set_bots_ready));

    let protected_routes = Router::new()
        .route("/games", post(games::create_game))
        .route("/availableGames", get(games::available_games))
        .route("/games/id/{lobby_code}", get(games::game_id_by_lobby_code))
        .route("/games/{id}", get(games::get_game))
        .route("/games/{id}/join", post(games::join_game))
        .route(
            "/games/{id}/players/{player_name}/ready",
            post(games::set_player_ready),
        )
        .route("/games/{id}/start", post(games::start_game))
        .route("/games/{id}/turn", post(games::take_turn))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .route_layer(axum::middleware::from_fn(metrics::track_metrics))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the snapshot store answers, `503 Service Unavailable`
/// otherwise.
///
/// ```bash
/// curl http://localhost:3000/health
/// # {"status":"healthy","version":"0.1.0","store":true,"active_sessions":2,"timestamp":"..."}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_healthy = match state.lobby.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Snapshot store health check failed");
            false
        }
    };
    let active_sessions = state.lobby.active_session_count().await;
    metrics::active_sessions(active_sessions);

    let status_code = if store_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if store_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "store": store_healthy,
        "active_sessions": active_sessions,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::InvalidInput), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(status_for(ErrorKind::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_for(ErrorKind::UpstreamFailure),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
