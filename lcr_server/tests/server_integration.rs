//! Integration tests for the HTTP API.
//!
//! Each test builds a router over an in-memory store and drives it with
//! `oneshot` requests; no sockets or database are involved.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use lcr::{LobbyConfig, LobbyManager, OwnerId, auth::JwtVerifier};
use lcr_server::api::{AppState, create_router};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt; // For `oneshot` method

const TEST_SECRET: &str = "test_secret_key_for_testing_only_0123456789";

struct TestServer {
    app: axum::Router,
    token: String,
}

impl TestServer {
    fn new(config: LobbyConfig) -> Self {
        let verifier = JwtVerifier::new(TEST_SECRET).unwrap();
        let token = verifier
            .issue_token(&OwnerId::new("uid-test"), 3600)
            .unwrap();

        let state = AppState {
            lobby: Arc::new(LobbyManager::in_memory(config)),
            verifier: Arc::new(verifier),
        };

        Self {
            app: create_router(state),
            token,
        }
    }

    fn manual() -> Self {
        Self::new(LobbyConfig {
            auto_play_on_start: false,
            ..LobbyConfig::default()
        })
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(uri)
            .header("authorization", format!("Bearer {}", self.token))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    async fn post(&self, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("authorization", format!("Bearer {}", self.token));
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    /// Create a game and return `(game_id, lobby_code)`.
    async fn create(&self, names: &[&str]) -> (String, String) {
        let players: Vec<Value> = names.iter().map(|name| json!({"Name": name})).collect();
        let (status, body) = self.post("/games", Some(Value::from(players))).await;
        assert_eq!(status, StatusCode::OK, "create failed: {body}");
        (
            body["gameID"].as_str().unwrap().to_string(),
            body["lobbyCode"].as_str().unwrap().to_string(),
        )
    }
}

fn total_chips(game: &Value) -> u64 {
    let held: u64 = game["players"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["chips"].as_u64().unwrap())
        .sum();
    held + game["pot"].as_u64().unwrap()
}

// ============================================================================
// Health and Middleware
// ============================================================================

#[tokio::test]
async fn test_health_check_endpoint() {
    let server = TestServer::manual();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = server.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], true);
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let server = TestServer::manual();
    let request = Request::builder()
        .uri("/availableGames")
        .body(Body::empty())
        .unwrap();

    let (status, body) = server.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let server = TestServer::manual();
    let request = Request::builder()
        .uri("/availableGames")
        .header("authorization", "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();

    let (status, _) = server.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = TestServer::manual();
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-me-42")
        .body(Body::empty())
        .unwrap();

    let response = server.app.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "trace-me-42"
    );
}

#[tokio::test]
async fn test_404_for_invalid_endpoint() {
    let server = TestServer::manual();
    let (status, _) = server.get("/nonexistent").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Game Creation and Lookup
// ============================================================================

#[tokio::test]
async fn test_create_game_returns_ids_and_creator() {
    let server = TestServer::manual();
    let (status, body) = server
        .post("/games", Some(json!([{"Name": "Ann"}, {"Name": "Bo"}])))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["gameID"].is_string());
    assert_eq!(body["lobbyCode"].as_str().unwrap().len(), 5);
    assert_eq!(body["creator"]["name"], "Ann");
    assert_eq!(body["creator"]["chips"], 3);
}

#[tokio::test]
async fn test_malformed_json_request() {
    let server = TestServer::manual();
    let request = Request::builder()
        .method("POST")
        .uri("/games")
        .header("authorization", format!("Bearer {}", server.token))
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = server.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_create_with_no_players_is_bad_request() {
    let server = TestServer::manual();
    let (status, _) = server.post("/games", Some(json!([]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_lookup_game_by_id_and_code() {
    let server = TestServer::manual();
    let (game_id, code) = server.create(&["Ann", "Bo", "Cy"]).await;

    let (status, body) = server.get(&format!("/games/{game_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["game"]["id"], game_id.as_str());
    assert_eq!(body["game"]["players"].as_array().unwrap().len(), 3);

    let (status, body) = server
        .get(&format!("/games/id/{}", code.to_lowercase()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gameID"], game_id.as_str());

    let (status, body) = server.get("/availableGames").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["games"].get(&game_id).is_some());
}

#[tokio::test]
async fn test_unknown_game_is_not_found() {
    let server = TestServer::manual();

    let (status, _) = server.get("/games/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server.get("/games/id/ZZZZZ").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server.post("/games/does-not-exist/turn", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Lobby Operations
// ============================================================================

#[tokio::test]
async fn test_join_and_ready() {
    let server = TestServer::manual();
    let (game_id, code) = server.create(&["Ann"]).await;

    let (status, body) = server
        .post(&format!("/games/{code}/join"), Some(json!({"Name": "Bo"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gameID"], game_id.as_str());
    assert_eq!(body["game"]["players"][1]["name"], "Bo");

    let (status, body) = server
        .post(&format!("/games/{code}/players/Bo/ready"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["players"][1]["lobby_ready"], true);
    assert_eq!(body["players"][0]["lobby_ready"], false);

    let (status, _) = server
        .post(&format!("/games/{code}/players/Nobody/ready"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_join_unknown_code_with_empty_name_is_not_found() {
    let server = TestServer::manual();
    let (status, _) = server
        .post("/games/ZZZZZ/join", Some(json!({"Name": ""})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, code) = server.create(&["Ann"]).await;
    let (status, _) = server
        .post(&format!("/games/{code}/join"), Some(json!({"Name": ""})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_join_with_bad_body_is_bad_request() {
    let server = TestServer::manual();
    let (_, code) = server.create(&["Ann"]).await;

    let (status, _) = server
        .post(&format!("/games/{code}/join"), Some(json!({"nick": "Bo"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bot_routes_need_no_token() {
    let server = TestServer::manual();
    let (_, code) = server.create(&["Ann"]).await;

    let request = Request::builder()
        .method("POST")
        .uri(format!("/games/{code}/addBots"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = server.send(request).await;
    assert_eq!(status, StatusCode::OK);
    let count = body["players"].as_array().unwrap().len();
    assert!((3..=5).contains(&count), "unexpected roster size {count}");

    let request = Request::builder()
        .method("POST")
        .uri(format!("/games/{code}/setBotsReady"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = server.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        body["players"]
            .as_array()
            .unwrap()
            .iter()
            .all(|p| p["lobby_ready"] == true)
    );
}

// ============================================================================
// Game Lifecycle
// ============================================================================

#[tokio::test]
async fn test_start_with_two_players_is_bad_request() {
    let server = TestServer::manual();
    let (_, code) = server.create(&["Ann", "Bo"]).await;

    let (status, body) = server.post(&format!("/games/{code}/start"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("3"));
}

#[tokio::test]
async fn test_start_auto_plays_to_completion() {
    let server = TestServer::new(LobbyConfig::default());
    let (_, code) = server.create(&["Ann", "Bo", "Cy"]).await;

    let (status, body) = server.post(&format!("/games/{code}/start"), None).await;
    assert_eq!(status, StatusCode::OK);

    let game = &body["game"];
    assert_eq!(game["game_over"], true);
    assert!(game["winner"].is_string());
    assert_eq!(total_chips(game), 9);

    let holders = game["players"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|p| p["chips"].as_u64().unwrap() > 0)
        .count();
    assert_eq!(holders, 1);

    // Finished games drop out of the listing
    let (_, body) = server.get("/availableGames").await;
    assert!(body["games"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn test_manual_turns_then_forbidden() {
    let server = TestServer::manual();
    let (game_id, code) = server.create(&["Ann", "Bo", "Cy"]).await;

    let (status, body) = server.post(&format!("/games/{code}/start"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["game"]["phase"], "Active");

    let (status, _) = server.post(&format!("/games/{code}/start"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = server
        .post(&format!("/games/{code}/join"), Some(json!({"Name": "Late"})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let mut over = false;
    for _ in 0..10_000 {
        let (status, body) = server.post(&format!("/games/{game_id}/turn"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(total_chips(&body["game"]), 9);
        if body["game"]["game_over"] == true {
            over = true;
            break;
        }
    }
    assert!(over, "game did not finish");

    let (status, _) = server.post(&format!("/games/{game_id}/turn"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
