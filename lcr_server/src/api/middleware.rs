//! Authentication middleware for protected endpoints.
//!
//! Extracts the bearer token from the `Authorization` header, verifies it and
//! injects the caller's [`OwnerId`] into request extensions for downstream
//! handlers.
//!
//! # Extracting the caller
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use lcr::game::OwnerId;
//!
//! async fn protected_handler(Extension(owner): Extension<OwnerId>) -> String {
//!     format!("Authenticated as {}", owner)
//! }
//! # let _ = protected_handler;
//! ```

use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use lcr::auth::AuthError;

use super::{AppState, ErrorResponse, status_for};

/// Authentication middleware that validates bearer tokens and injects the
/// caller's identity.
///
/// # Behavior
///
/// - **Success**: token valid, `OwnerId` inserted into extensions, next handler runs
/// - **Missing or malformed header**: `401 Unauthorized`
/// - **Invalid/expired token**: `401 Unauthorized`
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    let result = match token {
        Some(token) => state.verifier.verify(token),
        None => Err(AuthError::MissingToken),
    };

    match result {
        Ok(owner) => {
            request.extensions_mut().insert(owner);
            Ok(next.run(request).await)
        }
        Err(e) => {
            tracing::warn!(error = %e, uri = %request.uri(), "Rejected bearer token");
            Err((
                status_for(e.kind()),
                Json(ErrorResponse {
                    error: e.client_message(),
                }),
            ))
        }
    }
}
