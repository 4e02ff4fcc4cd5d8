//! Token verification error types.

use thiserror::Error;

use crate::lobby::ErrorKind;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer token was presented
    #[error("Missing bearer token")]
    MissingToken,

    /// JWT token error
    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    /// Token verified but carries no usable identity
    #[error("Token has no subject")]
    MissingSubject,

    /// Signing secret is unusable
    #[error("Invalid signing secret: {0}")]
    InvalidSecret(String),
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// JWT errors are sanitized so token structure isn't exposed.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::JwtError(_) | AuthError::MissingSubject => {
                "Authentication failed".to_string()
            }
            AuthError::InvalidSecret(_) => "Internal server error".to_string(),
            AuthError::MissingToken => self.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidSecret(_) => ErrorKind::UpstreamFailure,
            _ => ErrorKind::Unauthorized,
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
