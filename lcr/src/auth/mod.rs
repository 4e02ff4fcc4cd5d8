//! Bearer-token verification.
//!
//! Credentials are managed by an external identity provider; this module only
//! checks the tokens it hands out and extracts the caller's [`OwnerId`].
//! [`TokenVerifier`] is the seam for that provider and [`JwtVerifier`] checks
//! HS256-signed JWTs against a shared secret.
//!
//! ## Example
//!
//! ```
//! use lcr::auth::{JwtVerifier, TokenVerifier};
//! use lcr::game::OwnerId;
//!
//! let verifier = JwtVerifier::new("a-very-long-secret-used-only-for-docs").unwrap();
//! let token = verifier.issue_token(&OwnerId::new("user-42"), 3600).unwrap();
//! assert_eq!(verifier.verify(&token).unwrap(), OwnerId::new("user-42"));
//! ```

pub mod errors;
pub mod models;
pub mod verifier;

pub use errors::{AuthError, AuthResult};
pub use models::Claims;
pub use verifier::{JwtVerifier, MIN_SECRET_LEN, TokenVerifier};
