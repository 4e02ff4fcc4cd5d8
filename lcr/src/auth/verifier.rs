use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::{AuthError, AuthResult, Claims};
use crate::game::OwnerId;

/// Shortest accepted HS256 secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Turns a bearer token into the identity it was issued for.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> AuthResult<OwnerId>;
}

/// HS256 JWT verifier sharing a secret with the token issuer
#[derive(Clone)]
pub struct JwtVerifier {
    jwt_secret: String,
}

impl JwtVerifier {
    /// # Errors
    ///
    /// `AuthError::InvalidSecret` if the secret is shorter than
    /// [`MIN_SECRET_LEN`] bytes.
    pub fn new(jwt_secret: impl Into<String>) -> AuthResult<Self> {
        let jwt_secret = jwt_secret.into();
        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::InvalidSecret(format!(
                "must be at least {MIN_SECRET_LEN} bytes, got {}",
                jwt_secret.len()
            )));
        }
        Ok(Self { jwt_secret })
    }

    /// Decode and validate a token, including its expiry.
    pub fn verify_claims(&self, token: &str) -> AuthResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    /// Sign a token for `owner` valid for `ttl_secs` seconds. Used by local
    /// tooling and tests; production tokens come from the identity provider.
    pub fn issue_token(&self, owner: &OwnerId, ttl_secs: i64) -> AuthResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: owner.as_str().to_string(),
            exp: now + ttl_secs,
            iat: now,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(token)
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> AuthResult<OwnerId> {
        let claims = self.verify_claims(token)?;
        if claims.sub.is_empty() {
            return Err(AuthError::MissingSubject);
        }
        Ok(OwnerId::new(claims.sub))
    }
}
