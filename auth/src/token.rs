//! Stateless HS256 session tokens.
//!
//! # Token lifecycle
//!
//! ```text
//! login ──► issue(user_id, email) ──► "Bearer <jwt>" ──► validate(jwt) ──► Claims
//!                                                            │
//!                                    expired / tampered ─────┴──► AuthError
//! ```
//!
//! Expiry is checked against the injected [`Clock`], not the system time, so
//! tests can move time forward.

use crate::config::TokenConfig;
use crate::error::{AuthError, Result};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use recipe_hub_core::{Clock, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Minimum signing secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// HMAC secret used to sign and verify tokens.
///
/// Constructed explicitly and injected into [`TokenService`]; there is no
/// process-wide key.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    /// Wraps a configured secret.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::WeakSigningKey`] if the secret is shorter than
    /// 32 bytes.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::WeakSigningKey(format!(
                "secret must be at least {MIN_SECRET_LEN} bytes, got {}",
                secret.len()
            )));
        }
        Ok(Self(secret))
    }

    /// Generates a random 64-byte secret.
    ///
    /// Tokens signed with a generated key do not survive a restart.
    #[must_use]
    pub fn generate() -> Self {
        let mut secret = vec![0u8; 64];
        rand::thread_rng().fill_bytes(&mut secret);
        Self(secret)
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// Identity carried by a valid token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Authenticated user
    pub user_id: UserId,
    /// Email at issue time
    pub email: String,
}

/// A freshly issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    /// Compact JWT
    pub token: String,
    /// When it stops validating
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JwtClaims {
    sub: String,
    email: String,
    iss: String,
    iat: i64,
    exp: i64,
}

/// Issues and validates session tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    config: TokenConfig,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Creates a token service.
    #[must_use]
    pub fn new(key: &SigningKey, config: TokenConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(&key.0),
            decoding: DecodingKey::from_secret(&key.0),
            config,
            clock,
        }
    }

    /// Issues a token for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Internal`] if signing fails.
    pub fn issue(&self, user_id: UserId, email: &str) -> Result<IssuedToken> {
        let now = self.clock.now();
        let expires_at = now + self.config.ttl;
        let claims = JwtClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("token signing failed: {e}")))?;

        tracing::debug!(user_id = %user_id, expires_at = %expires_at, "Issued session token");

        Ok(IssuedToken { token, expires_at })
    }

    /// Validates a token and returns its claims.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidToken`] for a bad signature, wrong algorithm,
    ///   wrong issuer, or malformed payload
    /// - [`AuthError::TokenExpired`] when the clock is past `exp`
    pub fn validate(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.issuer.as_str()]);
        // Expiry is checked against the injected clock below.
        validation.validate_exp = false;

        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected session token");
                AuthError::InvalidToken
            })?;

        if self.clock.now().timestamp() >= data.claims.exp {
            return Err(AuthError::TokenExpired);
        }

        let user_id = Uuid::parse_str(&data.claims.sub)
            .map(UserId::from_uuid)
            .map_err(|_| AuthError::InvalidToken)?;

        Ok(Claims {
            user_id,
            email: data.claims.email,
        })
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
