//! Error types for credential and token operations.

use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Error taxonomy for authentication.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Authentication Errors
    // ═══════════════════════════════════════════════════════════

    /// Unknown email or wrong password. Deliberately indistinguishable.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// No bearer token on a request that needs one.
    #[error("Authorization token required")]
    MissingToken,

    /// Token is malformed, tampered with, or issued by someone else.
    #[error("Invalid token")]
    InvalidToken,

    /// Token signature is fine but it is past its expiry.
    #[error("Token has expired")]
    TokenExpired,

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// The configured signing secret is unusable.
    #[error("Signing key rejected: {0}")]
    WeakSigningKey(String),

    /// Hashing or signing failed.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Returns `true` if the caller should get a 401.
    ///
    /// # Examples
    ///
    /// ```
    /// # use recipe_hub_auth::AuthError;
    /// assert!(AuthError::TokenExpired.is_unauthorized());
    /// assert!(!AuthError::Internal("boom".into()).is_unauthorized());
    /// ```
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials | Self::MissingToken | Self::InvalidToken | Self::TokenExpired
        )
    }
}
