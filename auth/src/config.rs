//! Token configuration.
//!
//! Values are supplied by the application, not hardcoded.

use chrono::Duration;

/// Default token lifetime.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Issuer stamped into and required from every token.
pub const TOKEN_ISSUER: &str = "recipe-hub";

/// Session token configuration.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// How long an issued token stays valid.
    ///
    /// Default: 24 hours
    pub ttl: Duration,

    /// `iss` claim.
    ///
    /// Default: `recipe-hub`
    pub issuer: String,
}

impl TokenConfig {
    /// Create configuration with the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
            issuer: TOKEN_ISSUER.to_string(),
        }
    }

    /// Set token time-to-live.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set issuer.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self::new()
    }
}
