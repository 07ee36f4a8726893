//! Domain error taxonomy.

use thiserror::Error;

/// Result type alias for domain operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure a Recipe Hub operation can report.
///
/// Validation, not-found and authorization failures are detected before any
/// write. `Integrity` means an atomic multi-row unit was rolled back.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed or out-of-range input. No side effect happened.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Referenced entity is absent or not visible to the caller.
    #[error("{resource} with id {id} not found")]
    NotFound {
        /// Kind of entity (e.g. "Recipe")
        resource: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// Duplicate purchase, duplicate user, duplicate category...
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Missing or invalid credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Database or payment provider unreachable, slow, or malformed.
    #[error("Dependency failure: {0}")]
    Dependency(String),

    /// An atomic write could not complete and was rolled back.
    #[error("Integrity failure: {0}")]
    Integrity(String),
}

impl Error {
    /// Shorthand for a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Shorthand for a not-found error.
    #[must_use]
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Shorthand for a conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Returns `true` if the caller can fix the request and retry.
    ///
    /// # Examples
    ///
    /// ```
    /// # use recipe_hub_core::Error;
    /// assert!(Error::validation("title is required").is_client_error());
    /// assert!(!Error::Dependency("pool timed out".into()).is_client_error());
    /// ```
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotFound { .. } | Self::Conflict(_) | Self::Unauthorized(_)
        )
    }
}
