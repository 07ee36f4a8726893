//! Error types for the Chapa API client

use recipe_hub_core::PaymentGatewayError;
use thiserror::Error;

/// Errors that can occur when interacting with the Chapa API
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChapaError {
    /// HTTP client could not be built
    #[error("HTTP client configuration failed: {0}")]
    ClientBuild(String),

    /// HTTP request did not complete in time
    #[error("Request timed out")]
    Timeout,

    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Response parsing failed
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// Chapa answered with a non-success status
    #[error("Chapa rejected the request: {0}")]
    Rejected(String),

    /// API returned an unexpected HTTP status without a readable body
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },
}

impl From<reqwest::Error> for ChapaError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::ResponseParseFailed(e.to_string())
        } else {
            Self::RequestFailed(e.to_string())
        }
    }
}

impl From<ChapaError> for PaymentGatewayError {
    fn from(e: ChapaError) -> Self {
        match e {
            ChapaError::Timeout => Self::Timeout,
            ChapaError::Rejected(message) => Self::Rejected(message),
            ChapaError::ResponseParseFailed(message) => Self::MalformedResponse(message),
            ChapaError::ApiError { status, message } => {
                Self::Transport(format!("status {status}: {message}"))
            }
            ChapaError::ClientBuild(_) | ChapaError::RequestFailed(_) => {
                Self::Transport(e.to_string())
            }
        }
    }
}
