//! Payment provider seam.
//!
//! The orchestrator talks to the provider only through [`PaymentGateway`];
//! production uses the Chapa client, tests use a scripted mock.

use crate::recipe::Money;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Payment gateway result
pub type GatewayResult<T> = Result<T, PaymentGatewayError>;

/// Payment gateway error
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaymentGatewayError {
    /// The provider did not answer within the configured timeout
    #[error("Payment provider timed out")]
    Timeout,
    /// Network or TLS failure reaching the provider
    #[error("Payment provider unreachable: {0}")]
    Transport(String),
    /// The provider answered with something we could not parse
    #[error("Malformed payment provider response: {0}")]
    MalformedResponse(String),
    /// The provider refused the request
    #[error("Payment provider rejected the request: {0}")]
    Rejected(String),
}

/// Everything the provider needs to open a hosted checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// Amount to charge
    pub amount: Money,
    /// ISO currency code
    pub currency: String,
    /// Payer email
    pub email: String,
    /// Payer first name
    pub first_name: String,
    /// Payer last name
    pub last_name: String,
    /// Our transaction reference
    pub tx_ref: String,
    /// Server-to-server callback URL
    pub callback_url: String,
    /// Where the payer's browser lands afterwards
    pub return_url: String,
    /// Checkout page title
    pub title: String,
    /// Checkout page description
    pub description: String,
}

/// A hosted checkout opened by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    /// Where to redirect the payer
    pub checkout_url: String,
}

/// The provider's verdict for a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedStatus {
    /// True only when the provider reports success
    pub success: bool,
    /// Raw provider status, for logging
    pub provider_status: String,
}

/// Payment gateway trait
///
/// Abstraction over hosted-checkout providers.
pub trait PaymentGateway: Send + Sync {
    /// Open a checkout session
    ///
    /// # Errors
    ///
    /// Returns error on timeout, transport failure, malformed response, or
    /// a non-success provider status
    fn initialize(
        &self,
        request: CheckoutRequest,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<Checkout>> + Send>>;

    /// Ask the provider for the status of a transaction
    ///
    /// # Errors
    ///
    /// Returns error on timeout, transport failure or malformed response
    fn verify(
        &self,
        tx_ref: &str,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<VerifiedStatus>> + Send>>;
}
