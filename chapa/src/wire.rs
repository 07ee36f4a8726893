//! Chapa request and response bodies.

use recipe_hub_core::CheckoutRequest;
use serde::{Deserialize, Serialize};

/// Body of `POST /transaction/initialize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeRequest {
    /// Decimal amount with two places, as a string
    pub amount: String,
    /// ISO currency code
    pub currency: String,
    /// Payer email
    pub email: String,
    /// Payer first name
    pub first_name: String,
    /// Payer last name
    pub last_name: String,
    /// Merchant transaction reference
    pub tx_ref: String,
    /// Server-to-server callback
    pub callback_url: String,
    /// Browser return URL
    pub return_url: String,
    /// Checkout page title
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub custom_title: String,
    /// Checkout page description
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub custom_description: String,
}

impl From<CheckoutRequest> for InitializeRequest {
    fn from(request: CheckoutRequest) -> Self {
        Self {
            amount: request.amount.to_string(),
            currency: request.currency,
            email: request.email,
            first_name: request.first_name,
            last_name: request.last_name,
            tx_ref: request.tx_ref,
            callback_url: request.callback_url,
            return_url: request.return_url,
            custom_title: request.title,
            custom_description: request.description,
        }
    }
}

/// Envelope every Chapa response shares.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Human-readable message
    #[serde(default)]
    pub message: String,
    /// `success` or `failed`
    pub status: String,
    /// Payload; absent on failures
    pub data: Option<T>,
}

/// `data` of a successful initialize.
#[derive(Debug, Clone, Deserialize)]
pub struct InitializeData {
    /// Hosted checkout page
    pub checkout_url: String,
}

/// `data` of a verify.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyData {
    /// Transaction status (`success`, `failed`, `pending`...)
    pub status: String,
    /// Echoed reference
    #[serde(default)]
    pub tx_ref: Option<String>,
}
