//! # Recipe Hub Chapa
//!
//! reqwest client for the [Chapa](https://chapa.co) hosted-checkout API,
//! implementing `recipe_hub_core::PaymentGateway`.
//!
//! - `POST {api_url}/transaction/initialize` opens a checkout and returns its URL
//! - `GET {api_url}/transaction/verify/{tx_ref}` reports the transaction status
//!
//! Both calls authenticate with `Authorization: Bearer <secret key>` and are
//! bounded by the client timeout (30 seconds by default).
//!
//! ## Example
//!
//! ```no_run
//! use recipe_hub_chapa::{ChapaClient, DEFAULT_API_URL, DEFAULT_TIMEOUT};
//! use recipe_hub_core::PaymentGateway;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), recipe_hub_chapa::ChapaError> {
//! let client = ChapaClient::new("CHASECK-...", DEFAULT_API_URL, DEFAULT_TIMEOUT)?;
//! let gateway: Arc<dyn PaymentGateway> = Arc::new(client);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod wire;

pub use client::{ChapaClient, DEFAULT_API_URL, DEFAULT_TIMEOUT};
pub use error::ChapaError;
