//! HTTP server for Recipe Hub.
//!
//! The imperative shell around the store, token service and payment
//! gateway: request parsing, authentication, error mapping and
//! observability. No business rule lives here beyond orchestration.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  axum router (routes.rs)                 │  ← CORS, correlation IDs, tracing
//! │   ├─ extractors: AuthUser, JsonBody ...  │  ← 401 / 400 as AppError
//! │   └─ handlers/*                          │  ← one module per resource
//! ├──────────────────────────────────────────┤
//! │  PaymentOrchestrator (checkout.rs)       │  ← pending row, provider, compensation
//! ├──────────────────────────────────────────┤
//! │  PostgresStore │ TokenService │ Gateway  │  ← injected through AppState
//! └──────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! let state = AppState::new(store, tokens, gateway, Config::from_env());
//! let app = recipe_hub_web::build_router(state);
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod checkout;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use checkout::PaymentOrchestrator;
pub use config::Config;
pub use error::AppError;
pub use extractors::{AuthUser, BearerToken, CorrelationId, MaybeAuthUser};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer, cors_layer};
pub use routes::build_router;
pub use state::AppState;
