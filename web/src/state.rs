//! Application state for Axum handlers.

use crate::config::Config;
use recipe_hub_auth::TokenService;
use recipe_hub_core::PaymentGateway;
use recipe_hub_postgres::PostgresStore;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Immutable after startup; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Persistence
    pub store: PostgresStore,
    /// Session tokens
    pub tokens: Arc<TokenService>,
    /// Payment provider
    pub gateway: Arc<dyn PaymentGateway>,
    /// Runtime configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        store: PostgresStore,
        tokens: TokenService,
        gateway: Arc<dyn PaymentGateway>,
        config: Config,
    ) -> Self {
        Self {
            store,
            tokens: Arc::new(tokens),
            gateway,
            config: Arc::new(config),
        }
    }
}
