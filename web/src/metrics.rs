//! Prometheus metrics.
//!
//! # Exported Metrics
//!
//! - `recipes.created` - Recipes created
//! - `recipes.likes.toggled` - Like toggles
//! - `recipes.ratings.submitted` - Ratings written or replaced
//! - `payments.initialized` - Checkouts opened
//! - `payments.compensated` - Pending purchases removed after a failed checkout
//! - `payments.verified{status}` - Purchases settled, by terminal status

use metrics::describe_counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

/// Register metric descriptions. Call once at startup, before recording.
pub fn register_metrics() {
    describe_counter!("recipes.created", "Total number of recipes created");
    describe_counter!("recipes.likes.toggled", "Total number of like toggles");
    describe_counter!(
        "recipes.ratings.submitted",
        "Total number of ratings written or replaced"
    );
    describe_counter!("payments.initialized", "Total number of checkouts opened");
    describe_counter!(
        "payments.compensated",
        "Pending purchases deleted after the provider call failed"
    );
    describe_counter!(
        "payments.verified",
        "Total number of purchases settled, by status (completed, failed)"
    );
}

/// Install the global recorder with a scrape endpoint on `addr`.
///
/// # Errors
///
/// Returns an error if a recorder is already installed or the listener
/// cannot be set up.
pub fn install_prometheus(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    register_metrics();
    tracing::info!(address = %addr, "Prometheus exporter listening");
    Ok(())
}
