//! # Recipe Hub Testing
//!
//! Testing utilities and helpers for Recipe Hub.
//!
//! This crate provides:
//! - Mock implementations of the service seams (`FixedClock`, `MockPaymentGateway`)
//! - A disposable `PostgreSQL` database per test (`TestDatabase`)
//! - Fixtures for users, categories and recipes
//!
//! ## Example
//!
//! ```ignore
//! use recipe_hub_testing::{fixtures, TestDatabase};
//!
//! #[tokio::test]
//! async fn test_like_flow() {
//!     let db = TestDatabase::start().await;
//!     let owner = fixtures::user(db.store(), "owner").await;
//!     let recipe = fixtures::recipe(db.store(), &owner, "Shiro").await;
//!
//!     let toggle = db.store().toggle_like(owner.id, recipe.recipe.id).await.unwrap();
//!     assert!(toggle.liked);
//! }
//! ```

pub mod database;
pub mod fixtures;
pub mod mocks;

pub use database::TestDatabase;
pub use mocks::{FixedClock, MockPaymentGateway, test_clock};

/// Install a `tracing` subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recipe_hub=debug,sqlx=warn".into()),
        )
        .with_test_writer()
        .try_init();
}
