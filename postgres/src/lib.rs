//! `PostgreSQL` catalog store for Recipe Hub.
//!
//! This crate owns every table of the application and the write paths that
//! keep them consistent:
//!
//! - **Composite recipe writer**: a recipe with its ingredients, steps and
//!   images is committed in one transaction or not at all
//! - **Social aggregate maintainer**: `like_count`, `average_rating`,
//!   `total_ratings` and the single featured image are updated in the same
//!   transaction as the row that changes them, under a `FOR UPDATE` lock on
//!   the recipe row
//! - **Catalog queries**: full-text search, filters and pagination
//! - **Purchases**: pending rows, compensation and conditional settlement
//!
//! # Example
//!
//! ```no_run
//! use recipe_hub_postgres::PostgresStore;
//!
//! # async fn example() -> Result<(), recipe_hub_core::Error> {
//! let store = PostgresStore::connect("postgres://localhost/recipe_hub", 10).await?;
//! store.migrate().await?;
//! store.seed_default_categories().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
mod categories;
mod error;
mod purchases;
mod recipes;
mod rows;
mod social;
mod users;

use error::db_error;
use recipe_hub_core::{Error, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Connection pool wrapper implementing every persistence operation.
///
/// Cloning is cheap; clones share the pool.
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect to `database_url` with at most `max_connections` connections.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dependency`] if the database cannot be reached.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        Self::connect_with_timeout(database_url, max_connections, Duration::from_secs(10)).await
    }

    /// Connect with an explicit acquire timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dependency`] if the database cannot be reached.
    pub async fn connect_with_timeout(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await
            .map_err(|e| Error::Dependency(format!("failed to connect to database: {e}")))?;

        tracing::info!(max_connections, "Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Integrity`] if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Integrity(format!("migration failed: {e}")))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// Cheap liveness check used by the readiness endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dependency`] if the database does not answer.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_error("ping database"))?;
        Ok(())
    }
}
