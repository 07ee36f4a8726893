//! Categories and their startup seed.

use crate::error::db_error;
use crate::rows::CategoryRow;
use crate::PostgresStore;
use recipe_hub_core::recipe::DEFAULT_CATEGORIES;
use recipe_hub_core::{Category, CategoryId, Result};

impl PostgresStore {
    /// Insert every default category that is not already present by name.
    ///
    /// Safe to call on every startup. Returns how many were inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if an insert fails.
    pub async fn seed_default_categories(&self) -> Result<u64> {
        let mut inserted = 0;
        for (name, description) in DEFAULT_CATEGORIES {
            inserted += sqlx::query(
                r"
                INSERT INTO categories (id, name, description)
                VALUES ($1, $2, $3)
                ON CONFLICT (name) DO NOTHING
                ",
            )
            .bind(CategoryId::new().as_uuid())
            .bind(name)
            .bind(description)
            .execute(&self.pool)
            .await
            .map_err(db_error("seed categories"))?
            .rows_affected();
        }

        if inserted > 0 {
            tracing::info!(inserted, "Seeded default categories");
        }
        Ok(inserted)
    }

    /// All categories, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows: Vec<CategoryRow> = sqlx::query_as(
            "SELECT id, name, description, image_url FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list categories"))?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// One category by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_category(&self, category_id: CategoryId) -> Result<Option<Category>> {
        let row: Option<CategoryRow> = sqlx::query_as(
            "SELECT id, name, description, image_url FROM categories WHERE id = $1",
        )
        .bind(category_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("get category"))?;
        Ok(row.map(Category::from))
    }
}
