//! Purchase rows.
//!
//! The orchestrator in the web crate drives these in order:
//! `create_pending_purchase` → (provider call) → `attach_tx_ref` or
//! `delete_pending_purchase`, then later `settle_purchase`.

use crate::error::db_error;
use crate::rows::{PurchaseRow, PurchaseSummaryRow, PURCHASE_COLUMNS};
use crate::PostgresStore;
use recipe_hub_core::purchase::PurchaseSummary;
use recipe_hub_core::{
    Error, Money, Purchase, PurchaseId, PurchaseStatus, RecipeId, Result, UserId,
};

impl PostgresStore {
    /// Insert a pending purchase.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] if the user already holds a pending or
    /// completed purchase for the recipe. The partial unique index turns a
    /// concurrent double submit into the same conflict.
    pub async fn create_pending_purchase(
        &self,
        user: UserId,
        recipe: RecipeId,
        amount: Money,
    ) -> Result<Purchase> {
        let (live,): (bool,) = sqlx::query_as(
            r"
            SELECT EXISTS(
                SELECT 1 FROM purchases
                WHERE user_id = $1 AND recipe_id = $2 AND status <> 'failed'
            )
            ",
        )
        .bind(user.as_uuid())
        .bind(recipe.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("check existing purchase"))?;
        if live {
            return Err(Error::conflict("recipe already purchased or payment pending"));
        }

        let row: PurchaseRow = sqlx::query_as(&format!(
            r"
            INSERT INTO purchases (id, user_id, recipe_id, amount_cents, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING {PURCHASE_COLUMNS}
            "
        ))
        .bind(PurchaseId::new().as_uuid())
        .bind(user.as_uuid())
        .bind(recipe.as_uuid())
        .bind(amount.cents())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("create purchase"))?;

        row.try_into()
    }

    /// Record the provider transaction reference on a pending purchase.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the purchase no longer exists.
    pub async fn attach_tx_ref(&self, purchase: PurchaseId, tx_ref: &str) -> Result<Purchase> {
        let row: Option<PurchaseRow> = sqlx::query_as(&format!(
            r"
            UPDATE purchases SET tx_ref = $2, updated_at = now()
            WHERE id = $1
            RETURNING {PURCHASE_COLUMNS}
            "
        ))
        .bind(purchase.as_uuid())
        .bind(tx_ref)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("attach transaction reference"))?;

        row.ok_or_else(|| Error::not_found("Purchase", purchase))?
            .try_into()
    }

    /// Compensating delete for a purchase whose checkout never opened.
    /// Only pending rows are removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete_pending_purchase(&self, purchase: PurchaseId) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM purchases WHERE id = $1 AND status = 'pending'")
            .bind(purchase.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error("delete pending purchase"))?
            .rows_affected()
            > 0;
        Ok(deleted)
    }

    /// Look a purchase up by provider transaction reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_purchase_by_tx_ref(&self, tx_ref: &str) -> Result<Option<Purchase>> {
        let row: Option<PurchaseRow> = sqlx::query_as(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases WHERE tx_ref = $1"
        ))
        .bind(tx_ref)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("find purchase"))?;
        row.map(Purchase::try_from).transpose()
    }

    /// Move a pending purchase to `status`.
    ///
    /// The update only matches `status = 'pending'`, so when two callbacks
    /// race the first one wins and both return the stored terminal value.
    ///
    /// # Errors
    ///
    /// - [`Error::Conflict`] if `status` is not a terminal state
    /// - [`Error::NotFound`] if the purchase does not exist
    pub async fn settle_purchase(
        &self,
        purchase: PurchaseId,
        status: PurchaseStatus,
    ) -> Result<Purchase> {
        PurchaseStatus::Pending.transition(status)?;

        let updated: Option<PurchaseRow> = sqlx::query_as(&format!(
            r"
            UPDATE purchases SET status = $2, updated_at = now()
            WHERE id = $1 AND status = 'pending'
            RETURNING {PURCHASE_COLUMNS}
            "
        ))
        .bind(purchase.as_uuid())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("settle purchase"))?;

        if let Some(row) = updated {
            tracing::info!(purchase_id = %purchase, status = %status, "Purchase settled");
            return row.try_into();
        }

        let current: Option<PurchaseRow> = sqlx::query_as(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases WHERE id = $1"
        ))
        .bind(purchase.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("load purchase"))?;

        let current: Purchase = current
            .ok_or_else(|| Error::not_found("Purchase", purchase))?
            .try_into()?;
        tracing::debug!(
            purchase_id = %purchase,
            status = %current.status,
            "Purchase already settled"
        );
        Ok(current)
    }

    /// The user's purchases, newest first, with recipe title and image.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_purchases(&self, user: UserId) -> Result<Vec<PurchaseSummary>> {
        let rows: Vec<PurchaseSummaryRow> = sqlx::query_as(
            r"
            SELECT p.id, p.user_id, p.recipe_id, p.amount_cents, p.tx_ref, p.status,
                   p.created_at, p.updated_at,
                   r.title AS recipe_title, r.featured_image_url AS recipe_image_url
            FROM purchases p
            JOIN recipes r ON r.id = p.recipe_id
            WHERE p.user_id = $1
            ORDER BY p.created_at DESC, p.id
            ",
        )
        .bind(user.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list purchases"))?;

        rows.into_iter().map(PurchaseSummary::try_from).collect()
    }
}
