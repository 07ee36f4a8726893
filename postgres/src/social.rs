//! Social aggregate maintenance.
//!
//! Every write here runs in a transaction that first locks the recipe row
//! (`SELECT ... FOR UPDATE`). Concurrent writers for one recipe therefore
//! serialize, and each recompute sees every committed rating, like and image.

use crate::error::db_error;
use crate::recipes::{clear_featured, insert_image, lock_recipe, stamp_featured_url};
use crate::rows::{CommentRow, ImageRow};
use crate::PostgresStore;
use recipe_hub_core::social::{comment_content, image_url};
use recipe_hub_core::{
    Comment, CommentId, Error, ImageId, LikeToggle, RatingSummary, RatingValue, RecipeId,
    RecipeImage, Result, UserId,
};
use sqlx::{Postgres, Transaction};

/// Recompute and store a recipe's rating aggregate from its rating rows.
async fn recompute_ratings(
    tx: &mut Transaction<'_, Postgres>,
    recipe: RecipeId,
    user_rating: Option<u8>,
) -> Result<RatingSummary> {
    let (sum, count): (i64, i64) = sqlx::query_as(
        "SELECT COALESCE(SUM(rating), 0)::BIGINT, COUNT(*) FROM ratings WHERE recipe_id = $1",
    )
    .bind(recipe.as_uuid())
    .fetch_one(&mut **tx)
    .await
    .map_err(db_error("aggregate ratings"))?;

    let summary = RatingSummary::from_totals(sum, count, user_rating);

    sqlx::query("UPDATE recipes SET average_rating = $2, total_ratings = $3 WHERE id = $1")
        .bind(recipe.as_uuid())
        .bind(summary.average_rating)
        .bind(summary.total_ratings)
        .execute(&mut **tx)
        .await
        .map_err(db_error("store rating aggregate"))?;

    Ok(summary)
}

impl PostgresStore {
    /// Like the recipe if the user has not, unlike it if they have.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the recipe is not in the public catalog.
    pub async fn toggle_like(&self, user: UserId, recipe: RecipeId) -> Result<LikeToggle> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;
        lock_recipe(&mut tx, recipe).await?.ensure_visible(recipe)?;

        let removed = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND recipe_id = $2")
            .bind(user.as_uuid())
            .bind(recipe.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(db_error("remove like"))?
            .rows_affected()
            > 0;

        if !removed {
            sqlx::query("INSERT INTO likes (user_id, recipe_id) VALUES ($1, $2)")
                .bind(user.as_uuid())
                .bind(recipe.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(db_error("add like"))?;
        }

        let delta: i64 = if removed { -1 } else { 1 };
        let (like_count,): (i64,) = sqlx::query_as(
            "UPDATE recipes SET like_count = like_count + $2 WHERE id = $1 RETURNING like_count",
        )
        .bind(recipe.as_uuid())
        .bind(delta)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("update like count"))?;

        tx.commit().await.map_err(db_error("commit like"))?;

        let liked = !removed;
        tracing::info!(recipe_id = %recipe, user_id = %user, liked, like_count, "Like toggled");
        metrics::counter!("recipes.likes.toggled").increment(1);

        Ok(LikeToggle { liked, like_count })
    }

    /// Bookmark or un-bookmark a recipe. Returns the new bookmarked state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the recipe is not in the public catalog.
    pub async fn toggle_bookmark(&self, user: UserId, recipe: RecipeId) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;
        lock_recipe(&mut tx, recipe).await?.ensure_visible(recipe)?;

        let removed = sqlx::query("DELETE FROM bookmarks WHERE user_id = $1 AND recipe_id = $2")
            .bind(user.as_uuid())
            .bind(recipe.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(db_error("remove bookmark"))?
            .rows_affected()
            > 0;

        if !removed {
            sqlx::query("INSERT INTO bookmarks (user_id, recipe_id) VALUES ($1, $2)")
                .bind(user.as_uuid())
                .bind(recipe.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(db_error("add bookmark"))?;
        }

        tx.commit().await.map_err(db_error("commit bookmark"))?;
        tracing::debug!(recipe_id = %recipe, user_id = %user, bookmarked = !removed, "Bookmark toggled");
        Ok(!removed)
    }

    /// Insert or replace the user's rating and recompute the aggregate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the recipe is not in the public catalog.
    pub async fn rate_recipe(
        &self,
        user: UserId,
        recipe: RecipeId,
        rating: RatingValue,
    ) -> Result<RatingSummary> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;
        lock_recipe(&mut tx, recipe).await?.ensure_visible(recipe)?;

        sqlx::query(
            r"
            INSERT INTO ratings (user_id, recipe_id, rating)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, recipe_id)
            DO UPDATE SET rating = EXCLUDED.rating, updated_at = now()
            ",
        )
        .bind(user.as_uuid())
        .bind(recipe.as_uuid())
        .bind(i16::from(rating.get()))
        .execute(&mut *tx)
        .await
        .map_err(db_error("upsert rating"))?;

        let summary = recompute_ratings(&mut tx, recipe, Some(rating.get())).await?;
        tx.commit().await.map_err(db_error("commit rating"))?;

        tracing::info!(
            recipe_id = %recipe,
            user_id = %user,
            rating = rating.get(),
            average_rating = summary.average_rating,
            total_ratings = summary.total_ratings,
            "Rating submitted"
        );
        metrics::counter!("recipes.ratings.submitted").increment(1);

        Ok(summary)
    }

    /// Remove the user's rating and recompute the aggregate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the recipe is not in the public catalog
    /// or the user has not rated it.
    pub async fn remove_rating(&self, user: UserId, recipe: RecipeId) -> Result<RatingSummary> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;
        lock_recipe(&mut tx, recipe).await?.ensure_visible(recipe)?;

        let removed = sqlx::query("DELETE FROM ratings WHERE user_id = $1 AND recipe_id = $2")
            .bind(user.as_uuid())
            .bind(recipe.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(db_error("remove rating"))?
            .rows_affected();
        if removed == 0 {
            return Err(Error::not_found("Rating", recipe));
        }

        let summary = recompute_ratings(&mut tx, recipe, None).await?;
        tx.commit().await.map_err(db_error("commit rating removal"))?;

        tracing::info!(recipe_id = %recipe, user_id = %user, "Rating removed");
        Ok(summary)
    }

    /// Add a comment to a recipe.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if the content is blank
    /// - [`Error::NotFound`] if the recipe is not in the public catalog
    pub async fn add_comment(&self, user: UserId, recipe: RecipeId, content: &str) -> Result<Comment> {
        let content = comment_content(content)?;
        self.get_recipe_summary(recipe, None).await?;

        let row: CommentRow = sqlx::query_as(
            r"
            WITH inserted AS (
                INSERT INTO comments (id, user_id, recipe_id, content)
                VALUES ($1, $2, $3, $4)
                RETURNING id, user_id, recipe_id, content, created_at
            )
            SELECT i.id, i.recipe_id, i.content, i.created_at,
                   u.id AS user_id, u.username, u.avatar_url
            FROM inserted i
            JOIN users u ON u.id = i.user_id
            ",
        )
        .bind(CommentId::new().as_uuid())
        .bind(user.as_uuid())
        .bind(recipe.as_uuid())
        .bind(&content)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("add comment"))?;

        tracing::info!(recipe_id = %recipe, user_id = %user, "Comment added");
        Ok(row.into())
    }

    /// Attach an image to a recipe the caller owns. A featured image replaces
    /// the previous featured one.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if the URL is blank or contains NUL
    /// - [`Error::NotFound`] if the recipe is missing, deleted, or not owned by
    ///   `owner`
    pub async fn add_image(
        &self,
        owner: UserId,
        recipe: RecipeId,
        url: &str,
        featured: bool,
    ) -> Result<RecipeImage> {
        let url = image_url(url)?;

        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;
        lock_recipe(&mut tx, recipe).await?.ensure_owned_by(owner, recipe)?;
        let image = insert_image(&mut tx, recipe, &url, featured).await?;
        tx.commit().await.map_err(db_error("commit image"))?;

        tracing::info!(recipe_id = %recipe, image_id = %image.id, featured, "Image added");
        Ok(image)
    }

    /// Make an existing image the recipe's single featured image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the recipe is missing, deleted, or not
    /// owned by `owner`, or the image does not belong to it.
    pub async fn feature_image(
        &self,
        owner: UserId,
        recipe: RecipeId,
        image: ImageId,
    ) -> Result<RecipeImage> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;
        lock_recipe(&mut tx, recipe).await?.ensure_owned_by(owner, recipe)?;

        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM recipe_images WHERE id = $1 AND recipe_id = $2)",
        )
        .bind(image.as_uuid())
        .bind(recipe.as_uuid())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("find image"))?;
        if !exists {
            return Err(Error::not_found("Image", image));
        }

        clear_featured(&mut tx, recipe).await?;
        let row: ImageRow = sqlx::query_as(
            r"
            UPDATE recipe_images SET is_featured = TRUE
            WHERE id = $1
            RETURNING id, recipe_id, image_url, is_featured, created_at
            ",
        )
        .bind(image.as_uuid())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("feature image"))?;
        let featured = RecipeImage::from(row);
        stamp_featured_url(&mut tx, recipe, &featured.image_url).await?;

        tx.commit().await.map_err(db_error("commit featured image"))?;
        tracing::info!(recipe_id = %recipe, image_id = %image, "Featured image changed");
        Ok(featured)
    }
}
