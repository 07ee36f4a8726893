//! Composite recipe writer and single-recipe reads.

use crate::error::db_error;
use crate::rows::{CommentRow, ImageRow, IngredientRow, RecipeRow, StepRow, RECIPE_SELECT};
use crate::PostgresStore;
use recipe_hub_core::{
    CategoryId, Comment, Error, ImageId, Ingredient, Interactions, NewRecipe, Recipe,
    RecipeChanges, RecipeDetail, RecipeId, RecipeImage, Result, Step, UserId,
};
use sqlx::{Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

/// State of a recipe row read under `FOR UPDATE`.
pub(crate) struct LockedRecipe {
    pub(crate) owner: Uuid,
    pub(crate) is_published: bool,
    pub(crate) deleted: bool,
}

impl LockedRecipe {
    /// Fails with not-found unless the recipe is in the public catalog.
    pub(crate) fn ensure_visible(&self, recipe: RecipeId) -> Result<()> {
        if self.is_published && !self.deleted {
            Ok(())
        } else {
            Err(Error::not_found("Recipe", recipe))
        }
    }

    /// Fails with not-found unless `owner` owns the live recipe.
    pub(crate) fn ensure_owned_by(&self, owner: UserId, recipe: RecipeId) -> Result<()> {
        if self.owner == *owner.as_uuid() && !self.deleted {
            Ok(())
        } else {
            Err(Error::not_found("Recipe", recipe))
        }
    }
}

/// Lock the recipe row for the rest of the transaction.
pub(crate) async fn lock_recipe(
    tx: &mut Transaction<'_, Postgres>,
    recipe: RecipeId,
) -> Result<LockedRecipe> {
    let row: Option<(Uuid, bool, bool)> = sqlx::query_as(
        r"
        SELECT user_id, is_published, deleted_at IS NOT NULL
        FROM recipes
        WHERE id = $1
        FOR UPDATE
        ",
    )
    .bind(recipe.as_uuid())
    .fetch_optional(&mut **tx)
    .await
    .map_err(db_error("lock recipe"))?;

    let (owner, is_published, deleted) = row.ok_or_else(|| Error::not_found("Recipe", recipe))?;
    Ok(LockedRecipe {
        owner,
        is_published,
        deleted,
    })
}

/// Insert an image; when `featured`, clear every sibling first and stamp the
/// recipe's `featured_image_url`.
pub(crate) async fn insert_image(
    tx: &mut Transaction<'_, Postgres>,
    recipe: RecipeId,
    url: &str,
    featured: bool,
) -> Result<RecipeImage> {
    if featured {
        clear_featured(tx, recipe).await?;
    }

    let row: ImageRow = sqlx::query_as(
        r"
        INSERT INTO recipe_images (id, recipe_id, image_url, is_featured)
        VALUES ($1, $2, $3, $4)
        RETURNING id, recipe_id, image_url, is_featured, created_at
        ",
    )
    .bind(ImageId::new().as_uuid())
    .bind(recipe.as_uuid())
    .bind(url)
    .bind(featured)
    .fetch_one(&mut **tx)
    .await
    .map_err(db_error("insert recipe image"))?;

    if featured {
        stamp_featured_url(tx, recipe, url).await?;
    }
    Ok(row.into())
}

pub(crate) async fn clear_featured(
    tx: &mut Transaction<'_, Postgres>,
    recipe: RecipeId,
) -> Result<()> {
    sqlx::query("UPDATE recipe_images SET is_featured = FALSE WHERE recipe_id = $1 AND is_featured")
        .bind(recipe.as_uuid())
        .execute(&mut **tx)
        .await
        .map_err(db_error("clear featured image"))?;
    Ok(())
}

pub(crate) async fn stamp_featured_url(
    tx: &mut Transaction<'_, Postgres>,
    recipe: RecipeId,
    url: &str,
) -> Result<()> {
    sqlx::query("UPDATE recipes SET featured_image_url = $2, updated_at = now() WHERE id = $1")
        .bind(recipe.as_uuid())
        .bind(url)
        .execute(&mut **tx)
        .await
        .map_err(db_error("set featured image url"))?;
    Ok(())
}

async fn ensure_category(tx: &mut Transaction<'_, Postgres>, category: CategoryId) -> Result<()> {
    let (exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
            .bind(category.as_uuid())
            .fetch_one(&mut **tx)
            .await
            .map_err(db_error("check category"))?;
    if exists {
        Ok(())
    } else {
        Err(Error::validation(format!("category {category} does not exist")))
    }
}

impl PostgresStore {
    /// Create a recipe with all its ingredients, steps and images atomically.
    ///
    /// Returns the aggregate as read back after commit.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if the category does not exist (nothing is written)
    /// - [`Error::Integrity`] if any insert fails; the whole unit is rolled back
    pub async fn create_recipe(&self, owner: UserId, recipe: &NewRecipe) -> Result<RecipeDetail> {
        let recipe_id = RecipeId::new();
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        ensure_category(&mut tx, recipe.category_id()).await?;

        sqlx::query(
            r"
            INSERT INTO recipes (
                id, user_id, category_id, title, description, featured_image_url,
                preparation_time, cooking_time, servings, difficulty, price_cents, is_published
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, TRUE)
            ",
        )
        .bind(recipe_id.as_uuid())
        .bind(owner.as_uuid())
        .bind(recipe.category_id().as_uuid())
        .bind(recipe.title())
        .bind(recipe.description())
        .bind(recipe.featured_image_url())
        .bind(recipe.preparation_time())
        .bind(recipe.cooking_time())
        .bind(recipe.servings())
        .bind(recipe.difficulty().as_str())
        .bind(recipe.price().cents())
        .execute(&mut *tx)
        .await
        .map_err(db_error("insert recipe"))?;

        let mut ingredients = QueryBuilder::<Postgres>::new(
            "INSERT INTO ingredients (id, recipe_id, name, quantity, unit, position) ",
        );
        ingredients.push_values(recipe.ingredients(), |mut row, ingredient| {
            row.push_bind(Uuid::new_v4())
                .push_bind(*recipe_id.as_uuid())
                .push_bind(ingredient.name.clone())
                .push_bind(ingredient.quantity.clone())
                .push_bind(ingredient.unit.clone())
                .push_bind(ingredient.position);
        });
        ingredients
            .build()
            .execute(&mut *tx)
            .await
            .map_err(db_error("insert ingredients"))?;

        let mut steps = QueryBuilder::<Postgres>::new(
            "INSERT INTO steps (id, recipe_id, step_number, instruction, image_url) ",
        );
        steps.push_values(recipe.steps(), |mut row, step| {
            row.push_bind(Uuid::new_v4())
                .push_bind(*recipe_id.as_uuid())
                .push_bind(step.step_number)
                .push_bind(step.instruction.clone())
                .push_bind(step.image_url.clone());
        });
        steps
            .build()
            .execute(&mut *tx)
            .await
            .map_err(db_error("insert steps"))?;

        for image in recipe.images() {
            insert_image(&mut tx, recipe_id, &image.url, image.featured).await?;
        }

        tx.commit().await.map_err(db_error("commit recipe"))?;

        tracing::info!(
            recipe_id = %recipe_id,
            owner = %owner,
            ingredients = recipe.ingredients().len(),
            steps = recipe.steps().len(),
            images = recipe.images().len(),
            "Recipe created"
        );
        metrics::counter!("recipes.created").increment(1);

        self.get_recipe(recipe_id, Some(owner)).await
    }

    /// Apply validated changes to a recipe the caller owns.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the recipe is missing, deleted, or not owned by
    ///   `owner`
    /// - [`Error::Validation`] if the new category does not exist
    pub async fn update_recipe(
        &self,
        owner: UserId,
        recipe_id: RecipeId,
        changes: &RecipeChanges,
    ) -> Result<RecipeDetail> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;
        lock_recipe(&mut tx, recipe_id)
            .await?
            .ensure_owned_by(owner, recipe_id)?;

        if let Some(category) = changes.category_id {
            ensure_category(&mut tx, category).await?;
        }

        sqlx::query(
            r"
            UPDATE recipes SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                preparation_time = COALESCE($4, preparation_time),
                cooking_time = COALESCE($5, cooking_time),
                servings = COALESCE($6, servings),
                difficulty = COALESCE($7, difficulty),
                category_id = COALESCE($8, category_id),
                price_cents = COALESCE($9, price_cents),
                is_published = COALESCE($10, is_published),
                updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(recipe_id.as_uuid())
        .bind(changes.title.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.preparation_time)
        .bind(changes.cooking_time)
        .bind(changes.servings)
        .bind(changes.difficulty.map(|d| d.as_str()))
        .bind(changes.category_id.map(|c| *c.as_uuid()))
        .bind(changes.price.map(|p| p.cents()))
        .bind(changes.is_published)
        .execute(&mut *tx)
        .await
        .map_err(db_error("update recipe"))?;

        tx.commit().await.map_err(db_error("commit recipe update"))?;
        tracing::info!(recipe_id = %recipe_id, owner = %owner, "Recipe updated");

        self.get_recipe(recipe_id, Some(owner)).await
    }

    /// Soft-delete a recipe the caller owns. The aggregate stays attached but
    /// disappears from every public read path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the recipe is missing, already deleted,
    /// or owned by someone else.
    pub async fn delete_recipe(&self, owner: UserId, recipe_id: RecipeId) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE recipes SET deleted_at = now(), updated_at = now()
            WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
            ",
        )
        .bind(recipe_id.as_uuid())
        .bind(owner.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(db_error("delete recipe"))?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("Recipe", recipe_id));
        }
        tracing::info!(recipe_id = %recipe_id, owner = %owner, "Recipe soft-deleted");
        Ok(())
    }

    /// The recipe row with owner and category, if `viewer` may see it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if it does not exist or is hidden from
    /// `viewer`.
    pub async fn get_recipe_summary(
        &self,
        recipe_id: RecipeId,
        viewer: Option<UserId>,
    ) -> Result<Recipe> {
        let row: Option<RecipeRow> = sqlx::query_as(&format!("{RECIPE_SELECT} WHERE r.id = $1"))
            .bind(recipe_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("load recipe"))?;

        let recipe = row
            .map(Recipe::try_from)
            .transpose()?
            .filter(|recipe| recipe.is_visible_to(viewer))
            .ok_or_else(|| Error::not_found("Recipe", recipe_id))?;
        Ok(recipe)
    }

    /// The fully materialized aggregate.
    ///
    /// Owners see their own unpublished or soft-deleted recipes; everyone
    /// else gets not-found.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if it does not exist or is hidden from
    /// `viewer`.
    pub async fn get_recipe(
        &self,
        recipe_id: RecipeId,
        viewer: Option<UserId>,
    ) -> Result<RecipeDetail> {
        let recipe = self.get_recipe_summary(recipe_id, viewer).await?;

        let ingredients: Vec<IngredientRow> = sqlx::query_as(
            r"
            SELECT id, name, quantity, unit, position
            FROM ingredients WHERE recipe_id = $1
            ORDER BY position
            ",
        )
        .bind(recipe_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("load ingredients"))?;

        let steps: Vec<StepRow> = sqlx::query_as(
            r"
            SELECT id, step_number, instruction, image_url
            FROM steps WHERE recipe_id = $1
            ORDER BY step_number
            ",
        )
        .bind(recipe_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("load steps"))?;

        let images: Vec<ImageRow> = sqlx::query_as(
            r"
            SELECT id, recipe_id, image_url, is_featured, created_at
            FROM recipe_images WHERE recipe_id = $1
            ORDER BY is_featured DESC, created_at, id
            ",
        )
        .bind(recipe_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("load images"))?;

        let comments: Vec<CommentRow> = sqlx::query_as(
            r"
            SELECT c.id, c.recipe_id, c.content, c.created_at,
                   u.id AS user_id, u.username, u.avatar_url
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.recipe_id = $1
            ORDER BY c.created_at DESC, c.id
            ",
        )
        .bind(recipe_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("load comments"))?;

        Ok(RecipeDetail {
            recipe,
            ingredients: ingredients.into_iter().map(Ingredient::from).collect(),
            steps: steps.into_iter().map(Step::from).collect(),
            images: images.into_iter().map(RecipeImage::from).collect(),
            comments: comments.into_iter().map(Comment::from).collect(),
        })
    }

    /// The viewer's like, bookmark and rating for a recipe. Missing rows are
    /// `false` / `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn interactions(&self, viewer: UserId, recipe_id: RecipeId) -> Result<Interactions> {
        let (liked, bookmarked, rating): (bool, bool, Option<i16>) = sqlx::query_as(
            r"
            SELECT
                EXISTS(SELECT 1 FROM likes WHERE user_id = $1 AND recipe_id = $2),
                EXISTS(SELECT 1 FROM bookmarks WHERE user_id = $1 AND recipe_id = $2),
                (SELECT rating FROM ratings WHERE user_id = $1 AND recipe_id = $2)
            ",
        )
        .bind(viewer.as_uuid())
        .bind(recipe_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("load interactions"))?;

        Ok(Interactions {
            liked,
            bookmarked,
            rating: rating.and_then(|r| u8::try_from(r).ok()),
        })
    }
}
