//! Recipe endpoints.
//!
//! - GET /api/recipes - Search the published catalog, paginated
//! - GET /api/recipes/:id - One recipe with the viewer's interactions
//! - POST /api/recipes - Create a recipe with ingredients, steps and images (requires auth)
//! - PUT /api/recipes/:id - Update a recipe's own fields (requires ownership)
//! - DELETE /api/recipes/:id - Soft-delete a recipe (requires ownership)

use crate::error::AppError;
use crate::extractors::{AuthUser, JsonBody, MaybeAuthUser, PathParams, QueryParams};
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use recipe_hub_core::{
    CatalogQuery, Error, Interactions, Page, Recipe, RecipeDetail, RecipeDraft, RecipeId,
    RecipeUpdate,
};
use serde::Serialize;

/// A recipe as seen by one viewer.
#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    /// The aggregate
    pub recipe: RecipeDetail,
    /// Viewer liked it
    pub user_liked: bool,
    /// Viewer bookmarked it
    pub user_bookmarked: bool,
    /// Viewer's rating
    pub user_rating: Option<u8>,
}

/// Plain acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// What happened
    pub message: &'static str,
}

/// Search the catalog.
///
/// `?page=&limit=&q=&category_id=&max_time=&ingredient=&min_rating=`, all
/// optional and AND-combined. Newest first.
///
/// # Errors
///
/// - 400 for an unparseable query string
pub async fn list_recipes(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<CatalogQuery>,
) -> Result<Json<Page<Recipe>>, AppError> {
    let (filters, pagination) = query.into_parts();
    Ok(Json(state.store.search_recipes(&filters, pagination).await?))
}

/// Load one recipe.
///
/// Anonymous viewers get the published recipe with every interaction flag
/// unset; owners also see their unpublished and deleted recipes.
///
/// # Errors
///
/// - 404 if it does not exist or is hidden from the viewer
pub async fn get_recipe(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    PathParams(recipe_id): PathParams<RecipeId>,
) -> Result<Json<RecipeResponse>, AppError> {
    let recipe = state.store.get_recipe(recipe_id, viewer.user_id()).await?;
    let interactions = match viewer.user_id() {
        Some(user) => state.store.interactions(user, recipe_id).await?,
        None => Interactions::default(),
    };

    Ok(Json(RecipeResponse {
        recipe,
        user_liked: interactions.liked,
        user_bookmarked: interactions.bookmarked,
        user_rating: interactions.rating,
    }))
}

/// Create a recipe.
///
/// Ingredients, steps and images are written in one transaction; any
/// failure leaves nothing behind.
///
/// # Errors
///
/// - 422 for invalid fields
/// - 404 for an unknown category
pub async fn create_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(draft): JsonBody<RecipeDraft>,
) -> Result<(StatusCode, Json<RecipeDetail>), AppError> {
    let recipe = draft.validate()?;
    let created = state.store.create_recipe(user.user_id, &recipe).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a recipe's scalar fields.
///
/// # Errors
///
/// - 422 for invalid fields or an empty update
/// - 404 if the caller does not own the recipe
pub async fn update_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    PathParams(recipe_id): PathParams<RecipeId>,
    JsonBody(update): JsonBody<RecipeUpdate>,
) -> Result<Json<RecipeDetail>, AppError> {
    let changes = update.validate()?;
    if changes.is_empty() {
        return Err(Error::validation("no fields to update").into());
    }
    Ok(Json(
        state
            .store
            .update_recipe(user.user_id, recipe_id, &changes)
            .await?,
    ))
}

/// Soft-delete a recipe.
///
/// # Errors
///
/// - 404 if the caller does not own the recipe or it is already deleted
pub async fn delete_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    PathParams(recipe_id): PathParams<RecipeId>,
) -> Result<Json<MessageResponse>, AppError> {
    state.store.delete_recipe(user.user_id, recipe_id).await?;
    Ok(Json(MessageResponse {
        message: "Recipe deleted successfully",
    }))
}
