//! Interaction endpoints. All require authentication.
//!
//! - POST /api/recipes/:id/like - Toggle like
//! - POST /api/recipes/:id/bookmark - Toggle bookmark
//! - POST /api/recipes/:id/rating - Rate 1 to 5, replacing any earlier rating
//! - DELETE /api/recipes/:id/rating - Withdraw the caller's rating
//! - POST /api/recipes/:id/comment - Comment
//! - POST /api/recipes/:id/images - Attach an image (owner only)
//! - PUT /api/recipes/:id/images/:image_id/featured - Feature an image (owner only)

use crate::error::AppError;
use crate::extractors::{AuthUser, JsonBody, PathParams};
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use recipe_hub_core::{
    Comment, ImageId, LikeToggle, RatingSummary, RatingValue, RecipeId, RecipeImage,
};
use serde::{Deserialize, Serialize};

/// `{"rating": 1..=5}`
#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    /// Stars
    pub rating: i64,
}

/// `{"content": "..."}`
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    /// Comment body
    pub content: String,
}

/// `{"image_url": "...", "is_featured": false}`
#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    /// Image URL, typically from `/api/upload`
    pub image_url: String,
    /// Make this the featured image
    #[serde(default)]
    pub is_featured: bool,
}

/// Bookmark state after a toggle.
#[derive(Debug, Serialize)]
pub struct BookmarkResponse {
    /// Whether the caller now has it bookmarked
    pub bookmarked: bool,
}

/// Toggle the caller's like.
///
/// # Errors
///
/// - 404 if the recipe is not in the public catalog
pub async fn toggle_like(
    State(state): State<AppState>,
    user: AuthUser,
    PathParams(recipe_id): PathParams<RecipeId>,
) -> Result<Json<LikeToggle>, AppError> {
    Ok(Json(state.store.toggle_like(user.user_id, recipe_id).await?))
}

/// Toggle the caller's bookmark.
///
/// # Errors
///
/// - 404 if the recipe is not in the public catalog
pub async fn toggle_bookmark(
    State(state): State<AppState>,
    user: AuthUser,
    PathParams(recipe_id): PathParams<RecipeId>,
) -> Result<Json<BookmarkResponse>, AppError> {
    let bookmarked = state.store.toggle_bookmark(user.user_id, recipe_id).await?;
    Ok(Json(BookmarkResponse { bookmarked }))
}

/// Rate a recipe.
///
/// # Errors
///
/// - 422 for a rating outside 1..=5
/// - 404 if the recipe is not in the public catalog
pub async fn rate_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    PathParams(recipe_id): PathParams<RecipeId>,
    JsonBody(request): JsonBody<RatingRequest>,
) -> Result<Json<RatingSummary>, AppError> {
    let rating = RatingValue::new(request.rating)?;
    Ok(Json(
        state
            .store
            .rate_recipe(user.user_id, recipe_id, rating)
            .await?,
    ))
}

/// Withdraw the caller's rating.
///
/// # Errors
///
/// - 404 if the caller has not rated the recipe
pub async fn remove_rating(
    State(state): State<AppState>,
    user: AuthUser,
    PathParams(recipe_id): PathParams<RecipeId>,
) -> Result<Json<RatingSummary>, AppError> {
    Ok(Json(
        state.store.remove_rating(user.user_id, recipe_id).await?,
    ))
}

/// Comment on a recipe.
///
/// # Errors
///
/// - 422 for blank content
/// - 404 if the recipe is not in the public catalog
pub async fn add_comment(
    State(state): State<AppState>,
    user: AuthUser,
    PathParams(recipe_id): PathParams<RecipeId>,
    JsonBody(request): JsonBody<CommentRequest>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let comment = state
        .store
        .add_comment(user.user_id, recipe_id, &request.content)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// Attach an image to a recipe the caller owns.
///
/// # Errors
///
/// - 422 for a blank URL
/// - 404 if the caller does not own the recipe
pub async fn add_image(
    State(state): State<AppState>,
    user: AuthUser,
    PathParams(recipe_id): PathParams<RecipeId>,
    JsonBody(request): JsonBody<ImageRequest>,
) -> Result<(StatusCode, Json<RecipeImage>), AppError> {
    let image = state
        .store
        .add_image(user.user_id, recipe_id, &request.image_url, request.is_featured)
        .await?;
    Ok((StatusCode::CREATED, Json(image)))
}

/// Make an existing image the featured one.
///
/// # Errors
///
/// - 404 if the caller does not own the recipe or the image is not on it
pub async fn feature_image(
    State(state): State<AppState>,
    user: AuthUser,
    PathParams((recipe_id, image_id)): PathParams<(RecipeId, ImageId)>,
) -> Result<Json<RecipeImage>, AppError> {
    Ok(Json(
        state
            .store
            .feature_image(user.user_id, recipe_id, image_id)
            .await?,
    ))
}
