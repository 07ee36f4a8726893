//! Category endpoints.
//!
//! - GET /api/categories - All categories, by name
//! - GET /api/categories/:id/recipes - Published recipes in a category, paginated

use crate::error::AppError;
use crate::extractors::{PathParams, QueryParams};
use crate::state::AppState;
use axum::{Json, extract::State};
use recipe_hub_core::{Category, CategoryId, Page, Pagination, Recipe};
use serde::{Deserialize, Serialize};

/// `?page=&limit=`
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Requested page
    pub page: Option<i64>,
    /// Requested page size
    pub limit: Option<i64>,
}

/// A category with one page of its recipes.
#[derive(Debug, Serialize)]
pub struct CategoryRecipesResponse {
    /// The category
    pub category: Category,
    /// The page
    #[serde(flatten)]
    pub page: Page<Recipe>,
}

/// List every category.
///
/// # Errors
///
/// - 503 if the database is unavailable
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.store.list_categories().await?))
}

/// Browse a category.
///
/// # Errors
///
/// - 404 for an unknown category
pub async fn category_recipes(
    State(state): State<AppState>,
    PathParams(category_id): PathParams<CategoryId>,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<Json<CategoryRecipesResponse>, AppError> {
    let pagination = Pagination::new(query.page, query.limit);
    let (category, page) = state.store.category_recipes(category_id, pagination).await?;
    Ok(Json(CategoryRecipesResponse { category, page }))
}
