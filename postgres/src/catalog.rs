//! Catalog listing, search and category browse.
//!
//! The count and the page are built from the same predicate so `total` and
//! `pages` always describe the rows being paged.

use crate::error::db_error;
use crate::rows::{RecipeRow, RECIPE_SELECT};
use crate::PostgresStore;
use recipe_hub_core::{
    Category, CategoryId, Error, Page, Pagination, Recipe, Result, SearchFilters,
};
use sqlx::{Postgres, QueryBuilder};

/// Escape `%`, `_` and `\` so user text matches literally inside `ILIKE`.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len() + 2);
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Appends the shared `WHERE` clause. Only published, non-deleted recipes.
fn push_predicate(qb: &mut QueryBuilder<'_, Postgres>, filters: &SearchFilters) {
    qb.push(" WHERE r.is_published AND r.deleted_at IS NULL");

    if let Some(q) = &filters.q {
        qb.push(" AND r.search_vector @@ websearch_to_tsquery('english', ")
            .push_bind(q.clone())
            .push(")");
    }
    if let Some(category) = filters.category_id {
        qb.push(" AND r.category_id = ").push_bind(*category.as_uuid());
    }
    if let Some(max_time) = filters.max_time {
        qb.push(" AND (r.preparation_time::BIGINT + r.cooking_time) <= ")
            .push_bind(max_time);
    }
    if let Some(ingredient) = &filters.ingredient {
        qb.push(" AND EXISTS (SELECT 1 FROM ingredients i WHERE i.recipe_id = r.id AND i.name ILIKE ")
            .push_bind(format!("%{}%", escape_like(ingredient)))
            .push(")");
    }
    if let Some(min_rating) = filters.min_rating {
        qb.push(" AND r.average_rating >= ").push_bind(min_rating);
    }
}

impl PostgresStore {
    /// Search the public catalog.
    ///
    /// Ordered newest first, or by full-text rank then newest first when `q`
    /// is present.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn search_recipes(
        &self,
        filters: &SearchFilters,
        pagination: Pagination,
    ) -> Result<Page<Recipe>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM recipes r");
        push_predicate(&mut count, filters);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("count recipes"))?;

        let mut page = QueryBuilder::<Postgres>::new(RECIPE_SELECT);
        push_predicate(&mut page, filters);
        page.push(" ORDER BY ");
        if let Some(q) = &filters.q {
            page.push("ts_rank(r.search_vector, websearch_to_tsquery('english', ")
                .push_bind(q.clone())
                .push(")) DESC, ");
        }
        page.push("r.created_at DESC, r.id DESC LIMIT ")
            .push_bind(i64::from(pagination.limit()))
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows: Vec<RecipeRow> = page
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("search recipes"))?;

        let items = rows
            .into_iter()
            .map(Recipe::try_from)
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            total,
            page = pagination.page(),
            limit = pagination.limit(),
            returned = items.len(),
            "Catalog query"
        );
        Ok(Page::new(items, total, pagination))
    }

    /// One category and a page of its public recipes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the category does not exist.
    pub async fn category_recipes(
        &self,
        category_id: CategoryId,
        pagination: Pagination,
    ) -> Result<(Category, Page<Recipe>)> {
        let category = self
            .get_category(category_id)
            .await?
            .ok_or_else(|| Error::not_found("Category", category_id))?;

        let filters = SearchFilters {
            category_id: Some(category_id),
            ..SearchFilters::default()
        };
        let page = self.search_recipes(&filters, pagination).await?;
        Ok((category, page))
    }
}
