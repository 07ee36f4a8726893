//! Catalog query parameters: search filters and pagination.

use crate::ids::CategoryId;
use serde::{Deserialize, Serialize};

/// Page used when the caller gives none or a value below 1.
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when the caller gives none or one outside `1..=MAX_LIMIT`.
pub const DEFAULT_LIMIT: u32 = 12;
/// Largest accepted page size.
pub const MAX_LIMIT: u32 = 50;

/// A clamped page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Pagination {
    /// Clamps raw query values.
    ///
    /// `page < 1` becomes 1; a limit outside `1..=50` becomes 12.
    ///
    /// # Examples
    ///
    /// ```
    /// # use recipe_hub_core::Pagination;
    /// let p = Pagination::new(Some(0), Some(500));
    /// assert_eq!((p.page(), p.limit()), (1, 12));
    /// ```
    #[must_use]
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page
            .filter(|p| *p >= 1)
            .and_then(|p| u32::try_from(p).ok())
            .unwrap_or(DEFAULT_PAGE);
        let limit = limit
            .and_then(|l| u32::try_from(l).ok())
            .filter(|l| (1..=MAX_LIMIT).contains(l))
            .unwrap_or(DEFAULT_LIMIT);
        Self { page, limit }
    }

    /// 1-based page number
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Page size
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Rows to skip
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }

    /// Number of pages needed for `total` rows.
    #[must_use]
    pub const fn pages(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        let limit = self.limit as i64;
        (total + limit - 1) / limit
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One page of results.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Rows on this page; the catalog only pages recipes
    #[serde(rename = "recipes")]
    pub items: Vec<T>,
    /// Rows matching the predicate across all pages
    pub total: i64,
    /// 1-based page number
    pub page: u32,
    /// Page size
    pub limit: u32,
    /// Page count
    pub pages: i64,
}

impl<T> Page<T> {
    /// Assembles a page from its rows and the predicate's total count.
    #[must_use]
    pub const fn new(items: Vec<T>, total: i64, pagination: Pagination) -> Self {
        Self {
            items,
            total,
            page: pagination.page,
            limit: pagination.limit,
            pages: pagination.pages(total),
        }
    }
}

/// AND-combined catalog filters. Empty strings count as absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchFilters {
    /// Free-text query over title and description
    pub q: Option<String>,
    /// Restrict to one category
    pub category_id: Option<CategoryId>,
    /// Maximum preparation + cooking minutes
    pub max_time: Option<i32>,
    /// Case-insensitive ingredient-name substring
    pub ingredient: Option<String>,
    /// Minimum average rating
    pub min_rating: Option<f64>,
}

impl SearchFilters {
    /// True when no filter is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.q.is_none()
            && self.category_id.is_none()
            && self.max_time.is_none()
            && self.ingredient.is_none()
            && self.min_rating.is_none()
    }
}

/// Raw catalog query string: `?page=&limit=&q=&category_id=&max_time=&ingredient=&min_rating=`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CatalogQuery {
    /// Requested page
    pub page: Option<i64>,
    /// Requested page size
    pub limit: Option<i64>,
    /// Free text
    pub q: Option<String>,
    /// Category filter
    pub category_id: Option<CategoryId>,
    /// Maximum total minutes
    pub max_time: Option<i32>,
    /// Ingredient substring
    pub ingredient: Option<String>,
    /// Minimum average rating
    pub min_rating: Option<f64>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CatalogQuery {
    /// Splits the query into normalized filters and clamped pagination.
    #[must_use]
    pub fn into_parts(self) -> (SearchFilters, Pagination) {
        let filters = SearchFilters {
            q: non_blank(self.q),
            category_id: self.category_id,
            max_time: self.max_time.filter(|minutes| *minutes > 0),
            ingredient: non_blank(self.ingredient),
            min_rating: self.min_rating.filter(|r| r.is_finite() && *r > 0.0),
        };
        (filters, Pagination::new(self.page, self.limit))
    }
}
