//! Social interaction values: ratings, like toggles, per-viewer state.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A star rating in `1..=5`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RatingValue(u8);

impl RatingValue {
    /// Validates a raw rating.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when `value` is outside `1..=5`.
    pub fn new(value: i64) -> Result<Self> {
        u8::try_from(value)
            .ok()
            .filter(|v| (1..=5).contains(v))
            .map(Self)
            .ok_or_else(|| Error::validation("rating must be between 1 and 5"))
    }

    /// The rating as a number
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl<'de> Deserialize<'de> for RatingValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Result of toggling a like.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeToggle {
    /// Whether the caller now likes the recipe
    pub liked: bool,
    /// The recipe's like count after the toggle
    pub like_count: i64,
}

/// A recipe's rating aggregate after a rating write.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    /// Mean of all ratings, two decimals, 0 when unrated
    pub average_rating: f64,
    /// Number of ratings
    pub total_ratings: i64,
    /// The caller's rating, if any
    pub user_rating: Option<u8>,
}

impl RatingSummary {
    /// Builds the summary from the sum and count of a recipe's ratings.
    ///
    /// # Examples
    ///
    /// ```
    /// # use recipe_hub_core::RatingSummary;
    /// let summary = RatingSummary::from_totals(6, 2, Some(4));
    /// assert_eq!(summary.average_rating, 3.0);
    /// assert_eq!(RatingSummary::from_totals(0, 0, None).average_rating, 0.0);
    /// ```
    #[must_use]
    pub fn from_totals(sum: i64, count: i64, user_rating: Option<u8>) -> Self {
        Self {
            average_rating: average_rating(sum, count),
            total_ratings: count,
            user_rating,
        }
    }
}

/// Mean of `count` ratings summing to `sum`, rounded to two decimals.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_rating(sum: i64, count: i64) -> f64 {
    if count <= 0 {
        return 0.0;
    }
    let mean = sum as f64 / count as f64;
    (mean * 100.0).round() / 100.0
}

/// The viewer's relationship with a recipe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interactions {
    /// Viewer liked the recipe
    pub liked: bool,
    /// Viewer bookmarked the recipe
    pub bookmarked: bool,
    /// Viewer's rating
    pub rating: Option<u8>,
}

/// Validates comment content.
///
/// # Errors
///
/// Returns [`Error::Validation`] if the content is blank or contains NUL.
pub fn comment_content(raw: &str) -> Result<String> {
    let trimmed = crate::recipe::plain_text("comment content", raw)?;
    if trimmed.is_empty() {
        return Err(Error::validation("comment content is required"));
    }
    Ok(trimmed)
}

/// Validates an image URL attached to an existing recipe.
///
/// # Errors
///
/// Returns [`Error::Validation`] if the URL is blank or contains NUL.
pub fn image_url(raw: &str) -> Result<String> {
    let trimmed = crate::recipe::plain_text("image_url", raw)?;
    if trimmed.is_empty() {
        return Err(Error::validation("image_url is required"));
    }
    Ok(trimmed)
}
