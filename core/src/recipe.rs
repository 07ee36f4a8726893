//! Recipe catalog model and the validation that guards every write.
//!
//! Input arrives as a [`RecipeDraft`] (or [`RecipeUpdate`]) straight from the
//! request body. The only way to obtain a [`NewRecipe`] is
//! [`RecipeDraft::validate`], so the composite writer never sees unchecked
//! input.

use crate::error::{Error, Result};
use crate::ids::{CategoryId, CommentId, ImageId, IngredientId, RecipeId, StepId, UserId};
use crate::user::UserSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Money Value Object (cents-based to avoid floating point errors)
// ============================================================================

/// A non-negative price in cents.
///
/// Serialized as a decimal number (`12.5`) because that is what clients send
/// and display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Zero; the price of a free recipe.
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from cents.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `cents` is negative.
    pub fn from_cents(cents: i64) -> Result<Self> {
        if cents < 0 {
            return Err(Error::validation("price must not be negative"));
        }
        Ok(Self(cents))
    }

    /// Creates a `Money` value from a decimal amount, rounding to the nearest cent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the amount is negative, NaN, infinite,
    /// or too large to represent in cents.
    ///
    /// # Examples
    ///
    /// ```
    /// # use recipe_hub_core::Money;
    /// assert_eq!(Money::from_decimal(19.999).map(|m| m.cents()), Ok(2000));
    /// assert!(Money::from_decimal(-1.0).is_err());
    /// assert!(Money::from_decimal(f64::NAN).is_err());
    /// ```
    #[allow(clippy::cast_possible_truncation)] // range checked above the cast
    pub fn from_decimal(amount: f64) -> Result<Self> {
        if !amount.is_finite() {
            return Err(Error::validation("price must be a finite number"));
        }
        if amount < 0.0 {
            return Err(Error::validation("price must not be negative"));
        }
        let cents = (amount * 100.0).round();
        // 2^53: beyond this f64 cannot represent every integer
        if cents > 9_007_199_254_740_992.0 {
            return Err(Error::validation("price is too large"));
        }
        Ok(Self(cents as i64))
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the amount as a decimal number.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_decimal())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Self::from_decimal(amount).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Difficulty
// ============================================================================

/// How hard a recipe is to cook.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Beginner friendly
    Easy,
    /// Some experience needed
    Medium,
    /// Challenging
    Hard,
}

impl Difficulty {
    /// Database / wire representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(Error::validation(format!(
                "difficulty must be one of easy, medium, hard (got '{other}')"
            ))),
        }
    }
}

// ============================================================================
// Write-side input
// ============================================================================

/// One ingredient as submitted by the author.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct IngredientInput {
    /// Ingredient name (required)
    pub name: String,
    /// Free-text quantity ("2", "a pinch")
    #[serde(default)]
    pub quantity: String,
    /// Free-text unit ("cups", "g")
    #[serde(default)]
    pub unit: String,
}

/// One step as submitted by the author.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StepInput {
    /// What to do
    pub instruction: String,
    /// Optional illustration
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Unvalidated recipe creation request.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RecipeDraft {
    /// Recipe title
    pub title: String,
    /// Recipe description
    pub description: String,
    /// Minutes of preparation
    pub preparation_time: i32,
    /// Minutes of cooking
    pub cooking_time: i32,
    /// Number of servings
    pub servings: i32,
    /// `easy`, `medium` or `hard`
    pub difficulty: String,
    /// Category the recipe is filed under
    pub category_id: CategoryId,
    /// Decimal price; absent means free
    #[serde(default)]
    pub price: Option<f64>,
    /// Ordered ingredients
    #[serde(default)]
    pub ingredients: Vec<IngredientInput>,
    /// Ordered steps
    #[serde(default)]
    pub steps: Vec<StepInput>,
    /// Featured image URL
    #[serde(default)]
    pub featured_image: Option<String>,
    /// Additional image URLs
    #[serde(default)]
    pub images: Vec<String>,
}

/// A validated ingredient with its input position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewIngredient {
    /// Zero-based input position
    pub position: i32,
    /// Trimmed name
    pub name: String,
    /// Trimmed quantity
    pub quantity: String,
    /// Trimmed unit
    pub unit: String,
}

/// A validated step with its 1-based number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewStep {
    /// 1-based, contiguous
    pub step_number: i32,
    /// Trimmed instruction
    pub instruction: String,
    /// Optional illustration
    pub image_url: Option<String>,
}

/// A validated image to attach at creation time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewImage {
    /// Image URL
    pub url: String,
    /// Whether this image is the featured one
    pub featured: bool,
}

/// A recipe that passed validation and is ready for the composite writer.
///
/// Fields are read-only; construct through [`RecipeDraft::validate`].
#[derive(Clone, Debug, PartialEq)]
pub struct NewRecipe {
    title: String,
    description: String,
    preparation_time: i32,
    cooking_time: i32,
    servings: i32,
    difficulty: Difficulty,
    category_id: CategoryId,
    price: Money,
    featured_image_url: Option<String>,
    ingredients: Vec<NewIngredient>,
    steps: Vec<NewStep>,
    images: Vec<NewImage>,
}

/// Trims `value`. Postgres text columns cannot store NUL, so it is refused here.
pub(crate) fn plain_text(field: &str, value: &str) -> Result<String> {
    if value.contains('\0') {
        return Err(Error::validation(format!(
            "{field} must not contain NUL characters"
        )));
    }
    Ok(value.trim().to_string())
}

fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = plain_text(field, value)?;
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    Ok(trimmed)
}

fn optional_url(field: &str, value: Option<&str>) -> Result<Option<String>> {
    Ok(value
        .map(|url| plain_text(field, url))
        .transpose()?
        .filter(|url| !url.is_empty()))
}

/// Upper bound for preparation and cooking time: one week, in minutes.
pub const MAX_MINUTES: i32 = 7 * 24 * 60;

/// Upper bound for servings.
pub const MAX_SERVINGS: i32 = 1_000;

fn check_times(preparation_time: i32, cooking_time: i32, servings: i32) -> Result<()> {
    if !(1..=MAX_MINUTES).contains(&preparation_time) {
        return Err(Error::validation(format!(
            "preparation_time must be between 1 and {MAX_MINUTES}"
        )));
    }
    if !(0..=MAX_MINUTES).contains(&cooking_time) {
        return Err(Error::validation(format!(
            "cooking_time must be between 0 and {MAX_MINUTES}"
        )));
    }
    if !(1..=MAX_SERVINGS).contains(&servings) {
        return Err(Error::validation(format!(
            "servings must be between 1 and {MAX_SERVINGS}"
        )));
    }
    Ok(())
}

impl RecipeDraft {
    /// Validates the draft and assigns positions and step numbers.
    ///
    /// The featured URL, when present, becomes the first image with
    /// `featured = true`. An additional image equal to the featured URL is
    /// kept and also flagged featured; the writer's single-featured path
    /// leaves exactly one featured row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first offending field.
    pub fn validate(self) -> Result<NewRecipe> {
        let title = required("title", &self.title)?;
        let description = required("description", &self.description)?;
        check_times(self.preparation_time, self.cooking_time, self.servings)?;
        let difficulty: Difficulty = self.difficulty.parse()?;
        let price = self.price.map_or(Ok(Money::ZERO), Money::from_decimal)?;

        if self.ingredients.is_empty() {
            return Err(Error::validation("at least one ingredient is required"));
        }
        let ingredients = self
            .ingredients
            .iter()
            .zip(0..)
            .map(|(ingredient, position)| {
                Ok(NewIngredient {
                    position,
                    name: required("ingredient name", &ingredient.name)?,
                    quantity: plain_text("ingredient quantity", &ingredient.quantity)?,
                    unit: plain_text("ingredient unit", &ingredient.unit)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if self.steps.is_empty() {
            return Err(Error::validation("at least one step is required"));
        }
        let steps = self
            .steps
            .iter()
            .zip(1..)
            .map(|(step, step_number)| {
                Ok(NewStep {
                    step_number,
                    instruction: required("step instruction", &step.instruction)?,
                    image_url: optional_url("step image_url", step.image_url.as_deref())?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let featured_image_url = optional_url("featured_image", self.featured_image.as_deref())?;
        let mut images = Vec::with_capacity(self.images.len() + 1);
        if let Some(url) = &featured_image_url {
            images.push(NewImage {
                url: url.clone(),
                featured: true,
            });
        }
        for url in &self.images {
            let Some(url) = optional_url("image url", Some(url))? else {
                continue;
            };
            let featured = featured_image_url.as_deref() == Some(url.as_str());
            images.push(NewImage { url, featured });
        }

        Ok(NewRecipe {
            title,
            description,
            preparation_time: self.preparation_time,
            cooking_time: self.cooking_time,
            servings: self.servings,
            difficulty,
            category_id: self.category_id,
            price,
            featured_image_url,
            ingredients,
            steps,
            images,
        })
    }
}

impl NewRecipe {
    /// Trimmed title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Trimmed description
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Minutes of preparation (≥1)
    #[must_use]
    pub const fn preparation_time(&self) -> i32 {
        self.preparation_time
    }

    /// Minutes of cooking (≥0)
    #[must_use]
    pub const fn cooking_time(&self) -> i32 {
        self.cooking_time
    }

    /// Servings (≥1)
    #[must_use]
    pub const fn servings(&self) -> i32 {
        self.servings
    }

    /// Difficulty
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Category
    #[must_use]
    pub const fn category_id(&self) -> CategoryId {
        self.category_id
    }

    /// Price (zero for free recipes)
    #[must_use]
    pub const fn price(&self) -> Money {
        self.price
    }

    /// Featured image URL, if any
    #[must_use]
    pub fn featured_image_url(&self) -> Option<&str> {
        self.featured_image_url.as_deref()
    }

    /// Ingredients in input order
    #[must_use]
    pub fn ingredients(&self) -> &[NewIngredient] {
        &self.ingredients
    }

    /// Steps numbered 1..=N
    #[must_use]
    pub fn steps(&self) -> &[NewStep] {
        &self.steps
    }

    /// Images, featured first
    #[must_use]
    pub fn images(&self) -> &[NewImage] {
        &self.images
    }
}

/// Partial update of a recipe's own columns. Derived fields are not listed.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RecipeUpdate {
    /// New title
    #[serde(default)]
    pub title: Option<String>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// New preparation time
    #[serde(default)]
    pub preparation_time: Option<i32>,
    /// New cooking time
    #[serde(default)]
    pub cooking_time: Option<i32>,
    /// New servings
    #[serde(default)]
    pub servings: Option<i32>,
    /// New difficulty
    #[serde(default)]
    pub difficulty: Option<String>,
    /// New category
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// New decimal price
    #[serde(default)]
    pub price: Option<f64>,
    /// Publish or unpublish
    #[serde(default)]
    pub is_published: Option<bool>,
}

/// Validated changes produced by [`RecipeUpdate::validate`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecipeChanges {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New preparation time
    pub preparation_time: Option<i32>,
    /// New cooking time
    pub cooking_time: Option<i32>,
    /// New servings
    pub servings: Option<i32>,
    /// New difficulty
    pub difficulty: Option<Difficulty>,
    /// New category
    pub category_id: Option<CategoryId>,
    /// New price
    pub price: Option<Money>,
    /// Publish flag
    pub is_published: Option<bool>,
}

impl RecipeUpdate {
    /// Validates the present fields with the same rules as creation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first offending field.
    pub fn validate(self) -> Result<RecipeChanges> {
        let title = self.title.as_deref().map(|t| required("title", t)).transpose()?;
        let description = self
            .description
            .as_deref()
            .map(|d| required("description", d))
            .transpose()?;
        check_times(
            self.preparation_time.unwrap_or(1),
            self.cooking_time.unwrap_or(0),
            self.servings.unwrap_or(1),
        )?;
        let difficulty = self
            .difficulty
            .as_deref()
            .map(str::parse::<Difficulty>)
            .transpose()?;
        let price = self.price.map(Money::from_decimal).transpose()?;

        Ok(RecipeChanges {
            title,
            description,
            preparation_time: self.preparation_time,
            cooking_time: self.cooking_time,
            servings: self.servings,
            difficulty,
            category_id: self.category_id,
            price,
            is_published: self.is_published,
        })
    }
}

impl RecipeChanges {
    /// True when nothing would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.preparation_time.is_none()
            && self.cooking_time.is_none()
            && self.servings.is_none()
            && self.difficulty.is_none()
            && self.category_id.is_none()
            && self.price.is_none()
            && self.is_published.is_none()
    }
}

// ============================================================================
// Read models
// ============================================================================

/// A recipe category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Identifier
    pub id: CategoryId,
    /// Unique name
    pub name: String,
    /// Short description
    pub description: Option<String>,
    /// Optional cover image
    pub image_url: Option<String>,
}

/// The categories seeded at startup, with their descriptions.
pub const DEFAULT_CATEGORIES: [(&str, &str); 10] = [
    ("Breakfast", "Start your day right"),
    ("Lunch", "Midday meals"),
    ("Dinner", "Evening delights"),
    ("Desserts", "Sweet treats"),
    ("Appetizers", "Starters and snacks"),
    ("Vegetarian", "Plant-based recipes"),
    ("Vegan", "100% plant-based"),
    ("Gluten-Free", "No gluten ingredients"),
    ("Quick & Easy", "30 minutes or less"),
    ("Healthy", "Nutritious options"),
];

/// A recipe row with its owner and category, as listed and searched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Identifier
    pub id: RecipeId,
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// URL of the featured image
    pub featured_image_url: Option<String>,
    /// Minutes of preparation
    pub preparation_time: i32,
    /// Minutes of cooking
    pub cooking_time: i32,
    /// Servings
    pub servings: i32,
    /// Difficulty
    pub difficulty: Difficulty,
    /// Price
    pub price: Money,
    /// Mean rating, two decimals, 0 when unrated
    pub average_rating: f64,
    /// Number of ratings
    pub total_ratings: i64,
    /// Number of likes
    pub like_count: i64,
    /// Whether the recipe is visible in the catalog
    pub is_published: bool,
    /// Owner
    pub user: UserSummary,
    /// Category
    pub category: Category,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Recipe {
    /// Preparation plus cooking time, in minutes.
    #[must_use]
    pub fn total_time(&self) -> i64 {
        i64::from(self.preparation_time) + i64::from(self.cooking_time)
    }

    /// Soft-deleted recipes are hidden from everyone but their owner.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether `viewer` may see this recipe.
    #[must_use]
    pub fn is_visible_to(&self, viewer: Option<UserId>) -> bool {
        viewer == Some(self.user.id) || (self.is_published && !self.is_deleted())
    }
}

/// An ingredient row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Identifier
    pub id: IngredientId,
    /// Name
    pub name: String,
    /// Free-text quantity
    pub quantity: String,
    /// Free-text unit
    pub unit: String,
    /// Input order
    pub position: i32,
}

/// A step row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Identifier
    pub id: StepId,
    /// 1-based step number
    pub step_number: i32,
    /// Instruction text
    pub instruction: String,
    /// Optional illustration
    pub image_url: Option<String>,
}

/// A recipe image row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeImage {
    /// Identifier
    pub id: ImageId,
    /// Owning recipe
    pub recipe_id: RecipeId,
    /// Image URL
    pub image_url: String,
    /// At most one per recipe
    pub is_featured: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// A comment with its author.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Identifier
    pub id: CommentId,
    /// Recipe commented on
    pub recipe_id: RecipeId,
    /// Comment body
    pub content: String,
    /// Author
    pub user: UserSummary,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// A fully materialized recipe aggregate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecipeDetail {
    /// The recipe row
    #[serde(flatten)]
    pub recipe: Recipe,
    /// Ingredients in input order
    pub ingredients: Vec<Ingredient>,
    /// Steps ordered by step number
    pub steps: Vec<Step>,
    /// Images, featured first
    pub images: Vec<RecipeImage>,
    /// Comments, newest first
    pub comments: Vec<Comment>,
}

impl RecipeDetail {
    /// The featured image, if one is set.
    #[must_use]
    pub fn featured_image(&self) -> Option<&RecipeImage> {
        self.images.iter().find(|image| image.is_featured)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn draft() -> RecipeDraft {
        RecipeDraft {
            title: "  Shiro  ".to_string(),
            description: "Chickpea stew".to_string(),
            preparation_time: 10,
            cooking_time: 25,
            servings: 4,
            difficulty: "Easy".to_string(),
            category_id: CategoryId::new(),
            price: None,
            ingredients: vec![
                IngredientInput {
                    name: "Shiro powder".to_string(),
                    quantity: "1".to_string(),
                    unit: "cup".to_string(),
                },
                IngredientInput {
                    name: "Onion".to_string(),
                    quantity: "2".to_string(),
                    unit: String::new(),
                },
            ],
            steps: vec![
                StepInput {
                    instruction: "Chop onions".to_string(),
                    image_url: None,
                },
                StepInput {
                    instruction: "Fry".to_string(),
                    image_url: Some("  ".to_string()),
                },
                StepInput {
                    instruction: "Add powder and water".to_string(),
                    image_url: Some("step3.jpg".to_string()),
                },
            ],
            featured_image: Some("a.jpg".to_string()),
            images: vec![],
        }
    }

    #[test]
    fn test_validate_numbers_steps_by_position() {
        let recipe = draft().validate().unwrap();

        let numbers: Vec<i32> = recipe.steps().iter().map(|s| s.step_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(recipe.steps()[1].image_url, None);
        assert_eq!(recipe.title(), "Shiro");
        assert_eq!(recipe.difficulty(), Difficulty::Easy);
        assert!(recipe.price().is_zero());
        assert_eq!(recipe.ingredients()[1].position, 1);
    }

    #[test]
    fn test_featured_url_becomes_single_featured_image() {
        let recipe = draft().validate().unwrap();

        assert_eq!(recipe.featured_image_url(), Some("a.jpg"));
        assert_eq!(
            recipe.images(),
            &[NewImage {
                url: "a.jpg".to_string(),
                featured: true
            }]
        );
    }

    #[test]
    fn test_additional_image_matching_featured_is_flagged() {
        let mut input = draft();
        input.images = vec!["b.jpg".to_string(), "a.jpg".to_string()];
        let recipe = input.validate().unwrap();

        let featured: Vec<&str> = recipe
            .images()
            .iter()
            .filter(|i| i.featured)
            .map(|i| i.url.as_str())
            .collect();
        assert_eq!(featured, vec!["a.jpg", "a.jpg"]);
        assert_eq!(recipe.images().len(), 3);
    }

    fn assert_rejected(mutate: impl FnOnce(&mut RecipeDraft), field: &str) {
        let mut input = draft();
        mutate(&mut input);
        match input.validate() {
            Err(Error::Validation(message)) => {
                assert!(message.contains(field), "{message} should mention {field}");
            }
            other => panic!("expected validation error for {field}, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        assert_rejected(|d| d.title = "   ".to_string(), "title");
        assert_rejected(|d| d.description = String::new(), "description");
        assert_rejected(|d| d.preparation_time = 0, "preparation_time");
        assert_rejected(|d| d.cooking_time = -1, "cooking_time");
        assert_rejected(|d| d.servings = 0, "servings");
        assert_rejected(|d| d.difficulty = "extreme".to_string(), "difficulty");
        assert_rejected(|d| d.price = Some(-0.5), "price");
        assert_rejected(|d| d.price = Some(f64::INFINITY), "price");
        assert_rejected(|d| d.ingredients.clear(), "ingredient");
        assert_rejected(|d| d.ingredients[0].name = " ".to_string(), "ingredient name");
        assert_rejected(|d| d.steps.clear(), "step");
        assert_rejected(|d| d.steps[2].instruction = String::new(), "step instruction");
        assert_rejected(|d| d.preparation_time = MAX_MINUTES + 1, "preparation_time");
        assert_rejected(|d| d.cooking_time = 2_000_000_000, "cooking_time");
        assert_rejected(|d| d.servings = MAX_SERVINGS + 1, "servings");
    }

    #[test]
    fn test_validate_rejects_nul_bytes() {
        assert_rejected(|d| d.title = "Doro\0Wat".to_string(), "title");
        assert_rejected(|d| d.steps[0].instruction = "bad\0step".to_string(), "step instruction");
        assert_rejected(|d| d.ingredients[0].unit = "g\0".to_string(), "ingredient unit");
        assert_rejected(|d| d.featured_image = Some("a\0.jpg".to_string()), "featured_image");
        assert_rejected(|d| d.images = vec!["b\0.jpg".to_string()], "image url");
    }

    #[test]
    fn test_times_at_the_bounds_are_accepted() {
        let mut d = draft();
        d.preparation_time = MAX_MINUTES;
        d.cooking_time = MAX_MINUTES;
        d.servings = MAX_SERVINGS;
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_money_decimal_conversion() {
        assert_eq!(Money::from_decimal(12.5).unwrap().cents(), 1250);
        assert_eq!(Money::from_decimal(0.0).unwrap(), Money::ZERO);
        assert_eq!(Money::from_cents(1999).unwrap().to_string(), "19.99");
        assert!(Money::from_cents(-1).is_err());
    }

    #[test]
    fn test_money_serializes_as_decimal() {
        let json = serde_json::to_string(&Money::from_cents(1050).unwrap()).unwrap();
        assert_eq!(json, "10.5");
        let parsed: Money = serde_json::from_str("3.99").unwrap();
        assert_eq!(parsed.cents(), 399);
        assert!(serde_json::from_str::<Money>("-2").is_err());
    }

    #[test]
    fn test_update_validates_present_fields_only() {
        let changes = RecipeUpdate {
            title: Some(" New ".to_string()),
            price: Some(4.0),
            ..RecipeUpdate::default()
        }
        .validate()
        .unwrap();
        assert_eq!(changes.title.as_deref(), Some("New"));
        assert_eq!(changes.price.map(|p| p.cents()), Some(400));
        assert!(changes.servings.is_none());

        assert!(RecipeUpdate::default().validate().unwrap().is_empty());
        assert!(RecipeUpdate {
            servings: Some(0),
            ..RecipeUpdate::default()
        }
        .validate()
        .is_err());
    }
}
