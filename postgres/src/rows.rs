//! Database row shapes and their conversion into domain types.

use chrono::{DateTime, Utc};
use recipe_hub_core::purchase::PurchaseSummary;
use recipe_hub_core::{
    Category, CategoryId, Comment, CommentId, Error, ImageId, Ingredient, IngredientId, Money,
    Purchase, PurchaseId, Recipe, RecipeId, RecipeImage, Result, Step, StepId, User, UserId,
    UserSummary,
};
use sqlx::FromRow;
use uuid::Uuid;

/// Columns selected for every recipe read, joined with owner and category.
pub(crate) const RECIPE_SELECT: &str = r"
    SELECT
        r.id, r.title, r.description, r.featured_image_url,
        r.preparation_time, r.cooking_time, r.servings, r.difficulty, r.price_cents,
        r.average_rating, r.total_ratings, r.like_count, r.is_published,
        r.created_at, r.updated_at, r.deleted_at,
        u.id AS owner_id, u.username AS owner_username, u.avatar_url AS owner_avatar_url,
        c.id AS category_id, c.name AS category_name,
        c.description AS category_description, c.image_url AS category_image_url
    FROM recipes r
    JOIN users u ON u.id = r.user_id
    JOIN categories c ON c.id = r.category_id
";

pub(crate) const PURCHASE_COLUMNS: &str =
    "id, user_id, recipe_id, amount_cents, tx_ref, status, created_at, updated_at";

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    id: Uuid,
    email: String,
    username: String,
    password_hash: String,
    avatar_url: Option<String>,
    bio: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from_uuid(row.id),
            email: row.email,
            username: row.username,
            password_hash: row.password_hash,
            avatar_url: row.avatar_url,
            bio: row.bio,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct CategoryRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    image_url: Option<String>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            image_url: row.image_url,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct RecipeRow {
    id: Uuid,
    title: String,
    description: String,
    featured_image_url: Option<String>,
    preparation_time: i32,
    cooking_time: i32,
    servings: i32,
    difficulty: String,
    price_cents: i64,
    average_rating: f64,
    total_ratings: i64,
    like_count: i64,
    is_published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
    owner_id: Uuid,
    owner_username: String,
    owner_avatar_url: Option<String>,
    category_id: Uuid,
    category_name: String,
    category_description: Option<String>,
    category_image_url: Option<String>,
}

impl TryFrom<RecipeRow> for Recipe {
    type Error = Error;

    fn try_from(row: RecipeRow) -> Result<Self> {
        Ok(Self {
            id: RecipeId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            featured_image_url: row.featured_image_url,
            preparation_time: row.preparation_time,
            cooking_time: row.cooking_time,
            servings: row.servings,
            difficulty: row
                .difficulty
                .parse()
                .map_err(|_| Error::Integrity(format!("recipe {} has an unknown difficulty", row.id)))?,
            price: Money::from_cents(row.price_cents)
                .map_err(|_| Error::Integrity(format!("recipe {} has a negative price", row.id)))?,
            average_rating: row.average_rating,
            total_ratings: row.total_ratings,
            like_count: row.like_count,
            is_published: row.is_published,
            user: UserSummary {
                id: UserId::from_uuid(row.owner_id),
                username: row.owner_username,
                avatar_url: row.owner_avatar_url,
            },
            category: Category {
                id: CategoryId::from_uuid(row.category_id),
                name: row.category_name,
                description: row.category_description,
                image_url: row.category_image_url,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct IngredientRow {
    id: Uuid,
    name: String,
    quantity: String,
    unit: String,
    position: i32,
}

impl From<IngredientRow> for Ingredient {
    fn from(row: IngredientRow) -> Self {
        Self {
            id: IngredientId::from_uuid(row.id),
            name: row.name,
            quantity: row.quantity,
            unit: row.unit,
            position: row.position,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct StepRow {
    id: Uuid,
    step_number: i32,
    instruction: String,
    image_url: Option<String>,
}

impl From<StepRow> for Step {
    fn from(row: StepRow) -> Self {
        Self {
            id: StepId::from_uuid(row.id),
            step_number: row.step_number,
            instruction: row.instruction,
            image_url: row.image_url,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ImageRow {
    id: Uuid,
    recipe_id: Uuid,
    image_url: String,
    is_featured: bool,
    created_at: DateTime<Utc>,
}

impl From<ImageRow> for RecipeImage {
    fn from(row: ImageRow) -> Self {
        Self {
            id: ImageId::from_uuid(row.id),
            recipe_id: RecipeId::from_uuid(row.recipe_id),
            image_url: row.image_url,
            is_featured: row.is_featured,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct CommentRow {
    id: Uuid,
    recipe_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
    user_id: Uuid,
    username: String,
    avatar_url: Option<String>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: CommentId::from_uuid(row.id),
            recipe_id: RecipeId::from_uuid(row.recipe_id),
            content: row.content,
            user: UserSummary {
                id: UserId::from_uuid(row.user_id),
                username: row.username,
                avatar_url: row.avatar_url,
            },
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct PurchaseRow {
    id: Uuid,
    user_id: Uuid,
    recipe_id: Uuid,
    amount_cents: i64,
    tx_ref: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PurchaseRow> for Purchase {
    type Error = Error;

    fn try_from(row: PurchaseRow) -> Result<Self> {
        Ok(Self {
            id: PurchaseId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            recipe_id: RecipeId::from_uuid(row.recipe_id),
            amount: Money::from_cents(row.amount_cents)
                .map_err(|_| Error::Integrity(format!("purchase {} has a negative amount", row.id)))?,
            tx_ref: row.tx_ref,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct PurchaseSummaryRow {
    #[sqlx(flatten)]
    purchase: PurchaseRow,
    recipe_title: String,
    recipe_image_url: Option<String>,
}

impl TryFrom<PurchaseSummaryRow> for PurchaseSummary {
    type Error = Error;

    fn try_from(row: PurchaseSummaryRow) -> Result<Self> {
        Ok(Self {
            purchase: row.purchase.try_into()?,
            recipe_title: row.recipe_title,
            recipe_image_url: row.recipe_image_url,
        })
    }
}
