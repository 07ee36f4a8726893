//! # Recipe Hub Core
//!
//! Domain types and service seams shared by every Recipe Hub crate.
//!
//! This crate has no I/O. It defines:
//!
//! - **Identifiers**: typed UUID newtypes (`RecipeId`, `UserId`, ...)
//! - **Catalog model**: recipes, ingredients, steps, images, categories
//! - **Validation**: `RecipeDraft` → `NewRecipe`, `Signup` → `NewUser`
//! - **Queries**: search filters and clamped pagination
//! - **Purchases**: the pending → completed | failed state machine
//! - **Seams**: the `Clock` and `PaymentGateway` traits implemented elsewhere
//! - **Errors**: the domain error taxonomy every layer maps into
//!
//! ## Layering
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ recipe-hub-web (axum shell)  │
//! ├──────────────┬───────────────┤
//! │ postgres     │ chapa / auth  │  ← I/O
//! ├──────────────┴───────────────┤
//! │ recipe-hub-core              │  ← pure types + validation
//! └──────────────────────────────┘
//! ```

pub mod environment;
pub mod error;
pub mod ids;
pub mod payment;
pub mod purchase;
pub mod query;
pub mod recipe;
pub mod social;
pub mod user;

pub use chrono::{DateTime, Utc};

pub use environment::{Clock, SystemClock};
pub use error::{Error, Result};
pub use ids::{
    CategoryId, CommentId, ImageId, IngredientId, PurchaseId, RecipeId, StepId, UserId,
};
pub use payment::{
    Checkout, CheckoutRequest, GatewayResult, PaymentGateway, PaymentGatewayError,
    VerifiedStatus,
};
pub use purchase::{Purchase, PurchaseStatus, PurchaseSummary};
pub use query::{CatalogQuery, Page, Pagination, SearchFilters};
pub use recipe::{
    Category, Comment, Difficulty, Ingredient, Money, NewRecipe, Recipe, RecipeChanges,
    RecipeDetail, RecipeDraft, RecipeImage, RecipeUpdate, Step,
};
pub use social::{Interactions, LikeToggle, RatingSummary, RatingValue};
pub use user::{NewUser, Signup, User, UserSummary};
