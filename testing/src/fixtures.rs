//! Test data builders.
//!
//! Fixtures panic on failure; they set up preconditions, not behavior under
//! test.

#![allow(clippy::expect_used)]

use recipe_hub_core::recipe::{IngredientInput, StepInput};
use recipe_hub_core::{Category, CategoryId, RecipeDetail, RecipeDraft, Signup, User};
use recipe_hub_postgres::PostgresStore;

/// Placeholder stored as the password hash of fixture users.
pub const FIXTURE_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$fixture$fixture";

/// Register a user named `username` with email `<username>@example.com`.
///
/// # Panics
///
/// Panics if the signup is invalid or the insert fails.
pub async fn user(store: &PostgresStore, username: &str) -> User {
    let signup = Signup {
        email: format!("{username}@example.com"),
        username: username.to_string(),
        password: "password123".to_string(),
    }
    .validate()
    .expect("fixture signup should be valid");

    store
        .create_user(&signup, FIXTURE_PASSWORD_HASH)
        .await
        .expect("fixture user insert failed")
}

/// The first seeded category by name.
///
/// # Panics
///
/// Panics if no categories were seeded.
pub async fn category(store: &PostgresStore) -> Category {
    store
        .list_categories()
        .await
        .expect("list categories failed")
        .into_iter()
        .next()
        .expect("categories should be seeded")
}

/// A valid draft: 2 ingredients, 3 steps, no images, free.
#[must_use]
pub fn draft(category: CategoryId, title: &str) -> RecipeDraft {
    RecipeDraft {
        title: title.to_string(),
        description: format!("How to make {title}"),
        preparation_time: 10,
        cooking_time: 20,
        servings: 4,
        difficulty: "medium".to_string(),
        category_id: category,
        price: None,
        ingredients: vec![
            IngredientInput {
                name: "Red lentils".to_string(),
                quantity: "2".to_string(),
                unit: "cups".to_string(),
            },
            IngredientInput {
                name: "Berbere".to_string(),
                quantity: "1".to_string(),
                unit: "tbsp".to_string(),
            },
        ],
        steps: vec![
            StepInput {
                instruction: "Rinse the lentils".to_string(),
                image_url: None,
            },
            StepInput {
                instruction: "Simmer with berbere".to_string(),
                image_url: None,
            },
            StepInput {
                instruction: "Serve with injera".to_string(),
                image_url: None,
            },
        ],
        featured_image: None,
        images: Vec::new(),
    }
}

/// Create a published recipe from [`draft`] in the first category.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn recipe(store: &PostgresStore, owner: &User, title: &str) -> RecipeDetail {
    let category = category(store).await;
    create(store, owner, draft(category.id, title)).await
}

/// Create a recipe from an arbitrary draft.
///
/// # Panics
///
/// Panics if validation or the insert fails.
pub async fn create(store: &PostgresStore, owner: &User, draft: RecipeDraft) -> RecipeDetail {
    let recipe = draft.validate().expect("fixture draft should be valid");
    store
        .create_recipe(owner.id, &recipe)
        .await
        .expect("fixture recipe insert failed")
}
