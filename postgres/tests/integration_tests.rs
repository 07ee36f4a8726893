//! Integration tests for the recipe aggregate and its derived statistics.
//!
//! # Requirements
//!
//! Docker must be running. Every test starts its own `PostgreSQL` container
//! through `TestDatabase`.

#![allow(clippy::expect_used)] // Test code uses expect for clear failure messages

use recipe_hub_core::recipe::StepInput;
use recipe_hub_core::{Error, RatingValue, RecipeUpdate};
use recipe_hub_testing::{TestDatabase, fixtures};

fn rating(value: i64) -> RatingValue {
    RatingValue::new(value).expect("valid rating")
}

#[tokio::test]
async fn test_create_recipe_scenario_with_featured_image() {
    let db = TestDatabase::start().await;
    let owner = fixtures::user(db.store(), "abebe").await;
    let category = fixtures::category(db.store()).await;

    let mut draft = fixtures::draft(category.id, "Misir Wot");
    draft.featured_image = Some("a.jpg".to_string());

    let created = fixtures::create(db.store(), &owner, draft).await;

    let numbers: Vec<i32> = created.steps.iter().map(|s| s.step_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert_eq!(created.ingredients.len(), 2);
    assert_eq!(created.ingredients[0].name, "Red lentils");
    assert_eq!(created.images.len(), 1);
    assert!(created.images[0].is_featured);
    assert_eq!(created.images[0].image_url, "a.jpg");
    assert_eq!(created.recipe.featured_image_url.as_deref(), Some("a.jpg"));
    assert_eq!(created.recipe.user.username, "abebe");
    assert_eq!(created.recipe.category.id, category.id);
    assert!(created.recipe.is_published);
    assert_eq!(created.recipe.like_count, 0);
    assert_eq!(created.recipe.total_ratings, 0);
}

#[tokio::test]
async fn test_extra_image_matching_featured_url_leaves_one_featured_row() {
    let db = TestDatabase::start().await;
    let owner = fixtures::user(db.store(), "almaz").await;
    let category = fixtures::category(db.store()).await;

    let mut draft = fixtures::draft(category.id, "Kitfo");
    draft.featured_image = Some("a.jpg".to_string());
    draft.images = vec!["b.jpg".to_string(), "a.jpg".to_string()];

    let created = fixtures::create(db.store(), &owner, draft).await;

    let featured: Vec<_> = created.images.iter().filter(|i| i.is_featured).collect();
    assert_eq!(created.images.len(), 3);
    assert_eq!(featured.len(), 1, "exactly one featured image");
    assert_eq!(featured[0].image_url, "a.jpg");
}

#[tokio::test]
async fn test_failed_step_insert_rolls_back_whole_recipe() {
    let db = TestDatabase::start().await;
    let owner = fixtures::user(db.store(), "bekele").await;
    let category = fixtures::category(db.store()).await;

    // A constraint only this database has: ingredients are already written
    // by the time the steps insert trips it.
    sqlx::query("ALTER TABLE steps ADD CONSTRAINT steps_no_burnt CHECK (instruction <> 'Burn it')")
        .execute(db.pool())
        .await
        .expect("add constraint");

    let mut draft = fixtures::draft(category.id, "Broken");
    draft.steps.push(StepInput {
        instruction: "Burn it".to_string(),
        image_url: None,
    });
    draft.featured_image = Some("broken.jpg".to_string());
    let recipe = draft.validate().expect("draft passes validation");

    let result = db.store().create_recipe(owner.id, &recipe).await;
    assert!(
        matches!(result, Err(Error::Integrity(_))),
        "expected integrity failure, got {result:?}"
    );

    for table in ["recipes", "ingredients", "steps", "recipe_images"] {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(db.pool())
            .await
            .expect("count");
        assert_eq!(count, 0, "{table} should be empty after rollback");
    }
}

#[tokio::test]
async fn test_create_recipe_with_unknown_category_writes_nothing() {
    let db = TestDatabase::start().await;
    let owner = fixtures::user(db.store(), "chaltu").await;

    let draft = fixtures::draft(recipe_hub_core::CategoryId::new(), "Orphan");
    let recipe = draft.validate().expect("valid draft");

    let result = db.store().create_recipe(owner.id, &recipe).await;
    assert!(
        matches!(&result, Err(Error::Validation(message)) if message.contains("category")),
        "expected validation failure, got {result:?}"
    );

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes")
        .fetch_one(db.pool())
        .await
        .expect("count");
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_toggle_like_twice_restores_count() {
    let db = TestDatabase::start().await;
    let owner = fixtures::user(db.store(), "dawit").await;
    let fan = fixtures::user(db.store(), "eden").await;
    let recipe = fixtures::recipe(db.store(), &owner, "Tibs").await.recipe;

    let first = db.store().toggle_like(fan.id, recipe.id).await.expect("like");
    assert!(first.liked);
    assert_eq!(first.like_count, 1);
    assert_eq!(db.count_for_recipe("likes", recipe.id).await, 1);

    let second = db.store().toggle_like(fan.id, recipe.id).await.expect("unlike");
    assert!(!second.liked);
    assert_eq!(second.like_count, 0);
    assert_eq!(db.count_for_recipe("likes", recipe.id).await, 0);
}

#[tokio::test]
async fn test_concurrent_likes_match_like_rows() {
    let db = TestDatabase::start().await;
    let owner = fixtures::user(db.store(), "fikir").await;
    let recipe = fixtures::recipe(db.store(), &owner, "Firfir").await.recipe;

    let mut fans = Vec::new();
    for i in 0..8 {
        fans.push(fixtures::user(db.store(), &format!("fan{i}")).await);
    }

    let tasks: Vec<_> = fans
        .iter()
        .map(|fan| {
            let store = db.store().clone();
            let (user, recipe) = (fan.id, recipe.id);
            tokio::spawn(async move { store.toggle_like(user, recipe).await })
        })
        .collect();
    for result in futures::future::join_all(tasks).await {
        result.expect("task panicked").expect("like failed");
    }

    // Two fans change their minds.
    db.store().toggle_like(fans[0].id, recipe.id).await.expect("unlike");
    db.store().toggle_like(fans[1].id, recipe.id).await.expect("unlike");

    let stored = db
        .store()
        .get_recipe_summary(recipe.id, None)
        .await
        .expect("load recipe");
    assert_eq!(stored.like_count, 6);
    assert_eq!(db.count_for_recipe("likes", recipe.id).await, 6);
}

#[tokio::test]
async fn test_concurrent_ratings_match_rating_rows() {
    let db = TestDatabase::start().await;
    let owner = fixtures::user(db.store(), "kebede").await;
    let recipe = fixtures::recipe(db.store(), &owner, "Kitfo").await.recipe;

    let mut raters = Vec::new();
    for i in 0..12 {
        raters.push(fixtures::user(db.store(), &format!("rater{i}")).await);
    }

    // 1,2,3,4,5,1,2,3,4,5,1,2: sum 33 over 12 ratings.
    let tasks: Vec<_> = raters
        .iter()
        .zip(0_i64..)
        .map(|(rater, i)| {
            let store = db.store().clone();
            let (user, recipe) = (rater.id, recipe.id);
            tokio::spawn(async move { store.rate_recipe(user, recipe, rating(i % 5 + 1)).await })
        })
        .collect();
    for result in futures::future::join_all(tasks).await {
        result.expect("task panicked").expect("rating failed");
    }

    let stored = db
        .store()
        .get_recipe_summary(recipe.id, None)
        .await
        .expect("load recipe");
    assert_eq!(stored.total_ratings, 12);
    assert!((stored.average_rating - 2.75).abs() < f64::EPSILON);
    assert_eq!(db.count_for_recipe("ratings", recipe.id).await, 12);
}

#[tokio::test]
async fn test_two_users_rate_four_and_two() {
    let db = TestDatabase::start().await;
    let owner = fixtures::user(db.store(), "genet").await;
    let u1 = fixtures::user(db.store(), "hana").await;
    let u2 = fixtures::user(db.store(), "iyasu").await;
    let recipe = fixtures::recipe(db.store(), &owner, "Injera").await.recipe;

    db.store().rate_recipe(u1.id, recipe.id, rating(4)).await.expect("rate");
    let summary = db
        .store()
        .rate_recipe(u2.id, recipe.id, rating(2))
        .await
        .expect("rate");

    assert!((summary.average_rating - 3.0).abs() < f64::EPSILON);
    assert_eq!(summary.total_ratings, 2);
    assert_eq!(summary.user_rating, Some(2));

    let stored = db
        .store()
        .get_recipe_summary(recipe.id, None)
        .await
        .expect("load recipe");
    assert!((stored.average_rating - 3.0).abs() < f64::EPSILON);
    assert_eq!(stored.total_ratings, 2);
}

#[tokio::test]
async fn test_rerating_replaces_previous_value() {
    let db = TestDatabase::start().await;
    let owner = fixtures::user(db.store(), "jemal").await;
    let rater = fixtures::user(db.store(), "kidist").await;
    let recipe = fixtures::recipe(db.store(), &owner, "Genfo").await.recipe;

    db.store().rate_recipe(rater.id, recipe.id, rating(3)).await.expect("rate");
    let summary = db
        .store()
        .rate_recipe(rater.id, recipe.id, rating(5))
        .await
        .expect("re-rate");

    assert_eq!(db.count_for_recipe("ratings", recipe.id).await, 1);
    assert!((summary.average_rating - 5.0).abs() < f64::EPSILON);
    assert_eq!(summary.total_ratings, 1);

    let interactions = db
        .store()
        .interactions(rater.id, recipe.id)
        .await
        .expect("interactions");
    assert_eq!(interactions.rating, Some(5));
}

#[tokio::test]
async fn test_average_is_rounded_to_two_decimals() {
    let db = TestDatabase::start().await;
    let owner = fixtures::user(db.store(), "lensa").await;
    let recipe = fixtures::recipe(db.store(), &owner, "Ayib").await.recipe;

    for (name, value) in [("rater1", 5), ("rater2", 4), ("rater3", 4)] {
        let rater = fixtures::user(db.store(), name).await;
        db.store().rate_recipe(rater.id, recipe.id, rating(value)).await.expect("rate");
    }

    let stored = db
        .store()
        .get_recipe_summary(recipe.id, None)
        .await
        .expect("load recipe");
    assert!((stored.average_rating - 4.33).abs() < 1e-9);
    assert_eq!(stored.total_ratings, 3);
}

#[tokio::test]
async fn test_removing_last_rating_resets_aggregate() {
    let db = TestDatabase::start().await;
    let owner = fixtures::user(db.store(), "meron").await;
    let rater = fixtures::user(db.store(), "nahom").await;
    let recipe = fixtures::recipe(db.store(), &owner, "Dulet").await.recipe;

    db.store().rate_recipe(rater.id, recipe.id, rating(4)).await.expect("rate");
    let summary = db.store().remove_rating(rater.id, recipe.id).await.expect("remove");

    assert!(summary.average_rating.abs() < f64::EPSILON);
    assert_eq!(summary.total_ratings, 0);
    assert_eq!(summary.user_rating, None);

    let again = db.store().remove_rating(rater.id, recipe.id).await;
    assert!(matches!(again, Err(Error::NotFound { resource: "Rating", .. })));
}

#[tokio::test]
async fn test_concurrent_featured_images_leave_exactly_one() {
    let db = TestDatabase::start().await;
    let owner = fixtures::user(db.store(), "rahel").await;
    let recipe = fixtures::recipe(db.store(), &owner, "Shiro").await.recipe;

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let store = db.store().clone();
            let (owner, recipe) = (owner.id, recipe.id);
            tokio::spawn(async move {
                store
                    .add_image(owner, recipe, &format!("img-{i}.jpg"), true)
                    .await
            })
        })
        .collect();
    for result in futures::future::join_all(tasks).await {
        result.expect("task panicked").expect("add image failed");
    }

    let detail = db.store().get_recipe(recipe.id, None).await.expect("load");
    let featured: Vec<_> = detail.images.iter().filter(|i| i.is_featured).collect();
    assert_eq!(detail.images.len(), 8);
    assert_eq!(featured.len(), 1);
    assert_eq!(
        detail.recipe.featured_image_url.as_deref(),
        Some(featured[0].image_url.as_str()),
        "recipe points at the featured image"
    );
}

#[tokio::test]
async fn test_feature_image_moves_the_flag() {
    let db = TestDatabase::start().await;
    let owner = fixtures::user(db.store(), "samuel").await;
    let intruder = fixtures::user(db.store(), "tigist").await;
    let recipe = fixtures::recipe(db.store(), &owner, "Kik Alicha").await.recipe;

    let first = db
        .store()
        .add_image(owner.id, recipe.id, "first.jpg", true)
        .await
        .expect("add first");
    let second = db
        .store()
        .add_image(owner.id, recipe.id, "second.jpg", false)
        .await
        .expect("add second");
    assert!(first.is_featured);
    assert!(!second.is_featured);

    let denied = db.store().feature_image(intruder.id, recipe.id, second.id).await;
    assert!(matches!(denied, Err(Error::NotFound { .. })));

    let featured = db
        .store()
        .feature_image(owner.id, recipe.id, second.id)
        .await
        .expect("feature second");
    assert!(featured.is_featured);

    let detail = db.store().get_recipe(recipe.id, None).await.expect("load");
    assert_eq!(detail.images[0].id, second.id, "featured image sorts first");
    assert!(!detail.images[1].is_featured);
    assert_eq!(detail.recipe.featured_image_url.as_deref(), Some("second.jpg"));
}

#[tokio::test]
async fn test_comments_are_listed_newest_first() {
    let db = TestDatabase::start().await;
    let owner = fixtures::user(db.store(), "yonas").await;
    let reader = fixtures::user(db.store(), "zewdi").await;
    let recipe = fixtures::recipe(db.store(), &owner, "Atkilt").await.recipe;

    db.store()
        .add_comment(reader.id, recipe.id, "  Tasty  ")
        .await
        .expect("comment");
    db.store()
        .add_comment(owner.id, recipe.id, "Thanks!")
        .await
        .expect("comment");

    let blank = db.store().add_comment(reader.id, recipe.id, "   ").await;
    assert!(matches!(blank, Err(Error::Validation(_))));

    let detail = db.store().get_recipe(recipe.id, None).await.expect("load");
    let contents: Vec<&str> = detail.comments.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, vec!["Thanks!", "Tasty"]);
    assert_eq!(detail.comments[1].user.username, "zewdi");
}

#[tokio::test]
async fn test_interactions_default_to_absent() {
    let db = TestDatabase::start().await;
    let owner = fixtures::user(db.store(), "aster").await;
    let viewer = fixtures::user(db.store(), "biruk").await;
    let recipe = fixtures::recipe(db.store(), &owner, "Enkulal").await.recipe;

    let none = db.store().interactions(viewer.id, recipe.id).await.expect("load");
    assert!(!none.liked && !none.bookmarked);
    assert_eq!(none.rating, None);

    db.store().toggle_like(viewer.id, recipe.id).await.expect("like");
    assert!(db.store().toggle_bookmark(viewer.id, recipe.id).await.expect("bookmark"));

    let some = db.store().interactions(viewer.id, recipe.id).await.expect("load");
    assert!(some.liked && some.bookmarked);
}

#[tokio::test]
async fn test_soft_deleted_recipe_is_hidden_except_from_owner() {
    let db = TestDatabase::start().await;
    let owner = fixtures::user(db.store(), "dagi").await;
    let other = fixtures::user(db.store(), "elsa").await;
    let recipe = fixtures::recipe(db.store(), &owner, "Beyaynetu").await.recipe;

    let denied = db.store().delete_recipe(other.id, recipe.id).await;
    assert!(matches!(denied, Err(Error::NotFound { .. })));

    db.store().delete_recipe(owner.id, recipe.id).await.expect("delete");

    assert!(matches!(
        db.store().get_recipe(recipe.id, None).await,
        Err(Error::NotFound { .. })
    ));
    assert!(matches!(
        db.store().toggle_like(other.id, recipe.id).await,
        Err(Error::NotFound { .. })
    ));

    let own = db
        .store()
        .get_recipe(recipe.id, Some(owner.id))
        .await
        .expect("owner still sees it");
    assert!(own.recipe.is_deleted());
    assert_eq!(own.steps.len(), 3, "children stay attached");

    let twice = db.store().delete_recipe(owner.id, recipe.id).await;
    assert!(matches!(twice, Err(Error::NotFound { .. })));
}

#[tokio::test]
async fn test_update_recipe_is_owner_only_and_can_unpublish() {
    let db = TestDatabase::start().await;
    let owner = fixtures::user(db.store(), "fasil").await;
    let other = fixtures::user(db.store(), "gelila").await;
    let recipe = fixtures::recipe(db.store(), &owner, "Chechebsa").await.recipe;

    let changes = RecipeUpdate {
        title: Some("  Chechebsa Deluxe ".to_string()),
        price: Some(12.5),
        is_published: Some(false),
        ..RecipeUpdate::default()
    }
    .validate()
    .expect("valid update");

    let denied = db.store().update_recipe(other.id, recipe.id, &changes).await;
    assert!(matches!(denied, Err(Error::NotFound { .. })));

    let updated = db
        .store()
        .update_recipe(owner.id, recipe.id, &changes)
        .await
        .expect("update");
    assert_eq!(updated.recipe.title, "Chechebsa Deluxe");
    assert_eq!(updated.recipe.price.cents(), 1250);
    assert!(!updated.recipe.is_published);
    assert_eq!(updated.recipe.cooking_time, 20, "untouched fields kept");

    assert!(matches!(
        db.store().get_recipe(recipe.id, Some(other.id)).await,
        Err(Error::NotFound { .. })
    ));
    assert!(matches!(
        db.store().rate_recipe(other.id, recipe.id, rating(5)).await,
        Err(Error::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_duplicate_signup_is_conflict() {
    let db = TestDatabase::start().await;
    fixtures::user(db.store(), "habtamu").await;

    let duplicate = recipe_hub_core::Signup {
        email: "HABTAMU@example.com".to_string(),
        username: "someone-else".to_string(),
        password: "password123".to_string(),
    }
    .validate()
    .expect("valid signup");

    let result = db
        .store()
        .create_user(&duplicate, fixtures::FIXTURE_PASSWORD_HASH)
        .await;
    assert!(matches!(result, Err(Error::Conflict(_))), "got {result:?}");

    let found = db
        .store()
        .find_user_by_email("habtamu@example.com")
        .await
        .expect("lookup");
    assert!(found.is_some());
}

#[tokio::test]
async fn test_seeding_categories_is_idempotent() {
    let db = TestDatabase::start().await;

    let inserted = db.store().seed_default_categories().await.expect("seed");
    assert_eq!(inserted, 0, "already seeded at startup");

    let categories = db.store().list_categories().await.expect("list");
    assert_eq!(categories.len(), 10);
    let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted, "ordered by name");
}
