//! End-to-end HTTP tests: real Postgres, scripted payment gateway.

#![allow(clippy::expect_used, clippy::panic)]

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use recipe_hub_auth::{SigningKey, TokenConfig, TokenService};
use recipe_hub_core::{PaymentGatewayError, RecipeId, SystemClock, User};
use recipe_hub_testing::{MockPaymentGateway, TestDatabase, fixtures};
use recipe_hub_web::config::{Config, UploadConfig};
use recipe_hub_web::{AppState, CORRELATION_ID_HEADER, build_router};
use serde_json::{Value, json};
use std::sync::Arc;

const PNG_HEADER: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

struct Harness {
    db: TestDatabase,
    server: TestServer,
    gateway: MockPaymentGateway,
    tokens: Arc<TokenService>,
}

impl Harness {
    async fn start() -> Self {
        recipe_hub_testing::init_test_tracing();
        let db = TestDatabase::start().await;
        let gateway = MockPaymentGateway::new();

        let key = SigningKey::new(vec![42u8; 32]).expect("signing key");
        let config = Config {
            upload: UploadConfig {
                dir: std::env::temp_dir().join(format!("recipe-hub-uploads-{}", uuid::Uuid::new_v4())),
                max_bytes: 64 * 1024,
            },
            ..Config::default()
        };
        let state = AppState::new(
            db.store().clone(),
            TokenService::new(&key, TokenConfig::default(), Arc::new(SystemClock)),
            gateway.shared(),
            config,
        );
        let tokens = Arc::clone(&state.tokens);
        let server = TestServer::new(build_router(state)).expect("test server");

        Self {
            db,
            server,
            gateway,
            tokens,
        }
    }

    /// A registered user and a bearer token for them.
    async fn user(&self, username: &str) -> (User, String) {
        let user = fixtures::user(self.db.store(), username).await;
        let token = self
            .tokens
            .issue(user.id, &user.email)
            .expect("issue token")
            .token;
        (user, token)
    }

    /// A published recipe priced at 25.00.
    async fn paid_recipe(&self, owner: &User) -> RecipeId {
        let category = fixtures::category(self.db.store()).await;
        let mut draft = fixtures::draft(category.id, "Doro Wat");
        draft.price = Some(25.0);
        fixtures::create(self.db.store(), owner, draft).await.recipe.id
    }

    async fn purchase_rows(&self, recipe: RecipeId) -> i64 {
        self.db.count_for_recipe("purchases", recipe).await
    }
}

// ============================================================================
// Health & middleware
// ============================================================================

#[tokio::test]
async fn test_health_and_readiness() {
    let h = Harness::start().await;

    let health = h.server.get("/health").await;
    health.assert_status_ok();
    assert_eq!(health.json::<Value>()["status"], "ok");
    assert!(!health.header(CORRELATION_ID_HEADER).is_empty());

    let ready = h.server.get("/ready").await;
    ready.assert_status_ok();
    assert_eq!(ready.json::<Value>()["database"], true);
}

// ============================================================================
// Accounts
// ============================================================================

#[tokio::test]
async fn test_signup_login_profile() {
    let h = Harness::start().await;

    let signup = h
        .server
        .post("/api/auth/signup")
        .json(&json!({ "email": "Cook@Example.com", "username": "cook", "password": "secret1" }))
        .await;
    signup.assert_status(StatusCode::CREATED);
    let body = signup.json::<Value>();
    assert_eq!(body["user"]["email"], "cook@example.com");
    assert!(body["user"].get("password_hash").is_none());

    let login = h
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "cook@example.com", "password": "secret1" }))
        .await;
    login.assert_status_ok();
    let token = login.json::<Value>()["token"]
        .as_str()
        .expect("token")
        .to_string();

    let profile = h
        .server
        .get("/api/auth/profile")
        .authorization_bearer(&token)
        .await;
    profile.assert_status_ok();
    assert_eq!(profile.json::<Value>()["username"], "cook");
}

#[tokio::test]
async fn test_signup_rejects_duplicates_and_weak_input() {
    let h = Harness::start().await;
    let payload = json!({ "email": "dup@example.com", "username": "dupe", "password": "secret1" });

    h.server
        .post("/api/auth/signup")
        .json(&payload)
        .await
        .assert_status(StatusCode::CREATED);
    h.server
        .post("/api/auth/signup")
        .json(&payload)
        .await
        .assert_status(StatusCode::CONFLICT);

    let weak = h
        .server
        .post("/api/auth/signup")
        .json(&json!({ "email": "new@example.com", "username": "newbie", "password": "123" }))
        .await;
    weak.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(weak.json::<Value>()["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let h = Harness::start().await;
    h.server
        .post("/api/auth/signup")
        .json(&json!({ "email": "real@example.com", "username": "real", "password": "secret1" }))
        .await
        .assert_status(StatusCode::CREATED);

    let wrong_password = h
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "real@example.com", "password": "wrong-one" }))
        .await;
    let unknown_email = h
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "ghost@example.com", "password": "secret1" }))
        .await;

    wrong_password.assert_status(StatusCode::UNAUTHORIZED);
    unknown_email.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(
        wrong_password.json::<Value>()["message"],
        unknown_email.json::<Value>()["message"]
    );
}

#[tokio::test]
async fn test_protected_routes_require_valid_token() {
    let h = Harness::start().await;

    let missing = h.server.get("/api/auth/profile").await;
    missing.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(missing.json::<Value>()["code"], "UNAUTHORIZED");

    h.server
        .get("/api/auth/profile")
        .authorization_bearer("not.a.jwt")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    h.server
        .post("/api/payment/initialize")
        .json(&json!({ "recipe_id": RecipeId::new() }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Recipes & interactions
// ============================================================================

#[tokio::test]
async fn test_create_recipe_and_view_with_interactions() {
    let h = Harness::start().await;
    let (_, token) = h.user("author").await;
    let category = fixtures::category(h.db.store()).await;

    let created = h
        .server
        .post("/api/recipes")
        .authorization_bearer(&token)
        .json(&json!({
            "title": "Shiro",
            "description": "Chickpea stew",
            "preparation_time": 10,
            "cooking_time": 25,
            "servings": 4,
            "difficulty": "easy",
            "category_id": category.id,
            "ingredients": [
                { "name": "Shiro powder", "quantity": "1", "unit": "cup" },
                { "name": "Berbere", "quantity": "1", "unit": "tbsp" }
            ],
            "steps": [
                { "instruction": "Boil water" },
                { "instruction": "Whisk in powder" },
                { "instruction": "Simmer" }
            ],
            "featured_image": "a.jpg"
        }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let recipe = created.json::<Value>();
    let id = recipe["id"].as_str().expect("id").to_string();
    let steps: Vec<i64> = recipe["steps"]
        .as_array()
        .expect("steps")
        .iter()
        .map(|s| s["step_number"].as_i64().expect("step number"))
        .collect();
    assert_eq!(steps, vec![1, 2, 3]);
    assert_eq!(recipe["featured_image_url"], "a.jpg");

    let anonymous = h.server.get(&format!("/api/recipes/{id}")).await;
    anonymous.assert_status_ok();
    let body = anonymous.json::<Value>();
    assert_eq!(body["user_liked"], false);
    assert_eq!(body["user_rating"], Value::Null);

    let (_, fan) = h.user("fan").await;
    let like = h
        .server
        .post(&format!("/api/recipes/{id}/like"))
        .authorization_bearer(&fan)
        .await;
    like.assert_status_ok();
    assert_eq!(like.json::<Value>(), json!({ "liked": true, "like_count": 1 }));

    let rating = h
        .server
        .post(&format!("/api/recipes/{id}/rating"))
        .authorization_bearer(&fan)
        .json(&json!({ "rating": 4 }))
        .await;
    rating.assert_status_ok();
    assert_eq!(rating.json::<Value>()["average_rating"], 4.0);

    let viewed = h
        .server
        .get(&format!("/api/recipes/{id}"))
        .authorization_bearer(&fan)
        .await
        .json::<Value>();
    assert_eq!(viewed["user_liked"], true);
    assert_eq!(viewed["user_bookmarked"], false);
    assert_eq!(viewed["user_rating"], 4);
    assert_eq!(viewed["recipe"]["like_count"], 1);
}

#[tokio::test]
async fn test_invalid_rating_and_bad_path() {
    let h = Harness::start().await;
    let (owner, token) = h.user("rater").await;
    let recipe = fixtures::recipe(h.db.store(), &owner, "Tibs").await;

    h.server
        .post(&format!("/api/recipes/{}/rating", recipe.recipe.id))
        .authorization_bearer(&token)
        .json(&json!({ "rating": 6 }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let bad_id = h.server.get("/api/recipes/not-a-uuid").await;
    bad_id.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(bad_id.json::<Value>()["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_only_owner_can_update_or_delete() {
    let h = Harness::start().await;
    let (owner, owner_token) = h.user("owner").await;
    let (_, other_token) = h.user("other").await;
    let recipe = fixtures::recipe(h.db.store(), &owner, "Kitfo").await.recipe.id;

    h.server
        .put(&format!("/api/recipes/{recipe}"))
        .authorization_bearer(&other_token)
        .json(&json!({ "title": "Stolen" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    h.server
        .delete(&format!("/api/recipes/{recipe}"))
        .authorization_bearer(&other_token)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let updated = h
        .server
        .put(&format!("/api/recipes/{recipe}"))
        .authorization_bearer(&owner_token)
        .json(&json!({ "title": "Kitfo Special" }))
        .await;
    updated.assert_status_ok();
    assert_eq!(updated.json::<Value>()["title"], "Kitfo Special");

    h.server
        .delete(&format!("/api/recipes/{recipe}"))
        .authorization_bearer(&owner_token)
        .await
        .assert_status_ok();
    h.server
        .get(&format!("/api/recipes/{recipe}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_pagination_over_http() {
    let h = Harness::start().await;
    let (owner, _) = h.user("prolific").await;
    for i in 1..=25 {
        fixtures::recipe(h.db.store(), &owner, &format!("Recipe {i}")).await;
    }

    let page = h
        .server
        .get("/api/recipes")
        .add_query_param("page", 2)
        .add_query_param("limit", 10)
        .await;
    page.assert_status_ok();
    let body = page.json::<Value>();
    assert_eq!(body["total"], 25);
    assert_eq!(body["pages"], 3);
    assert_eq!(body["page"], 2);
    assert_eq!(body["recipes"].as_array().expect("recipes").len(), 10);

    let category = fixtures::category(h.db.store()).await;
    let browse = h
        .server
        .get(&format!("/api/categories/{}/recipes", category.id))
        .add_query_param("limit", 5)
        .await
        .json::<Value>();
    assert_eq!(browse["category"]["name"], category.name);
    assert_eq!(browse["total"], 25);
    assert_eq!(browse["recipes"].as_array().expect("recipes").len(), 5);
}

// ============================================================================
// Uploads
// ============================================================================

#[tokio::test]
async fn test_upload_sniffs_content_and_serves_file() {
    let h = Harness::start().await;
    let mut png = PNG_HEADER.to_vec();
    png.extend_from_slice(&[0u8; 32]);

    // Client-supplied name and type are ignored.
    let form = MultipartForm::new().add_part(
        "image",
        Part::bytes(png.clone())
            .file_name("photo.gif")
            .mime_type("image/gif"),
    );
    let uploaded = h.server.post("/api/upload").multipart(form).await;
    uploaded.assert_status(StatusCode::CREATED);
    let body = uploaded.json::<Value>();
    assert_eq!(body["mime_type"], "image/png");
    assert_eq!(body["file_size"], png.len());
    let url = body["url"].as_str().expect("url");
    assert!(url.starts_with("/uploads/") && url.ends_with(".png"));

    let served = h.server.get(url).await;
    served.assert_status_ok();
    assert_eq!(served.as_bytes().to_vec(), png);
}

#[tokio::test]
async fn test_upload_rejects_non_images_and_missing_field() {
    let h = Harness::start().await;

    let script = MultipartForm::new().add_part(
        "image",
        Part::bytes(b"<script>alert(1)</script>".to_vec())
            .file_name("evil.png")
            .mime_type("image/png"),
    );
    h.server
        .post("/api/upload")
        .multipart(script)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let missing = h
        .server
        .post("/api/upload")
        .multipart(MultipartForm::new().add_text("caption", "no file"))
        .await;
    missing.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(missing.json::<Value>()["message"], "No image file provided");
}

#[tokio::test]
async fn test_upload_without_multipart_body_is_bad_request() {
    let h = Harness::start().await;

    let response = h
        .server
        .post("/api/upload")
        .json(&json!({ "image": "not a file" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "BAD_REQUEST");
}

// ============================================================================
// Payments
// ============================================================================

#[tokio::test]
async fn test_second_initialization_conflicts_without_second_row() {
    let h = Harness::start().await;
    let (seller, _) = h.user("seller").await;
    let (_, buyer) = h.user("buyer").await;
    let recipe = h.paid_recipe(&seller).await;

    let first = h
        .server
        .post("/api/payment/initialize")
        .authorization_bearer(&buyer)
        .json(&json!({ "recipe_id": recipe }))
        .await;
    first.assert_status_ok();
    let body = first.json::<Value>();
    let tx_ref = body["tx_ref"].as_str().expect("tx_ref");
    assert!(tx_ref.starts_with(&format!("recipe-{recipe}-")));
    assert_eq!(body["checkout_url"], format!("https://checkout.test/{tx_ref}"));

    let calls = h.gateway.initialize_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].amount.cents(), 2500);
    assert_eq!(calls[0].email, "buyer@example.com");

    h.server
        .post("/api/payment/initialize")
        .authorization_bearer(&buyer)
        .json(&json!({ "recipe_id": recipe }))
        .await
        .assert_status(StatusCode::CONFLICT);

    assert_eq!(h.purchase_rows(recipe).await, 1);
    assert_eq!(h.gateway.initialize_calls().len(), 1);
}

#[tokio::test]
async fn test_failed_checkout_is_compensated() {
    let h = Harness::start().await;
    let (seller, _) = h.user("seller").await;
    let (_, buyer) = h.user("buyer").await;
    let recipe = h.paid_recipe(&seller).await;

    h.gateway.fail_next_initialize(PaymentGatewayError::Timeout);
    let failed = h
        .server
        .post("/api/payment/initialize")
        .authorization_bearer(&buyer)
        .json(&json!({ "recipe_id": recipe }))
        .await;
    failed.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(h.purchase_rows(recipe).await, 0);

    h.gateway
        .fail_next_initialize(PaymentGatewayError::Rejected("Invalid currency".into()));
    let rejected = h
        .server
        .post("/api/payment/initialize")
        .authorization_bearer(&buyer)
        .json(&json!({ "recipe_id": recipe }))
        .await;
    rejected.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(rejected.json::<Value>()["message"], "Invalid currency");
    assert_eq!(h.purchase_rows(recipe).await, 0);

    h.server
        .post("/api/payment/initialize")
        .authorization_bearer(&buyer)
        .json(&json!({ "recipe_id": recipe }))
        .await
        .assert_status_ok();
    assert_eq!(h.purchase_rows(recipe).await, 1);
}

#[tokio::test]
async fn test_free_recipe_cannot_be_purchased() {
    let h = Harness::start().await;
    let (seller, _) = h.user("seller").await;
    let (_, buyer) = h.user("buyer").await;
    let free = fixtures::recipe(h.db.store(), &seller, "Free Injera").await.recipe.id;

    h.server
        .post("/api/payment/initialize")
        .authorization_bearer(&buyer)
        .json(&json!({ "recipe_id": free }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(h.gateway.initialize_calls().is_empty());
}

#[tokio::test]
async fn test_verify_settles_once_and_lists_purchase() {
    let h = Harness::start().await;
    let (seller, _) = h.user("seller").await;
    let (_, buyer) = h.user("buyer").await;
    let recipe = h.paid_recipe(&seller).await;

    let tx_ref = h
        .server
        .post("/api/payment/initialize")
        .authorization_bearer(&buyer)
        .json(&json!({ "recipe_id": recipe }))
        .await
        .json::<Value>()["tx_ref"]
        .as_str()
        .expect("tx_ref")
        .to_string();

    h.gateway.next_verify_status("success");
    let verified = h
        .server
        .get("/api/payment/verify")
        .add_query_param("tx_ref", &tx_ref)
        .await;
    verified.assert_status_ok();
    assert_eq!(verified.json::<Value>()["status"], "completed");

    // A late failure callback does not reopen a settled purchase.
    h.gateway.next_verify_status("failed");
    let again = h
        .server
        .get("/api/payment/verify")
        .add_query_param("tx_ref", &tx_ref)
        .await;
    assert_eq!(again.json::<Value>()["status"], "completed");
    assert_eq!(h.gateway.verify_calls(), vec![tx_ref.clone()]);

    let purchases = h
        .server
        .get("/api/payment/purchases")
        .authorization_bearer(&buyer)
        .await
        .json::<Value>();
    let purchases = purchases.as_array().expect("purchases");
    assert_eq!(purchases.len(), 1);
    assert_eq!(purchases[0]["status"], "completed");
    assert_eq!(purchases[0]["recipe_title"], "Doro Wat");
}

#[tokio::test]
async fn test_verify_failure_frees_the_recipe_for_another_attempt() {
    let h = Harness::start().await;
    let (seller, _) = h.user("seller").await;
    let (_, buyer) = h.user("buyer").await;
    let recipe = h.paid_recipe(&seller).await;

    let initialize = || {
        h.server
            .post("/api/payment/initialize")
            .authorization_bearer(&buyer)
            .json(&json!({ "recipe_id": recipe }))
    };

    let tx_ref = initialize().await.json::<Value>()["tx_ref"]
        .as_str()
        .expect("tx_ref")
        .to_string();

    h.gateway.next_verify_status("failed");
    let verified = h
        .server
        .get("/api/payment/verify")
        .add_query_param("tx_ref", &tx_ref)
        .await
        .json::<Value>();
    assert_eq!(verified["status"], "failed");

    initialize().await.assert_status_ok();
    assert_eq!(h.purchase_rows(recipe).await, 2);
}

#[tokio::test]
async fn test_provider_outage_during_verify_leaves_purchase_pending() {
    let h = Harness::start().await;
    let (seller, _) = h.user("seller").await;
    let (_, buyer) = h.user("buyer").await;
    let recipe = h.paid_recipe(&seller).await;

    let tx_ref = h
        .server
        .post("/api/payment/initialize")
        .authorization_bearer(&buyer)
        .json(&json!({ "recipe_id": recipe }))
        .await
        .json::<Value>()["tx_ref"]
        .as_str()
        .expect("tx_ref")
        .to_string();

    h.gateway.fail_next_verify(PaymentGatewayError::Timeout);
    h.server
        .get("/api/payment/verify")
        .add_query_param("tx_ref", &tx_ref)
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let purchases = h
        .server
        .get("/api/payment/purchases")
        .authorization_bearer(&buyer)
        .await
        .json::<Value>();
    assert_eq!(purchases[0]["status"], "pending");

    // The provider's retry settles it.
    h.gateway.next_verify_status("success");
    let verified = h
        .server
        .get("/api/payment/verify")
        .add_query_param("tx_ref", &tx_ref)
        .await
        .json::<Value>();
    assert_eq!(verified["status"], "completed");
    assert_eq!(h.gateway.verify_calls().len(), 2);
}

#[tokio::test]
async fn test_payment_callback_keeps_provider_correlation_id() {
    let h = Harness::start().await;
    let correlation = uuid::Uuid::new_v4();

    let response = h
        .server
        .get("/api/payment/verify")
        .add_query_param("tx_ref", "recipe-unknown")
        .add_header(
            HeaderName::from_static("x-correlation-id"),
            HeaderValue::from_str(&correlation.to_string()).expect("header value"),
        )
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        response.header(CORRELATION_ID_HEADER).to_str().expect("ascii"),
        correlation.to_string()
    );
}

#[tokio::test]
async fn test_verify_unknown_reference_is_not_found() {
    let h = Harness::start().await;

    h.server
        .get("/api/payment/verify")
        .add_query_param("tx_ref", "recipe-missing")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    h.server
        .get("/api/payment/verify")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    assert!(h.gateway.verify_calls().is_empty());
}
