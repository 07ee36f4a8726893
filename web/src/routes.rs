//! Router configuration.

use crate::handlers::{
    auth, categories, health_check, payments, readiness_check, recipes, social, upload,
};
use crate::middleware::{correlation_id_layer, cors_layer};
use crate::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Multipart framing on top of the image itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the complete Axum router.
///
/// Health checks at the root, the API under `/api`, uploaded images under
/// `/uploads`. Every response carries `X-Correlation-ID`.
pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.upload.max_bytes + MULTIPART_OVERHEAD;
    let upload_dir = state.config.upload.dir.clone();
    let cors = cors_layer(&state.config.server);

    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/profile", get(auth::profile));

    let recipe_routes = Router::new()
        .route("/", get(recipes::list_recipes).post(recipes::create_recipe))
        .route(
            "/:id",
            get(recipes::get_recipe)
                .put(recipes::update_recipe)
                .delete(recipes::delete_recipe),
        )
        .route("/:id/like", post(social::toggle_like))
        .route("/:id/bookmark", post(social::toggle_bookmark))
        .route(
            "/:id/rating",
            post(social::rate_recipe).delete(social::remove_rating),
        )
        .route("/:id/comment", post(social::add_comment))
        .route("/:id/images", post(social::add_image))
        .route(
            "/:id/images/:image_id/featured",
            put(social::feature_image),
        );

    let payment_routes = Router::new()
        .route("/initialize", post(payments::initialize_payment))
        .route("/verify", get(payments::verify_payment))
        .route("/purchases", get(payments::list_purchases));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .route("/categories", get(categories::list_categories))
        .route("/categories/:id/recipes", get(categories::category_recipes))
        .nest("/recipes", recipe_routes)
        .route(
            "/upload",
            post(upload::upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .nest("/payment", payment_routes);

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .nest("/api", api_routes)
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .layer(cors)
        .with_state(state)
}
