//! Payment endpoints.
//!
//! - POST /api/payment/initialize - Open a checkout for a paid recipe (requires auth)
//! - GET /api/payment/verify?tx_ref= - Provider callback; settles the purchase
//! - GET /api/payment/purchases - The caller's purchases, newest first (requires auth)

use crate::checkout::{InitializedPayment, PaymentOrchestrator};
use crate::error::AppError;
use crate::extractors::{AuthUser, CorrelationId, JsonBody, QueryParams};
use crate::state::AppState;
use axum::{Json, extract::State};
use recipe_hub_core::{PurchaseId, PurchaseStatus, PurchaseSummary, RecipeId};
use serde::{Deserialize, Serialize};
use tracing::Instrument;

/// `{"recipe_id": "..."}`
#[derive(Debug, Deserialize)]
pub struct InitializeRequest {
    /// Recipe to buy
    pub recipe_id: RecipeId,
}

/// `?tx_ref=`
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    /// Provider transaction reference
    pub tx_ref: String,
}

/// Settlement result.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    /// Stored purchase status
    pub status: PurchaseStatus,
    /// Human-readable summary
    pub message: &'static str,
    /// The purchase
    pub purchase_id: PurchaseId,
}

fn orchestrator(state: &AppState) -> PaymentOrchestrator<'_> {
    PaymentOrchestrator::new(&state.store, state.gateway.as_ref(), &state.config.payment)
}

/// Provider calls and compensations are logged under the request's correlation ID.
fn payment_span(operation: &'static str, correlation: CorrelationId) -> tracing::Span {
    tracing::info_span!("payment", operation, correlation_id = %correlation.0)
}

/// Open a checkout.
///
/// # Errors
///
/// - 404 if the recipe is not published
/// - 422 if the recipe is free
/// - 409 if the caller already bought it or has a payment pending
/// - 400/503 if the provider refuses or is unavailable
pub async fn initialize_payment(
    State(state): State<AppState>,
    correlation: CorrelationId,
    user: AuthUser,
    JsonBody(request): JsonBody<InitializeRequest>,
) -> Result<Json<InitializedPayment>, AppError> {
    Ok(Json(
        orchestrator(&state)
            .initialize(user.user_id, request.recipe_id)
            .instrument(payment_span("initialize", correlation))
            .await?,
    ))
}

/// Settle a purchase from the provider's callback.
///
/// # Errors
///
/// - 400 without `tx_ref`
/// - 404 for an unknown reference
/// - 400/503 if the provider refuses or is unavailable
pub async fn verify_payment(
    State(state): State<AppState>,
    correlation: CorrelationId,
    QueryParams(query): QueryParams<VerifyQuery>,
) -> Result<Json<VerifyResponse>, AppError> {
    let tx_ref = query.tx_ref.trim();
    if tx_ref.is_empty() {
        return Err(AppError::bad_request("tx_ref is required"));
    }

    let purchase = orchestrator(&state)
        .verify(tx_ref)
        .instrument(payment_span("verify", correlation))
        .await?;
    Ok(Json(VerifyResponse {
        status: purchase.status,
        message: "Payment verification completed",
        purchase_id: purchase.id,
    }))
}

/// The caller's purchases.
///
/// # Errors
///
/// - 503 if the database is unavailable
pub async fn list_purchases(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<PurchaseSummary>>, AppError> {
    Ok(Json(state.store.list_purchases(user.user_id).await?))
}
