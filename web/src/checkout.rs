//! Purchase orchestration.
//!
//! ```text
//! initialize ─► pending row ─► provider.initialize ─┬─ ok ──► attach tx_ref ─► checkout_url
//!                                                   └─ err ─► delete pending row (compensate)
//!
//! verify(tx_ref) ─► terminal? ─ yes ─► stored status
//!                       │
//!                       no ─► provider.verify ─► settle (pending → completed | failed)
//! ```
//!
//! Every provider call is bounded by the configured payment timeout. The
//! store's partial unique index makes a double submit a conflict before the
//! provider is ever called.

use crate::config::PaymentConfig;
use crate::error::AppError;
use recipe_hub_core::{
    CheckoutRequest, Error, PaymentGateway, PaymentGatewayError, Purchase, PurchaseId,
    PurchaseStatus, RecipeId, UserId, purchase::generate_tx_ref,
};
use recipe_hub_postgres::PostgresStore;
use serde::Serialize;
use std::future::Future;

/// An opened checkout.
#[derive(Debug, Clone, Serialize)]
pub struct InitializedPayment {
    /// Where the client redirects the payer
    pub checkout_url: String,
    /// The pending purchase
    pub purchase_id: PurchaseId,
    /// Provider transaction reference
    pub tx_ref: String,
}

/// Coordinates the store and the payment provider.
pub struct PaymentOrchestrator<'a> {
    store: &'a PostgresStore,
    gateway: &'a dyn PaymentGateway,
    config: &'a PaymentConfig,
}

impl<'a> PaymentOrchestrator<'a> {
    /// Borrow the collaborators for one request.
    #[must_use]
    pub const fn new(
        store: &'a PostgresStore,
        gateway: &'a dyn PaymentGateway,
        config: &'a PaymentConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            config,
        }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, PaymentGatewayError>>,
    ) -> Result<T, PaymentGatewayError> {
        tokio::time::timeout(self.config.timeout(), call)
            .await
            .unwrap_or(Err(PaymentGatewayError::Timeout))
    }

    /// Open a checkout for `recipe` on behalf of `user`.
    ///
    /// # Errors
    ///
    /// - 404 if the recipe is not published or the user vanished
    /// - 422 for a free recipe
    /// - 409 if the user already holds a pending or completed purchase
    /// - 400/503 if the provider refuses or fails; the pending row is
    ///   deleted first
    pub async fn initialize(
        &self,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<InitializedPayment, AppError> {
        let summary = self.store.get_recipe_summary(recipe, None).await?;
        if summary.price.is_zero() {
            return Err(Error::validation("recipe is free and cannot be purchased").into());
        }
        let buyer = self
            .store
            .get_user(user)
            .await?
            .ok_or_else(|| Error::not_found("User", user))?;

        let purchase = self
            .store
            .create_pending_purchase(user, recipe, summary.price)
            .await?;

        let tx_ref = generate_tx_ref(recipe);
        let request = CheckoutRequest {
            amount: summary.price,
            currency: self.config.currency.clone(),
            email: buyer.email.clone(),
            first_name: buyer.username.clone(),
            last_name: "User".to_string(),
            tx_ref: tx_ref.clone(),
            callback_url: self.config.callback_url.clone(),
            return_url: self.config.return_url.clone(),
            title: "Food Recipe Purchase".to_string(),
            description: format!("Purchase of recipe: {}", summary.title),
        };

        let checkout = match self.bounded(self.gateway.initialize(request)).await {
            Ok(checkout) => checkout,
            Err(err) => {
                self.compensate(purchase.id, &err.to_string()).await;
                return Err(err.into());
            }
        };

        if let Err(err) = self.store.attach_tx_ref(purchase.id, &tx_ref).await {
            self.compensate(purchase.id, &err.to_string()).await;
            return Err(err.into());
        }

        metrics::counter!("payments.initialized").increment(1);
        tracing::info!(
            purchase_id = %purchase.id,
            recipe_id = %recipe,
            user_id = %user,
            tx_ref = %tx_ref,
            amount = %summary.price,
            "Payment initialized"
        );

        Ok(InitializedPayment {
            checkout_url: checkout.checkout_url,
            purchase_id: purchase.id,
            tx_ref,
        })
    }

    async fn compensate(&self, purchase: PurchaseId, reason: &str) {
        metrics::counter!("payments.compensated").increment(1);
        match self.store.delete_pending_purchase(purchase).await {
            Ok(deleted) => tracing::warn!(
                purchase_id = %purchase,
                deleted,
                reason,
                "Checkout failed, pending purchase removed"
            ),
            Err(err) => tracing::error!(
                purchase_id = %purchase,
                reason,
                error = %err,
                "Checkout failed and the pending purchase could not be removed"
            ),
        }
    }

    /// Settle the purchase behind `tx_ref` with the provider's verdict.
    ///
    /// Already-settled purchases are returned without asking the provider.
    ///
    /// # Errors
    ///
    /// - 404 if no purchase carries `tx_ref`
    /// - 400/503 if the provider refuses or fails; the purchase stays pending
    pub async fn verify(&self, tx_ref: &str) -> Result<Purchase, AppError> {
        let purchase = self
            .store
            .find_purchase_by_tx_ref(tx_ref)
            .await?
            .ok_or_else(|| Error::not_found("Purchase", tx_ref))?;

        if purchase.status.is_terminal() {
            tracing::debug!(tx_ref, status = purchase.status.as_str(), "Purchase already settled");
            return Ok(purchase);
        }

        let verdict = self.bounded(self.gateway.verify(tx_ref)).await.map_err(|err| {
            tracing::warn!(tx_ref, error = %err, "Payment verification failed");
            AppError::from(err)
        })?;

        let settled = self
            .store
            .settle_purchase(purchase.id, PurchaseStatus::from_verdict(verdict.success))
            .await?;

        metrics::counter!("payments.verified", "status" => settled.status.as_str()).increment(1);
        tracing::info!(
            purchase_id = %settled.id,
            tx_ref,
            provider_status = %verdict.provider_status,
            status = settled.status.as_str(),
            "Payment verified"
        );

        Ok(settled)
    }
}
