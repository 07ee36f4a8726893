//! Chapa API client implementation

use crate::error::ChapaError;
use crate::wire::{Envelope, InitializeData, InitializeRequest, VerifyData};
use recipe_hub_core::{
    Checkout, CheckoutRequest, GatewayResult, PaymentGateway, VerifiedStatus,
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Production Chapa endpoint.
pub const DEFAULT_API_URL: &str = "https://api.chapa.co/v1";

/// Default bound on every provider call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Chapa API client
#[derive(Clone)]
pub struct ChapaClient {
    client: Client,
    secret_key: String,
    api_url: String,
}

impl ChapaClient {
    /// Create a new client with explicit settings
    ///
    /// # Errors
    ///
    /// Returns `ChapaError::ClientBuild` if the TLS backend cannot initialize
    pub fn new(
        secret_key: impl Into<String>,
        api_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ChapaError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChapaError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            secret_key: secret_key.into(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Open a hosted checkout
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, timeouts, parsing failures, or a
    /// status other than `success`
    pub async fn initialize(&self, request: &InitializeRequest) -> Result<String, ChapaError> {
        let response = self
            .client
            .post(format!("{}/transaction/initialize", self.api_url))
            .bearer_auth(&self.secret_key)
            .json(request)
            .send()
            .await?;

        let envelope: Envelope<InitializeData> = Self::read_envelope(response).await?;
        if envelope.status != "success" {
            tracing::warn!(
                tx_ref = %request.tx_ref,
                message = %envelope.message,
                "Chapa rejected checkout initialization"
            );
            return Err(ChapaError::Rejected(envelope.message));
        }

        envelope
            .data
            .map(|data| data.checkout_url)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ChapaError::ResponseParseFailed("missing data.checkout_url".to_string()))
    }

    /// Look up the status of a transaction
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, timeouts, or parsing failures
    pub async fn verify(&self, tx_ref: &str) -> Result<String, ChapaError> {
        let response = self
            .client
            .get(format!("{}/transaction/verify/{tx_ref}", self.api_url))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        let envelope: Envelope<VerifyData> = Self::read_envelope(response).await?;
        Ok(envelope
            .data
            .map_or_else(|| envelope.status.clone(), |data| data.status))
    }

    /// Decode the JSON envelope, whatever the HTTP status. Chapa reports
    /// business failures as 4xx with a readable envelope.
    async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<Envelope<T>, ChapaError> {
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<Envelope<T>>(&body) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => Err(ChapaError::ApiError {
                status: status.as_u16(),
                message: body,
            }),
            Err(e) => Err(ChapaError::ResponseParseFailed(e.to_string())),
        }
    }
}

impl fmt::Debug for ChapaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChapaClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl PaymentGateway for ChapaClient {
    fn initialize(
        &self,
        request: CheckoutRequest,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<Checkout>> + Send>> {
        let client = self.clone();
        Box::pin(async move {
            let body = InitializeRequest::from(request);
            let checkout_url = client.initialize(&body).await?;
            tracing::info!(tx_ref = %body.tx_ref, "Chapa checkout initialized");
            Ok(Checkout { checkout_url })
        })
    }

    fn verify(
        &self,
        tx_ref: &str,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<VerifiedStatus>> + Send>> {
        let client = self.clone();
        let tx_ref = tx_ref.to_string();
        Box::pin(async move {
            let provider_status = ChapaClient::verify(&client, &tx_ref).await?;
            tracing::info!(tx_ref = %tx_ref, provider_status = %provider_status, "Chapa transaction verified");
            Ok(VerifiedStatus {
                success: provider_status == "success",
                provider_status,
            })
        })
    }
}
