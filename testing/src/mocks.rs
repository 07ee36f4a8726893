//! Mock implementations of the service seams.

use chrono::{DateTime, Utc};
use recipe_hub_core::{
    Checkout, CheckoutRequest, Clock, GatewayResult, PaymentGateway, PaymentGatewayError,
    VerifiedStatus,
};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Fixed clock for deterministic tests
///
/// Always returns the same time, making tests reproducible.
///
/// # Example
///
/// ```
/// use recipe_hub_testing::mocks::FixedClock;
/// use recipe_hub_core::environment::Clock;
/// use chrono::Utc;
///
/// let clock = FixedClock::new(Utc::now());
/// let time1 = clock.now();
/// let time2 = clock.now();
/// assert_eq!(time1, time2); // Always the same!
/// ```
#[derive(Debug, Clone)]
pub struct FixedClock {
    time: DateTime<Utc>,
}

impl FixedClock {
    /// Create a new fixed clock with the given time
    #[must_use]
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self { time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time
    }
}

/// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
///
/// # Panics
///
/// This function will panic if the hardcoded timestamp fails to parse,
/// which should never happen in practice.
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_clock() -> FixedClock {
    FixedClock::new(
        DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .expect("hardcoded timestamp should always parse")
            .with_timezone(&Utc),
    )
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct GatewayScript {
    initialize: VecDeque<GatewayResult<Checkout>>,
    verify: VecDeque<GatewayResult<VerifiedStatus>>,
    initialized: Vec<CheckoutRequest>,
    verified: Vec<String>,
}

/// Scripted payment gateway.
///
/// Queued outcomes are returned in order; once a queue is empty the gateway
/// succeeds (`https://checkout.test/<tx_ref>` for initialize, `success` for
/// verify). Every call is recorded for assertions.
///
/// # Example
///
/// ```
/// use recipe_hub_testing::MockPaymentGateway;
/// use recipe_hub_core::PaymentGatewayError;
///
/// let gateway = MockPaymentGateway::new();
/// gateway.fail_next_initialize(PaymentGatewayError::Timeout);
/// assert_eq!(gateway.initialize_calls().len(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockPaymentGateway {
    script: Arc<Mutex<GatewayScript>>,
}

impl MockPaymentGateway {
    /// Creates a gateway that succeeds until told otherwise
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an Arc-wrapped handle for sharing with application state
    #[must_use]
    pub fn shared(&self) -> Arc<dyn PaymentGateway> {
        Arc::new(self.clone())
    }

    /// Make the next `initialize` call fail.
    pub fn fail_next_initialize(&self, error: PaymentGatewayError) {
        lock(&self.script).initialize.push_back(Err(error));
    }

    /// Make the next `verify` call report `provider_status`.
    pub fn next_verify_status(&self, provider_status: &str) {
        lock(&self.script).verify.push_back(Ok(VerifiedStatus {
            success: provider_status == "success",
            provider_status: provider_status.to_string(),
        }));
    }

    /// Make the next `verify` call fail.
    pub fn fail_next_verify(&self, error: PaymentGatewayError) {
        lock(&self.script).verify.push_back(Err(error));
    }

    /// Every request passed to `initialize`, in call order.
    #[must_use]
    pub fn initialize_calls(&self) -> Vec<CheckoutRequest> {
        lock(&self.script).initialized.clone()
    }

    /// Every reference passed to `verify`, in call order.
    #[must_use]
    pub fn verify_calls(&self) -> Vec<String> {
        lock(&self.script).verified.clone()
    }
}

impl PaymentGateway for MockPaymentGateway {
    fn initialize(
        &self,
        request: CheckoutRequest,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<Checkout>> + Send>> {
        let outcome = {
            let mut script = lock(&self.script);
            let checkout_url = format!("https://checkout.test/{}", request.tx_ref);
            script.initialized.push(request);
            script
                .initialize
                .pop_front()
                .unwrap_or(Ok(Checkout { checkout_url }))
        };
        Box::pin(async move { outcome })
    }

    fn verify(
        &self,
        tx_ref: &str,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<VerifiedStatus>> + Send>> {
        let outcome = {
            let mut script = lock(&self.script);
            script.verified.push(tx_ref.to_string());
            script.verify.pop_front().unwrap_or_else(|| {
                Ok(VerifiedStatus {
                    success: true,
                    provider_status: "success".to_string(),
                })
            })
        };
        Box::pin(async move { outcome })
    }
}
