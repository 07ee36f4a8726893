//! Request tracking and cross-origin middleware.
//!
//! # Correlation flow
//!
//! 1. Read `X-Correlation-ID` from the request (or generate a UUID v4)
//! 2. Store it in request extensions for the `CorrelationId` extractor
//! 3. Run the request inside an `http_request` span carrying the ID
//! 4. Echo the ID back in the response `X-Correlation-ID` header

use crate::config::ServerConfig;
use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue, Method, header},
    response::Response,
};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for correlation ID.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// Create a layer that adds correlation ID tracking to all requests.
#[must_use]
pub const fn correlation_id_layer() -> CorrelationIdLayer {
    CorrelationIdLayer
}

/// Layer for correlation ID tracking.
#[derive(Clone, Copy, Debug)]
pub struct CorrelationIdLayer;

impl<S> Layer<S> for CorrelationIdLayer {
    type Service = CorrelationIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationIdMiddleware { inner }
    }
}

/// Middleware service for correlation ID tracking.
#[derive(Clone, Debug)]
pub struct CorrelationIdMiddleware<S> {
    inner: S,
}

fn incoming_correlation_id(req: &Request) -> Option<Uuid> {
    req.headers()
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
}

impl<S> Service<Request> for CorrelationIdMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let correlation_id = incoming_correlation_id(&req).unwrap_or_else(Uuid::new_v4);
        req.extensions_mut().insert(correlation_id);

        let span = tracing::info_span!(
            "http_request",
            correlation_id = %correlation_id,
            method = %req.method(),
            path = %req.uri().path(),
            status = tracing::field::Empty,
        );

        let fut = self.inner.call(req);

        Box::pin(async move {
            let mut response = fut.instrument(span.clone()).await?;
            span.record("status", response.status().as_u16());

            if let Ok(value) = HeaderValue::from_str(&correlation_id.to_string()) {
                response.headers_mut().insert(CORRELATION_ID_HEADER, value);
            }

            Ok(response)
        })
    }
}

/// CORS policy for the API.
///
/// `*` allows any origin; otherwise a comma-separated origin list. Methods
/// and headers are the ones the API uses.
#[must_use]
pub fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origin = config.cors_allow_origin.trim();
    let allow_origin = if origin == "*" {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = origin
            .split(',')
            .filter_map(|o| HeaderValue::from_str(o.trim()).ok())
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-correlation-id"),
        ])
        .expose_headers([HeaderName::from_static("x-correlation-id")])
}
