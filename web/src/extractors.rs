//! Custom Axum extractors.
//!
//! - `CorrelationId`: the request's correlation ID
//! - `BearerToken`: raw token from `Authorization: Bearer <token>`
//! - `AuthUser`: a validated session; rejects with 401
//! - `MaybeAuthUser`: a validated session or anonymous, never rejects
//! - `JsonBody`, `PathParams`, `QueryParams`: the axum extractors with
//!   rejections rendered as `AppError`
//!
//! # Examples
//!
//! ```ignore
//! async fn like(
//!     State(state): State<AppState>,
//!     user: AuthUser,
//!     PathParams(id): PathParams<RecipeId>,
//! ) -> Result<Json<LikeToggle>, AppError> {
//!     Ok(Json(state.store.toggle_like(user.user_id, id).await?))
//! }
//! ```

use crate::error::AppError;
use crate::middleware::CORRELATION_ID_HEADER;
use crate::state::AppState;
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
};
use recipe_hub_core::UserId;
use uuid::Uuid;

/// Correlation ID for request tracing.
///
/// Prefers the ID the correlation middleware stored in the request
/// extensions, then the `X-Correlation-ID` header, then a fresh UUID v4.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Uuid>() {
            return Ok(Self(*id));
        }

        let correlation_id = parts
            .headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

/// Bearer token extracted from `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| {
                AppError::unauthorized("Invalid authorization format. Expected 'Bearer <token>'")
            })?
            .trim();

        if token.is_empty() {
            return Err(AppError::unauthorized("Empty bearer token"));
        }

        Ok(Self(token.to_string()))
    }
}

/// Authenticated user.
///
/// Use as a handler parameter to require a valid session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The authenticated user ID
    pub user_id: UserId,
    /// Email the token was issued for
    pub email: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = BearerToken::from_request_parts(parts, state).await?;
        let claims = state.tokens.validate(&bearer.0)?;

        Ok(Self {
            user_id: claims.user_id,
            email: claims.email,
        })
    }
}

/// Optional authentication.
///
/// A missing, malformed or expired token reads as anonymous.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    /// The viewer's ID, if authenticated.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.0.as_ref().map(|user| user.user_id)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(AuthUser::from_request_parts(parts, state).await.ok()))
    }
}

/// `axum::Json` with rejections rendered as `AppError`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// `axum::extract::Path` with rejections rendered as `AppError`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PathParams<T>(pub T);

/// `axum::extract::Query` with rejections rendered as `AppError`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct QueryParams<T>(pub T);
