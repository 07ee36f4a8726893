//! Account endpoints.
//!
//! - POST /api/auth/signup - Register and receive a session token
//! - POST /api/auth/login - Exchange credentials for a session token
//! - GET /api/auth/profile - The authenticated user (requires auth)

use crate::error::AppError;
use crate::extractors::{AuthUser, JsonBody};
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use recipe_hub_auth::{AuthError, hash_password, verify_password};
use recipe_hub_core::{Error, Signup, User};
use serde::{Deserialize, Serialize};

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Account email
    pub email: String,
    /// Plaintext password
    pub password: String,
}

/// A session token with the user it belongs to.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Bearer token
    pub token: String,
    /// When the token stops validating
    pub expires_at: DateTime<Utc>,
    /// The user
    pub user: User,
}

/// Runs CPU-heavy Argon2 work off the async workers.
async fn blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::internal("An internal error occurred").with_source(e.into()))
}

fn session(state: &AppState, user: User) -> Result<SessionResponse, AppError> {
    let issued = state.tokens.issue(user.id, &user.email)?;
    Ok(SessionResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        user,
    })
}

/// Register a new account.
///
/// # Errors
///
/// - 422 for a malformed email, short username or short password
/// - 409 if the email or username is taken
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<Signup>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let new_user = request.validate()?;

    let password = new_user.password().to_string();
    let hash = blocking(move || hash_password(&password)).await??;

    let user = state.store.create_user(&new_user, &hash).await?;
    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok((StatusCode::CREATED, Json(session(&state, user)?)))
}

/// Log in with email and password.
///
/// Unknown email and wrong password produce the same 401.
///
/// # Errors
///
/// - 401 for bad credentials
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let email = request.email.trim().to_lowercase();
    let Some(user) = state.store.find_user_by_email(&email).await? else {
        tracing::debug!("Login attempt for unknown email");
        return Err(AuthError::InvalidCredentials.into());
    };

    let hash = user.password_hash.clone();
    let password = request.password;
    if !blocking(move || verify_password(&password, &hash)).await? {
        tracing::debug!(user_id = %user.id, "Login attempt with wrong password");
        return Err(AuthError::InvalidCredentials.into());
    }

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(session(&state, user)?))
}

/// The authenticated user's profile.
///
/// # Errors
///
/// - 401 without a valid token
/// - 404 if the account no longer exists
pub async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<User>, AppError> {
    let profile = state
        .store
        .get_user(user.user_id)
        .await?
        .ok_or_else(|| Error::not_found("User", user.user_id))?;
    Ok(Json(profile))
}
