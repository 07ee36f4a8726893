//! Users and signup validation.

use crate::error::{Error, Result};
use crate::ids::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum username length, in characters.
pub const MIN_USERNAME_LEN: usize = 3;
/// Minimum password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// A registered user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identifier
    pub id: UserId,
    /// Unique email
    pub email: String,
    /// Unique username
    pub username: String,
    /// Argon2 PHC string; never leaves the server
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Optional avatar
    pub avatar_url: Option<String>,
    /// Optional biography
    pub bio: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

/// The public fields of a user, embedded in recipes and comments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// Identifier
    pub id: UserId,
    /// Username
    pub username: String,
    /// Optional avatar
    pub avatar_url: Option<String>,
}

/// Unvalidated signup request.
#[derive(Clone, Debug, Deserialize)]
pub struct Signup {
    /// Email address
    pub email: String,
    /// Desired username
    pub username: String,
    /// Plaintext password
    pub password: String,
}

/// A signup that passed validation. The password is still plaintext; the
/// auth crate hashes it before the store sees it.
#[derive(Clone, Debug)]
pub struct NewUser {
    email: String,
    username: String,
    password: String,
}

impl Signup {
    /// Validates the signup fields.
    ///
    /// Email is lower-cased and trimmed; username is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a malformed email, a username shorter
    /// than 3 characters, or a password shorter than 6 characters.
    pub fn validate(self) -> Result<NewUser> {
        let email = crate::recipe::plain_text("email", &self.email)?.to_lowercase();
        if !is_valid_email(&email) {
            return Err(Error::validation("email is not a valid address"));
        }
        let username = crate::recipe::plain_text("username", &self.username)?;
        if username.chars().count() < MIN_USERNAME_LEN {
            return Err(Error::validation(format!(
                "username must be at least {MIN_USERNAME_LEN} characters"
            )));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(NewUser {
            email,
            username,
            password: self.password,
        })
    }
}

impl NewUser {
    /// Normalized email
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Trimmed username
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Plaintext password, for hashing
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

/// Validate email address format (basic RFC 5322 check).
///
/// This is a simplified validation that checks:
/// - Contains exactly one @ symbol
/// - Has non-empty local and domain parts
/// - Domain has at least one dot
/// - No whitespace
///
/// # Examples
///
/// ```
/// # use recipe_hub_core::user::is_valid_email;
/// assert!(is_valid_email("cook@example.com"));
/// assert!(!is_valid_email("cook@example"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    if local.is_empty() || local.len() > 64 {
        return false;
    }

    if domain.is_empty() || !domain.contains('.') {
        return false;
    }

    !domain.starts_with('.') && !domain.ends_with('.') && !domain.contains("..")
}
