//! User accounts.

use crate::error::db_error;
use crate::rows::UserRow;
use crate::PostgresStore;
use recipe_hub_core::{NewUser, Result, User, UserId};

const USER_COLUMNS: &str =
    "id, email, username, password_hash, avatar_url, bio, created_at, updated_at";

impl PostgresStore {
    /// Insert a user whose password has already been hashed.
    ///
    /// # Errors
    ///
    /// Returns [`recipe_hub_core::Error::Conflict`] if the email or username
    /// is taken.
    pub async fn create_user(&self, user: &NewUser, password_hash: &str) -> Result<User> {
        let row: UserRow = sqlx::query_as(&format!(
            r"
            INSERT INTO users (id, email, username, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(UserId::new().as_uuid())
        .bind(user.email())
        .bind(user.username())
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("create user"))?;

        let user = User::from(row);
        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Look a user up by (normalized) email.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email.trim().to_lowercase())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("find user by email"))?;
        Ok(row.map(User::from))
    }

    /// Look a user up by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(user_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("get user"))?;
        Ok(row.map(User::from))
    }
}
