//! Mapping from `sqlx` failures onto the domain error taxonomy.

use recipe_hub_core::Error;

/// Maps a `sqlx::Error` raised while doing `context`.
///
/// - unique violations become [`Error::Conflict`]
/// - pool exhaustion and I/O failures become [`Error::Dependency`]
/// - everything else becomes [`Error::Integrity`]: the enclosing transaction
///   is dropped, which rolls it back
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> Error {
    move |e| classify(context, &e)
}

fn classify(context: &str, e: &sqlx::Error) -> Error {
    match e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Error::Conflict(conflict_message(db_err.constraint()).to_string())
        }
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::WorkerCrashed => {
            tracing::error!(error = %e, context, "Database unavailable");
            Error::Dependency(format!("database unavailable while trying to {context}"))
        }
        _ => {
            tracing::error!(error = %e, context, "Database operation failed");
            Error::Integrity(format!("failed to {context}: {e}"))
        }
    }
}

fn conflict_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("users_email_key") => "email is already registered",
        Some("users_username_key") => "username is already taken",
        Some("categories_name_key") => "category already exists",
        Some("idx_purchases_one_live") => "recipe already purchased or payment pending",
        Some("idx_recipe_images_one_featured") => "recipe already has a featured image",
        _ => "resource already exists",
    }
}
