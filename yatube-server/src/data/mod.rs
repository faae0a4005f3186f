use crate::domain::error::DomainError;
use tracing::error;

pub mod group_repository;
pub mod memory;
pub mod post_repository;
pub mod user_repository;

/// Logs a database failure and hides its details behind `Internal`.
pub(crate) fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    error!(error = %e, "{}", context);
    DomainError::Internal(format!("database error: {e}"))
}

/// Whether `e` violates a constraint whose name contains `name`.
pub(crate) fn violates(e: &sqlx::Error, name: &str) -> bool {
    e.as_database_error()
        .and_then(|db| db.constraint())
        .is_some_and(|c| c.contains(name))
}
