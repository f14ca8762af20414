//! PostgreSQL adapter for the repository ports.

mod accounts;
mod categories;
mod transactions;
mod users;

pub use accounts::PgAccountRepository;
pub use categories::PgCategoryRepository;
pub use transactions::PgTransactionRepository;
pub use users::PgUserRepository;

use crate::database::repository::RepoError;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Translates constraint violations into their domain meaning.
pub(crate) fn map_write_error(err: sqlx::Error) -> RepoError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or_default().to_string();
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => return RepoError::Duplicate(constraint),
            Some(FOREIGN_KEY_VIOLATION) => return RepoError::ForeignKey(constraint),
            _ => {}
        }
    }
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        other => RepoError::Database(other),
    }
}

/// Decides why a conditional update touched no row.
pub(crate) fn missing_or_stale(exists: bool) -> RepoError {
    if exists {
        RepoError::Stale
    } else {
        RepoError::NotFound
    }
}
