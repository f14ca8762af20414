use thiserror::Error;

use crate::auth::{PasswordError, TokenError};
use crate::database::RepoError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("record not found")]
    NotFound,

    #[error("email already registered")]
    DuplicateEmail,

    /// Same message for an unknown email and a wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    BadInput(String),

    #[error("record was modified by another request")]
    Conflict,

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepoError> for ServiceError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => ServiceError::NotFound,
            RepoError::Duplicate(_) => ServiceError::DuplicateEmail,
            RepoError::ForeignKey(constraint) => {
                tracing::debug!("foreign key rejected write: {}", constraint);
                ServiceError::BadInput("referenced account or category does not exist".to_string())
            }
            RepoError::Stale => ServiceError::Conflict,
            RepoError::Database(e) => ServiceError::Internal(e.to_string()),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl From<TokenError> for ServiceError {
    fn from(err: TokenError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

/// Parses a path or body identifier, reporting `field` on failure.
pub fn parse_uuid(field: &str, value: &str) -> ServiceResult<uuid::Uuid> {
    uuid::Uuid::parse_str(value.trim())
        .map_err(|_| ServiceError::BadInput(format!("invalid {}", field)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_errors_translate() {
        assert!(matches!(ServiceError::from(RepoError::NotFound), ServiceError::NotFound));
        assert!(matches!(
            ServiceError::from(RepoError::Duplicate("users_email_key".into())),
            ServiceError::DuplicateEmail
        ));
        assert!(matches!(ServiceError::from(RepoError::Stale), ServiceError::Conflict));
        assert!(matches!(
            ServiceError::from(RepoError::ForeignKey("fk".into())),
            ServiceError::BadInput(_)
        ));
        assert!(matches!(
            ServiceError::from(RepoError::Database(sqlx::Error::PoolTimedOut)),
            ServiceError::Internal(_)
        ));
    }

    #[test]
    fn uuid_parsing_reports_field() {
        assert!(parse_uuid("id", "not-a-uuid").is_err());
        let id = uuid::Uuid::new_v4();
        assert_eq!(parse_uuid("id", &id.to_string()).unwrap(), id);
        match parse_uuid("account_id", "x") {
            Err(ServiceError::BadInput(msg)) => assert_eq!(msg, "invalid account_id"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
