use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// bcrypt hash; never serialised.
    #[serde(skip_serializing)]
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values written by a user insert.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Full replacement row for a user update. Built by merging a patch over the
/// stored record.
#[derive(Debug, Clone, PartialEq)]
pub struct UserUpdate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    /// `updated_at` observed when the record was read; the write only lands if
    /// the row still carries it.
    pub expected_updated_at: DateTime<Utc>,
}
