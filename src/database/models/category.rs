use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::TransactionType;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub category_type: TransactionType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub user_id: Uuid,
    pub name: String,
    pub category_type: TransactionType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryUpdate {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub category_type: TransactionType,
    pub expected_updated_at: DateTime<Utc>,
}
