//! Persistence ports. Services depend on these traits only; the PostgreSQL and
//! in-memory adapters implement them.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::account::{AccountUpdate, NewAccount};
use crate::database::models::category::{CategoryUpdate, NewCategory};
use crate::database::models::transaction::{NewTransaction, TransactionUpdate};
use crate::database::models::user::{NewUser, UserUpdate};
use crate::database::models::{Account, Category, Transaction, User};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("record not found")]
    NotFound,

    /// A unique constraint rejected the write.
    #[error("duplicate value: {0}")]
    Duplicate(String),

    /// A referenced row does not exist.
    #[error("referenced record does not exist: {0}")]
    ForeignKey(String),

    /// The row changed between read and write.
    #[error("record was modified concurrently")]
    Stale,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> RepoResult<User>;
    async fn get(&self, id: Uuid) -> RepoResult<User>;
    async fn get_by_email(&self, email: &str) -> RepoResult<User>;
    async fn list(&self) -> RepoResult<Vec<User>>;
    async fn update(&self, update: UserUpdate) -> RepoResult<User>;
    async fn delete(&self, id: Uuid) -> RepoResult<()>;
    async fn ping(&self) -> RepoResult<()>;
}

/// Every lookup is scoped by the owning user id.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn create(&self, account: NewAccount) -> RepoResult<Account>;
    async fn get(&self, user_id: Uuid, id: Uuid) -> RepoResult<Account>;
    async fn list_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Account>>;
    async fn update(&self, update: AccountUpdate) -> RepoResult<Account>;
    /// Adds `delta` to the stored balance in one store operation and returns the
    /// new balance.
    async fn adjust_balance(&self, user_id: Uuid, id: Uuid, delta: f64) -> RepoResult<f64>;
    async fn delete(&self, user_id: Uuid, id: Uuid) -> RepoResult<()>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, category: NewCategory) -> RepoResult<Category>;
    async fn get(&self, user_id: Uuid, id: Uuid) -> RepoResult<Category>;
    async fn list_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Category>>;
    async fn update(&self, update: CategoryUpdate) -> RepoResult<Category>;
    async fn delete(&self, user_id: Uuid, id: Uuid) -> RepoResult<()>;
}

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn create(&self, transaction: NewTransaction) -> RepoResult<Transaction>;
    async fn get(&self, user_id: Uuid, id: Uuid) -> RepoResult<Transaction>;
    async fn list_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Transaction>>;
    async fn list_by_account(&self, user_id: Uuid, account_id: Uuid) -> RepoResult<Vec<Transaction>>;
    async fn list_by_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
    ) -> RepoResult<Vec<Transaction>>;
    async fn update(&self, update: TransactionUpdate) -> RepoResult<Transaction>;
    async fn delete(&self, user_id: Uuid, id: Uuid) -> RepoResult<()>;
}
