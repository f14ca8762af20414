use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{map_write_error, missing_or_stale};
use crate::database::models::account::{AccountUpdate, NewAccount};
use crate::database::models::Account;
use crate::database::repository::{AccountRepository, RepoError, RepoResult};

const ACCOUNT_COLUMNS: &str = "id, user_id, name, type, balance, created_at, updated_at";

#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn create(&self, account: NewAccount) -> RepoResult<Account> {
        let sql = format!(
            "INSERT INTO accounts (user_id, name, type, balance) VALUES ($1, $2, $3, $4) RETURNING {}",
            ACCOUNT_COLUMNS
        );
        sqlx::query_as::<_, Account>(&sql)
            .bind(account.user_id)
            .bind(&account.name)
            .bind(&account.account_type)
            .bind(account.balance)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> RepoResult<Account> {
        let sql = format!(
            "SELECT {} FROM accounts WHERE id = $1 AND user_id = $2",
            ACCOUNT_COLUMNS
        );
        sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepoError::NotFound)
    }

    async fn list_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Account>> {
        let sql = format!(
            "SELECT {} FROM accounts WHERE user_id = $1 ORDER BY created_at",
            ACCOUNT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Account>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update(&self, update: AccountUpdate) -> RepoResult<Account> {
        let sql = format!(
            "UPDATE accounts SET name = $3, type = $4, updated_at = now() \
             WHERE id = $1 AND user_id = $2 AND updated_at = $5 RETURNING {}",
            ACCOUNT_COLUMNS
        );
        let row = sqlx::query_as::<_, Account>(&sql)
            .bind(update.id)
            .bind(update.user_id)
            .bind(&update.name)
            .bind(&update.account_type)
            .bind(update.expected_updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?;

        match row {
            Some(account) => Ok(account),
            None => {
                let (exists,): (bool,) = sqlx::query_as(
                    "SELECT EXISTS (SELECT 1 FROM accounts WHERE id = $1 AND user_id = $2)",
                )
                .bind(update.id)
                .bind(update.user_id)
                .fetch_one(&self.pool)
                .await?;
                Err(missing_or_stale(exists))
            }
        }
    }

    async fn adjust_balance(&self, user_id: Uuid, id: Uuid, delta: f64) -> RepoResult<f64> {
        let row: Option<(f64,)> = sqlx::query_as(
            "UPDATE accounts SET balance = balance + $3, updated_at = now() \
             WHERE id = $1 AND user_id = $2 RETURNING balance",
        )
        .bind(id)
        .bind(user_id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(balance,)| balance).ok_or(RepoError::NotFound)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
