use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{map_write_error, missing_or_stale};
use crate::database::models::transaction::{NewTransaction, TransactionUpdate};
use crate::database::models::Transaction;
use crate::database::repository::{RepoError, RepoResult, TransactionRepository};

const TRANSACTION_COLUMNS: &str = "id, description, amount, date, type, account_id, category_id, \
                                   user_id, created_at, updated_at";

#[derive(Clone)]
pub struct PgTransactionRepository {
    pool: PgPool,
}

impl PgTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn list_where(
        &self,
        clause: &str,
        user_id: Uuid,
        other: Option<Uuid>,
    ) -> RepoResult<Vec<Transaction>> {
        let sql = format!(
            "SELECT {} FROM transactions WHERE {} ORDER BY date DESC, created_at DESC",
            TRANSACTION_COLUMNS, clause
        );
        let mut query = sqlx::query_as::<_, Transaction>(&sql).bind(user_id);
        if let Some(id) = other {
            query = query.bind(id);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }
}

#[async_trait]
impl TransactionRepository for PgTransactionRepository {
    async fn create(&self, transaction: NewTransaction) -> RepoResult<Transaction> {
        let sql = format!(
            "INSERT INTO transactions (description, amount, date, type, account_id, category_id, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            TRANSACTION_COLUMNS
        );
        sqlx::query_as::<_, Transaction>(&sql)
            .bind(&transaction.description)
            .bind(transaction.amount)
            .bind(transaction.date)
            .bind(transaction.transaction_type)
            .bind(transaction.account_id)
            .bind(transaction.category_id)
            .bind(transaction.user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> RepoResult<Transaction> {
        let sql = format!(
            "SELECT {} FROM transactions WHERE id = $1 AND user_id = $2",
            TRANSACTION_COLUMNS
        );
        sqlx::query_as::<_, Transaction>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepoError::NotFound)
    }

    async fn list_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Transaction>> {
        self.list_where("user_id = $1", user_id, None).await
    }

    async fn list_by_account(&self, user_id: Uuid, account_id: Uuid) -> RepoResult<Vec<Transaction>> {
        self.list_where("user_id = $1 AND account_id = $2", user_id, Some(account_id))
            .await
    }

    async fn list_by_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
    ) -> RepoResult<Vec<Transaction>> {
        self.list_where("user_id = $1 AND category_id = $2", user_id, Some(category_id))
            .await
    }

    async fn update(&self, update: TransactionUpdate) -> RepoResult<Transaction> {
        let sql = format!(
            "UPDATE transactions SET description = $3, amount = $4, date = $5, type = $6, \
             account_id = $7, category_id = $8, updated_at = now() \
             WHERE id = $1 AND user_id = $2 AND updated_at = $9 RETURNING {}",
            TRANSACTION_COLUMNS
        );
        let row = sqlx::query_as::<_, Transaction>(&sql)
            .bind(update.id)
            .bind(update.user_id)
            .bind(&update.description)
            .bind(update.amount)
            .bind(update.date)
            .bind(update.transaction_type)
            .bind(update.account_id)
            .bind(update.category_id)
            .bind(update.expected_updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?;

        match row {
            Some(transaction) => Ok(transaction),
            None => {
                let (exists,): (bool,) = sqlx::query_as(
                    "SELECT EXISTS (SELECT 1 FROM transactions WHERE id = $1 AND user_id = $2)",
                )
                .bind(update.id)
                .bind(update.user_id)
                .fetch_one(&self.pool)
                .await?;
                Err(missing_or_stale(exists))
            }
        }
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1 AND user_id = $2")
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
