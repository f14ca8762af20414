use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{map_write_error, missing_or_stale};
use crate::database::models::category::{CategoryUpdate, NewCategory};
use crate::database::models::Category;
use crate::database::repository::{CategoryRepository, RepoError, RepoResult};

const CATEGORY_COLUMNS: &str = "id, user_id, name, type, created_at, updated_at";

#[derive(Clone)]
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create(&self, category: NewCategory) -> RepoResult<Category> {
        let sql = format!(
            "INSERT INTO categories (user_id, name, type) VALUES ($1, $2, $3) RETURNING {}",
            CATEGORY_COLUMNS
        );
        sqlx::query_as::<_, Category>(&sql)
            .bind(category.user_id)
            .bind(&category.name)
            .bind(category.category_type)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> RepoResult<Category> {
        let sql = format!(
            "SELECT {} FROM categories WHERE id = $1 AND user_id = $2",
            CATEGORY_COLUMNS
        );
        sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepoError::NotFound)
    }

    async fn list_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Category>> {
        let sql = format!(
            "SELECT {} FROM categories WHERE user_id = $1 ORDER BY created_at",
            CATEGORY_COLUMNS
        );
        Ok(sqlx::query_as::<_, Category>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update(&self, update: CategoryUpdate) -> RepoResult<Category> {
        let sql = format!(
            "UPDATE categories SET name = $3, type = $4, updated_at = now() \
             WHERE id = $1 AND user_id = $2 AND updated_at = $5 RETURNING {}",
            CATEGORY_COLUMNS
        );
        let row = sqlx::query_as::<_, Category>(&sql)
            .bind(update.id)
            .bind(update.user_id)
            .bind(&update.name)
            .bind(update.category_type)
            .bind(update.expected_updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?;

        match row {
            Some(category) => Ok(category),
            None => {
                let (exists,): (bool,) = sqlx::query_as(
                    "SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1 AND user_id = $2)",
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
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND user_id = $2")
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
