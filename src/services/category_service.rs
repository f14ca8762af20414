use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use crate::database::models::category::{CategoryUpdate, NewCategory};
use crate::database::models::{Category, TransactionType};
use crate::database::CategoryRepository;
use crate::validator::{self, supplied, Evaluator, Validate, ValidationContext};

const NAME_MIN: usize = 3;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub category_type: Option<String>,
}

fn check_name(eval: &mut Evaluator, name: &str) {
    eval.check_field(validator::not_blank(name), "name", "name is required");
    eval.check_field(
        // Counted on the name as sent, surrounding spaces included.
        validator::min_chars(name, NAME_MIN),
        "name",
        "name must be at least 3 characters",
    );
}

fn check_type(eval: &mut Evaluator, value: &str) {
    eval.check_field(validator::not_blank(value), "type", "type is required");
    eval.check_field(
        validator::transaction_type(value.trim()),
        "type",
        "type must be income or expense",
    );
}

impl Validate for CreateCategoryRequest {
    fn validate(&self, _ctx: &ValidationContext) -> Evaluator {
        let mut eval = Evaluator::new();
        check_name(&mut eval, &self.name);
        check_type(&mut eval, &self.category_type);
        eval
    }
}

impl Validate for CategoryPatch {
    fn validate(&self, _ctx: &ValidationContext) -> Evaluator {
        let mut eval = Evaluator::new();
        let name = supplied(&self.name);
        let category_type = supplied(&self.category_type);

        if name.is_none() && category_type.is_none() {
            eval.add_field_error("fields", "at least one of name or type is required");
            return eval;
        }
        if let Some(name) = name {
            check_name(&mut eval, name);
        }
        if let Some(category_type) = category_type {
            check_type(&mut eval, category_type);
        }
        eval
    }
}

pub(crate) fn parse_type(value: &str) -> ServiceResult<TransactionType> {
    value
        .parse::<TransactionType>()
        .map_err(|e| ServiceError::BadInput(e.to_string()))
}

impl CategoryPatch {
    pub fn merge(&self, existing: &Category) -> ServiceResult<CategoryUpdate> {
        let category_type = match supplied(&self.category_type) {
            Some(value) => parse_type(value)?,
            None => existing.category_type,
        };

        Ok(CategoryUpdate {
            id: existing.id,
            user_id: existing.user_id,
            name: supplied(&self.name).unwrap_or(&existing.name).to_string(),
            category_type,
            expected_updated_at: existing.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, user_id: Uuid, request: CreateCategoryRequest) -> ServiceResult<Category> {
        let category_type = parse_type(&request.category_type)?;
        Ok(self
            .repo
            .create(NewCategory {
                user_id,
                name: request.name,
                category_type,
            })
            .await?)
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> ServiceResult<Category> {
        Ok(self.repo.get(user_id, id).await?)
    }

    pub async fn list(&self, user_id: Uuid) -> ServiceResult<Vec<Category>> {
        Ok(self.repo.list_by_user(user_id).await?)
    }

    pub async fn update(&self, user_id: Uuid, id: Uuid, patch: CategoryPatch) -> ServiceResult<Category> {
        let existing = self.repo.get(user_id, id).await?;
        Ok(self.repo.update(patch.merge(&existing)?).await?)
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> ServiceResult<()> {
        Ok(self.repo.delete(user_id, id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::user::NewUser;
    use crate::database::{MemoryStore, UserRepository};
    use chrono::Utc;

    fn groceries() -> CreateCategoryRequest {
        CreateCategoryRequest {
            name: "Groceries".to_string(),
            category_type: "Expense".to_string(),
        }
    }

    #[test]
    fn create_rules() {
        let ctx = ValidationContext::new();
        assert!(groceries().validate(&ctx).is_valid());

        let eval = CreateCategoryRequest {
            name: "ab".to_string(),
            category_type: "transfer".to_string(),
        }
        .validate(&ctx);
        assert_eq!(eval.get("name"), Some("name must be at least 3 characters"));
        assert_eq!(eval.get("type"), Some("type must be income or expense"));
    }

    #[test]
    fn name_length_counts_the_raw_text() {
        let ctx = ValidationContext::new();
        let padded = CreateCategoryRequest {
            name: "  ab".to_string(),
            category_type: "expense".to_string(),
        };
        assert!(padded.validate(&ctx).is_valid());

        let blank = CreateCategoryRequest {
            name: "    ".to_string(),
            category_type: "expense".to_string(),
        };
        assert_eq!(blank.validate(&ctx).get("name"), Some("name is required"));
    }

    #[test]
    fn patch_requires_a_field() {
        let ctx = ValidationContext::new();
        assert!(CategoryPatch::default().validate(&ctx).contains("fields"));
        assert!(CategoryPatch {
            category_type: Some("INCOME".to_string()),
            ..Default::default()
        }
        .validate(&ctx)
        .is_valid());
    }

    #[test]
    fn merge_normalises_type() {
        let category = Category {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Salary".to_string(),
            category_type: TransactionType::Expense,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let unchanged = CategoryPatch::default().merge(&category).unwrap();
        assert_eq!(unchanged.name, "Salary");
        assert_eq!(unchanged.category_type, TransactionType::Expense);

        let update = CategoryPatch {
            name: None,
            category_type: Some("INCOME".to_string()),
        }
        .merge(&category)
        .unwrap();
        assert_eq!(update.category_type, TransactionType::Income);
    }

    #[tokio::test]
    async fn same_name_under_different_users() {
        let store = MemoryStore::new();
        let mut owners = Vec::new();
        for email in ["a@x.com", "b@x.com"] {
            let user = UserRepository::create(
                &store,
                NewUser {
                    name: "User".to_string(),
                    email: email.to_string(),
                    password: "hash".to_string(),
                },
            )
            .await
            .unwrap();
            owners.push(user.id);
        }

        let categories = CategoryService::new(Arc::new(store));
        for owner in &owners {
            categories.create(*owner, groceries()).await.unwrap();
        }
        for owner in &owners {
            let listed = categories.list(*owner).await.unwrap();
            assert_eq!(listed.len(), 1);
            assert_eq!(listed[0].category_type, TransactionType::Expense);
        }
    }
}
