use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::error::ServiceResult;
use crate::database::models::account::{AccountUpdate, NewAccount};
use crate::database::models::Account;
use crate::database::AccountRepository;
use crate::validator::{self, supplied, Evaluator, Validate, ValidationContext};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateAccountRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: String,
    /// Opening balance; zero when omitted.
    pub balance: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccountPatch {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub account_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceAdjustment {
    pub delta: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceResponse {
    pub balance: f64,
}

impl Validate for CreateAccountRequest {
    fn validate(&self, _ctx: &ValidationContext) -> Evaluator {
        let mut eval = Evaluator::new();
        eval.check_field(validator::not_blank(&self.name), "name", "name is required");
        eval.check_field(
            validator::not_blank(&self.account_type),
            "type",
            "type is required",
        );
        if let Some(balance) = self.balance {
            eval.check_field(
                validator::non_negative(balance),
                "balance",
                "balance cannot be negative",
            );
        }
        eval
    }
}

impl Validate for AccountPatch {
    fn validate(&self, _ctx: &ValidationContext) -> Evaluator {
        let mut eval = Evaluator::new();
        if supplied(&self.name).is_none() && supplied(&self.account_type).is_none() {
            eval.add_field_error("fields", "at least one of name or type is required");
        }
        eval
    }
}

impl Validate for BalanceAdjustment {
    fn validate(&self, _ctx: &ValidationContext) -> Evaluator {
        let mut eval = Evaluator::new();
        eval.check_field(self.delta.is_finite(), "delta", "delta must be a number");
        eval
    }
}

impl AccountPatch {
    pub fn merge(&self, existing: &Account) -> AccountUpdate {
        AccountUpdate {
            id: existing.id,
            user_id: existing.user_id,
            name: supplied(&self.name).unwrap_or(&existing.name).to_string(),
            account_type: supplied(&self.account_type)
                .unwrap_or(&existing.account_type)
                .to_string(),
            expected_updated_at: existing.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct AccountService {
    repo: Arc<dyn AccountRepository>,
}

impl AccountService {
    pub fn new(repo: Arc<dyn AccountRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, user_id: Uuid, request: CreateAccountRequest) -> ServiceResult<Account> {
        let account = self
            .repo
            .create(NewAccount {
                user_id,
                name: request.name,
                account_type: request.account_type,
                balance: request.balance.unwrap_or(0.0),
            })
            .await?;
        tracing::debug!("Created account {} for user {}", account.id, user_id);
        Ok(account)
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> ServiceResult<Account> {
        Ok(self.repo.get(user_id, id).await?)
    }

    pub async fn list(&self, user_id: Uuid) -> ServiceResult<Vec<Account>> {
        Ok(self.repo.list_by_user(user_id).await?)
    }

    pub async fn update(&self, user_id: Uuid, id: Uuid, patch: AccountPatch) -> ServiceResult<Account> {
        let existing = self.repo.get(user_id, id).await?;
        Ok(self.repo.update(patch.merge(&existing)).await?)
    }

    /// Applies `delta` in the store and returns the new balance. No floor is
    /// enforced after creation.
    pub async fn adjust_balance(&self, user_id: Uuid, id: Uuid, delta: f64) -> ServiceResult<f64> {
        Ok(self.repo.adjust_balance(user_id, id, delta).await?)
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
    use crate::services::ServiceError;
    use chrono::Utc;

    async fn setup() -> (AccountService, Uuid) {
        let store = MemoryStore::new();
        let user = UserRepository::create(
            &store,
            NewUser {
                name: "Ana".to_string(),
                email: "ana@x.com".to_string(),
                password: "hash".to_string(),
            },
        )
        .await
        .unwrap();
        (AccountService::new(Arc::new(store)), user.id)
    }

    fn wallet() -> CreateAccountRequest {
        CreateAccountRequest {
            name: "Wallet".to_string(),
            account_type: "cash".to_string(),
            balance: None,
        }
    }

    #[test]
    fn create_rules() {
        let ctx = ValidationContext::new();
        assert!(wallet().validate(&ctx).is_valid());

        let eval = CreateAccountRequest {
            name: String::new(),
            account_type: " ".to_string(),
            balance: Some(-1.0),
        }
        .validate(&ctx);
        assert!(eval.contains("name"));
        assert!(eval.contains("type"));
        assert!(eval.contains("balance"));
    }

    #[test]
    fn blank_patch_merge_keeps_record() {
        let account = Account {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Wallet".to_string(),
            account_type: "cash".to_string(),
            balance: 12.5,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let update = AccountPatch {
            name: Some(String::new()),
            account_type: None,
        }
        .merge(&account);
        assert_eq!(update.name, account.name);
        assert_eq!(update.account_type, account.account_type);

        let update = AccountPatch {
            name: None,
            account_type: Some("savings".to_string()),
        }
        .merge(&account);
        assert_eq!(update.name, "Wallet");
        assert_eq!(update.account_type, "savings");
    }

    #[tokio::test]
    async fn balance_defaults_to_zero_and_can_go_negative() {
        let (accounts, user_id) = setup().await;
        let account = accounts.create(user_id, wallet()).await.unwrap();
        assert_eq!(account.balance, 0.0);

        let balance = accounts
            .adjust_balance(user_id, account.id, -50.0)
            .await
            .unwrap();
        assert_eq!(balance, -50.0);
        assert_eq!(accounts.get(user_id, account.id).await.unwrap().balance, -50.0);
    }

    #[tokio::test]
    async fn concurrent_adjustments_are_not_lost() {
        let (accounts, user_id) = setup().await;
        let account = accounts.create(user_id, wallet()).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let accounts = accounts.clone();
            let id = account.id;
            handles.push(tokio::spawn(async move {
                accounts.adjust_balance(user_id, id, 5.0).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(accounts.get(user_id, account.id).await.unwrap().balance, 100.0);
    }

    #[tokio::test]
    async fn foreign_accounts_are_invisible() {
        let (accounts, user_id) = setup().await;
        let account = accounts.create(user_id, wallet()).await.unwrap();
        let stranger = Uuid::new_v4();

        assert!(matches!(
            accounts.get(stranger, account.id).await,
            Err(ServiceError::NotFound)
        ));
        assert!(matches!(
            accounts.delete(stranger, account.id).await,
            Err(ServiceError::NotFound)
        ));
        assert!(accounts.list(stranger).await.unwrap().is_empty());
    }
}
