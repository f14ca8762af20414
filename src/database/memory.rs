//! In-memory adapter with the same constraint semantics as the PostgreSQL schema:
//! unique emails, owner-scoped references and cascading deletes.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::account::{AccountUpdate, NewAccount};
use crate::database::models::category::{CategoryUpdate, NewCategory};
use crate::database::models::transaction::{NewTransaction, TransactionUpdate};
use crate::database::models::user::{NewUser, UserUpdate};
use crate::database::models::{Account, Category, Transaction, User};
use crate::database::repository::{
    AccountRepository, CategoryRepository, RepoError, RepoResult, TransactionRepository,
    UserRepository,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    accounts: HashMap<Uuid, Account>,
    categories: HashMap<Uuid, Category>,
    transactions: HashMap<Uuid, Transaction>,
}

impl Tables {
    fn check_references(&self, user_id: Uuid, account_id: Uuid, category_id: Uuid) -> RepoResult<()> {
        if !self
            .accounts
            .get(&account_id)
            .is_some_and(|a| a.user_id == user_id)
        {
            return Err(RepoError::ForeignKey("transactions_account_id_fkey".to_string()));
        }
        if !self
            .categories
            .get(&category_id)
            .is_some_and(|c| c.user_id == user_id)
        {
            return Err(RepoError::ForeignKey("transactions_category_id_fkey".to_string()));
        }
        Ok(())
    }
}

/// Strictly after `previous`, so a conditional write can always tell versions apart.
fn bump(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> RepoResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(RepoError::Duplicate("users_email_key".to_string()));
        }

        let now = Utc::now();
        let record = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password: user.password,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> RepoResult<User> {
        let tables = self.tables.read().await;
        tables.users.get(&id).cloned().ok_or(RepoError::NotFound)
    }

    async fn get_by_email(&self, email: &str) -> RepoResult<User> {
        let tables = self.tables.read().await;
        tables
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn list(&self) -> RepoResult<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn update(&self, update: UserUpdate) -> RepoResult<User> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.email == update.email && u.id != update.id)
        {
            return Err(RepoError::Duplicate("users_email_key".to_string()));
        }

        let user = tables.users.get_mut(&update.id).ok_or(RepoError::NotFound)?;
        if user.updated_at != update.expected_updated_at {
            return Err(RepoError::Stale);
        }
        user.name = update.name;
        user.email = update.email;
        user.password = update.password;
        user.updated_at = bump(user.updated_at);
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        let mut tables = self.tables.write().await;
        tables.users.remove(&id).ok_or(RepoError::NotFound)?;
        tables.accounts.retain(|_, a| a.user_id != id);
        tables.categories.retain(|_, c| c.user_id != id);
        tables.transactions.retain(|_, t| t.user_id != id);
        Ok(())
    }

    async fn ping(&self) -> RepoResult<()> {
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn create(&self, account: NewAccount) -> RepoResult<Account> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&account.user_id) {
            return Err(RepoError::ForeignKey("accounts_user_id_fkey".to_string()));
        }

        let now = Utc::now();
        let record = Account {
            id: Uuid::new_v4(),
            user_id: account.user_id,
            name: account.name,
            account_type: account.account_type,
            balance: account.balance,
            created_at: now,
            updated_at: now,
        };
        tables.accounts.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> RepoResult<Account> {
        let tables = self.tables.read().await;
        tables
            .accounts
            .get(&id)
            .filter(|a| a.user_id == user_id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn list_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Account>> {
        let tables = self.tables.read().await;
        let mut accounts: Vec<Account> = tables
            .accounts
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        accounts.sort_by_key(|a| a.created_at);
        Ok(accounts)
    }

    async fn update(&self, update: AccountUpdate) -> RepoResult<Account> {
        let mut tables = self.tables.write().await;
        let account = tables
            .accounts
            .get_mut(&update.id)
            .filter(|a| a.user_id == update.user_id)
            .ok_or(RepoError::NotFound)?;
        if account.updated_at != update.expected_updated_at {
            return Err(RepoError::Stale);
        }
        account.name = update.name;
        account.account_type = update.account_type;
        account.updated_at = bump(account.updated_at);
        Ok(account.clone())
    }

    async fn adjust_balance(&self, user_id: Uuid, id: Uuid, delta: f64) -> RepoResult<f64> {
        let mut tables = self.tables.write().await;
        let account = tables
            .accounts
            .get_mut(&id)
            .filter(|a| a.user_id == user_id)
            .ok_or(RepoError::NotFound)?;
        account.balance += delta;
        account.updated_at = bump(account.updated_at);
        Ok(account.balance)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> RepoResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.accounts.get(&id).is_some_and(|a| a.user_id == user_id) {
            return Err(RepoError::NotFound);
        }
        tables.accounts.remove(&id);
        tables.transactions.retain(|_, t| t.account_id != id);
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn create(&self, category: NewCategory) -> RepoResult<Category> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&category.user_id) {
            return Err(RepoError::ForeignKey("categories_user_id_fkey".to_string()));
        }

        let now = Utc::now();
        let record = Category {
            id: Uuid::new_v4(),
            user_id: category.user_id,
            name: category.name,
            category_type: category.category_type,
            created_at: now,
            updated_at: now,
        };
        tables.categories.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> RepoResult<Category> {
        let tables = self.tables.read().await;
        tables
            .categories
            .get(&id)
            .filter(|c| c.user_id == user_id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn list_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Category>> {
        let tables = self.tables.read().await;
        let mut categories: Vec<Category> = tables
            .categories
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        categories.sort_by_key(|c| c.created_at);
        Ok(categories)
    }

    async fn update(&self, update: CategoryUpdate) -> RepoResult<Category> {
        let mut tables = self.tables.write().await;
        let category = tables
            .categories
            .get_mut(&update.id)
            .filter(|c| c.user_id == update.user_id)
            .ok_or(RepoError::NotFound)?;
        if category.updated_at != update.expected_updated_at {
            return Err(RepoError::Stale);
        }
        category.name = update.name;
        category.category_type = update.category_type;
        category.updated_at = bump(category.updated_at);
        Ok(category.clone())
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> RepoResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.categories.get(&id).is_some_and(|c| c.user_id == user_id) {
            return Err(RepoError::NotFound);
        }
        tables.categories.remove(&id);
        tables.transactions.retain(|_, t| t.category_id != id);
        Ok(())
    }
}

fn newest_first(mut transactions: Vec<Transaction>) -> Vec<Transaction> {
    transactions.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    transactions
}

#[async_trait]
impl TransactionRepository for MemoryStore {
    async fn create(&self, transaction: NewTransaction) -> RepoResult<Transaction> {
        let mut tables = self.tables.write().await;
        tables.check_references(
            transaction.user_id,
            transaction.account_id,
            transaction.category_id,
        )?;

        let now = Utc::now();
        let record = Transaction {
            id: Uuid::new_v4(),
            description: transaction.description,
            amount: transaction.amount,
            date: transaction.date,
            transaction_type: transaction.transaction_type,
            account_id: transaction.account_id,
            category_id: transaction.category_id,
            user_id: transaction.user_id,
            created_at: now,
            updated_at: now,
        };
        tables.transactions.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> RepoResult<Transaction> {
        let tables = self.tables.read().await;
        tables
            .transactions
            .get(&id)
            .filter(|t| t.user_id == user_id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn list_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Transaction>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .transactions
                .values()
                .filter(|t| t.user_id == user_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_by_account(&self, user_id: Uuid, account_id: Uuid) -> RepoResult<Vec<Transaction>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .transactions
                .values()
                .filter(|t| t.user_id == user_id && t.account_id == account_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_by_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
    ) -> RepoResult<Vec<Transaction>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .transactions
                .values()
                .filter(|t| t.user_id == user_id && t.category_id == category_id)
                .cloned()
                .collect(),
        ))
    }

    async fn update(&self, update: TransactionUpdate) -> RepoResult<Transaction> {
        let mut tables = self.tables.write().await;
        match tables.transactions.get(&update.id) {
            Some(t) if t.user_id == update.user_id => {
                if t.updated_at != update.expected_updated_at {
                    return Err(RepoError::Stale);
                }
            }
            _ => return Err(RepoError::NotFound),
        }
        tables.check_references(update.user_id, update.account_id, update.category_id)?;

        let transaction = tables
            .transactions
            .get_mut(&update.id)
            .ok_or(RepoError::NotFound)?;
        transaction.description = update.description;
        transaction.amount = update.amount;
        transaction.date = update.date;
        transaction.transaction_type = update.transaction_type;
        transaction.account_id = update.account_id;
        transaction.category_id = update.category_id;
        transaction.updated_at = bump(transaction.updated_at);
        Ok(transaction.clone())
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> RepoResult<()> {
        let mut tables = self.tables.write().await;
        if !tables
            .transactions
            .get(&id)
            .is_some_and(|t| t.user_id == user_id)
        {
            return Err(RepoError::NotFound);
        }
        tables.transactions.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ana".to_string(),
            email: email.to_string(),
            password: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        UserRepository::create(&store, new_user("ana@x.com")).await.unwrap();
        let err = UserRepository::create(&store, new_user("ana@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn stale_update_is_rejected() {
        let store = MemoryStore::new();
        let user = UserRepository::create(&store, new_user("ana@x.com")).await.unwrap();
        let update = UserUpdate {
            id: user.id,
            name: "Ana Maria".to_string(),
            email: user.email.clone(),
            password: user.password.clone(),
            expected_updated_at: user.updated_at,
        };

        let updated = UserRepository::update(&store, update.clone()).await.unwrap();
        assert!(updated.updated_at > user.updated_at);

        let err = UserRepository::update(&store, update).await.unwrap_err();
        assert!(matches!(err, RepoError::Stale));
    }

    #[tokio::test]
    async fn accounts_are_scoped_to_owner() {
        let store = MemoryStore::new();
        let owner = UserRepository::create(&store, new_user("a@x.com")).await.unwrap();
        let other = UserRepository::create(&store, new_user("b@x.com")).await.unwrap();
        let account = AccountRepository::create(
            &store,
            NewAccount {
                user_id: owner.id,
                name: "Wallet".to_string(),
                account_type: "cash".to_string(),
                balance: 0.0,
            },
        )
        .await
        .unwrap();

        assert!(AccountRepository::get(&store, owner.id, account.id).await.is_ok());
        assert!(matches!(
            AccountRepository::get(&store, other.id, account.id).await,
            Err(RepoError::NotFound)
        ));
        assert!(matches!(
            store.adjust_balance(other.id, account.id, 10.0).await,
            Err(RepoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn deleting_user_cascades() {
        let store = MemoryStore::new();
        let owner = UserRepository::create(&store, new_user("a@x.com")).await.unwrap();
        AccountRepository::create(
            &store,
            NewAccount {
                user_id: owner.id,
                name: "Wallet".to_string(),
                account_type: "cash".to_string(),
                balance: 0.0,
            },
        )
        .await
        .unwrap();

        UserRepository::delete(&store, owner.id).await.unwrap();
        assert!(AccountRepository::list_by_user(&store, owner.id)
            .await
            .unwrap()
            .is_empty());
    }
}
