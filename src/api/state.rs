use axum::extract::FromRef;
use chrono::Duration;
use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenError, TokenManager};
use crate::config::SecurityConfig;
use crate::database::postgres::{
    PgAccountRepository, PgCategoryRepository, PgTransactionRepository, PgUserRepository,
};
use crate::database::{DatabaseManager, MemoryStore};
use crate::services::{AccountService, CategoryService, TransactionService, UserService};
use crate::validator::ValidationContext;

/// Everything a handler can reach. Cheap to clone; services share their stores.
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub accounts: AccountService,
    pub categories: CategoryService,
    pub transactions: TransactionService,
    pub tokens: TokenManager,
    pub validation: ValidationContext,
}

impl AppState {
    /// Wires services over the PostgreSQL repositories.
    pub fn postgres(db: &DatabaseManager, security: &SecurityConfig) -> Result<Self, TokenError> {
        let pool = db.pool().clone();
        let tokens = token_manager(security)?;
        Ok(Self {
            users: UserService::new(
                Arc::new(PgUserRepository::new(pool.clone())),
                PasswordHasher::new(security.bcrypt_cost),
                tokens.clone(),
            ),
            accounts: AccountService::new(Arc::new(PgAccountRepository::new(pool.clone()))),
            categories: CategoryService::new(Arc::new(PgCategoryRepository::new(pool.clone()))),
            transactions: TransactionService::new(Arc::new(PgTransactionRepository::new(pool))),
            tokens,
            validation: ValidationContext::new(),
        })
    }

    /// Wires services over a single in-process store.
    pub fn in_memory(store: MemoryStore, security: &SecurityConfig) -> Result<Self, TokenError> {
        let tokens = token_manager(security)?;
        Ok(Self {
            users: UserService::new(
                Arc::new(store.clone()),
                PasswordHasher::new(security.bcrypt_cost),
                tokens.clone(),
            ),
            accounts: AccountService::new(Arc::new(store.clone())),
            categories: CategoryService::new(Arc::new(store.clone())),
            transactions: TransactionService::new(Arc::new(store)),
            tokens,
            validation: ValidationContext::new(),
        })
    }
}

pub fn token_manager(security: &SecurityConfig) -> Result<TokenManager, TokenError> {
    let hours = i64::try_from(security.jwt_expiry_hours).unwrap_or(i64::MAX / 3600);
    TokenManager::new(&security.jwt_secret, Duration::hours(hours))
}

impl FromRef<AppState> for TokenManager {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl FromRef<AppState> for ValidationContext {
    fn from_ref(state: &AppState) -> Self {
        state.validation.clone()
    }
}
