use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use crate::auth::{PasswordHasher, TokenManager};
use crate::database::models::user::{NewUser, UserUpdate};
use crate::database::models::User;
use crate::database::{RepoError, UserRepository};
use crate::validator::{self, supplied, Evaluator, Validate, ValidationContext};

const NAME_MAX: usize = 255;
const PASSWORD_MIN: usize = 8;
// bcrypt only reads the first 72 bytes
const PASSWORD_MAX: usize = 72;
// Hashed once per service; unknown-email logins verify against it.
const UNKNOWN_USER_PASSWORD: &str = "no-such-user-password";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Sparse profile update. A blank value counts as not supplied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

fn check_name(eval: &mut Evaluator, name: &str) {
    eval.check_field(validator::not_blank(name), "name", "name is required");
    eval.check_field(
        validator::max_chars(name, NAME_MAX),
        "name",
        "name must be at most 255 characters",
    );
}

fn check_email(eval: &mut Evaluator, ctx: &ValidationContext, email: &str) {
    eval.check_field(validator::not_blank(email), "email", "email is required");
    eval.check_field(
        validator::matches(email, ctx.email_rx()),
        "email",
        "email is not a valid address",
    );
}

fn check_password(eval: &mut Evaluator, password: &str) {
    eval.check_field(
        validator::not_blank(password),
        "password",
        "password is required",
    );
    eval.check_field(
        validator::min_chars(password, PASSWORD_MIN),
        "password",
        "password must be at least 8 characters",
    );
    eval.check_field(
        password.len() <= PASSWORD_MAX,
        "password",
        "password must be at most 72 bytes",
    );
}

impl Validate for SignupRequest {
    fn validate(&self, ctx: &ValidationContext) -> Evaluator {
        let mut eval = Evaluator::new();
        check_name(&mut eval, &self.name);
        check_email(&mut eval, ctx, &self.email);
        check_password(&mut eval, &self.password);
        eval
    }
}

impl Validate for LoginRequest {
    fn validate(&self, _ctx: &ValidationContext) -> Evaluator {
        let mut eval = Evaluator::new();
        eval.check_field(validator::not_blank(&self.email), "email", "email is required");
        eval.check_field(
            validator::not_blank(&self.password),
            "password",
            "password is required",
        );
        eval
    }
}

impl Validate for UserPatch {
    fn validate(&self, ctx: &ValidationContext) -> Evaluator {
        let mut eval = Evaluator::new();
        let name = supplied(&self.name);
        let email = supplied(&self.email);
        let password = supplied(&self.password);

        if name.is_none() && email.is_none() && password.is_none() {
            eval.add_field_error("fields", "at least one of name, email or password is required");
            return eval;
        }
        if let Some(name) = name {
            check_name(&mut eval, name);
        }
        if let Some(email) = email {
            check_email(&mut eval, ctx, email);
        }
        if let Some(password) = password {
            check_password(&mut eval, password);
        }
        eval
    }
}

impl UserPatch {
    /// Seeds the update with `existing` and overwrites only supplied fields.
    /// The stored hash is carried over; the caller replaces it when a new
    /// password was supplied.
    pub fn merge(&self, existing: &User) -> UserUpdate {
        UserUpdate {
            id: existing.id,
            name: supplied(&self.name).unwrap_or(&existing.name).to_string(),
            email: supplied(&self.email).unwrap_or(&existing.email).to_string(),
            password: existing.password.clone(),
            expected_updated_at: existing.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    tokens: TokenManager,
    dummy_hash: Option<Arc<str>>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, hasher: PasswordHasher, tokens: TokenManager) -> Self {
        let dummy_hash = match hasher.hash(UNKNOWN_USER_PASSWORD) {
            Ok(hash) => Some(Arc::from(hash)),
            Err(e) => {
                tracing::warn!("could not prepare login hash for unknown users: {}", e);
                None
            }
        };
        Self {
            repo,
            hasher,
            tokens,
            dummy_hash,
        }
    }

    pub async fn signup(&self, request: SignupRequest) -> ServiceResult<User> {
        match self.repo.get_by_email(&request.email).await {
            Ok(_) => return Err(ServiceError::DuplicateEmail),
            Err(RepoError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }

        let password = self.hasher.hash(&request.password)?;
        let user = self
            .repo
            .create(NewUser {
                name: request.name,
                email: request.email,
                password,
            })
            .await?;

        tracing::info!("Registered user {}", user.id);
        Ok(user)
    }

    pub async fn login(&self, request: LoginRequest) -> ServiceResult<LoginResponse> {
        let user = match self.repo.get_by_email(&request.email).await {
            Ok(user) => user,
            Err(RepoError::NotFound) => {
                // Same bcrypt work as a wrong password so timing does not reveal the email.
                if let Some(hash) = &self.dummy_hash {
                    self.hasher.verify(&request.password, hash);
                }
                return Err(ServiceError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };

        if !self.hasher.verify(&request.password, &user.password) {
            tracing::debug!("password mismatch for user {}", user.id);
            return Err(ServiceError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id, &user.name)?;
        Ok(LoginResponse { token })
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<User> {
        Ok(self.repo.get(id).await?)
    }

    pub async fn list(&self) -> ServiceResult<Vec<User>> {
        Ok(self.repo.list().await?)
    }

    /// Callers may only change their own profile; anyone else's id reads as missing.
    pub async fn update(&self, caller: Uuid, id: Uuid, patch: UserPatch) -> ServiceResult<User> {
        if caller != id {
            return Err(ServiceError::NotFound);
        }

        let existing = self.repo.get(id).await?;
        let mut update = patch.merge(&existing);
        if let Some(password) = supplied(&patch.password) {
            update.password = self.hasher.hash(password)?;
        }

        Ok(self.repo.update(update).await?)
    }

    pub async fn delete(&self, caller: Uuid, id: Uuid) -> ServiceResult<()> {
        if caller != id {
            return Err(ServiceError::NotFound);
        }
        self.repo.delete(id).await?;
        tracing::info!("Deleted user {}", id);
        Ok(())
    }

    /// Store round trip used by the health endpoint.
    pub async fn ping(&self) -> ServiceResult<()> {
        Ok(self.repo.ping().await?)
    }
}
