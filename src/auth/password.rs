use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Salted bcrypt hashing with a configurable work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        Ok(bcrypt::hash(plaintext, self.cost)?)
    }

    /// `true` only when `candidate` matches `hashed`. A malformed stored hash is
    /// treated as a mismatch so callers can answer with the same generic error.
    pub fn verify(&self, candidate: &str, hashed: &str) -> bool {
        match bcrypt::verify(candidate, hashed) {
            Ok(ok) => ok,
            Err(e) => {
                tracing::warn!("stored password hash could not be parsed: {}", e);
                false
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(10)
    }
}
