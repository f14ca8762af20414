use axum::{
    async_trait,
    extract::{FromRef, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::ApiError;
use crate::validator::{Validate, ValidationContext};

/// JSON body that has passed its own [`Validate`] rules. Undecodable bodies are
/// a 400; rule failures are a 422 carrying the field map.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    ValidationContext: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::debug!("rejected request body: {}", e);
            ApiError::bad_request("invalid request body")
        })?;

        let ctx = ValidationContext::from_ref(state);
        let eval = value.validate(&ctx);
        if !eval.is_valid() {
            return Err(ApiError::unprocessable_entity(eval));
        }
        Ok(Self(value))
    }
}

/// Path ids arrive as text so a malformed one is a 400 with our own body.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("invalid id"))
}
