use axum::extract::State;

use crate::api::extract::ValidatedJson;
use crate::api::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::user_service::{LoginRequest, LoginResponse, SignupRequest};

/// POST /api/v1/users/signup - register a new user
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SignupRequest>,
) -> ApiResult<()> {
    let user = state.users.signup(request).await?;
    Ok(ApiResponse::created(format!("/api/v1/users/{}", user.id)))
}

/// POST /api/v1/users/login - exchange credentials for a bearer token
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    Ok(ApiResponse::success(state.users.login(request).await?))
}
