use axum::extract::{Path, State};

use crate::api::extract::{parse_id, ValidatedJson};
use crate::api::AppState;
use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::user_service::UserPatch;

/// GET /api/v1/users
pub async fn list(State(state): State<AppState>, _caller: AuthUser) -> ApiResult<Vec<User>> {
    Ok(ApiResponse::success(state.users.list().await?))
}

/// GET /api/v1/users/:id
pub async fn show(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<User> {
    let id = parse_id(&id)?;
    Ok(ApiResponse::success(state.users.get(id).await?))
}

/// PUT /api/v1/users/:id - partial profile update, own profile only
pub async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(patch): ValidatedJson<UserPatch>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    state.users.update(caller.user_id, id, patch).await?;
    Ok(ApiResponse::no_content())
}

/// DELETE /api/v1/users/:id - own account only
pub async fn delete(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    state.users.delete(caller.user_id, id).await?;
    Ok(ApiResponse::no_content())
}
