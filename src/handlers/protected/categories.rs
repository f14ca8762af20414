use axum::extract::{Path, State};

use crate::api::extract::{parse_id, ValidatedJson};
use crate::api::AppState;
use crate::database::models::Category;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::category_service::{CategoryPatch, CreateCategoryRequest};

/// POST /api/v1/categories
pub async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateCategoryRequest>,
) -> ApiResult<()> {
    let category = state.categories.create(caller.user_id, request).await?;
    Ok(ApiResponse::created(format!("/api/v1/categories/{}", category.id)))
}

/// GET /api/v1/categories
pub async fn list(State(state): State<AppState>, caller: AuthUser) -> ApiResult<Vec<Category>> {
    Ok(ApiResponse::success(state.categories.list(caller.user_id).await?))
}

/// GET /api/v1/categories/:id
pub async fn show(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Category> {
    let id = parse_id(&id)?;
    Ok(ApiResponse::success(state.categories.get(caller.user_id, id).await?))
}

/// PUT /api/v1/categories/:id
pub async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(patch): ValidatedJson<CategoryPatch>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    state.categories.update(caller.user_id, id, patch).await?;
    Ok(ApiResponse::no_content())
}

/// DELETE /api/v1/categories/:id
pub async fn delete(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    state.categories.delete(caller.user_id, id).await?;
    Ok(ApiResponse::no_content())
}
