use axum::extract::{Path, State};

use crate::api::extract::{parse_id, ValidatedJson};
use crate::api::AppState;
use crate::database::models::Account;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::account_service::{
    AccountPatch, BalanceAdjustment, BalanceResponse, CreateAccountRequest,
};

/// POST /api/v1/accounts
pub async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateAccountRequest>,
) -> ApiResult<()> {
    let account = state.accounts.create(caller.user_id, request).await?;
    Ok(ApiResponse::created(format!("/api/v1/accounts/{}", account.id)))
}

/// GET /api/v1/accounts
pub async fn list(State(state): State<AppState>, caller: AuthUser) -> ApiResult<Vec<Account>> {
    Ok(ApiResponse::success(state.accounts.list(caller.user_id).await?))
}

/// GET /api/v1/accounts/:id
pub async fn show(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Account> {
    let id = parse_id(&id)?;
    Ok(ApiResponse::success(state.accounts.get(caller.user_id, id).await?))
}

/// PUT|POST /api/v1/accounts/:id - rename or retype
pub async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(patch): ValidatedJson<AccountPatch>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    state.accounts.update(caller.user_id, id, patch).await?;
    Ok(ApiResponse::no_content())
}

/// PATCH /api/v1/accounts/:id/balance - add a signed delta
pub async fn adjust_balance(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(adjustment): ValidatedJson<BalanceAdjustment>,
) -> ApiResult<BalanceResponse> {
    let id = parse_id(&id)?;
    let balance = state
        .accounts
        .adjust_balance(caller.user_id, id, adjustment.delta)
        .await?;
    Ok(ApiResponse::success(BalanceResponse { balance }))
}

/// DELETE /api/v1/accounts/:id
pub async fn delete(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    state.accounts.delete(caller.user_id, id).await?;
    Ok(ApiResponse::no_content())
}
