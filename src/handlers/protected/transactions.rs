use axum::extract::{Path, Query, State};

use crate::api::extract::{parse_id, ValidatedJson};
use crate::api::AppState;
use crate::database::models::Transaction;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::transaction_service::{
    CreateTransactionRequest, TransactionFilters, TransactionPatch,
};

/// POST /api/v1/transactions
pub async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateTransactionRequest>,
) -> ApiResult<()> {
    let transaction = state.transactions.create(caller.user_id, request).await?;
    Ok(ApiResponse::created(format!(
        "/api/v1/transactions/{}",
        transaction.id
    )))
}

/// GET /api/v1/transactions?account_id=&category_id=&type=&start_date=&end_date=
pub async fn list(
    State(state): State<AppState>,
    caller: AuthUser,
    filters: Result<Query<TransactionFilters>, axum::extract::rejection::QueryRejection>,
) -> ApiResult<Vec<Transaction>> {
    let Query(filters) = filters.map_err(|_| ApiError::bad_request("invalid query string"))?;
    Ok(ApiResponse::success(
        state.transactions.list(caller.user_id, &filters).await?,
    ))
}

/// GET /api/v1/transactions/:id
pub async fn show(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Transaction> {
    let id = parse_id(&id)?;
    Ok(ApiResponse::success(state.transactions.get(caller.user_id, id).await?))
}

/// PUT /api/v1/transactions/:id - sparse patch, may move between accounts
pub async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(patch): ValidatedJson<TransactionPatch>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    state.transactions.update(caller.user_id, id, patch).await?;
    Ok(ApiResponse::no_content())
}

/// DELETE /api/v1/transactions/:id
pub async fn delete(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    state.transactions.delete(caller.user_id, id).await?;
    Ok(ApiResponse::no_content())
}
