//! 余额与提取处理器

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::dto::{BalanceResponse, WithdrawRequest, WithdrawalResponse};
use crate::error::{LoyaltyError, Result};
use crate::middleware::AuthUser;
use crate::state::AppState;

/// 查询余额
///
/// GET /api/user/balance
pub async fn get_balance(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<BalanceResponse>> {
    let balance = state.balance.get_balance(user.0).await?;
    Ok(Json(BalanceResponse::from(balance)))
}

/// 提取积分
///
/// POST /api/user/balance/withdraw
pub async fn withdraw(
    State(state): State<AppState>,
    user: AuthUser,
    payload: std::result::Result<Json<WithdrawRequest>, JsonRejection>,
) -> Result<StatusCode> {
    let Json(req) = payload
        .map_err(|e| LoyaltyError::InvalidInput(format!("invalid JSON: {}", e)))?;

    state.balance.withdraw(user.0, &req.order, req.sum).await?;
    Ok(StatusCode::OK)
}

/// 提取流水列表
///
/// GET /api/user/withdrawals（无记录时返回 204）
pub async fn list_withdrawals(State(state): State<AppState>, user: AuthUser) -> Result<Response> {
    let withdrawals = state.balance.list_withdrawals(user.0).await?;

    if withdrawals.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let body: Vec<WithdrawalResponse> = withdrawals
        .into_iter()
        .map(WithdrawalResponse::from)
        .collect();
    Ok(Json(body).into_response())
}
