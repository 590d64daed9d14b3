//! 注册与登录处理器
//!
//! 成功时在 `Authorization: Bearer <token>` 响应头中返回 Token，
//! 响应体为空。

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::Json;

use crate::dto::CredentialsRequest;
use crate::error::{LoyaltyError, Result};
use crate::state::AppState;

/// 组装携带 Bearer 头的空响应
fn bearer_response(token: String) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::AUTHORIZATION, format!("Bearer {}", token))],
    )
}

/// 用户注册
///
/// POST /api/user/register
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(req) = payload
        .map_err(|e| LoyaltyError::InvalidInput(format!("invalid JSON: {}", e)))?;

    let token = state.auth.register(&req.login, &req.password).await?;
    Ok(bearer_response(token))
}

/// 用户登录
///
/// POST /api/user/login
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(req) = payload
        .map_err(|e| LoyaltyError::InvalidInput(format!("invalid JSON: {}", e)))?;

    let token = state.auth.login(&req.login, &req.password).await?;
    Ok(bearer_response(token))
}
