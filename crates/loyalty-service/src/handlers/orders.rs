//! 订单处理器
//!
//! 上传为纯文本订单号，首次受理 202、本人重复上传 200；
//! 列表始终返回 200，空结果为 `[]`。

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::OrderResponse;
use crate::error::Result;
use crate::middleware::AuthUser;
use crate::service::UploadOutcome;
use crate::state::AppState;

/// 上传订单号
///
/// POST /api/user/orders（请求体为纯文本订单号）
pub async fn upload_order(
    State(state): State<AppState>,
    user: AuthUser,
    body: String,
) -> Result<StatusCode> {
    let number = body.trim();

    match state.orders.upload_order(user.0, number).await? {
        UploadOutcome::Accepted => Ok(StatusCode::ACCEPTED),
        UploadOutcome::AlreadyUploaded => Ok(StatusCode::OK),
    }
}

/// 用户订单列表
///
/// GET /api/user/orders
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<OrderResponse>>> {
    let orders = state.orders.list_orders(user.0).await?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}
