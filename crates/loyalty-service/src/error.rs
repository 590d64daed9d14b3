//! 服务错误类型定义
//!
//! 业务错误与传输层解耦：服务层返回类型化错误，
//! HTTP 层通过 `status_code` / `IntoResponse` 统一映射状态码。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// 积分账户服务错误类型
#[derive(Debug, thiserror::Error)]
pub enum LoyaltyError {
    // 输入错误
    #[error("请求无效: {0}")]
    InvalidInput(String),
    #[error("订单号无效")]
    InvalidOrderNumber,

    // 订单归属冲突
    #[error("订单号已被其他用户上传")]
    OrderOwnedByAnother,
    #[error("订单号已存在")]
    OrderExists,

    // 提取错误
    #[error("该订单号已有提取记录")]
    DuplicateWithdrawal,
    #[error("积分余额不足")]
    NotEnoughFunds,

    // 认证错误
    #[error("未授权: {0}")]
    Unauthorized(String),
    #[error("登录名或密码错误")]
    InvalidCredentials,
    #[error("登录名已被占用")]
    LoginTaken,

    // 资源不存在（保留，当前对外未使用）
    #[error("资源不存在: {0}")]
    NotFound(String),

    // 系统错误
    #[error("上游暂时不可用: {0}")]
    Transient(String),
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl LoyaltyError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            // 提取时重复的订单号对外等价于订单号无效
            Self::InvalidOrderNumber | Self::DuplicateWithdrawal => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::OrderOwnedByAnother | Self::OrderExists | Self::LoginTaken => {
                StatusCode::CONFLICT
            }
            Self::NotEnoughFunds => StatusCode::PAYMENT_REQUIRED,
            Self::Unauthorized(_) | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Transient(_) | Self::Database(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::InvalidOrderNumber => "INVALID_ORDER_NUMBER",
            Self::OrderOwnedByAnother => "ORDER_OWNED_BY_ANOTHER",
            Self::OrderExists => "ORDER_EXISTS",
            Self::DuplicateWithdrawal => "INVALID_ORDER_NUMBER",
            Self::NotEnoughFunds => "NOT_ENOUGH_FUNDS",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::LoginTaken => "LOGIN_TAKEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Transient(_) => "TRANSIENT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for LoyaltyError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志，防止信息泄露
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Transient(e) => {
                tracing::error!(error = %e, "上游调用失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, LoyaltyError>;
