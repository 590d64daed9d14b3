//! 认证中间件
//!
//! 验证请求中的 Bearer Token 并将用户身份注入请求扩展。
//! 注册、登录与健康检查为公开路由，跳过验证。

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{Request, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::error::LoyaltyError;
use crate::state::AppState;

/// 公开路由列表（不需要认证）
const PUBLIC_PATHS: [&str; 3] = ["/api/user/register", "/api/user/login", "/health"];

/// 已认证的用户身份
///
/// 由认证中间件写入请求扩展，处理器通过提取器获取。
/// 受保护路由上缺失时提取器返回 401。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = LoyaltyError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or_else(|| LoyaltyError::Unauthorized("missing user context".to_string()))
    }
}

/// 认证中间件
///
/// 从 Authorization header 提取 Bearer Token，验证通过后把
/// `AuthUser` 注入请求扩展，供后续处理器使用。
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path();

    if PUBLIC_PATHS.iter().any(|p| path == *p) {
        return next.run(request).await;
    }

    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            return LoyaltyError::Unauthorized("缺少认证 Token".to_string()).into_response();
        }
    };

    match state.jwt.verify_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(AuthUser(claims.sub));
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}
