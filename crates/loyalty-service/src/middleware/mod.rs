//! HTTP 中间件
//!
//! 认证（Bearer Token 验证与用户注入）和请求追踪。

pub mod auth;
pub mod trace;

pub use auth::{AuthUser, auth_middleware};
pub use trace::http_tracing;
