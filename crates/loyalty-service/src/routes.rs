//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射

use axum::{
    Router,
    routing::{get, post},
};

use crate::{handlers, state::AppState};

/// 构建全部 API 路由
///
/// 注册、登录与健康检查为公开路由，其余路由由认证中间件保护
/// （中间件在组装 Router 时挂载）。
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/user/register", post(handlers::auth::register))
        .route("/api/user/login", post(handlers::auth::login))
        .route(
            "/api/user/orders",
            post(handlers::orders::upload_order).get(handlers::orders::list_orders),
        )
        .route("/api/user/balance", get(handlers::balance::get_balance))
        .route(
            "/api/user/balance/withdraw",
            post(handlers::balance::withdraw),
        )
        .route(
            "/api/user/withdrawals",
            get(handlers::balance::list_withdrawals),
        )
        .route("/health", get(handlers::health::health_check))
}
