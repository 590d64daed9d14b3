//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::JwtManager;
use crate::repository::{OrderRepository, UserRepository, WithdrawalRepository};
use crate::service::{AuthService, BalanceService, OrdersService};

/// Axum 应用共享状态
///
/// 业务服务与 Token 管理器，通过 Arc 在 handler 间共享。
#[derive(Clone)]
pub struct AppState {
    /// Token 签发/验证（认证中间件使用）
    pub jwt: JwtManager,
    pub auth: Arc<AuthService<UserRepository>>,
    pub orders: Arc<OrdersService<OrderRepository>>,
    pub balance: Arc<BalanceService<WithdrawalRepository>>,
}

impl AppState {
    /// 从连接池装配仓储与服务
    pub fn new(pool: PgPool, jwt: JwtManager) -> Self {
        let users = Arc::new(UserRepository::new(pool.clone()));
        let orders = Arc::new(OrderRepository::new(pool.clone()));
        let withdrawals = Arc::new(WithdrawalRepository::new(pool));

        Self {
            jwt: jwt.clone(),
            auth: Arc::new(AuthService::new(users, jwt)),
            orders: Arc::new(OrdersService::new(orders)),
            balance: Arc::new(BalanceService::new(withdrawals)),
        }
    }
}
