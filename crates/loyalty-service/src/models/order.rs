//! 订单实体

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use super::OrderStatus;

/// 用户上传的消费订单
///
/// `number` 全局唯一；`accrual` 仅在状态为 PROCESSED 时非空。
/// 由订单服务创建，仅由对账 Worker 变更状态，永不删除。
#[derive(Debug, Clone, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub number: String,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub accrual: Option<Decimal>,
    pub uploaded_at: DateTime<Utc>,
}
