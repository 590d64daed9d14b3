//! 积分提取实体

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// 积分提取流水
///
/// `order_number` 是用户提取时提供的订单号引用，不要求存在于订单表；
/// `(user_id, order_number)` 唯一。创建后不可变，永不删除。
#[derive(Debug, Clone, FromRow)]
pub struct Withdrawal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_number: String,
    pub sum: Decimal,
    pub processed_at: DateTime<Utc>,
}
