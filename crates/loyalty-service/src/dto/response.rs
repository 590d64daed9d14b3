//! 响应 DTO 定义
//!
//! 金额字段使用 arbitrary-precision 序列化为精确 JSON 数字，
//! 出口处统一舍入到两位小数；时间戳为 RFC3339。

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Order, OrderStatus, Withdrawal};
use crate::service::balance_service::Balance;

/// 订单列表项
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub number: String,
    pub status: OrderStatus,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::arbitrary_precision_option"
    )]
    pub accrual: Option<Decimal>,
    pub uploaded_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            number: order.number,
            status: order.status,
            accrual: order.accrual.map(|a| a.round_dp(2)),
            uploaded_at: order.uploaded_at,
        }
    }
}

/// 余额应答
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub current: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub withdrawn: Decimal,
}

impl From<Balance> for BalanceResponse {
    fn from(balance: Balance) -> Self {
        Self {
            current: balance.current.round_dp(2),
            withdrawn: balance.withdrawn.round_dp(2),
        }
    }
}

/// 提取流水列表项
#[derive(Debug, Serialize)]
pub struct WithdrawalResponse {
    pub order: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub sum: Decimal,
    pub processed_at: DateTime<Utc>,
}

impl From<Withdrawal> for WithdrawalResponse {
    fn from(withdrawal: Withdrawal) -> Self {
        Self {
            order: withdrawal.order_number,
            sum: withdrawal.sum.round_dp(2),
            processed_at: withdrawal.processed_at,
        }
    }
}
