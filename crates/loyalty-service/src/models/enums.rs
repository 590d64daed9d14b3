//! 订单状态机
//!
//! 状态支持数据库（sqlx）和 JSON（serde）序列化。
//! 所有合法迁移集中在 `can_transition_to` 一处定义，仓储层的条件
//! UPDATE 由此导出前驱集合，调用方不得各自重复判断。

use serde::{Deserialize, Serialize};

/// 订单处理状态
///
/// 迁移 DAG：NEW → PROCESSING → {PROCESSED, INVALID}，
/// NEW 也可直接到达两个终态。INVALID 与 PROCESSED 为终态。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// 新上传 - 尚未被上游登记
    #[default]
    New,
    /// 计算中 - 上游已受理
    Processing,
    /// 无效 - 上游拒绝，不产生积分（终态）
    Invalid,
    /// 已完成 - 积分已确定（终态）
    Processed,
}

impl OrderStatus {
    /// 判断 `self -> next` 是否为合法迁移
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (New, Processing) | (New, Invalid) | (New, Processed)
                | (Processing, Invalid) | (Processing, Processed)
        )
    }

    /// 是否为终态
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Invalid | OrderStatus::Processed)
    }

    /// 能够迁移到 `self` 的前驱状态集合，供仓储层条件 UPDATE 使用
    pub fn predecessors(self) -> Vec<OrderStatus> {
        [
            OrderStatus::New,
            OrderStatus::Processing,
            OrderStatus::Invalid,
            OrderStatus::Processed,
        ]
        .into_iter()
        .filter(|from| from.can_transition_to(self))
        .collect()
    }

    /// 数据库/接口中使用的字符串表示
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::New => "NEW",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Invalid => "INVALID",
            OrderStatus::Processed => "PROCESSED",
        }
    }
}
