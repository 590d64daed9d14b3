//! 仓储 Trait 定义
//!
//! 定义仓储接口，便于服务层依赖抽象而非具体实现，支持 mock 测试

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Order, OrderStatus, User, Withdrawal};

/// 订单仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepositoryTrait: Send + Sync {
    /// 新建订单（状态 NEW，accrual 为空）；订单号全局冲突返回 `OrderExists`
    async fn create(&self, user_id: Uuid, number: &str) -> Result<Order>;

    /// 用户订单列表，按上传时间倒序
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>>;

    /// 按订单号查找（用于归属判定）
    async fn find_by_number(&self, number: &str) -> Result<Option<Order>>;

    /// 待处理订单批次（状态 NEW/PROCESSING），按上传时间先进先出；仅 Worker 使用
    async fn pending_batch(&self, limit: i64) -> Result<Vec<Order>>;

    /// 原子更新状态与积分；只接受合法前驱上的迁移，
    /// 非单调迁移静默忽略并返回 false
    async fn update_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
        accrual: Option<Decimal>,
    ) -> Result<bool>;
}

/// 提取仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WithdrawalRepositoryTrait: Send + Sync {
    /// 事务化创建提取流水：锁定用户行，校验余额充足后写入。
    /// 余额不足返回 `NotEnoughFunds`，(user, order_number) 冲突返回
    /// `DuplicateWithdrawal`
    async fn create(&self, user_id: Uuid, order_number: &str, sum: Decimal) -> Result<Withdrawal>;

    /// 用户提取流水，按处理时间倒序
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Withdrawal>>;

    /// 单条语句读取 (累积, 已提取) 总额，空集合并为零
    async fn totals(&self, user_id: Uuid) -> Result<(Decimal, Decimal)>;
}

/// 用户仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    /// 创建用户，登录名冲突返回 `LoginTaken`
    async fn create(&self, login: &str, password_hash: &str) -> Result<Uuid>;

    /// 按登录名查找
    async fn find_by_login(&self, login: &str) -> Result<Option<User>>;
}
