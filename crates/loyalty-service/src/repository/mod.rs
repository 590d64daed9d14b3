//! 仓储层
//!
//! 仓储接口定义与 PostgreSQL 实现。服务层只依赖 trait，便于 mock 测试。

pub mod order_repo;
pub mod traits;
pub mod user_repo;
pub mod withdrawal_repo;

pub use order_repo::OrderRepository;
pub use traits::{OrderRepositoryTrait, UserRepositoryTrait, WithdrawalRepositoryTrait};
pub use user_repo::UserRepository;
pub use withdrawal_repo::WithdrawalRepository;

/// 判断是否为命中指定唯一约束的冲突错误
pub(crate) fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.is_unique_violation() && db.constraint() == Some(constraint)
    )
}
