//! 领域模型
//!
//! 包含积分账户服务的核心实体定义与订单状态机。

pub mod enums;
pub mod order;
pub mod user;
pub mod withdrawal;

pub use enums::OrderStatus;
pub use order::Order;
pub use user::User;
pub use withdrawal::Withdrawal;
