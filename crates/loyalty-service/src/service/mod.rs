//! 业务服务层
//!
//! 订单接入、余额台账与注册/登录的核心业务逻辑。
//! 服务依赖仓储 trait 而非具体实现，全部依赖显式传入构造函数。

pub mod auth_service;
pub mod balance_service;
pub mod luhn;
pub mod orders_service;

pub use auth_service::AuthService;
pub use balance_service::{Balance, BalanceService};
pub use orders_service::{OrdersService, UploadOutcome};
