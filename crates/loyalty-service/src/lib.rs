//! 积分账户服务
//!
//! 认证用户上传消费订单号，后台 Worker 轮询外部积分计算服务获取
//! 每笔订单的奖励积分；用户可查询积分余额并凭新订单号提取积分。
//!
//! ## 核心流程
//!
//! - **订单接入**：校验（Luhn）、幂等入库、归属冲突判定
//! - **对账 Worker**：FIFO 拉取待处理订单，驱动状态机，尊重上游限流
//! - **余额台账**：单快照读取累积/提取总额，事务化提取保证余额非负
//!
//! ## 模块结构
//!
//! - `models`: 领域实体与订单状态机
//! - `repository`: 仓储接口与 PostgreSQL 实现
//! - `service`: 业务服务（订单、余额、认证）
//! - `accrual`: 外部积分计算服务客户端
//! - `worker`: 后台对账 Worker
//! - `auth` / `middleware`: Token 签发与认证中间件
//! - `handlers` / `routes` / `dto`: HTTP 接口层
//! - `error`: 错误类型与状态码映射

pub mod accrual;
pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;
pub mod worker;

pub use error::{LoyaltyError, Result};
pub use models::{Order, OrderStatus, User, Withdrawal};
pub use state::AppState;
