//! 外部积分计算服务对接
//!
//! 类型化 HTTP 客户端与上游应答模型。

pub mod client;

pub use client::{AccrualClient, AccrualError, AccrualOrder, AccrualStatus};
