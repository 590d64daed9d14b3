//! HTTP 请求处理器
//!
//! 薄映射层：解码请求、调用服务、按接口约定编码应答。

pub mod auth;
pub mod balance;
pub mod health;
pub mod orders;
