//! 数据传输对象
//!
//! HTTP 接口的请求与响应结构。字段名即线上格式，金额一律以
//! 精确 JSON 数字（最多两位小数）序列化。

pub mod request;
pub mod response;

pub use request::{CredentialsRequest, WithdrawRequest};
pub use response::{BalanceResponse, OrderResponse, WithdrawalResponse};
