//! 请求 DTO 定义

use rust_decimal::Decimal;
use serde::Deserialize;

/// 注册/登录请求
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub login: String,
    pub password: String,
}

/// 提取请求
///
/// `sum` 同时接受 JSON 数字和数字字符串（客户端两种写法都存在）。
#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    pub order: String,
    pub sum: Decimal,
}
