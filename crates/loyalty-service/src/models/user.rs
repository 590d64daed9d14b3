//! 用户实体

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// 注册用户
///
/// 注册时创建，核心流程不会删除。密码只保存 bcrypt 哈希。
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub login: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
