//! 用户仓储

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use super::{is_unique_violation, traits::UserRepositoryTrait};
use crate::error::{LoyaltyError, Result};
use crate::models::User;

/// 用户仓储 PostgreSQL 实现
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn create(&self, login: &str, password_hash: &str) -> Result<Uuid> {
        let user_id: Uuid = sqlx::query_scalar(
            "INSERT INTO users (login, password_hash) VALUES ($1, $2) RETURNING id",
        )
        .bind(login)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "users_login_key") {
                warn!(login = %login, "登录名已被占用");
                LoyaltyError::LoginTaken
            } else {
                e.into()
            }
        })?;

        info!(user_id = %user_id, "用户已创建");
        Ok(user_id)
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, login, password_hash, created_at FROM users WHERE login = $1",
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
