//! 认证服务
//!
//! 注册与登录。密码策略在两条路径上共用：
//! 空凭证、登录名与密码相同、密码短于 8 位均以 `InvalidInput`（400）拒绝。

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::auth::{JwtManager, hash_password, verify_password};
use crate::error::{LoyaltyError, Result};
use crate::repository::UserRepositoryTrait;

/// 认证服务
pub struct AuthService<U>
where
    U: UserRepositoryTrait,
{
    users: Arc<U>,
    jwt: JwtManager,
}

/// 凭证策略检查
///
/// 注册与登录共用，保证两条路径对坏凭证的判定一致。
fn check_credentials(login: &str, password: &str) -> Result<()> {
    if login.is_empty() || password.is_empty() {
        return Err(LoyaltyError::InvalidInput(
            "login and password required".to_string(),
        ));
    }
    if login == password {
        return Err(LoyaltyError::InvalidInput(
            "password must differ from login".to_string(),
        ));
    }
    if password.chars().count() < 8 {
        return Err(LoyaltyError::InvalidInput(
            "password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}

impl<U> AuthService<U>
where
    U: UserRepositoryTrait,
{
    pub fn new(users: Arc<U>, jwt: JwtManager) -> Self {
        Self { users, jwt }
    }

    /// 注册新用户并签发 Token
    #[instrument(skip(self, password))]
    pub async fn register(&self, login: &str, password: &str) -> Result<String> {
        check_credentials(login, password)?;

        let password_hash = hash_password(password)?;
        let user_id = self.users.create(login, &password_hash).await?;

        info!(login = %login, "注册成功");
        self.jwt.generate_token(user_id)
    }

    /// 校验凭证并签发 Token
    #[instrument(skip(self, password))]
    pub async fn login(&self, login: &str, password: &str) -> Result<String> {
        check_credentials(login, password)?;

        let user = self
            .users
            .find_by_login(login)
            .await?
            .ok_or(LoyaltyError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            warn!(login = %login, "密码错误");
            return Err(LoyaltyError::InvalidCredentials);
        }

        self.jwt.generate_token(user.id)
    }
}
