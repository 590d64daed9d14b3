//! 提取仓储
//!
//! 提取流水的持久化访问。创建走单事务协议：
//! `SELECT ... FOR UPDATE` 锁定用户行串行化同一用户的并发提取，
//! 事务内重读总额并校验 `current >= sum` 后写入，保证任何提交点上
//! 余额不为负。

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

use super::{is_unique_violation, traits::WithdrawalRepositoryTrait};
use crate::error::{LoyaltyError, Result};
use crate::models::Withdrawal;

/// 提取仓储 PostgreSQL 实现
pub struct WithdrawalRepository {
    pool: PgPool,
}

impl WithdrawalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// 单条语句读取 (累积, 已提取)，两个总额同处一个数据库快照
async fn totals_with<'e, E>(executor: E, user_id: Uuid) -> Result<(Decimal, Decimal)>
where
    E: PgExecutor<'e>,
{
    let totals: (Decimal, Decimal) = sqlx::query_as(
        r#"
        SELECT
            COALESCE(SUM(o.accrual), 0) AS accrued,
            COALESCE((
                SELECT SUM(w.sum)
                FROM withdrawals w
                WHERE w.user_id = $1
            ), 0) AS withdrawn
        FROM orders o
        WHERE o.user_id = $1
          AND o.status = 'PROCESSED'
        "#,
    )
    .bind(user_id)
    .fetch_one(executor)
    .await?;

    Ok(totals)
}

#[async_trait]
impl WithdrawalRepositoryTrait for WithdrawalRepository {
    async fn create(&self, user_id: Uuid, order_number: &str, sum: Decimal) -> Result<Withdrawal> {
        let mut tx = self.pool.begin().await?;

        // 锁定用户行；同一用户的并发提取在此排队
        let locked: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(LoyaltyError::Unauthorized("unknown user".to_string()));
        }

        let (accrued, withdrawn) = totals_with(&mut *tx, user_id).await?;
        if accrued - withdrawn < sum {
            warn!(user_id = %user_id, sum = %sum, "余额不足，提取被拒绝");
            return Err(LoyaltyError::NotEnoughFunds);
        }

        let withdrawal = sqlx::query_as::<_, Withdrawal>(
            r#"
            INSERT INTO withdrawals (user_id, order_number, sum)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, order_number, sum, processed_at
            "#,
        )
        .bind(user_id)
        .bind(order_number)
        .bind(sum)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "withdrawals_user_id_order_number_key") {
                warn!(order = %order_number, "该订单号已有提取记录");
                LoyaltyError::DuplicateWithdrawal
            } else {
                e.into()
            }
        })?;

        tx.commit().await?;

        info!(order = %order_number, sum = %sum, "提取已记录");
        Ok(withdrawal)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Withdrawal>> {
        let withdrawals = sqlx::query_as::<_, Withdrawal>(
            r#"
            SELECT id, user_id, order_number, sum, processed_at
            FROM withdrawals
            WHERE user_id = $1
            ORDER BY processed_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(withdrawals)
    }

    async fn totals(&self, user_id: Uuid) -> Result<(Decimal, Decimal)> {
        totals_with(&self.pool, user_id).await
    }
}
