//! 订单仓储
//!
//! 订单的持久化访问。状态更新通过条件 UPDATE 实现单调性：
//! WHERE 子句限定在目标状态的合法前驱上，非单调迁移命中零行即为静默 no-op，
//! Worker 重试不会让已落定的状态回退。

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use super::{is_unique_violation, traits::OrderRepositoryTrait};
use crate::error::{LoyaltyError, Result};
use crate::models::{Order, OrderStatus};

/// 订单仓储 PostgreSQL 实现
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepositoryTrait for OrderRepository {
    async fn create(&self, user_id: Uuid, number: &str) -> Result<Order> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (user_id, number)
            VALUES ($1, $2)
            RETURNING id, number, user_id, status, accrual, uploaded_at
            "#,
        )
        .bind(user_id)
        .bind(number)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "orders_number_key") {
                warn!(number = %number, "订单号已存在");
                LoyaltyError::OrderExists
            } else {
                e.into()
            }
        })?;

        info!(number = %number, "订单已创建");
        Ok(order)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, number, user_id, status, accrual, uploaded_at
            FROM orders
            WHERE user_id = $1
            ORDER BY uploaded_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    async fn find_by_number(&self, number: &str) -> Result<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, number, user_id, status, accrual, uploaded_at
            FROM orders
            WHERE number = $1
            "#,
        )
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    async fn pending_batch(&self, limit: i64) -> Result<Vec<Order>> {
        // id 作为并列时间戳下的决定性次序
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, number, user_id, status, accrual, uploaded_at
            FROM orders
            WHERE status IN ('NEW', 'PROCESSING')
            ORDER BY uploaded_at ASC, id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    async fn update_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
        accrual: Option<Decimal>,
    ) -> Result<bool> {
        let predecessors: Vec<&str> = new_status
            .predecessors()
            .into_iter()
            .map(OrderStatus::as_str)
            .collect();

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = $2, accrual = $3
            WHERE id = $1 AND status = ANY($4)
            "#,
        )
        .bind(order_id)
        .bind(new_status)
        .bind(accrual)
        .bind(&predecessors)
        .execute(&self.pool)
        .await?;

        let applied = result.rows_affected() > 0;
        if applied {
            info!(order_id = %order_id, status = new_status.as_str(), "订单状态已更新");
        }
        Ok(applied)
    }
}
