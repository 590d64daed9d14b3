//! 订单服务
//!
//! 处理订单号上传的核心业务逻辑：
//! 1. 非空校验 -> 2. Luhn 结构校验 -> 3. 入库
//! -> 4. 冲突时按归属细分（本人重复上传幂等，他人占用报冲突）

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use super::luhn;
use crate::error::{LoyaltyError, Result};
use crate::models::Order;
use crate::repository::OrderRepositoryTrait;

/// 上传结果
///
/// 两种成功形态对应不同的 HTTP 状态码：首次受理 202，同一用户重复上传 200。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// 新订单已受理
    Accepted,
    /// 同一用户重复上传，幂等返回
    AlreadyUploaded,
}

/// 订单服务
pub struct OrdersService<R>
where
    R: OrderRepositoryTrait,
{
    orders: Arc<R>,
}

impl<R> OrdersService<R>
where
    R: OrderRepositoryTrait,
{
    pub fn new(orders: Arc<R>) -> Self {
        Self { orders }
    }

    /// 上传订单号
    #[instrument(skip(self))]
    pub async fn upload_order(&self, user_id: Uuid, number: &str) -> Result<UploadOutcome> {
        if number.is_empty() {
            return Err(LoyaltyError::InvalidInput("order number required".to_string()));
        }
        if !luhn::is_valid(number) {
            return Err(LoyaltyError::InvalidOrderNumber);
        }

        match self.orders.create(user_id, number).await {
            Ok(_) => Ok(UploadOutcome::Accepted),
            Err(LoyaltyError::OrderExists) => {
                // 冲突按归属细分：查出现有订单的所有者
                let existing = self.orders.find_by_number(number).await?;
                match existing {
                    Some(order) if order.user_id == user_id => {
                        info!(number = %number, "同一用户重复上传，幂等返回");
                        Ok(UploadOutcome::AlreadyUploaded)
                    }
                    Some(_) => Err(LoyaltyError::OrderOwnedByAnother),
                    // 插入报冲突但查不到：并发窗口内几乎不可能，按冲突处理
                    None => Err(LoyaltyError::OrderExists),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// 用户订单列表，按上传时间倒序
    pub async fn list_orders(&self, user_id: Uuid) -> Result<Vec<Order>> {
        self.orders.list_by_user(user_id).await
    }
}
