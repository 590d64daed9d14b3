//! 余额服务
//!
//! 余额读取与积分提取。提取的余额校验与写入在仓储层的单事务内完成，
//! 服务层负责入参校验与错误归一。

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::instrument;
use uuid::Uuid;

use super::luhn;
use crate::error::{LoyaltyError, Result};
use crate::models::Withdrawal;
use crate::repository::WithdrawalRepositoryTrait;

/// 用户余额快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balance {
    /// 可用余额 = 累积 - 已提取
    pub current: Decimal,
    /// 已提取总额
    pub withdrawn: Decimal,
}

/// 余额服务
pub struct BalanceService<W>
where
    W: WithdrawalRepositoryTrait,
{
    withdrawals: Arc<W>,
}

impl<W> BalanceService<W>
where
    W: WithdrawalRepositoryTrait,
{
    pub fn new(withdrawals: Arc<W>) -> Self {
        Self { withdrawals }
    }

    /// 读取余额：(累积, 已提取) 来自单条语句的同一快照
    pub async fn get_balance(&self, user_id: Uuid) -> Result<Balance> {
        let (accrued, withdrawn) = self.withdrawals.totals(user_id).await?;
        Ok(Balance {
            current: accrued - withdrawn,
            withdrawn,
        })
    }

    /// 提取积分
    ///
    /// 非正金额与 Luhn 不合法的订单号都归一为 `InvalidOrderNumber`（422）；
    /// 余额校验由仓储的事务化创建完成。
    #[instrument(skip(self))]
    pub async fn withdraw(&self, user_id: Uuid, order_number: &str, sum: Decimal) -> Result<()> {
        if sum <= Decimal::ZERO {
            return Err(LoyaltyError::InvalidOrderNumber);
        }
        if !luhn::is_valid(order_number) {
            return Err(LoyaltyError::InvalidOrderNumber);
        }

        self.withdrawals.create(user_id, order_number, sum).await?;
        Ok(())
    }

    /// 用户提取流水，按处理时间倒序
    pub async fn list_withdrawals(&self, user_id: Uuid) -> Result<Vec<Withdrawal>> {
        self.withdrawals.list_by_user(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::repository::traits::MockWithdrawalRepositoryTrait;

    #[tokio::test]
    async fn test_balance_is_accrued_minus_withdrawn() {
        let mut repo = MockWithdrawalRepositoryTrait::new();
        repo.expect_totals()
            .returning(|_| Ok((dec!(500.00), dec!(100.50))));

        let service = BalanceService::new(Arc::new(repo));
        let balance = service.get_balance(Uuid::new_v4()).await.unwrap();
        assert_eq!(balance.current, dec!(399.50));
        assert_eq!(balance.withdrawn, dec!(100.50));
    }

    #[tokio::test]
    async fn test_withdraw_rejects_non_positive_sum() {
        // 入参校验失败时不触达仓储
        let service = BalanceService::new(Arc::new(MockWithdrawalRepositoryTrait::new()));

        for sum in [Decimal::ZERO, dec!(-1)] {
            let result = service.withdraw(Uuid::new_v4(), "2377225624", sum).await;
            assert!(matches!(result, Err(LoyaltyError::InvalidOrderNumber)));
        }
    }

    #[tokio::test]
    async fn test_withdraw_rejects_luhn_invalid_order() {
        let service = BalanceService::new(Arc::new(MockWithdrawalRepositoryTrait::new()));

        let result = service.withdraw(Uuid::new_v4(), "123", dec!(1)).await;
        assert!(matches!(result, Err(LoyaltyError::InvalidOrderNumber)));
    }

    #[tokio::test]
    async fn test_withdraw_propagates_insufficient_funds() {
        let mut repo = MockWithdrawalRepositoryTrait::new();
        repo.expect_create()
            .returning(|_, _, _| Err(LoyaltyError::NotEnoughFunds));

        let service = BalanceService::new(Arc::new(repo));
        let result = service.withdraw(Uuid::new_v4(), "2377225624", dec!(1)).await;
        assert!(matches!(result, Err(LoyaltyError::NotEnoughFunds)));
    }
}
