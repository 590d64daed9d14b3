//! 余额与提取集成测试
//!
//! 使用真实 PostgreSQL 测试余额计算与事务化提取协议。
//! 提取的余额校验发生在锁定用户行的事务内，并发提取不可能把余额打穿，
//! 这是无法用 mock 覆盖的部分，必须走集成测试。
//!
//! ## 运行方式
//!
//! ```bash
//! DATABASE_URI=postgres://... cargo test --test balance_flow_test -- --ignored
//! ```

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::PgPool;
use uuid::Uuid;

use loyalty_service::error::LoyaltyError;
use loyalty_service::models::OrderStatus;
use loyalty_service::repository::{
    OrderRepository, OrderRepositoryTrait, UserRepository, UserRepositoryTrait,
    WithdrawalRepository,
};
use loyalty_service::service::{BalanceService, luhn};

// ==================== 辅助函数 ====================

fn database_uri() -> String {
    std::env::var("DATABASE_URI").expect("DATABASE_URI must be set for integration tests")
}

async fn setup_pool() -> PgPool {
    let pool = PgPool::connect(&database_uri())
        .await
        .expect("数据库连接失败");
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("迁移失败");
    pool
}

async fn seed_user(pool: &PgPool) -> Uuid {
    let login = format!("it-user-{}", Uuid::new_v4().simple());
    UserRepository::new(pool.clone())
        .create(&login, "$2b$12$test-hash-placeholder")
        .await
        .expect("插入测试用户失败")
}

fn unique_order_number() -> String {
    let base: String = Uuid::new_v4()
        .as_u128()
        .to_string()
        .chars()
        .take(15)
        .collect();
    for d in 0..10 {
        let candidate = format!("{}{}", base, d);
        if luhn::is_valid(&candidate) {
            return candidate;
        }
    }
    unreachable!("one of ten check digits must satisfy the checksum")
}

/// 为用户落一笔 PROCESSED 订单，形成可提取余额
async fn seed_accrual(pool: &PgPool, user_id: Uuid, amount: Decimal) {
    let repo = OrderRepository::new(pool.clone());
    let order = repo
        .create(user_id, &unique_order_number())
        .await
        .expect("插入订单失败");
    assert!(
        repo.update_status(order.id, OrderStatus::Processed, Some(amount))
            .await
            .expect("更新订单失败")
    );
}

fn balance_service(pool: &PgPool) -> BalanceService<WithdrawalRepository> {
    BalanceService::new(Arc::new(WithdrawalRepository::new(pool.clone())))
}

// ==================== 测试 ====================

/// 提取流程：500 进账提取 100.50 后余额 399.50，流水一条
#[tokio::test]
#[ignore] // 需要数据库连接
async fn test_withdraw_flow() {
    let pool = setup_pool().await;
    let user_id = seed_user(&pool).await;
    seed_accrual(&pool, user_id, dec!(500.00)).await;

    let service = balance_service(&pool);
    let order = unique_order_number();

    service.withdraw(user_id, &order, dec!(100.50)).await.unwrap();

    let balance = service.get_balance(user_id).await.unwrap();
    assert_eq!(balance.current, dec!(399.50));
    assert_eq!(balance.withdrawn, dec!(100.50));

    let withdrawals = service.list_withdrawals(user_id).await.unwrap();
    assert_eq!(withdrawals.len(), 1);
    assert_eq!(withdrawals[0].order_number, order);
    assert_eq!(withdrawals[0].sum, dec!(100.50));
}

/// 余额不足：新用户任何提取都被拒
#[tokio::test]
#[ignore] // 需要数据库连接
async fn test_withdraw_with_no_funds_is_rejected() {
    let pool = setup_pool().await;
    let user_id = seed_user(&pool).await;
    let service = balance_service(&pool);

    let result = service
        .withdraw(user_id, &unique_order_number(), dec!(1))
        .await;
    assert!(matches!(result, Err(LoyaltyError::NotEnoughFunds)));
}

/// Luhn 不合法的提取订单号被拒且不落流水
#[tokio::test]
#[ignore] // 需要数据库连接
async fn test_withdraw_with_invalid_order_persists_nothing() {
    let pool = setup_pool().await;
    let user_id = seed_user(&pool).await;
    seed_accrual(&pool, user_id, dec!(500.00)).await;

    let service = balance_service(&pool);
    let result = service.withdraw(user_id, "123", dec!(1)).await;
    assert!(matches!(result, Err(LoyaltyError::InvalidOrderNumber)));

    assert!(service.list_withdrawals(user_id).await.unwrap().is_empty());
}

/// 同一 (user, order) 第二次提取被拒，对外仍是订单号无效语义
#[tokio::test]
#[ignore] // 需要数据库连接
async fn test_duplicate_withdrawal_is_rejected() {
    let pool = setup_pool().await;
    let user_id = seed_user(&pool).await;
    seed_accrual(&pool, user_id, dec!(500.00)).await;

    let service = balance_service(&pool);
    let order = unique_order_number();

    service.withdraw(user_id, &order, dec!(10)).await.unwrap();

    let result = service.withdraw(user_id, &order, dec!(10)).await;
    assert!(matches!(result, Err(LoyaltyError::DuplicateWithdrawal)));

    assert_eq!(service.list_withdrawals(user_id).await.unwrap().len(), 1);
}

/// 并发提取打不穿余额：两笔 80 同时提取 100 的余额，恰好一笔成功
#[tokio::test]
#[ignore] // 需要数据库连接
async fn test_concurrent_withdrawals_cannot_overdraw() {
    let pool = setup_pool().await;
    let user_id = seed_user(&pool).await;
    seed_accrual(&pool, user_id, dec!(100.00)).await;

    let service = Arc::new(balance_service(&pool));

    let s1 = service.clone();
    let s2 = service.clone();
    let (o1, o2) = (unique_order_number(), unique_order_number());
    let (r1, r2) = tokio::join!(
        tokio::spawn(async move { s1.withdraw(user_id, &o1, dec!(80)).await }),
        tokio::spawn(async move { s2.withdraw(user_id, &o2, dec!(80)).await }),
    );
    let results = [r1.unwrap(), r2.unwrap()];

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 1, "两笔并发提取只允许一笔成功");
    assert!(
        results
            .iter()
            .any(|r| matches!(r, Err(LoyaltyError::NotEnoughFunds))),
        "失败的一笔必须是余额不足"
    );

    // 任何提交点上 current >= 0
    let balance = service.get_balance(user_id).await.unwrap();
    assert_eq!(balance.current, dec!(20.00));
    assert!(balance.current >= Decimal::ZERO);
}

/// 恒等式：current + withdrawn = Σ accrual（PROCESSED 订单）
#[tokio::test]
#[ignore] // 需要数据库连接
async fn test_balance_identity_holds() {
    let pool = setup_pool().await;
    let user_id = seed_user(&pool).await;
    seed_accrual(&pool, user_id, dec!(300.00)).await;
    seed_accrual(&pool, user_id, dec!(200.00)).await;

    // 未完成订单不计入余额
    let order_repo = OrderRepository::new(pool.clone());
    order_repo
        .create(user_id, &unique_order_number())
        .await
        .unwrap();

    let service = balance_service(&pool);
    service
        .withdraw(user_id, &unique_order_number(), dec!(123.45))
        .await
        .unwrap();

    let balance = service.get_balance(user_id).await.unwrap();
    assert_eq!(balance.current + balance.withdrawn, dec!(500.00));
    assert_eq!(balance.withdrawn, dec!(123.45));
}
