//! 对账 Worker
//!
//! 进程内唯一的后台任务，驱动订单沿状态机前进：
//! 1. 按上传时间先进先出拉取一批待处理订单（NEW/PROCESSING）
//! 2. 逐单查询上游积分计算服务
//! 3. 应用状态迁移：REGISTERED 不动，PROCESSING/INVALID/PROCESSED 落库
//!
//! 故障隔离：单个订单的瞬时故障或未登记只跳过该单；
//! 上游限流放弃整批并退避，下个周期从 FIFO 队头恢复。
//! 数据库批量拉取失败只记录日志并跳过本周期，循环继续。
//! 终态订单不会出现在批次里，状态机的单调性由此与仓储层条件
//! UPDATE 共同保证。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::accrual::{AccrualClient, AccrualError, AccrualOrder, AccrualStatus};
use crate::models::{Order, OrderStatus};
use crate::repository::OrderRepositoryTrait;

/// 对账 Worker
///
/// 以固定间隔轮询数据库。设计假定每个数据库同时只有一个活动实例。
pub struct AccrualWorker<R>
where
    R: OrderRepositoryTrait,
{
    orders: Arc<R>,
    client: AccrualClient,
    /// 轮询间隔
    poll_interval: Duration,
    /// 每批拉取的最大订单数
    batch_size: i64,
    /// 单次数据库调用超时
    db_timeout: Duration,
}

impl<R> AccrualWorker<R>
where
    R: OrderRepositoryTrait,
{
    pub fn new(
        orders: Arc<R>,
        client: AccrualClient,
        poll_interval_secs: u64,
        batch_size: i64,
        db_timeout_secs: u64,
    ) -> Self {
        Self {
            orders,
            client,
            poll_interval: Duration::from_secs(poll_interval_secs),
            batch_size,
            db_timeout: Duration::from_secs(db_timeout_secs),
        }
    }

    /// 主循环：持续对账直到收到 shutdown 信号
    ///
    /// 收到信号后最多再经过一个周期即退出。
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            poll_interval = ?self.poll_interval,
            batch_size = self.batch_size,
            "对账 Worker 已启动"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let backoff = self.tick().await;

            // 限流退避只会加长等待，不会缩短周期
            let delay = match backoff {
                Some(d) if d > self.poll_interval => d,
                _ => self.poll_interval,
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("对账 Worker 已退出");
    }

    /// 单个周期：拉批、逐单查询上游、应用迁移
    ///
    /// 返回上游要求的额外退避时长（仅限流时出现）。
    async fn tick(&self) -> Option<Duration> {
        let batch = match tokio::time::timeout(
            self.db_timeout,
            self.orders.pending_batch(self.batch_size),
        )
        .await
        {
            Ok(Ok(batch)) => batch,
            Ok(Err(e)) => {
                error!(error = %e, "拉取待处理订单失败");
                return None;
            }
            Err(_) => {
                error!("拉取待处理订单超时");
                return None;
            }
        };

        for order in batch {
            match self.client.get_order(&order.number).await {
                Ok(upstream) => self.apply(&order, upstream).await,
                Err(AccrualError::RateLimited { retry_after }) => {
                    warn!(order = %order.number, ?retry_after, "上游限流，放弃本批次");
                    return retry_after;
                }
                Err(AccrualError::OrderUnknown) => {
                    debug!(order = %order.number, "上游尚未登记，跳过");
                }
                Err(AccrualError::TransientUpstream(e)) => {
                    warn!(order = %order.number, error = %e, "上游瞬时故障，跳过");
                }
            }
        }

        None
    }

    /// 将上游应答映射为状态迁移并落库
    async fn apply(&self, order: &Order, upstream: AccrualOrder) {
        let (new_status, accrual) = match upstream.status {
            // 尚无变化，保持 NEW
            AccrualStatus::Registered => return,
            AccrualStatus::Processing => (OrderStatus::Processing, None),
            AccrualStatus::Invalid => (OrderStatus::Invalid, None),
            AccrualStatus::Processed => (OrderStatus::Processed, Some(upstream.accrual)),
        };

        match tokio::time::timeout(
            self.db_timeout,
            self.orders.update_status(order.id, new_status, accrual),
        )
        .await
        {
            Ok(Ok(_applied)) => {}
            Ok(Err(e)) => error!(order = %order.number, error = %e, "更新订单状态失败"),
            Err(_) => error!(order = %order.number, "更新订单状态超时"),
        }
    }
}
