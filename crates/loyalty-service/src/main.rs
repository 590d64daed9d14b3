//! 积分账户服务入口
//!
//! 装配顺序：配置 -> 日志 -> 数据库（含迁移）-> 服务与状态
//! -> 对账 Worker -> HTTP 服务。关闭顺序相反：HTTP 先排空，
//! Worker 在当前迭代后停止，连接池最后关闭。

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, middleware};
use clap::Parser;
use loyalty_service::accrual::AccrualClient;
use loyalty_service::auth::{JwtConfig, JwtManager};
use loyalty_service::middleware::{auth_middleware, http_tracing};
use loyalty_service::repository::OrderRepository;
use loyalty_service::routes;
use loyalty_service::state::AppState;
use loyalty_service::worker::AccrualWorker;
use loyalty_shared::config::{AppConfig, Cli};
use loyalty_shared::database::Database;
use loyalty_shared::observability;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli)?;

    observability::init(&config.observability)?;

    info!("Starting loyalty-service on {}", config.run_address);

    // 签名密钥：生产环境必须通过环境变量注入，开发环境允许默认值
    if config.uses_dev_secret() {
        if config.is_production() {
            anyhow::bail!("AUTH_SECRET must be set in production environment");
        }
        warn!("Using default AUTH_SECRET - set AUTH_SECRET for production");
    }

    let db = Database::connect(&config.database).await?;
    db.run_migrations().await?;

    let jwt = JwtManager::new(JwtConfig {
        secret: config.auth.secret.clone(),
        expires_in_secs: config.auth.token_ttl_seconds,
        issuer: "loyalty-service".to_string(),
    });
    let state = AppState::new(db.pool().clone(), jwt);

    // 启动对账 Worker（每个进程恰好一个实例）
    let accrual_client = AccrualClient::new(
        &config.accrual.address,
        Duration::from_secs(config.accrual.request_timeout_seconds),
    )?;
    let worker = AccrualWorker::new(
        Arc::new(OrderRepository::new(db.pool().clone())),
        accrual_client,
        config.accrual.poll_interval_seconds,
        config.accrual.batch_size,
        config.accrual.db_timeout_seconds,
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker_handle = tokio::spawn(worker.run(shutdown_rx));
    info!(accrual = %config.accrual.address, "AccrualWorker started");

    let app = Router::new()
        .merge(routes::api_routes())
        // 认证中间件：验证 Bearer Token
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        // 请求追踪中间件
        .layer(middleware::from_fn(http_tracing))
        .with_state(state);

    let listener = TcpListener::bind(&config.run_address).await?;
    info!("Listening on {}", config.run_address);

    // 优雅关闭：收到 SIGTERM 或 Ctrl+C 时停止接收新连接并排空已有请求
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // HTTP 已排空；Worker 最多再跑完当前迭代
    let _ = shutdown_tx.send(true);
    let _ = worker_handle.await;
    db.close().await;

    info!("Server shutdown complete");

    Ok(())
}

/// 监听关闭信号
///
/// 收到 SIGTERM（容器编排停止）或 Ctrl+C（本地开发）后返回，
/// 触发 axum 的优雅关闭流程。
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("注册 Ctrl+C 处理器失败");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("注册 SIGTERM 处理器失败")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
