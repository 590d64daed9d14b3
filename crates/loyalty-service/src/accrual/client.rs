//! 积分计算服务客户端
//!
//! 无状态 HTTP 客户端：`GET {base}/api/orders/{number}`。
//! 应答到结果的映射：200 解析记录；204 订单未登记；429 限流
//! （尽力解析 Retry-After）；其余状态码和传输/解析错误一律视为
//! 可重试的瞬时故障，由 Worker 在下个周期重试。

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use rust_decimal::Decimal;
use serde::Deserialize;

/// 上游应答中的订单状态
///
/// REGISTERED 对 Worker 等价于"尚无变化"，不触发任何状态更新。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccrualStatus {
    Registered,
    Processing,
    Invalid,
    Processed,
}

/// 上游订单记录
#[derive(Debug, Clone)]
pub struct AccrualOrder {
    pub order: String,
    pub status: AccrualStatus,
    /// 奖励积分，上游未给出时为零
    pub accrual: Decimal,
}

/// 客户端错误
#[derive(Debug, thiserror::Error)]
pub enum AccrualError {
    #[error("订单未在上游登记")]
    OrderUnknown,
    #[error("上游限流")]
    RateLimited { retry_after: Option<Duration> },
    #[error("上游暂时不可用: {0}")]
    TransientUpstream(String),
}

/// 应答体（上游的 accrual 字段既可能是数字也可能是字符串）
#[derive(Debug, Deserialize)]
struct AccrualOrderWire {
    order: String,
    status: AccrualStatus,
    #[serde(default)]
    accrual: Option<Decimal>,
}

/// 积分计算服务客户端
#[derive(Clone)]
pub struct AccrualClient {
    base_url: String,
    http: reqwest::Client,
}

impl AccrualClient {
    /// 创建客户端
    ///
    /// `timeout` 为单次请求超时，覆盖连接与读取全程。
    pub fn new(base_url: &str, timeout: Duration) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// 查询订单的积分计算结果
    pub async fn get_order(&self, number: &str) -> Result<AccrualOrder, AccrualError> {
        let url = format!("{}/api/orders/{}", self.base_url, number);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AccrualError::TransientUpstream(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let wire: AccrualOrderWire = response
                    .json()
                    .await
                    .map_err(|e| AccrualError::TransientUpstream(format!("解析应答失败: {}", e)))?;
                Ok(AccrualOrder {
                    order: wire.order,
                    status: wire.status,
                    accrual: wire.accrual.unwrap_or(Decimal::ZERO),
                })
            }
            StatusCode::NO_CONTENT => Err(AccrualError::OrderUnknown),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(Duration::from_secs);
                Err(AccrualError::RateLimited { retry_after })
            }
            other => Err(AccrualError::TransientUpstream(format!(
                "unexpected status {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use rust_decimal_macros::dec;

    use super::*;

    /// 在随机端口起一个上游桩服务，返回其基础 URL
    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base: &str) -> AccrualClient {
        AccrualClient::new(base, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_ok_with_string_accrual() {
        let router = Router::new().route(
            "/api/orders/{number}",
            get(|| async {
                axum::Json(serde_json::json!({
                    "order": "12345678903",
                    "status": "PROCESSED",
                    "accrual": "500.00"
                }))
            }),
        );
        let base = spawn_stub(router).await;

        let order = client(&base).get_order("12345678903").await.unwrap();
        assert_eq!(order.status, AccrualStatus::Processed);
        assert_eq!(order.accrual, dec!(500.00));
    }

    #[tokio::test]
    async fn test_ok_without_accrual_defaults_to_zero() {
        let router = Router::new().route(
            "/api/orders/{number}",
            get(|| async {
                axum::Json(serde_json::json!({
                    "order": "12345678903",
                    "status": "REGISTERED"
                }))
            }),
        );
        let base = spawn_stub(router).await;

        let order = client(&base).get_order("12345678903").await.unwrap();
        assert_eq!(order.status, AccrualStatus::Registered);
        assert_eq!(order.accrual, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_no_content_means_order_unknown() {
        let router = Router::new().route(
            "/api/orders/{number}",
            get(|| async { StatusCode::NO_CONTENT }),
        );
        let base = spawn_stub(router).await;

        let result = client(&base).get_order("12345678903").await;
        assert!(matches!(result, Err(AccrualError::OrderUnknown)));
    }

    #[tokio::test]
    async fn test_rate_limited_parses_retry_after() {
        let router = Router::new().route(
            "/api/orders/{number}",
            get(|| async {
                (StatusCode::TOO_MANY_REQUESTS, [("retry-after", "7")]).into_response()
            }),
        );
        let base = spawn_stub(router).await;

        let result = client(&base).get_order("12345678903").await;
        match result {
            Err(AccrualError::RateLimited { retry_after }) => {
                assert_eq!(retry_after, Some(Duration::from_secs(7)));
            }
            other => panic!("expected RateLimited, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_and_garbage_are_transient() {
        let router = Router::new()
            .route(
                "/api/orders/boom",
                get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
            )
            .route("/api/orders/garbage", get(|| async { "not json" }));
        let base = spawn_stub(router).await;

        let result = client(&base).get_order("boom").await;
        assert!(matches!(result, Err(AccrualError::TransientUpstream(_))));

        let result = client(&base).get_order("garbage").await;
        assert!(matches!(result, Err(AccrualError::TransientUpstream(_))));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transient() {
        // 显式关闭监听端口
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = client(&format!("http://{}", addr))
            .get_order("12345678903")
            .await;
        assert!(matches!(result, Err(AccrualError::TransientUpstream(_))));
    }
}
