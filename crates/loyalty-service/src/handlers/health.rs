//! 健康检查处理器

use axum::Json;

/// 存活探针：服务进程正常即返回 OK
///
/// GET /health
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "OK" }))
}
