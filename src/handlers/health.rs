//! 健康检查处理器
//! 提供 /health、/ready 和 /metrics 端点

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{db::HealthStatus, middleware::AppState};

/// 存活探针响应
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// 就绪探针响应
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: Vec<HealthCheck>,
}

/// 健康检查项
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// 指标快照响应
#[derive(Serialize)]
pub struct MetricsResponse {
    pub process_uptime_secs: u64,
    pub store_status: String,
}

/// 应用启动时间（在 main.rs 中设置）
static APP_START_TIME: OnceLock<u64> = OnceLock::new();

fn now_epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// 设置应用启动时间
pub fn set_start_time() {
    let _ = APP_START_TIME.set(now_epoch_secs());
}

/// 获取应用运行时间（秒）
pub fn get_uptime() -> u64 {
    APP_START_TIME
        .get()
        .map_or(0, |start| now_epoch_secs().saturating_sub(*start))
}

/// 存活探针
/// 快速响应，不检查依赖
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: get_uptime(),
    })
}

/// 就绪探针
/// 检查底层存储等依赖
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> Json<ReadinessResponse> {
    let mut checks = Vec::new();

    let store_health = state.leave_store.health_check().await;
    checks.push(HealthCheck {
        name: "leave_store".to_string(),
        status: match &store_health {
            HealthStatus::Healthy => "healthy".to_string(),
            HealthStatus::Unhealthy(_) => "unhealthy".to_string(),
        },
        message: match store_health {
            HealthStatus::Healthy => None,
            HealthStatus::Unhealthy(msg) => Some(msg),
        },
    });

    let all_healthy = checks.iter().all(|c| c.status == "healthy");

    Json(ReadinessResponse {
        ready: all_healthy,
        checks,
    })
}

/// 指标快照
pub async fn metrics_snapshot(State(state): State<Arc<AppState>>) -> Json<MetricsResponse> {
    let store_status = match state.leave_store.health_check().await {
        HealthStatus::Healthy => "healthy".to_string(),
        HealthStatus::Unhealthy(_) => "unhealthy".to_string(),
    };

    Json(MetricsResponse {
        process_uptime_secs: get_uptime(),
        store_status,
    })
}
