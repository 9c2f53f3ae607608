//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};

use crate::{handlers, middleware::AppState};

/// 请求体大小上限（字节）
const BODY_LIMIT_BYTES: usize = 64 * 1024;

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（健康检查与指标）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/metrics", get(handlers::health::metrics_snapshot));

    // 需要身份头的路由
    let api_routes = Router::new()
        // 请假单
        .route(
            "/api/v1/leave-requests",
            get(handlers::leave::list_leave_requests)
                .post(handlers::leave::create_leave_request),
        )
        .route(
            "/api/v1/leave-requests/{id}",
            get(handlers::leave::get_leave_request)
                .patch(handlers::leave::transition_leave_request),
        )

        // 仪表盘统计
        .route(
            "/api/v1/dashboard/admin/stats",
            get(handlers::dashboard::admin_stats),
        )
        .route(
            "/api/v1/dashboard/employee/stats",
            get(handlers::dashboard::employee_stats),
        )
        .route(
            "/api/v1/dashboard/employee/weekly-hours",
            get(handlers::dashboard::weekly_hours),
        )
        .layer(axum::middleware::from_fn(
            crate::auth::middleware::identity_middleware,
        ));

    // 组合所有路由
    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
