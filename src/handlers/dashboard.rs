//! Dashboard handlers
//! 仪表盘统计相关 API 处理器

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::AuthContext,
    error::Result,
    middleware::AppState,
    models::stats::{StatsFilter, StatsQuery},
};

/// 管理端统计
pub async fn admin_stats(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Query(query): Query<StatsQuery>,
) -> Result<impl IntoResponse> {
    let filter = StatsFilter::parse(&query)?;
    let stats = state.dashboard_service.admin_stats(&ctx, filter).await?;
    Ok(Json(stats))
}

/// 员工端统计（固定为调用方本人）
pub async fn employee_stats(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
) -> Result<impl IntoResponse> {
    let stats = state.dashboard_service.employee_stats(&ctx).await?;
    Ok(Json(stats))
}

/// 近七日工时查询参数
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyHoursQuery {
    pub employee_id: Option<Uuid>,
    pub end_date: Option<NaiveDate>,
}

/// 近七日工时序列
pub async fn weekly_hours(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Query(query): Query<WeeklyHoursQuery>,
) -> Result<impl IntoResponse> {
    let series = state
        .dashboard_service
        .weekly_hours(&ctx, query.employee_id, query.end_date)
        .await?;
    Ok(Json(series))
}
