//! Leave request handlers
//! 请假单相关 API 处理器

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::AuthContext,
    error::Result,
    middleware::AppState,
    models::leave::{CreateLeaveRequest, LeaveAction, LeaveListQuery, TransitionLeaveRequest},
};

/// 创建请假单
pub async fn create_leave_request(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Json(request): Json<CreateLeaveRequest>,
) -> Result<impl IntoResponse> {
    let created = state.leave_service.submit(ctx.employee_id, request).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// 流转请假单（批准/拒绝/取消）
pub async fn transition_leave_request(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<TransitionLeaveRequest>,
) -> Result<impl IntoResponse> {
    let updated = match request.action {
        LeaveAction::Approve => state.leave_service.approve(id, &ctx, request.reason).await?,
        LeaveAction::Reject => state.leave_service.reject(id, &ctx, request.reason).await?,
        LeaveAction::Cancel => state.leave_service.cancel(id, &ctx).await?,
    };

    Ok(Json(updated))
}

/// 获取请假单详情（读范围由门面把关）
pub async fn get_leave_request(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let request = state.dashboard_service.get_request(&ctx, id).await?;
    Ok(Json(request))
}

/// 查询请假单列表
pub async fn list_leave_requests(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Query(query): Query<LeaveListQuery>,
) -> Result<impl IntoResponse> {
    let requests = state.dashboard_service.list_requests(&ctx, query).await?;
    Ok(Json(requests))
}
