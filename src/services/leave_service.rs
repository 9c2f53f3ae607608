//! Leave request lifecycle engine
//! 状态机：Pending -> Approved | Rejected | Cancelled（均为终态）

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::access::{AccessControl, Action, Resource};
use crate::auth::AuthContext;
use crate::error::{collect_field_violations, AppError, FieldViolation, Result};
use crate::models::leave::{
    CreateLeaveRequest, LeaveDecision, LeaveRequest, LeaveStatus,
};
use crate::repository::LeaveStore;

/// 请假生命周期服务
pub struct LeaveService {
    store: Arc<dyn LeaveStore>,
    access: Arc<AccessControl>,
    /// 流转底层存储调用的超时上限，超时以 Transient 返回
    transition_timeout: Duration,
}

impl LeaveService {
    pub fn new(
        store: Arc<dyn LeaveStore>,
        access: Arc<AccessControl>,
        transition_timeout: Duration,
    ) -> Self {
        Self {
            store,
            access,
            transition_timeout,
        }
    }

    /// 提交请假单
    ///
    /// 任何已认证员工都可以为自己提交，不经过权限表。
    /// 校验失败返回带字段信息的 Validation 错误。
    #[instrument(skip(self, request))]
    pub async fn submit(
        &self,
        employee_id: Uuid,
        request: CreateLeaveRequest,
    ) -> Result<LeaveRequest> {
        let mut violations = request
            .validate()
            .err()
            .map(|errors| collect_field_violations(&errors))
            .unwrap_or_default();

        if request.end_date < request.start_date {
            violations.push(FieldViolation {
                field: "endDate".to_string(),
                message: "endDate must be on or after startDate".to_string(),
            });
        }

        if !violations.is_empty() {
            return Err(AppError::Validation(violations));
        }

        let now = Utc::now();
        let row = LeaveRequest {
            id: Uuid::new_v4(),
            employee_id,
            leave_type: request.leave_type,
            start_date: request.start_date,
            end_date: request.end_date,
            reason: request.reason,
            status: LeaveStatus::Pending,
            approver_id: None,
            decision_note: None,
            created_at: now,
            updated_at: now,
        };

        let created = self.store.insert(row).await?;

        info!(
            leave_request_id = %created.id,
            employee_id = %employee_id,
            leave_type = ?created.leave_type,
            "Leave request submitted"
        );

        Ok(created)
    }

    /// 批准请假单
    #[instrument(skip(self, ctx, note))]
    pub async fn approve(
        &self,
        id: Uuid,
        ctx: &AuthContext,
        note: Option<String>,
    ) -> Result<LeaveRequest> {
        self.require(ctx, Action::Approve)?;

        let updated = self
            .decide(
                id,
                LeaveDecision {
                    status: LeaveStatus::Approved,
                    approver_id: Some(ctx.employee_id),
                    decision_note: note,
                },
            )
            .await?;

        info!(leave_request_id = %id, approver_id = %ctx.employee_id, "Leave request approved");
        Ok(updated)
    }

    /// 拒绝请假单
    #[instrument(skip(self, ctx, note))]
    pub async fn reject(
        &self,
        id: Uuid,
        ctx: &AuthContext,
        note: Option<String>,
    ) -> Result<LeaveRequest> {
        self.require(ctx, Action::Reject)?;

        let updated = self
            .decide(
                id,
                LeaveDecision {
                    status: LeaveStatus::Rejected,
                    approver_id: Some(ctx.employee_id),
                    decision_note: note,
                },
            )
            .await?;

        info!(leave_request_id = %id, approver_id = %ctx.employee_id, "Leave request rejected");
        Ok(updated)
    }

    /// 取消请假单
    ///
    /// 属主可以取消自己的待审批单；跨属主取消需要权限表中的
    /// Cancel 授权（提升取消）。已批准的单不能在这里取消，
    /// 需要走单独的补偿流程。
    #[instrument(skip(self, ctx))]
    pub async fn cancel(&self, id: Uuid, ctx: &AuthContext) -> Result<LeaveRequest> {
        let request = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("leave request"))?;

        let is_owner = request.employee_id == ctx.employee_id;
        if !is_owner && !self.access.permitted(ctx.role, Resource::LeaveRequest, Action::Cancel) {
            warn!(
                leave_request_id = %id,
                employee_id = %ctx.employee_id,
                role = %ctx.role,
                "Cancellation denied"
            );
            return Err(AppError::Forbidden);
        }

        let updated = self
            .decide(
                id,
                LeaveDecision {
                    status: LeaveStatus::Cancelled,
                    approver_id: None,
                    decision_note: None,
                },
            )
            .await?;

        info!(leave_request_id = %id, cancelled_by = %ctx.employee_id, "Leave request cancelled");
        Ok(updated)
    }

    /// 按 ID 查询
    pub async fn get(&self, id: Uuid) -> Result<LeaveRequest> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("leave request"))
    }

    /// 某员工的全部请假单（读范围由门面把关）
    pub async fn list_for_employee(&self, employee_id: Uuid) -> Result<Vec<LeaveRequest>> {
        self.store.list_for_employee(employee_id).await
    }

    /// 全部待审批请假单
    pub async fn list_pending(&self) -> Result<Vec<LeaveRequest>> {
        self.store.list_pending().await
    }

    /// 与日期区间有交集的请假单
    pub async fn list_in_range(
        &self,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> Result<Vec<LeaveRequest>> {
        self.store.list_in_range(start, end).await
    }

    /// 全量快照
    pub async fn list_all(&self) -> Result<Vec<LeaveRequest>> {
        self.store.list_all().await
    }

    fn require(&self, ctx: &AuthContext, action: Action) -> Result<()> {
        if !self.access.permitted(ctx.role, Resource::LeaveRequest, action) {
            warn!(
                employee_id = %ctx.employee_id,
                role = %ctx.role,
                action = ?action,
                "Permission denied"
            );
            return Err(AppError::Forbidden);
        }
        Ok(())
    }

    /// 带超时的 CAS 流转；超时对调用方表现为可重试的瞬时错误
    async fn decide(&self, id: Uuid, decision: LeaveDecision) -> Result<LeaveRequest> {
        match tokio::time::timeout(self.transition_timeout, self.store.transition(id, decision))
            .await
        {
            Ok(result) => result,
            Err(_) => {
                warn!(leave_request_id = %id, "Leave store transition timed out");
                Err(AppError::transient("leave store transition timed out"))
            }
        }
    }
}
