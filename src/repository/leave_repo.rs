//! Leave request store
//! 状态流转必须是按记录的 CAS：UPDATE 带上期望状态，未命中即失败

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{self, HealthStatus};
use crate::error::{AppError, Result};
use crate::models::leave::{LeaveDecision, LeaveRequest};

/// 请假单存储接口
///
/// PostgreSQL 实现用于生产，内存实现用于测试与本地开发。
#[async_trait]
pub trait LeaveStore: Send + Sync {
    /// 写入新建的请假单
    async fn insert(&self, request: LeaveRequest) -> Result<LeaveRequest>;

    /// 按 ID 查询
    async fn find_by_id(&self, id: Uuid) -> Result<Option<LeaveRequest>>;

    /// 全量快照（聚合用）
    async fn list_all(&self) -> Result<Vec<LeaveRequest>>;

    /// 某员工的全部请假单
    async fn list_for_employee(&self, employee_id: Uuid) -> Result<Vec<LeaveRequest>>;

    /// 全部待审批请假单
    async fn list_pending(&self) -> Result<Vec<LeaveRequest>>;

    /// 与给定日期区间有交集的请假单
    async fn list_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<LeaveRequest>>;

    /// 从 Pending 出发的原子流转
    ///
    /// 记录不存在返回 NotFound；已离开 Pending 返回 InvalidState，
    /// 且不产生任何写入。并发调用同一 ID 时恰有一个成功。
    async fn transition(&self, id: Uuid, decision: LeaveDecision) -> Result<LeaveRequest>;

    /// 存储健康检查（就绪探针用）
    async fn health_check(&self) -> HealthStatus;
}

/// PostgreSQL 实现
pub struct PgLeaveStore {
    db: PgPool,
}

impl PgLeaveStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LeaveStore for PgLeaveStore {
    async fn insert(&self, request: LeaveRequest) -> Result<LeaveRequest> {
        let row = sqlx::query_as::<_, LeaveRequest>(
            r#"
            INSERT INTO leave_requests (
                id, employee_id, leave_type, start_date, end_date, reason,
                status, approver_id, decision_note, created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6,
                $7, $8, $9, $10, $11
            ) RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(request.employee_id)
        .bind(request.leave_type)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(&request.reason)
        .bind(request.status)
        .bind(request.approver_id)
        .bind(&request.decision_note)
        .bind(request.created_at)
        .bind(request.updated_at)
        .fetch_one(&self.db)
        .await?;

        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<LeaveRequest>> {
        let row = sqlx::query_as::<_, LeaveRequest>("SELECT * FROM leave_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(row)
    }

    async fn list_all(&self) -> Result<Vec<LeaveRequest>> {
        let rows = sqlx::query_as::<_, LeaveRequest>(
            "SELECT * FROM leave_requests ORDER BY created_at DESC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn list_for_employee(&self, employee_id: Uuid) -> Result<Vec<LeaveRequest>> {
        let rows = sqlx::query_as::<_, LeaveRequest>(
            "SELECT * FROM leave_requests WHERE employee_id = $1 ORDER BY created_at DESC",
        )
        .bind(employee_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn list_pending(&self) -> Result<Vec<LeaveRequest>> {
        let rows = sqlx::query_as::<_, LeaveRequest>(
            "SELECT * FROM leave_requests WHERE status = 'pending' ORDER BY created_at ASC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn list_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<LeaveRequest>> {
        // 区间相交：start_date <= $end 且 end_date >= $start
        let rows = sqlx::query_as::<_, LeaveRequest>(
            r#"
            SELECT * FROM leave_requests
            WHERE start_date <= $2 AND end_date >= $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn transition(&self, id: Uuid, decision: LeaveDecision) -> Result<LeaveRequest> {
        let updated = sqlx::query_as::<_, LeaveRequest>(
            r#"
            UPDATE leave_requests
            SET status = $2, approver_id = $3, decision_note = $4, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(decision.status)
        .bind(decision.approver_id)
        .bind(&decision.decision_note)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, leave_request_id = %id, "Failed to transition leave request");
            AppError::Database(e)
        })?;

        match updated {
            Some(row) => Ok(row),
            // CAS 未命中：区分记录不存在与状态已流转
            None => match self.find_by_id(id).await? {
                Some(_) => Err(AppError::invalid_state("leave request is not pending")),
                None => Err(AppError::not_found("leave request")),
            },
        }
    }

    async fn health_check(&self) -> HealthStatus {
        db::health_check(&self.db).await
    }
}
