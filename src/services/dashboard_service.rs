//! Dashboard query facade
//! 在边界上统一执行读范围控制，组合引擎读取与统计聚合。
//! 统计结果按次重算，从不缓存。

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::access::{AccessControl, Action, Resource, Role};
use crate::auth::AuthContext;
use crate::error::{AppError, Result};
use crate::models::leave::{LeaveListQuery, LeaveRequest, LeaveStatus};
use crate::models::stats::{
    AdminStatsResponse, DimensionFilter, EmployeeStatsResponse, SessionStatus, StatsFilter,
    TodaySession, WeeklyHoursPoint,
};
use crate::repository::{AttendanceStore, DirectoryStore};
use crate::services::stats;
use crate::services::LeaveService;

/// 仪表盘查询门面
pub struct DashboardService {
    leave_service: Arc<LeaveService>,
    attendance_store: Arc<dyn AttendanceStore>,
    directory: Arc<dyn DirectoryStore>,
    access: Arc<AccessControl>,
}

impl DashboardService {
    pub fn new(
        leave_service: Arc<LeaveService>,
        attendance_store: Arc<dyn AttendanceStore>,
        directory: Arc<dyn DirectoryStore>,
        access: Arc<AccessControl>,
    ) -> Self {
        Self {
            leave_service,
            attendance_store,
            directory,
            access,
        }
    }

    /// 管理端统计：任意部门/项目/日期过滤
    ///
    /// 考勤工时是尽力而为的增强：考勤源不可用时该指标为 null，
    /// 不会使整个统计响应失败。
    #[instrument(skip(self, ctx))]
    pub async fn admin_stats(
        &self,
        ctx: &AuthContext,
        filter: StatsFilter,
    ) -> Result<AdminStatsResponse> {
        Self::ensure_admin(ctx)?;
        self.require(ctx, Resource::LeaveRequest, Action::Read)?;

        // "all" 哨兵值跳过目录查表，其余 ID 必须存在
        if let DimensionFilter::Id(id) = filter.department {
            if !self.directory.department_exists(id).await? {
                return Err(AppError::validation("departmentId", "unknown department"));
            }
        }
        if let DimensionFilter::Id(id) = filter.project {
            if !self.directory.project_exists(id).await? {
                return Err(AppError::validation("projectId", "unknown project"));
            }
        }

        let scope = self
            .directory
            .employee_scope(filter.department, filter.project)
            .await?;

        let requests = match filter.range {
            Some((start, end)) => self.leave_service.list_in_range(start, end).await?,
            None => self.leave_service.list_all().await?,
        };

        let today = Utc::now().date_naive();
        let counts = stats::leave_counts(&requests, scope.as_ref(), filter.range, today);

        let total_hours = match self.attendance_store.list_sessions(filter.range).await {
            Ok(sessions) => Some(stats::total_hours(&sessions, scope.as_ref())),
            Err(e) => {
                warn!(error = %e, "Attendance source unavailable, omitting hour totals");
                None
            }
        };

        Ok(AdminStatsResponse {
            on_leave: counts.on_leave,
            approved: counts.approved,
            pending: counts.pending,
            rejected: counts.rejected,
            total_hours,
            total_hours_label: total_hours.map(stats::format_work_hours),
        })
    }

    /// 员工端统计：固定只看调用方本人
    #[instrument(skip(self, ctx))]
    pub async fn employee_stats(&self, ctx: &AuthContext) -> Result<EmployeeStatsResponse> {
        self.require(ctx, Resource::LeaveRequest, Action::Read)?;
        self.require(ctx, Resource::Session, Action::Read)?;

        let today = Utc::now().date_naive();

        let (requests, session) = futures::join!(
            self.leave_service.list_for_employee(ctx.employee_id),
            self.attendance_store.find_for_day(ctx.employee_id, today)
        );

        let requests = requests?;
        // 考勤源故障只影响打卡字段，不阻塞请假计数
        let session = session.unwrap_or_else(|e| {
            warn!(error = %e, "Attendance source unavailable, omitting today session");
            None
        });

        let leaves_approved = requests
            .iter()
            .filter(|request| request.status == LeaveStatus::Approved)
            .count() as i64;
        let leaves_pending = requests
            .iter()
            .filter(|request| request.status == LeaveStatus::Pending)
            .count() as i64;

        let (check_in, check_out) = match &session {
            Some(session) => (session.check_in, session.check_out),
            None => (None, None),
        };

        let status = match (check_in, check_out) {
            (None, _) => SessionStatus::NotStarted,
            (Some(_), None) => SessionStatus::Working,
            (Some(_), Some(_)) => SessionStatus::Finished,
        };

        Ok(EmployeeStatsResponse {
            check_in_time: check_in,
            check_out_time: check_out,
            leaves_approved,
            leaves_pending,
            today_session: TodaySession {
                status,
                start_time: check_in,
                end_time: check_out,
            },
        })
    }

    /// 近七日工时序列
    ///
    /// 员工只能查自己；管理员可以查任何人。
    #[instrument(skip(self, ctx))]
    pub async fn weekly_hours(
        &self,
        ctx: &AuthContext,
        employee_id: Option<Uuid>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<WeeklyHoursPoint>> {
        self.require(ctx, Resource::Session, Action::Read)?;

        let target = employee_id.unwrap_or(ctx.employee_id);
        Self::ensure_self_or_admin(ctx, target)?;

        let end = end_date.unwrap_or_else(|| Utc::now().date_naive());
        let start = end - Duration::days(6);

        let sessions = self
            .attendance_store
            .list_for_employee(target, start, end)
            .await?;

        Ok(stats::weekly_hours(&sessions, end))
    }

    /// 请假单详情
    ///
    /// 员工只能读自己的单；管理员不受限。
    #[instrument(skip(self, ctx))]
    pub async fn get_request(&self, ctx: &AuthContext, id: Uuid) -> Result<LeaveRequest> {
        self.require(ctx, Resource::LeaveRequest, Action::Read)?;

        let request = self.leave_service.get(id).await?;

        Self::ensure_self_or_admin(ctx, request.employee_id)?;

        Ok(request)
    }

    /// 请假单列表
    ///
    /// 员工固定限定为本人；指名别人直接拒绝。
    /// 管理员可以按员工/状态任意过滤。
    #[instrument(skip(self, ctx))]
    pub async fn list_requests(
        &self,
        ctx: &AuthContext,
        query: LeaveListQuery,
    ) -> Result<Vec<LeaveRequest>> {
        self.require(ctx, Resource::LeaveRequest, Action::Read)?;

        let rows = match ctx.role {
            Role::Employee => {
                if let Some(requested) = query.employee_id {
                    if requested != ctx.employee_id {
                        warn!(
                            employee_id = %ctx.employee_id,
                            requested = %requested,
                            "Cross-employee list denied"
                        );
                        return Err(AppError::Forbidden);
                    }
                }
                self.leave_service.list_for_employee(ctx.employee_id).await?
            }
            Role::Admin => match query.employee_id {
                Some(employee_id) => self.leave_service.list_for_employee(employee_id).await?,
                None if query.status == Some(LeaveStatus::Pending) => {
                    return self.leave_service.list_pending().await;
                }
                None => self.leave_service.list_all().await?,
            },
        };

        Ok(match query.status {
            Some(status) => rows.into_iter().filter(|row| row.status == status).collect(),
            None => rows,
        })
    }

    fn require(&self, ctx: &AuthContext, resource: Resource, action: Action) -> Result<()> {
        if !self.access.permitted(ctx.role, resource, action) {
            warn!(
                employee_id = %ctx.employee_id,
                role = %ctx.role,
                resource = ?resource,
                action = ?action,
                "Permission denied"
            );
            return Err(AppError::Forbidden);
        }
        Ok(())
    }

    fn ensure_admin(ctx: &AuthContext) -> Result<()> {
        if ctx.role != Role::Admin {
            warn!(employee_id = %ctx.employee_id, role = %ctx.role, "Admin scope required");
            return Err(AppError::Forbidden);
        }
        Ok(())
    }

    fn ensure_self_or_admin(ctx: &AuthContext, target: Uuid) -> Result<()> {
        if target != ctx.employee_id {
            return Self::ensure_admin(ctx);
        }
        Ok(())
    }
}
