//! Leave request domain models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// 请假类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "leave_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    Annual,
    Maternity,
    Casual,
    Sick,
    Personal,
    Unpaid,
}

/// 请假单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "leave_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    /// 待审批（初始态）
    Pending,
    /// 已批准（终态）
    Approved,
    /// 已拒绝（终态）
    Rejected,
    /// 已取消（终态）
    Cancelled,
}

impl LeaveStatus {
    /// 终态不允许再流转
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }
}

/// 请假单
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,

    pub status: LeaveStatus,
    pub approver_id: Option<Uuid>,   // 仅在批准/拒绝时填写
    pub decision_note: Option<String>, // 审批意见（可选）

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// 日期是否落在 [start, end] 区间内（两端均含）
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// 创建请假单请求
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeaveRequest {
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(length(min = 10, message = "reason must be at least 10 characters"))]
    pub reason: String,
}

/// 状态流转动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveAction {
    Approve,
    Reject,
    Cancel,
}

/// 状态流转请求
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionLeaveRequest {
    pub action: LeaveAction,
    #[serde(default)]
    pub reason: Option<String>,
}

/// 写入模型：从 Pending 出发的一次 CAS 流转
#[derive(Debug, Clone)]
pub struct LeaveDecision {
    pub status: LeaveStatus,
    pub approver_id: Option<Uuid>,
    pub decision_note: Option<String>,
}

/// 请假单列表查询过滤器
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveListQuery {
    pub employee_id: Option<Uuid>,
    pub status: Option<LeaveStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!LeaveStatus::Pending.is_terminal());
        assert!(LeaveStatus::Approved.is_terminal());
        assert!(LeaveStatus::Rejected.is_terminal());
        assert!(LeaveStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_leave_type_wire_format() {
        let parsed: LeaveType = serde_json::from_str("\"maternity\"").unwrap();
        assert_eq!(parsed, LeaveType::Maternity);
        assert_eq!(serde_json::to_string(&LeaveType::Unpaid).unwrap(), "\"unpaid\"");
    }

    #[test]
    fn test_unknown_leave_type_rejected_at_parse() {
        let result: std::result::Result<LeaveType, _> = serde_json::from_str("\"sabbatical\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_covers_is_inclusive_on_both_ends() {
        let request = LeaveRequest {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            leave_type: LeaveType::Annual,
            start_date: NaiveDate::from_ymd_opt(2026, 8, 3).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 8, 5).unwrap(),
            reason: "family matters out of town".to_string(),
            status: LeaveStatus::Approved,
            approver_id: None,
            decision_note: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(request.covers(NaiveDate::from_ymd_opt(2026, 8, 3).unwrap()));
        assert!(request.covers(NaiveDate::from_ymd_opt(2026, 8, 4).unwrap()));
        assert!(request.covers(NaiveDate::from_ymd_opt(2026, 8, 5).unwrap()));
        assert!(!request.covers(NaiveDate::from_ymd_opt(2026, 8, 2).unwrap()));
        assert!(!request.covers(NaiveDate::from_ymd_opt(2026, 8, 6).unwrap()));
    }
}
