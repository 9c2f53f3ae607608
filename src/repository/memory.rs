//! In-memory store implementations
//! 供测试与本地开发使用；流转通过 DashMap 的条目写锁保证按记录原子

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::db::HealthStatus;
use crate::error::{AppError, Result};
use crate::models::attendance::AttendanceSession;
use crate::models::directory::{Department, Employee, Project};
use crate::models::leave::{LeaveDecision, LeaveRequest, LeaveStatus};
use crate::models::stats::DimensionFilter;
use crate::repository::{AttendanceStore, DirectoryStore, LeaveStore};

/// 内存请假单存储
#[derive(Default)]
pub struct InMemoryLeaveStore {
    rows: DashMap<Uuid, LeaveRequest>,
}

impl InMemoryLeaveStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(&self, mut rows: Vec<LeaveRequest>) -> Vec<LeaveRequest> {
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }
}

#[async_trait]
impl LeaveStore for InMemoryLeaveStore {
    async fn insert(&self, request: LeaveRequest) -> Result<LeaveRequest> {
        self.rows.insert(request.id, request.clone());
        Ok(request)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<LeaveRequest>> {
        Ok(self.rows.get(&id).map(|row| row.value().clone()))
    }

    async fn list_all(&self) -> Result<Vec<LeaveRequest>> {
        Ok(self.sorted(self.rows.iter().map(|row| row.value().clone()).collect()))
    }

    async fn list_for_employee(&self, employee_id: Uuid) -> Result<Vec<LeaveRequest>> {
        Ok(self.sorted(
            self.rows
                .iter()
                .filter(|row| row.employee_id == employee_id)
                .map(|row| row.value().clone())
                .collect(),
        ))
    }

    async fn list_pending(&self) -> Result<Vec<LeaveRequest>> {
        Ok(self.sorted(
            self.rows
                .iter()
                .filter(|row| row.status == LeaveStatus::Pending)
                .map(|row| row.value().clone())
                .collect(),
        ))
    }

    async fn list_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<LeaveRequest>> {
        Ok(self.sorted(
            self.rows
                .iter()
                .filter(|row| row.start_date <= end && row.end_date >= start)
                .map(|row| row.value().clone())
                .collect(),
        ))
    }

    async fn transition(&self, id: Uuid, decision: LeaveDecision) -> Result<LeaveRequest> {
        // get_mut 持有该记录所在分片的写锁，检查与写入不可分割
        match self.rows.get_mut(&id) {
            None => Err(AppError::not_found("leave request")),
            Some(mut row) => {
                if row.status != LeaveStatus::Pending {
                    return Err(AppError::invalid_state("leave request is not pending"));
                }
                row.status = decision.status;
                row.approver_id = decision.approver_id;
                row.decision_note = decision.decision_note;
                row.updated_at = Utc::now();
                Ok(row.value().clone())
            }
        }
    }

    async fn health_check(&self) -> HealthStatus {
        HealthStatus::Healthy
    }
}

/// 内存考勤存储
#[derive(Default)]
pub struct InMemoryAttendanceStore {
    rows: DashMap<Uuid, AttendanceSession>,
}

impl InMemoryAttendanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, session: AttendanceSession) {
        self.rows.insert(session.id, session);
    }
}

#[async_trait]
impl AttendanceStore for InMemoryAttendanceStore {
    async fn find_for_day(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<AttendanceSession>> {
        Ok(self
            .rows
            .iter()
            .find(|row| row.employee_id == employee_id && row.date == date)
            .map(|row| row.value().clone()))
    }

    async fn list_for_employee(
        &self,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceSession>> {
        let mut rows: Vec<AttendanceSession> = self
            .rows
            .iter()
            .filter(|row| row.employee_id == employee_id && row.date >= start && row.date <= end)
            .map(|row| row.value().clone())
            .collect();
        rows.sort_by_key(|row| row.date);
        Ok(rows)
    }

    async fn list_sessions(
        &self,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<AttendanceSession>> {
        let mut rows: Vec<AttendanceSession> = self
            .rows
            .iter()
            .filter(|row| match range {
                Some((start, end)) => row.date >= start && row.date <= end,
                None => true,
            })
            .map(|row| row.value().clone())
            .collect();
        rows.sort_by_key(|row| row.date);
        Ok(rows)
    }
}

/// 内存目录
#[derive(Default)]
pub struct InMemoryDirectoryStore {
    departments: DashMap<Uuid, Department>,
    projects: DashMap<Uuid, Project>,
    employees: DashMap<Uuid, Employee>,
}

impl InMemoryDirectoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_department(&self, department: Department) {
        self.departments.insert(department.id, department);
    }

    pub fn add_project(&self, project: Project) {
        self.projects.insert(project.id, project);
    }

    pub fn add_employee(&self, employee: Employee) {
        self.employees.insert(employee.id, employee);
    }
}

#[async_trait]
impl DirectoryStore for InMemoryDirectoryStore {
    async fn department_exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.departments.contains_key(&id))
    }

    async fn project_exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.projects.contains_key(&id))
    }

    async fn employee_scope(
        &self,
        department: DimensionFilter,
        project: DimensionFilter,
    ) -> Result<Option<HashSet<Uuid>>> {
        if department == DimensionFilter::All && project == DimensionFilter::All {
            return Ok(None);
        }

        let ids = self
            .employees
            .iter()
            .filter(|employee| match department {
                DimensionFilter::Id(id) => employee.department_id == id,
                DimensionFilter::All => true,
            })
            .filter(|employee| match project {
                DimensionFilter::Id(id) => employee.project_id == Some(id),
                DimensionFilter::All => true,
            })
            .map(|employee| employee.id)
            .collect();

        Ok(Some(ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::models::leave::LeaveType;

    fn pending_request(employee_id: Uuid) -> LeaveRequest {
        LeaveRequest {
            id: Uuid::new_v4(),
            employee_id,
            leave_type: LeaveType::Annual,
            start_date: NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 8, 12).unwrap(),
            reason: "attending a family wedding".to_string(),
            status: LeaveStatus::Pending,
            approver_id: None,
            decision_note: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_transition_cas_rejects_second_decision() {
        let store = InMemoryLeaveStore::new();
        let request = pending_request(Uuid::new_v4());
        store.insert(request.clone()).await.unwrap();

        let approver = Uuid::new_v4();
        let decision = LeaveDecision {
            status: LeaveStatus::Approved,
            approver_id: Some(approver),
            decision_note: None,
        };

        let approved = store.transition(request.id, decision.clone()).await.unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);
        assert_eq!(approved.approver_id, Some(approver));

        let second = store.transition(request.id, decision).await;
        assert!(matches!(second, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_transition_unknown_id_is_not_found() {
        let store = InMemoryLeaveStore::new();
        let decision = LeaveDecision {
            status: LeaveStatus::Cancelled,
            approver_id: None,
            decision_note: None,
        };
        let result = store.transition(Uuid::new_v4(), decision).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_employee_scope_unfiltered_is_none() {
        let directory = InMemoryDirectoryStore::new();
        let scope = directory
            .employee_scope(DimensionFilter::All, DimensionFilter::All)
            .await
            .unwrap();
        assert!(scope.is_none());
    }
}
