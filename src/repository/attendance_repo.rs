//! Attendance session store (read-only source)

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::attendance::AttendanceSession;

/// 考勤记录只读接口
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// 某员工某天的考勤记录
    async fn find_for_day(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<AttendanceSession>>;

    /// 某员工一段日期内的考勤记录
    async fn list_for_employee(
        &self,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceSession>>;

    /// 全员考勤快照，可选日期区间
    async fn list_sessions(
        &self,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<AttendanceSession>>;
}

/// PostgreSQL 实现
pub struct PgAttendanceStore {
    db: PgPool,
}

impl PgAttendanceStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AttendanceStore for PgAttendanceStore {
    async fn find_for_day(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<AttendanceSession>> {
        let row = sqlx::query_as::<_, AttendanceSession>(
            "SELECT * FROM attendance_sessions WHERE employee_id = $1 AND date = $2",
        )
        .bind(employee_id)
        .bind(date)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    async fn list_for_employee(
        &self,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceSession>> {
        let rows = sqlx::query_as::<_, AttendanceSession>(
            r#"
            SELECT * FROM attendance_sessions
            WHERE employee_id = $1 AND date BETWEEN $2 AND $3
            ORDER BY date ASC
            "#,
        )
        .bind(employee_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn list_sessions(
        &self,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<AttendanceSession>> {
        let rows = match range {
            Some((start, end)) => {
                sqlx::query_as::<_, AttendanceSession>(
                    r#"
                    SELECT * FROM attendance_sessions
                    WHERE date BETWEEN $1 AND $2
                    ORDER BY date ASC
                    "#,
                )
                .bind(start)
                .bind(end)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, AttendanceSession>(
                    "SELECT * FROM attendance_sessions ORDER BY date ASC",
                )
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(rows)
    }
}
