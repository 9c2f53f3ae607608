//! Attendance session model (consumed read-only)

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 考勤记录：每员工每天一条
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSession {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
}

impl AttendanceSession {
    /// 工时（小时）：缺少任一打卡记录时计为 0
    pub fn worked_hours(&self) -> f64 {
        match (self.check_in, self.check_out) {
            (Some(check_in), Some(check_out)) if check_out > check_in => {
                (check_out - check_in).num_seconds() as f64 / 3600.0
            }
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(check_in: Option<&str>, check_out: Option<&str>) -> AttendanceSession {
        AttendanceSession {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2026, 8, 3).unwrap(),
            check_in: check_in.map(|s| s.parse().unwrap()),
            check_out: check_out.map(|s| s.parse().unwrap()),
        }
    }

    #[test]
    fn test_worked_hours_full_day() {
        let s = session(Some("09:00:00"), Some("17:30:00"));
        assert!((s.worked_hours() - 8.5).abs() < 1e-9);
    }

    #[test]
    fn test_worked_hours_missing_punch_is_zero() {
        assert_eq!(session(Some("09:00:00"), None).worked_hours(), 0.0);
        assert_eq!(session(None, None).worked_hours(), 0.0);
    }

    #[test]
    fn test_worked_hours_inverted_punches_is_zero() {
        let s = session(Some("17:00:00"), Some("09:00:00"));
        assert_eq!(s.worked_hours(), 0.0);
    }
}
