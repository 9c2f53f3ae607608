//! 请假统计聚合
//! 对快照做纯计算：无 I/O，不读时钟（参考日期由调用方传入）。
//! 聚合假定入库记录已在提交时校验过，这里不再重复校验。

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use crate::models::attendance::AttendanceSession;
use crate::models::leave::{LeaveRequest, LeaveStatus};
use crate::models::stats::{LeaveCounts, WeeklyHoursPoint};

/// 按状态统计请假单
///
/// `scope` 限定员工集合（None 为全员），`range` 按区间相交过滤，
/// `on_leave` 统计 today 落在已批准区间内的员工数（去重）。
pub fn leave_counts(
    requests: &[LeaveRequest],
    scope: Option<&HashSet<Uuid>>,
    range: Option<(NaiveDate, NaiveDate)>,
    today: NaiveDate,
) -> LeaveCounts {
    let mut pending = 0;
    let mut approved = 0;
    let mut rejected = 0;
    let mut on_leave: HashSet<Uuid> = HashSet::new();

    for request in requests {
        if let Some(scope) = scope {
            if !scope.contains(&request.employee_id) {
                continue;
            }
        }
        if let Some((start, end)) = range {
            if request.start_date > end || request.end_date < start {
                continue;
            }
        }

        match request.status {
            LeaveStatus::Pending => pending += 1,
            LeaveStatus::Approved => {
                approved += 1;
                if request.covers(today) {
                    on_leave.insert(request.employee_id);
                }
            }
            LeaveStatus::Rejected => rejected += 1,
            LeaveStatus::Cancelled => {}
        }
    }

    LeaveCounts {
        pending,
        approved,
        rejected,
        on_leave: on_leave.len() as i64,
    }
}

/// 汇总工时（小时）
pub fn total_hours(sessions: &[AttendanceSession], scope: Option<&HashSet<Uuid>>) -> f64 {
    sessions
        .iter()
        .filter(|session| match scope {
            Some(scope) => scope.contains(&session.employee_id),
            None => true,
        })
        .map(AttendanceSession::worked_hours)
        .sum()
}

/// 工时的人类可读格式
///
/// 约定：0 -> "0m"；不足 1 小时 -> "<m>m"；整小时 -> "<h>h"；
/// 其余 -> "<h>h <m>m"。分钟四舍五入。
/// 这是被其它展示文案依赖的硬约定，不是展示层的小修饰。
pub fn format_work_hours(hours: f64) -> String {
    let total_minutes = (hours * 60.0).round().max(0.0) as i64;
    let h = total_minutes / 60;
    let m = total_minutes % 60;

    if total_minutes == 0 {
        "0m".to_string()
    } else if h == 0 {
        format!("{}m", m)
    } else if m == 0 {
        format!("{}h", h)
    } else {
        format!("{}h {}m", h, m)
    }
}

/// 近七日工时序列，最早一天在前，以 end 结尾
///
/// 同一区间重复计算得到同一序列。
pub fn weekly_hours(sessions: &[AttendanceSession], end: NaiveDate) -> Vec<WeeklyHoursPoint> {
    (0..7)
        .rev()
        .map(|offset| {
            let day = end - Duration::days(offset);
            let hours = sessions
                .iter()
                .filter(|session| session.date == day)
                .map(AttendanceSession::worked_hours)
                .sum();
            WeeklyHoursPoint {
                label: day.format("%a").to_string(),
                hours,
            }
        })
        .collect()
}
