//! Dashboard statistics shapes and filters
//! 统计结果均为按次计算的派生数据，从不落库

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// 按状态的请假单计数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveCounts {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    /// 今日处于已批准请假区间内的员工数（去重）
    pub on_leave: i64,
}

/// 管理端统计响应
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatsResponse {
    pub on_leave: i64,
    pub approved: i64,
    pub pending: i64,
    pub rejected: i64,
    /// 考勤源不可用时为 null，不阻塞计数统计
    pub total_hours: Option<f64>,
    pub total_hours_label: Option<String>,
}

/// 今日考勤状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    NotStarted,
    Working,
    Finished,
}

/// 今日考勤摘要
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodaySession {
    pub status: SessionStatus,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

/// 员工端统计响应
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeStatsResponse {
    pub check_in_time: Option<NaiveTime>,
    pub check_out_time: Option<NaiveTime>,
    pub leaves_approved: i64,
    pub leaves_pending: i64,
    pub today_session: TodaySession,
}

/// 近七日工时序列中的一个点
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyHoursPoint {
    pub label: String,
    pub hours: f64,
}

/// 单个过滤维度："all" 哨兵值表示不过滤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionFilter {
    All,
    Id(Uuid),
}

impl DimensionFilter {
    /// 解析查询参数：缺省或 "all" 视为不过滤
    pub fn parse(raw: Option<&str>, field: &str) -> Result<Self> {
        match raw {
            None => Ok(DimensionFilter::All),
            Some(s) if s.eq_ignore_ascii_case("all") => Ok(DimensionFilter::All),
            Some(s) => s
                .parse::<Uuid>()
                .map(DimensionFilter::Id)
                .map_err(|_| AppError::validation(field, "must be a UUID or \"all\"")),
        }
    }
}

/// 管理端统计查询参数（原始字符串形式）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    pub department_id: Option<String>,
    pub project_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// 解析后的统计过滤器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsFilter {
    pub department: DimensionFilter,
    pub project: DimensionFilter,
    pub range: Option<(NaiveDate, NaiveDate)>,
}

impl StatsFilter {
    /// 不过滤任何维度
    pub fn unfiltered() -> Self {
        Self {
            department: DimensionFilter::All,
            project: DimensionFilter::All,
            range: None,
        }
    }

    /// 解析查询参数；日期区间要么都给要么都不给
    pub fn parse(query: &StatsQuery) -> Result<Self> {
        let department = DimensionFilter::parse(query.department_id.as_deref(), "departmentId")?;
        let project = DimensionFilter::parse(query.project_id.as_deref(), "projectId")?;

        let start = parse_date(query.start_date.as_deref(), "startDate")?;
        let end = parse_date(query.end_date.as_deref(), "endDate")?;

        let range = match (start, end) {
            (None, None) => None,
            (Some(start), Some(end)) => {
                if end < start {
                    return Err(AppError::validation(
                        "endDate",
                        "endDate must be on or after startDate",
                    ));
                }
                Some((start, end))
            }
            (Some(_), None) => {
                return Err(AppError::validation("endDate", "both dates are required"))
            }
            (None, Some(_)) => {
                return Err(AppError::validation("startDate", "both dates are required"))
            }
        };

        Ok(Self {
            department,
            project,
            range,
        })
    }
}

fn parse_date(raw: Option<&str>, field: &str) -> Result<Option<NaiveDate>> {
    match raw {
        None => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("all") => Ok(None),
        Some(s) => s
            .parse::<NaiveDate>()
            .map(Some)
            .map_err(|_| AppError::validation(field, "must be a date (YYYY-MM-DD) or \"all\"")),
    }
}
