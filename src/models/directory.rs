//! Directory rows (departments, employees), owned externally and read-only here

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 部门（仅作为过滤维度）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// 项目（仅作为过滤维度）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
}

/// 员工目录行
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    pub name: String,
    pub department_id: Uuid,
    pub project_id: Option<Uuid>,
}
