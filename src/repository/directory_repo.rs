//! Directory store (departments, projects, employees), read-only
//! 过滤维度校验与员工范围解析

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::stats::DimensionFilter;

/// 目录只读接口
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn department_exists(&self, id: Uuid) -> Result<bool>;

    async fn project_exists(&self, id: Uuid) -> Result<bool>;

    /// 过滤维度对应的员工 ID 集合；两个维度都不过滤时返回 None
    async fn employee_scope(
        &self,
        department: DimensionFilter,
        project: DimensionFilter,
    ) -> Result<Option<HashSet<Uuid>>>;
}

/// PostgreSQL 实现
pub struct PgDirectoryStore {
    db: PgPool,
}

impl PgDirectoryStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DirectoryStore for PgDirectoryStore {
    async fn department_exists(&self, id: Uuid) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM departments WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        Ok(exists)
    }

    async fn project_exists(&self, id: Uuid) -> Result<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM projects WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.db)
                .await?;

        Ok(exists)
    }

    async fn employee_scope(
        &self,
        department: DimensionFilter,
        project: DimensionFilter,
    ) -> Result<Option<HashSet<Uuid>>> {
        let (department_id, project_id) = match (department, project) {
            (DimensionFilter::All, DimensionFilter::All) => return Ok(None),
            (department, project) => (
                match department {
                    DimensionFilter::Id(id) => Some(id),
                    DimensionFilter::All => None,
                },
                match project {
                    DimensionFilter::Id(id) => Some(id),
                    DimensionFilter::All => None,
                },
            ),
        };

        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM employees
            WHERE ($1::uuid IS NULL OR department_id = $1)
              AND ($2::uuid IS NULL OR project_id = $2)
            "#,
        )
        .bind(department_id)
        .bind(project_id)
        .fetch_all(&self.db)
        .await?;

        Ok(Some(ids.into_iter().collect()))
    }
}
