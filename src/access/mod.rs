//! Role-based access control model
//!
//! 权限表在启动时一次性构建，运行期只读。
//! 角色、资源、操作均为封闭枚举，非法组合在构建阶段报错。

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Caller role (closed set, no custom roles)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "employee" => Ok(Role::Employee),
            _ => Err(AppError::Unauthorized),
        }
    }
}

/// Protected resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    LeaveRequest,
    Project,
    User,
    Session,
}

/// Actions a role may hold on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Share,
    Approve,
    Reject,
    Cancel,
}

/// Schema of (resource, action) pairs that exist at all.
///
/// Grants are validated against this at construction so that a typo in a
/// statement table fails startup instead of silently denying at request time.
#[derive(Debug, Clone)]
pub struct AccessSchema {
    pairs: HashSet<(Resource, Action)>,
}

impl AccessSchema {
    pub fn new(entries: &[(Resource, &[Action])]) -> Self {
        let mut pairs = HashSet::new();
        for (resource, actions) in entries {
            for action in actions.iter() {
                pairs.insert((*resource, *action));
            }
        }
        Self { pairs }
    }

    /// 产品基线模式：所有存在的 (资源, 操作) 组合
    pub fn product() -> Self {
        use Action::*;
        Self::new(&[
            (Resource::LeaveRequest, &[Create, Read, Approve, Reject, Cancel]),
            (Resource::Project, &[Create, Share, Update, Delete]),
            (Resource::User, &[Create, Update, Delete]),
            (Resource::Session, &[Read]),
        ])
    }

    pub fn contains(&self, resource: Resource, action: Action) -> bool {
        self.pairs.contains(&(resource, action))
    }
}

/// Effective permission table, immutable after construction.
///
/// A role's effective set is the union of the baseline statements (granted
/// to every role) and its own overrides.
#[derive(Debug, Clone)]
pub struct AccessControl {
    table: HashSet<(Role, Resource, Action)>,
}

impl AccessControl {
    /// 由基线声明与按角色的覆盖表构建有效权限表
    ///
    /// 任何引用了模式之外 (资源, 操作) 组合的声明都会使构建失败。
    pub fn new(
        schema: &AccessSchema,
        baseline: &[(Resource, Action)],
        overrides: &[(Role, &[(Resource, Action)])],
    ) -> Result<Self, AppError> {
        let mut table = HashSet::new();

        for (resource, action) in baseline {
            if !schema.contains(*resource, *action) {
                return Err(AppError::Configuration(format!(
                    "baseline statement references unknown pair {:?}/{:?}",
                    resource, action
                )));
            }
            for role in [Role::Admin, Role::Employee] {
                table.insert((role, *resource, *action));
            }
        }

        for (role, grants) in overrides {
            for (resource, action) in grants.iter() {
                if !schema.contains(*resource, *action) {
                    return Err(AppError::Configuration(format!(
                        "override for role '{}' references unknown pair {:?}/{:?}",
                        role, resource, action
                    )));
                }
                table.insert((*role, *resource, *action));
            }
        }

        Ok(Self { table })
    }

    /// 产品内建权限表
    ///
    /// 员工的"仅限本人"约束由生命周期引擎与查询门面执行，
    /// 表中的 Cancel 授权表示跨属主的提升取消，只给管理员。
    pub fn builtin() -> Result<Self, AppError> {
        use Action::*;
        use Resource::*;

        let schema = AccessSchema::product();
        let baseline = [(LeaveRequest, Create), (LeaveRequest, Read), (Session, Read)];
        let admin_overrides: &[(Resource, Action)] = &[
            (LeaveRequest, Approve),
            (LeaveRequest, Reject),
            (LeaveRequest, Cancel),
            (Project, Create),
            (Project, Share),
            (Project, Update),
            (Project, Delete),
            (User, Create),
            (User, Update),
            (User, Delete),
        ];

        Self::new(&schema, &baseline, &[(Role::Admin, admin_overrides)])
    }

    /// 判定角色是否可对资源执行操作
    ///
    /// 纯查表，无 I/O，无副作用。
    pub fn permitted(&self, role: Role, resource: Resource, action: Action) -> bool {
        self.table.contains(&(role, resource, action))
    }
}
