//! 身份上下文中间件
//! 上游身份网关完成认证后透传 (employee_id, role)；
//! 本服务只解析并信任这对头，不做任何凭证校验。

use axum::{
    extract::{FromRequestParts, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{access::Role, error::AppError};

/// 网关透传的员工 ID 头
pub const EMPLOYEE_ID_HEADER: &str = "x-employee-id";
/// 网关透传的角色头
pub const EMPLOYEE_ROLE_HEADER: &str = "x-employee-role";

/// 认证上下文（附加到请求扩展）
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    pub employee_id: Uuid,
    pub role: Role,
}

// 实现 FromRequestParts 以便在 handler 中直接提取 AuthContext
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or(AppError::Unauthorized)
    }
}

/// 从请求头解析身份
pub fn extract_identity(headers: &HeaderMap) -> Result<AuthContext, AppError> {
    let employee_id = headers
        .get(EMPLOYEE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or(AppError::Unauthorized)?;

    let role = headers
        .get(EMPLOYEE_ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?
        .parse::<Role>()?;

    Ok(AuthContext { employee_id, role })
}

/// 身份中间件 - 必须携带身份头
pub async fn identity_middleware(mut req: Request, next: Next) -> Result<Response, AppError> {
    let ctx = extract_identity(req.headers())?;

    // 附加到请求扩展
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_identity_valid() {
        let employee_id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(EMPLOYEE_ID_HEADER, employee_id.to_string().parse().unwrap());
        headers.insert(EMPLOYEE_ROLE_HEADER, "admin".parse().unwrap());

        let ctx = extract_identity(&headers).unwrap();
        assert_eq!(ctx.employee_id, employee_id);
        assert_eq!(ctx.role, Role::Admin);
    }

    #[test]
    fn test_extract_identity_missing_headers() {
        let headers = HeaderMap::new();
        assert!(extract_identity(&headers).is_err());
    }

    #[test]
    fn test_extract_identity_bad_employee_id() {
        let mut headers = HeaderMap::new();
        headers.insert(EMPLOYEE_ID_HEADER, "not-a-uuid".parse().unwrap());
        headers.insert(EMPLOYEE_ROLE_HEADER, "employee".parse().unwrap());

        assert!(extract_identity(&headers).is_err());
    }

    #[test]
    fn test_extract_identity_unknown_role() {
        let mut headers = HeaderMap::new();
        headers.insert(EMPLOYEE_ID_HEADER, Uuid::new_v4().to_string().parse().unwrap());
        headers.insert(EMPLOYEE_ROLE_HEADER, "superuser".parse().unwrap());

        assert!(extract_identity(&headers).is_err());
    }
}
