//! 인증 미들웨어 동작 모드와 역할 요구사항

use crate::core::errors::AppError;
use crate::domain::entities::users::Role;

/// 인증 모드
#[derive(Debug, Clone, PartialEq)]
pub enum AuthMode {
    /// 토큰이 없거나 유효하지 않으면 401 로 거절
    Required,
    /// 가능하면 사용자를 식별하고, 실패해도 요청을 통과시킴
    Optional,
}

/// 접근에 필요한 역할
#[derive(Debug, Clone)]
pub enum RequiredRole {
    Single(Role),
    Any(Vec<Role>),
}

impl RequiredRole {
    pub fn is_satisfied(&self, role: Role) -> bool {
        match self {
            RequiredRole::Single(required) => *required == role,
            RequiredRole::Any(allowed) => allowed.contains(&role),
        }
    }
}

/// Optional 모드에서 삼킨 인증 실패. 핸들러가 로그인을 요구하면 이 원인을 그대로 돌려줍니다.
#[derive(Debug, Clone)]
pub struct AuthFailure(pub AppError);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_role_single() {
        let required = RequiredRole::Single(Role::Admin);

        assert!(required.is_satisfied(Role::Admin));
        assert!(!required.is_satisfied(Role::User));
    }

    #[test]
    fn test_required_role_any() {
        let required = RequiredRole::Any(vec![Role::Admin, Role::LeadGuide]);

        assert!(required.is_satisfied(Role::Admin));
        assert!(required.is_satisfied(Role::LeadGuide));
        assert!(!required.is_satisfied(Role::Guide));
        assert!(!required.is_satisfied(Role::User));
    }
}
