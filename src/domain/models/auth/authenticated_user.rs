//! 인증된 사용자 정보와 요청 추출기
//!
//! 인증 미들웨어가 request extensions 에 넣어 둔 [`AuthenticatedUser`]를 핸들러 인자로 꺼냅니다.

use std::future::{ready, Ready};

use actix_web::{FromRequest, HttpMessage, HttpRequest};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::core::errors::{AppError, AppResult};
use crate::domain::entities::users::{Role, User};
use crate::domain::models::auth::authentication_request::AuthFailure;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: ObjectId,
    pub name: String,
    pub email: String,
    pub photo: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    /// 현재 역할이 허용 목록에 없으면 403
    pub fn restrict_to(&self, roles: &[Role]) -> AppResult<()> {
        if self.has_any_role(roles) {
            Ok(())
        } else {
            Err(AppError::AuthorizationError(
                "You do not have permission to perform this action".to_string(),
            ))
        }
    }

    /// 뷰 템플릿에 넘기는 최소 정보
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

impl TryFrom<&User> for AuthenticatedUser {
    type Error = AppError;

    fn try_from(user: &User) -> Result<Self, Self::Error> {
        let user_id = user
            .id
            .ok_or_else(|| AppError::InternalError("저장되지 않은 사용자는 인증할 수 없습니다".to_string()))?;

        Ok(Self {
            user_id,
            name: user.name.clone(),
            email: user.email.clone(),
            photo: user.photo.clone(),
            role: user.role,
        })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let extensions = req.extensions();
        if let Some(user) = extensions.get::<AuthenticatedUser>() {
            return ready(Ok(user.clone()));
        }
        if let Some(AuthFailure(cause)) = extensions.get::<AuthFailure>() {
            return ready(Err(cause.clone()));
        }
        ready(Err(AppError::AuthenticationError(
            "You are not logged in! Please log in to get access.".to_string(),
        )))
    }
}

/// 로그인하지 않아도 되는 핸들러용 추출기
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<AuthenticatedUser>);

impl FromRequest for OptionalUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let user = req.extensions().get::<AuthenticatedUser>().cloned();
        ready(Ok(OptionalUser(user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn guide() -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: ObjectId::new(),
            name: "Steve Miller".to_string(),
            email: "steve@example.io".to_string(),
            photo: "default.jpg".to_string(),
            role: Role::Guide,
        }
    }

    #[test]
    fn test_restrict_to() {
        let user = guide();

        assert!(user.restrict_to(&[Role::Admin, Role::LeadGuide, Role::Guide]).is_ok());
        let err = user.restrict_to(&[Role::Admin]).unwrap_err();
        assert!(matches!(err, AppError::AuthorizationError(_)));
        assert!(!user.is_admin());
    }

    #[test]
    fn test_first_name() {
        assert_eq!(guide().first_name(), "Steve");
    }

    #[actix_web::test]
    async fn test_extractor_without_user_is_unauthorized() {
        let req = TestRequest::default().to_http_request();
        let result = AuthenticatedUser::extract(&req).await;

        assert!(matches!(result, Err(AppError::AuthenticationError(_))));
    }

    #[actix_web::test]
    async fn test_extractor_surfaces_stored_failure() {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(AuthFailure(AppError::ExpiredToken));

        let result = AuthenticatedUser::extract(&req).await;
        assert!(matches!(result, Err(AppError::ExpiredToken)));
    }

    #[actix_web::test]
    async fn test_extractor_returns_inserted_user() {
        let req = TestRequest::default().to_http_request();
        let user = guide();
        req.extensions_mut().insert(user.clone());

        let extracted = AuthenticatedUser::extract(&req).await.unwrap();
        assert_eq!(extracted.user_id, user.user_id);

        let optional = OptionalUser::extract(&req).await.unwrap();
        assert!(optional.0.is_some());
    }
}
