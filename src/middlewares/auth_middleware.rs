//! # 인증 미들웨어
//!
//! 스코프나 리소스 단위로 `.wrap()`하여 세션 토큰을 검증합니다.
//!
//! ```rust,ignore
//! web::scope("/reviews").wrap(AuthMiddleware::required())
//! web::resource("").wrap(AuthMiddleware::required_with_roles(&[Role::Admin, Role::LeadGuide]))
//! web::scope("").wrap(AuthMiddleware::optional())   // 페이지 라우트
//! ```
//!
//! 토큰은 `Authorization: Bearer` 헤더를 먼저 보고, 없으면 `jwt` 쿠키를 읽습니다.
//! 검증에 성공하면 [`AuthenticatedUser`](crate::domain::models::auth::AuthenticatedUser)가
//! request extensions 에 저장됩니다.

use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, Result,
};

use crate::domain::entities::users::Role;
use crate::domain::models::auth::{AuthMode, RequiredRole};
use crate::middlewares::auth_inner::AuthMiddlewareService;

pub struct AuthMiddleware {
    mode: AuthMode,
    required_role: Option<RequiredRole>,
}

impl AuthMiddleware {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            required_role: None,
        }
    }

    pub fn new_with_role(mode: AuthMode, required_role: RequiredRole) -> Self {
        Self {
            mode,
            required_role: Some(required_role),
        }
    }

    /// 로그인 필수
    pub fn required() -> Self {
        Self::new(AuthMode::Required)
    }

    /// 로그인 선택
    pub fn optional() -> Self {
        Self::new(AuthMode::Optional)
    }

    pub fn required_with_role(role: Role) -> Self {
        Self::new_with_role(AuthMode::Required, RequiredRole::Single(role))
    }

    /// 로그인 필수 + 역할 제한
    pub fn required_with_roles(roles: &[Role]) -> Self {
        Self::new_with_role(AuthMode::Required, RequiredRole::Any(roles.to_vec()))
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            mode: self.mode.clone(),
            required_role: self.required_role.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};

    use crate::domain::models::auth::OptionalUser;

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().body("ok")
    }

    async fn who(user: OptionalUser) -> HttpResponse {
        match user.0 {
            Some(user) => HttpResponse::Ok().body(user.name),
            None => HttpResponse::Ok().body("guest"),
        }
    }

    #[actix_web::test]
    async fn test_required_without_token_is_401() {
        let app = test::init_service(
            App::new().service(web::resource("/secret").wrap(AuthMiddleware::required()).to(ok)),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/secret").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], "You are not logged in! Please log in to get access.");
    }

    #[actix_web::test]
    async fn test_role_guard_without_token_is_401_not_403() {
        let app = test::init_service(
            App::new().service(
                web::resource("/admin")
                    .wrap(AuthMiddleware::required_with_roles(&[Role::Admin]))
                    .to(ok),
            ),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/admin").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_optional_without_token_passes_through() {
        let app = test::init_service(
            App::new().service(web::resource("/").wrap(AuthMiddleware::optional()).to(who)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .cookie(actix_web::cookie::Cookie::new("jwt", "loggedout"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, "guest");
    }
}
