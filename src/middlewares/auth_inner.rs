use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{Error, HttpMessage, ResponseError};
use futures_util::future::LocalBoxFuture;

use crate::config::CookieConfig;
use crate::core::errors::AppError;
use crate::domain::models::auth::{AuthFailure, AuthMode, RequiredRole};
use crate::services::auth::{AuthService, TokenService};

pub struct AuthMiddlewareService<S> {
    pub service: Rc<S>,
    pub mode: AuthMode,
    pub required_role: Option<RequiredRole>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, actix_web::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let mode = self.mode.clone();
        let required_role = self.required_role.clone();

        Box::pin(async move {
            let outcome = match extract_token(&req) {
                Some(token) => Some(authorize(&token, required_role.as_ref()).await),
                None => None,
            };

            match (&mode, outcome) {
                (_, Some(Ok(user))) => {
                    log::debug!("인증 성공: {} ({})", user.email, user.role.as_str());
                    req.extensions_mut().insert(user);
                }
                (AuthMode::Required, Some(Err(err))) => {
                    log::warn!("인증 실패 {}: {}", req.path(), err);
                    return Ok(reject(req, &err));
                }
                (AuthMode::Required, None) => {
                    let err = AppError::AuthenticationError(
                        "You are not logged in! Please log in to get access.".to_string(),
                    );
                    return Ok(reject(req, &err));
                }
                (AuthMode::Optional, Some(Err(err))) => {
                    log::debug!("선택적 인증 실패, 요청 진행: {}", err);
                    req.extensions_mut().insert(AuthFailure(err));
                }
                (AuthMode::Optional, None) => {}
            }

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

/// 토큰 → 사용자 확인 → 역할 확인
async fn authorize(
    token: &str,
    required_role: Option<&RequiredRole>,
) -> Result<crate::domain::models::auth::AuthenticatedUser, AppError> {
    let user = AuthService::instance().authenticate(token).await?;

    if let Some(required) = required_role {
        if !required.is_satisfied(user.role) {
            log::warn!("권한 부족: {} ({}), 필요 권한: {:?}", user.email, user.role.as_str(), required);
            return Err(AppError::AuthorizationError(
                "You do not have permission to perform this action".to_string(),
            ));
        }
    }
    Ok(user)
}

/// `Authorization: Bearer` 헤더 우선, 없으면 `jwt` 쿠키. 로그아웃 표식은 토큰이 아닙니다.
fn extract_token(req: &ServiceRequest) -> Option<String> {
    let from_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(TokenService::extract_bearer_token)
        .map(str::to_string);

    from_header.or_else(|| {
        req.cookie(CookieConfig::name())
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty() && value != CookieConfig::logged_out_value())
    })
}

fn reject<B>(req: ServiceRequest, err: &AppError) -> ServiceResponse<EitherBody<B>> {
    let (req, _) = req.into_parts();
    ServiceResponse::new(req, err.error_response()).map_into_right_body()
}
