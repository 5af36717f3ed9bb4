//! Authentication HTTP Handlers
//!
//! 가입, 로그인, 로그아웃, 비밀번호 재설정/변경 엔드포인트입니다.
//! 토큰을 발급하는 응답은 모두 같은 형태이며 `jwt` 쿠키도 함께 설정합니다.
//!
//! ```json
//! { "status": "success", "token": "eyJ...", "data": { "user": { ... } } }
//! ```

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::http::StatusCode;
use actix_web::{get, patch, post, web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::config::CookieConfig;
use crate::core::errors::AppError;
use crate::domain::dto::common::ApiResponse;
use crate::domain::dto::users::request::{
    ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, SignupRequest, UpdatePasswordRequest,
};
use crate::domain::models::auth::AuthenticatedUser;
use crate::handlers::base_url;
use crate::services::auth::{AuthService, SignedIn};

/// 세션 쿠키 (HttpOnly, 운영 환경에서는 Secure)
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(CookieConfig::name(), token)
        .path("/")
        .http_only(true)
        .secure(CookieConfig::secure())
        .same_site(SameSite::Lax)
        .max_age(Duration::days(CookieConfig::expires_days()))
        .finish()
}

fn logged_out_cookie() -> Cookie<'static> {
    Cookie::build(CookieConfig::name(), CookieConfig::logged_out_value())
        .path("/")
        .http_only(true)
        .max_age(Duration::seconds(CookieConfig::logged_out_secs()))
        .finish()
}

fn send_token(status: StatusCode, signed_in: SignedIn) -> HttpResponse {
    HttpResponse::build(status)
        .cookie(session_cookie(signed_in.token.clone()))
        .json(ApiResponse::with("user", signed_in.user).token(signed_in.token))
}

#[post("/signup")]
pub async fn signup(req: HttpRequest, payload: web::Json<SignupRequest>) -> Result<HttpResponse, AppError> {
    let account_url = format!("{}/me", base_url(&req));
    let signed_in = AuthService::instance()
        .signup(payload.into_inner(), &account_url)
        .await?;

    Ok(send_token(StatusCode::CREATED, signed_in))
}

#[post("/login")]
pub async fn login(payload: web::Json<LoginRequest>) -> Result<HttpResponse, AppError> {
    let signed_in = AuthService::instance().login(payload.into_inner()).await?;
    Ok(send_token(StatusCode::OK, signed_in))
}

/// 쿠키를 짧게 사는 로그아웃 표식으로 덮어씁니다.
#[get("/logout")]
pub async fn logout() -> HttpResponse {
    HttpResponse::Ok()
        .cookie(logged_out_cookie())
        .json(ApiResponse::success())
}

#[post("/forgotPassword")]
pub async fn forgot_password(
    req: HttpRequest,
    payload: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let reset_base_url = format!("{}/api/v1/users/resetPassword", base_url(&req));
    AuthService::instance()
        .forgot_password(payload.into_inner(), &reset_base_url)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Token sent to email!"
    })))
}

#[patch("/resetPassword/{token}")]
pub async fn reset_password(
    path: web::Path<String>,
    payload: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let signed_in = AuthService::instance()
        .reset_password(&path.into_inner(), payload.into_inner())
        .await?;

    Ok(send_token(StatusCode::OK, signed_in))
}

#[patch("/updateMyPassword", wrap = "crate::middlewares::AuthMiddleware::required()")]
pub async fn update_my_password(
    user: AuthenticatedUser,
    payload: web::Json<UpdatePasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let signed_in = AuthService::instance()
        .update_password(&user, payload.into_inner())
        .await?;

    Ok(send_token(StatusCode::OK, signed_in))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[::core::prelude::v1::test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc".to_string());
        assert_eq!(cookie.name(), "jwt");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.max_age(), Some(Duration::days(CookieConfig::expires_days())));
    }

    #[actix_web::test]
    async fn test_logout_overwrites_cookie() {
        let app = test::init_service(App::new().service(logout)).await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/logout").to_request()).await;

        assert!(res.status().is_success());
        let cookie = res
            .response()
            .cookies()
            .find(|c| c.name() == "jwt")
            .expect("jwt cookie");
        assert_eq!(cookie.value(), "loggedout");
        assert_eq!(cookie.max_age(), Some(Duration::seconds(10)));
    }
}
