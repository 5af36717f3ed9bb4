//! 라우트 설정 모듈
//!
//! API 라우트(`/api/v1/*`), 서버 렌더링 페이지, 정적 파일, 헬스체크를 등록합니다.
//! 요청 제한(`Governor`)은 `main`에서 `/api/v1` 스코프에만 씌웁니다.
//!
//! # 등록 순서
//!
//! actix-web 은 등록 순서대로 경로를 매칭하므로 고정 경로를 `/{id}` 보다 먼저 등록합니다.
//!
//! ```text
//! /health
//! /api/v1/tours     top-5-cheap, tour-stats, monthly-plan, tours-within, distances, "", /{tour_id}/reviews, /{id}
//! /api/v1/users     signup, login, logout, forgotPassword, resetPassword, updateMyPassword, me, updateMe, deleteMe, "", /{id}
//! /api/v1/reviews   (로그인 필요) "", /{id}
//! /api/v1/bookings  (로그인 필요) checkout-session, my, "", /{id}
//! /img /css /js     정적 파일
//! /                 페이지 (선택적 인증)
//! ```
//!
//! # Auth Middleware Usage
//!
//! 공개/보호 라우트가 섞인 스코프는 핸들러 단위 `wrap`을 씁니다.
//!
//! ```rust,ignore
//! #[post("", wrap = "crate::middlewares::AuthMiddleware::required_with_roles(&[Role::Admin, Role::LeadGuide])")]
//! pub async fn create_tour(...) { ... }
//! ```
//!
//! 스코프 전체가 로그인을 요구하면 스코프에 한 번만 씌웁니다.
//!
//! ```rust,ignore
//! web::scope("/reviews").wrap(AuthMiddleware::required())
//! ```

use actix_files::Files;
use actix_web::{error, get, web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::config::{ServerConfig, UploadConfig};
use crate::core::errors::AppError;
use crate::handlers;
use crate::handlers::multipart::MAX_UPLOAD_BYTES;
use crate::middlewares::AuthMiddleware;

/// 본문/쿼리/폼 추출 실패를 표준 에러 응답(400)으로 바꾸는 설정
///
/// `Either<Json, Multipart>` 추출기는 본문을 버퍼링하므로 `PayloadConfig`가 업로드 상한이 됩니다.
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
        .app_data(
            web::JsonConfig::default()
                .limit(ServerConfig::json_body_limit())
                .error_handler(|err, _req| {
                    log::debug!("JSON 본문 파싱 실패: {}", err);
                    error::Error::from(AppError::ValidationError(format!("Invalid input data. {}", err)))
                }),
        )
        .app_data(web::QueryConfig::default().error_handler(|err, _req| {
            error::Error::from(AppError::ValidationError(format!("Invalid query string. {}", err)))
        }))
        .app_data(web::FormConfig::default().limit(ServerConfig::json_body_limit()).error_handler(|err, _req| {
            error::Error::from(AppError::ValidationError(format!("Invalid form data. {}", err)))
        }));
}

/// `/api/v1` 스코프 내부 라우트
pub fn configure_api_routes(cfg: &mut web::ServiceConfig) {
    configure_tour_routes(cfg);
    configure_user_routes(cfg);
    configure_review_routes(cfg);
    configure_booking_routes(cfg);
}

fn configure_tour_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tours")
            .service(handlers::tours::top_five_cheap)
            .service(handlers::tours::tour_stats)
            .service(handlers::tours::monthly_plan)
            .service(handlers::tours::tours_within)
            .service(handlers::tours::distances)
            .service(handlers::tours::get_all_tours)
            .service(handlers::tours::create_tour)
            // 투어에 중첩된 리뷰 라우트
            .service(handlers::reviews::get_tour_reviews)
            .service(handlers::reviews::create_tour_review)
            .service(handlers::tours::get_tour)
            .service(handlers::tours::update_tour)
            .service(handlers::tours::delete_tour),
    );
}

fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            // 인증 흐름 (공개)
            .service(handlers::auth::signup)
            .service(handlers::auth::login)
            .service(handlers::auth::logout)
            .service(handlers::auth::forgot_password)
            .service(handlers::auth::reset_password)
            .service(handlers::auth::update_my_password)
            // 내 계정
            .service(handlers::users::get_me)
            .service(handlers::users::update_me)
            .service(handlers::users::delete_me)
            // 관리자
            .service(handlers::users::get_all_users)
            .service(handlers::users::create_user)
            .service(handlers::users::get_user)
            .service(handlers::users::update_user)
            .service(handlers::users::delete_user),
    );
}

fn configure_review_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reviews")
            .wrap(AuthMiddleware::required())
            .service(handlers::reviews::get_all_reviews)
            .service(handlers::reviews::create_review)
            .service(handlers::reviews::get_review)
            .service(handlers::reviews::update_review)
            .service(handlers::reviews::delete_review),
    );
}

fn configure_booking_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .wrap(AuthMiddleware::required())
            .service(handlers::bookings::checkout_session)
            .service(handlers::bookings::my_bookings)
            .service(handlers::bookings::get_all_bookings)
            .service(handlers::bookings::create_booking)
            .service(handlers::bookings::get_booking)
            .service(handlers::bookings::update_booking)
            .service(handlers::bookings::delete_booking),
    );
}

/// 정적 파일과 서버 렌더링 페이지
///
/// 페이지 스코프는 빈 접두사라 모든 경로를 받으므로 항상 마지막에 등록합니다.
/// 매칭되는 페이지가 없으면 앱의 기본 서비스([`not_found`])로 넘어갑니다.
pub fn configure_page_routes(cfg: &mut web::ServiceConfig) {
    let public_dir = UploadConfig::public_dir();
    for dir in ["img", "css", "js"] {
        cfg.service(Files::new(&format!("/{}", dir), public_dir.join(dir)));
    }

    cfg.service(
        web::scope("")
            .wrap(AuthMiddleware::optional())
            .service(handlers::views::overview)
            .service(handlers::views::tour)
            .service(handlers::views::login)
            .service(handlers::views::account)
            .service(handlers::views::my_tours)
            .service(handlers::views::submit_user_data),
    );
}

/// 매칭되는 라우트가 없을 때의 404 응답
pub async fn not_found(req: HttpRequest) -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound(format!("Can't find {} on this server!", req.path())))
}

/// 서비스 상태를 확인하는 헬스체크 엔드포인트
///
/// ```json
/// {
///   "status": "healthy",
///   "service": "tour_booking_backend",
///   "version": "0.1.0",
///   "timestamp": "2026-01-01T00:00:00Z",
///   "features": { "database": "MongoDB", "cache": "Redis", "views": "Tera" }
/// }
/// ```
#[get("/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "features": {
            "database": "MongoDB",
            "cache": "Redis",
            "views": "Tera"
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde::Deserialize;

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(App::new().service(health_check)).await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "tour_booking_backend");
    }

    #[actix_web::test]
    async fn test_unknown_route_is_json_404() {
        let app = test::init_service(App::new().default_service(web::to(not_found))).await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/api/v1/nope").to_request()).await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], "Can't find /api/v1/nope on this server!");
    }

    #[derive(Deserialize)]
    struct EchoBody {
        #[allow(dead_code)]
        name: String,
    }

    #[actix_web::test]
    async fn test_malformed_json_is_400_envelope() {
        let app = test::init_service(
            App::new().configure(configure_extractors).route(
                "/echo",
                web::post().to(|_: web::Json<EchoBody>| async { HttpResponse::Ok().finish() }),
            ),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/echo")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "fail");
    }
}
