//! # Page Handlers
//!
//! Tera 로 렌더링하는 페이지 라우트입니다. 스코프는 선택적 인증으로 감싸져 있어
//! 로그인 쿠키가 있으면 사용자 정보를 템플릿에 넘깁니다.
//! 에러는 JSON 대신 `error.html` 페이지로 응답합니다.

use actix_web::http::header::ContentType;
use actix_web::{get, post, web, HttpResponse, ResponseError};
use serde_json::Value;

use crate::config::Environment;
use crate::core::errors::{AppError, AppResult};
use crate::domain::dto::users::request::UpdateMeRequest;
use crate::domain::models::auth::{AuthenticatedUser, OptionalUser};
use crate::domain::models::query::QueryFeatures;
use crate::repositories::tours::TourRepository;
use crate::services::bookings::BookingService;
use crate::services::users::UserService;
use crate::services::views::ViewService;

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok().content_type(ContentType::html()).body(body)
}

/// 렌더링 결과 또는 에러 페이지
fn page(result: AppResult<String>, user: Option<&AuthenticatedUser>) -> HttpResponse {
    match result {
        Ok(body) => html(body),
        Err(err) => error_page(&err, user),
    }
}

pub fn error_page(err: &AppError, user: Option<&AuthenticatedUser>) -> HttpResponse {
    if !err.is_operational() {
        log::error!("💥 페이지 렌더링 에러: {:?}", err);
    }

    let message = if err.is_operational() || !Environment::current().is_production() {
        err.client_message()
    } else {
        "Please try again later.".to_string()
    };

    let body = ViewService::instance()
        .render(
            "error.html",
            "Something went wrong!",
            user,
            &[("msg", Value::String(message.clone()))],
        )
        .unwrap_or(message);

    HttpResponse::build(err.status_code())
        .content_type(ContentType::html())
        .body(body)
}

#[get("/")]
pub async fn overview(user: OptionalUser) -> HttpResponse {
    let result: AppResult<String> = async {
        let tours = TourRepository::instance()
            .find_all(&QueryFeatures::default(), None)
            .await?;
        ViewService::instance().render("overview.html", "All Tours", user.0.as_ref(), &[("tours", Value::Array(tours))])
    }
    .await;

    page(result, user.0.as_ref())
}

#[get("/tour/{slug}")]
pub async fn tour(user: OptionalUser, path: web::Path<String>) -> HttpResponse {
    let result: AppResult<String> = async {
        let tour = TourRepository::instance()
            .find_by_slug(&path)
            .await?
            .ok_or_else(|| AppError::NotFound("There is no tour with that name.".to_string()))?;

        let title = format!("{} Tour", tour["name"].as_str().unwrap_or_default());
        ViewService::instance().render("tour.html", &title, user.0.as_ref(), &[("tour", tour)])
    }
    .await;

    page(result, user.0.as_ref())
}

#[get("/login")]
pub async fn login(user: OptionalUser) -> HttpResponse {
    page(
        ViewService::instance().render("login.html", "Log into your account", user.0.as_ref(), &[]),
        user.0.as_ref(),
    )
}

#[get("/me")]
pub async fn account(user: Result<AuthenticatedUser, AppError>) -> HttpResponse {
    match user {
        Ok(user) => page(
            ViewService::instance().render("account.html", "Your account", Some(&user), &[]),
            Some(&user),
        ),
        Err(err) => error_page(&err, None),
    }
}

#[get("/my-tours")]
pub async fn my_tours(user: Result<AuthenticatedUser, AppError>) -> HttpResponse {
    let user = match user {
        Ok(user) => user,
        Err(err) => return error_page(&err, None),
    };

    let result: AppResult<String> = async {
        let tours = BookingService::instance().my_tours(&user).await?;
        ViewService::instance().render("overview.html", "My Tours", Some(&user), &[("tours", Value::Array(tours))])
    }
    .await;

    page(result, Some(&user))
}

/// 계정 페이지의 HTML 폼 제출 (`name`, `email`)
#[post("/submit-user-data")]
pub async fn submit_user_data(
    user: Result<AuthenticatedUser, AppError>,
    form: web::Form<UpdateMeRequest>,
) -> HttpResponse {
    let user = match user {
        Ok(user) => user,
        Err(err) => return error_page(&err, None),
    };

    let result: AppResult<String> = async {
        let updated = UserService::instance()
            .update_me(&user, form.into_inner(), None)
            .await?;
        let refreshed = AuthenticatedUser {
            name: updated["name"].as_str().unwrap_or(&user.name).to_string(),
            email: updated["email"].as_str().unwrap_or(&user.email).to_string(),
            ..user.clone()
        };
        ViewService::instance().render("account.html", "Your account", Some(&refreshed), &[])
    }
    .await;

    page(result, Some(&user))
}
