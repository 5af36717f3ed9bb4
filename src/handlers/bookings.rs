//! # Booking HTTP Handlers
//!
//! `/api/v1/bookings` 스코프 전체가 로그인 필수입니다.
//! 체크아웃과 내 예약은 모든 사용자, 나머지 CRUD 는 `admin`, `lead-guide`만 가능합니다.

use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::core::errors::AppError;
use crate::domain::dto::bookings::{CreateBookingRequest, UpdateBookingRequest};
use crate::domain::dto::common::{ApiResponse, IntoUpdate};
use crate::domain::entities::{Booking, Role};
use crate::domain::models::auth::AuthenticatedUser;
use crate::handlers::{base_url, factory};
use crate::services::bookings::BookingService;

const BOOKING_MANAGERS: [Role; 2] = [Role::Admin, Role::LeadGuide];

#[get("/checkout-session/{tour_id}")]
pub async fn checkout_session(
    req: HttpRequest,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let session = BookingService::instance()
        .checkout(&user, &path, &base_url(&req))
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with("session", session)))
}

#[get("/my")]
pub async fn my_bookings(user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    let tours = BookingService::instance().my_tours(&user).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::list("tours", tours)))
}

#[get("")]
pub async fn get_all_bookings(
    user: AuthenticatedUser,
    query: web::Query<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    user.restrict_to(&BOOKING_MANAGERS)?;
    factory::get_all::<Booking>(&query, None).await
}

#[post("")]
pub async fn create_booking(
    user: AuthenticatedUser,
    payload: web::Json<CreateBookingRequest>,
) -> Result<HttpResponse, AppError> {
    user.restrict_to(&BOOKING_MANAGERS)?;

    let request = payload.into_inner();
    request.validate()?;
    factory::create_one(request.into_entity()?).await
}

#[get("/{id}")]
pub async fn get_booking(user: AuthenticatedUser, path: web::Path<String>) -> Result<HttpResponse, AppError> {
    user.restrict_to(&BOOKING_MANAGERS)?;
    factory::get_one::<Booking>(&path, Vec::new()).await
}

#[patch("/{id}")]
pub async fn update_booking(
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateBookingRequest>,
) -> Result<HttpResponse, AppError> {
    user.restrict_to(&BOOKING_MANAGERS)?;

    let request = payload.into_inner();
    request.validate()?;
    factory::update_one::<Booking>(&path, request.into_update()?).await
}

#[delete("/{id}")]
pub async fn delete_booking(user: AuthenticatedUser, path: web::Path<String>) -> Result<HttpResponse, AppError> {
    user.restrict_to(&BOOKING_MANAGERS)?;
    factory::delete_one::<Booking>(&path).await
}
