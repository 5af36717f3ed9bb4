//! # Review HTTP Handlers
//!
//! `/api/v1/reviews` 스코프 전체가 로그인 필수이며, 역할 제한은 핸들러에서 확인합니다.
//! 투어 하위 경로(`/api/v1/tours/{tour_id}/reviews`)도 같은 생성/목록 로직을 씁니다.

use actix_web::{delete, get, patch, post, web, HttpResponse};
use mongodb::bson::doc;

use crate::core::errors::AppError;
use crate::domain::dto::common::ApiResponse;
use crate::domain::dto::reviews::{CreateReviewRequest, UpdateReviewRequest};
use crate::domain::entities::{Review, Role};
use crate::domain::models::auth::AuthenticatedUser;
use crate::handlers::factory;
use crate::services::reviews::ReviewService;
use crate::utils::string_utils::parse_object_id;

const REVIEW_EDITORS: [Role; 2] = [Role::User, Role::Admin];

#[get("")]
pub async fn get_all_reviews(query: web::Query<Vec<(String, String)>>) -> Result<HttpResponse, AppError> {
    factory::get_all::<Review>(&query, None).await
}

#[post("")]
pub async fn create_review(
    user: AuthenticatedUser,
    payload: web::Json<CreateReviewRequest>,
) -> Result<HttpResponse, AppError> {
    user.restrict_to(&[Role::User])?;

    let review = ReviewService::instance()
        .create(&user, None, payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::with("data", review)))
}

#[get("/{id}")]
pub async fn get_review(path: web::Path<String>) -> Result<HttpResponse, AppError> {
    factory::get_one::<Review>(&path, Vec::new()).await
}

#[patch("/{id}")]
pub async fn update_review(
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateReviewRequest>,
) -> Result<HttpResponse, AppError> {
    user.restrict_to(&REVIEW_EDITORS)?;

    let review = ReviewService::instance()
        .update(&path, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with("data", review)))
}

#[delete("/{id}")]
pub async fn delete_review(user: AuthenticatedUser, path: web::Path<String>) -> Result<HttpResponse, AppError> {
    user.restrict_to(&REVIEW_EDITORS)?;

    ReviewService::instance().delete(&path).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// `GET /api/v1/tours/{tour_id}/reviews`
#[get("/{tour_id}/reviews", wrap = "crate::middlewares::AuthMiddleware::required()")]
pub async fn get_tour_reviews(
    path: web::Path<String>,
    query: web::Query<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    let tour = parse_object_id(&path)?;
    factory::get_all::<Review>(&query, Some(doc! { "tour": tour })).await
}

/// `POST /api/v1/tours/{tour_id}/reviews`
#[post(
    "/{tour_id}/reviews",
    wrap = "crate::middlewares::AuthMiddleware::required_with_role(crate::domain::entities::Role::User)"
)]
pub async fn create_tour_review(
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<CreateReviewRequest>,
) -> Result<HttpResponse, AppError> {
    let review = ReviewService::instance()
        .create(&user, Some(path.as_str()), payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::with("data", review)))
}
