//! # Tour HTTP Handlers
//!
//! 목록/상세는 공개, 생성/수정/삭제는 `admin`, `lead-guide`만 가능합니다.
//! 고정 경로(`/top-5-cheap`, `/tour-stats` 등)는 `/{id}`보다 먼저 등록되어야 합니다.

use actix_multipart::Multipart;
use actix_web::{delete, get, patch, post, web, Either, HttpResponse};
use validator::Validate;

use crate::core::errors::AppError;
use crate::domain::dto::common::{ApiResponse, IntoUpdate};
use crate::domain::dto::tours::{CreateTourRequest, UpdateTourRequest};
use crate::domain::entities::Tour;
use crate::domain::models::query::QueryFeatures;
use crate::handlers::factory;
use crate::handlers::multipart::MultipartForm;
use crate::services::tours::TourService;
use crate::services::uploads::{ImageService, UploadedFile};

/// 평점 높은 순, 가격 낮은 순 상위 5개
const TOP_FIVE_CHEAP: [(&str, &str); 3] = [
    ("limit", "5"),
    ("sort", "-ratingsAverage,price"),
    ("fields", "name,price,ratingsAverage,summary,difficulty"),
];

#[get("")]
pub async fn get_all_tours(query: web::Query<Vec<(String, String)>>) -> Result<HttpResponse, AppError> {
    factory::get_all::<Tour>(&query, None).await
}

#[get("/top-5-cheap")]
pub async fn top_five_cheap(query: web::Query<Vec<(String, String)>>) -> Result<HttpResponse, AppError> {
    let pairs = QueryFeatures::with_alias(&query, &TOP_FIVE_CHEAP);
    factory::get_all::<Tour>(&pairs, None).await
}

#[get("/tour-stats")]
pub async fn tour_stats() -> Result<HttpResponse, AppError> {
    let stats = TourService::instance().tour_stats().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::list("stats", stats)))
}

#[get(
    "/monthly-plan/{year}",
    wrap = "crate::middlewares::AuthMiddleware::required_with_roles(&[crate::domain::entities::Role::Admin, crate::domain::entities::Role::LeadGuide, crate::domain::entities::Role::Guide])"
)]
pub async fn monthly_plan(path: web::Path<String>) -> Result<HttpResponse, AppError> {
    let plan = TourService::instance().monthly_plan(&path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::list("plan", plan)))
}

#[get("/tours-within/{distance}/center/{latlng}/unit/{unit}")]
pub async fn tours_within(path: web::Path<(String, String, String)>) -> Result<HttpResponse, AppError> {
    let (distance, latlng, unit) = path.into_inner();
    let tours = TourService::instance()
        .tours_within(&distance, &latlng, &unit)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::list("data", tours)))
}

#[get("/distances/{latlng}/unit/{unit}")]
pub async fn distances(path: web::Path<(String, String)>) -> Result<HttpResponse, AppError> {
    let (latlng, unit) = path.into_inner();
    let distances = TourService::instance().distances(&latlng, &unit).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::list("data", distances)))
}

#[post(
    "",
    wrap = "crate::middlewares::AuthMiddleware::required_with_roles(&[crate::domain::entities::Role::Admin, crate::domain::entities::Role::LeadGuide])"
)]
pub async fn create_tour(payload: web::Json<CreateTourRequest>) -> Result<HttpResponse, AppError> {
    let request = payload.into_inner();
    request.validate()?;
    factory::create_one(request.into_entity()?).await
}

#[get("/{id}")]
pub async fn get_tour(path: web::Path<String>) -> Result<HttpResponse, AppError> {
    factory::get_one::<Tour>(&path, vec![Tour::review_population()]).await
}

/// JSON 수정 또는 `imageCover` 1장 + `images` 최대 3장 멀티파트 업로드
#[patch(
    "/{id}",
    wrap = "crate::middlewares::AuthMiddleware::required_with_roles(&[crate::domain::entities::Role::Admin, crate::domain::entities::Role::LeadGuide])"
)]
pub async fn update_tour(
    path: web::Path<String>,
    payload: Either<web::Json<UpdateTourRequest>, Multipart>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let request = match payload {
        Either::Left(json) => {
            let request = json.into_inner();
            request.validate()?;
            request
        }
        Either::Right(multipart) => {
            let mut form = MultipartForm::collect(multipart).await?;
            let (mut request, cover, images) = tour_update_from_form(&mut form)?;

            // 없는 투어에 대한 요청이면 이미지를 쓰기 전에 404
            TourService::instance().ensure_exists(&id).await?;
            let (cover, images) = ImageService::instance()
                .save_tour_images(&id, cover, images)
                .await?;

            if cover.is_some() {
                request.image_cover = cover;
            }
            if !images.is_empty() {
                request.images = Some(images);
            }
            request
        }
    };

    factory::update_one::<Tour>(&id, request.into_update()?).await
}

/// 텍스트 필드 검증이 끝난 뒤에만 이미지 파일을 꺼냅니다.
fn tour_update_from_form(
    form: &mut MultipartForm,
) -> Result<(UpdateTourRequest, Option<UploadedFile>, Vec<UploadedFile>), AppError> {
    let request: UpdateTourRequest = form.into_dto(true)?;
    request.validate()?;
    Ok((request, form.take_file("imageCover"), form.take_files("images")))
}

#[delete(
    "/{id}",
    wrap = "crate::middlewares::AuthMiddleware::required_with_roles(&[crate::domain::entities::Role::Admin, crate::domain::entities::Role::LeadGuide])"
)]
pub async fn delete_tour(path: web::Path<String>) -> Result<HttpResponse, AppError> {
    factory::delete_one::<Tour>(&path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(fields: &[(&str, &str)]) -> MultipartForm {
        MultipartForm {
            fields: fields.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            files: vec![
                UploadedFile { field: "imageCover".into(), content_type: Some("image/jpeg".into()), bytes: vec![1] },
                UploadedFile { field: "images".into(), content_type: Some("image/jpeg".into()), bytes: vec![2] },
            ],
        }
    }

    #[test]
    fn test_invalid_fields_keep_images_out_of_storage() {
        let mut form = form(&[("name", "Short"), ("price", "497")]);

        assert!(matches!(tour_update_from_form(&mut form), Err(AppError::ValidationError(_))));
        assert_eq!(form.files.len(), 2);
    }

    #[test]
    fn test_valid_fields_release_cover_and_images() {
        let mut form = form(&[("price", "497")]);

        let (request, cover, images) = tour_update_from_form(&mut form).unwrap();
        assert_eq!(request.price, Some(497.0));
        assert_eq!(cover.map(|file| file.field), Some("imageCover".to_string()));
        assert_eq!(images.len(), 1);
    }
}
