//! # User HTTP Handlers
//!
//! 로그인한 사용자의 자기 관리 엔드포인트와 관리자용 사용자 CRUD 입니다.
//!
//! | 메서드 | 경로          | 권한   |
//! |--------|---------------|--------|
//! | GET    | `/me`         | 로그인 |
//! | PATCH  | `/updateMe`   | 로그인 (JSON 또는 `photo` 멀티파트) |
//! | DELETE | `/deleteMe`   | 로그인 |
//! | GET    | ``, `/{id}`   | admin  |
//! | POST   | ``            | 항상 500 (가입은 `/signup`) |
//! | PATCH  | `/{id}`       | admin  |
//! | DELETE | `/{id}`       | admin  |

use actix_multipart::Multipart;
use actix_web::{delete, get, patch, post, web, Either, HttpResponse};
use serde_json::json;

use crate::core::errors::AppError;
use crate::domain::dto::common::ApiResponse;
use crate::domain::dto::users::request::{UpdateMeRequest, UpdateUserRequest};
use crate::domain::entities::User;
use crate::domain::models::auth::AuthenticatedUser;
use crate::handlers::factory;
use crate::handlers::multipart::MultipartForm;
use crate::services::uploads::{ImageService, UploadedFile};
use crate::services::users::UserService;

#[get("/me", wrap = "crate::middlewares::AuthMiddleware::required()")]
pub async fn get_me(user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    let me = UserService::instance().get_me(&user).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with("data", me)))
}

#[patch("/updateMe", wrap = "crate::middlewares::AuthMiddleware::required()")]
pub async fn update_me(
    user: AuthenticatedUser,
    payload: Either<web::Json<UpdateMeRequest>, Multipart>,
) -> Result<HttpResponse, AppError> {
    let (request, photo) = match payload {
        Either::Left(json) => (json.into_inner(), None),
        Either::Right(multipart) => {
            let mut form = MultipartForm::collect(multipart).await?;
            let (request, photo) = profile_update_from_form(&mut form)?;
            let photo = match photo {
                Some(file) => Some(
                    ImageService::instance()
                        .save_user_photo(&user.user_id.to_hex(), file)
                        .await?,
                ),
                None => None,
            };
            (request, photo)
        }
    };

    let updated = UserService::instance().update_me(&user, request, photo).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with("user", updated)))
}

/// 텍스트 필드를 검증한 뒤에만 `photo` 파일을 꺼냅니다. 검증에 실패하면 파일은 저장되지 않습니다.
fn profile_update_from_form(form: &mut MultipartForm) -> Result<(UpdateMeRequest, Option<UploadedFile>), AppError> {
    let request: UpdateMeRequest = form.into_dto(false)?;
    UserService::check_profile_update(&request)?;
    Ok((request, form.take_file("photo")))
}

#[delete("/deleteMe", wrap = "crate::middlewares::AuthMiddleware::required()")]
pub async fn delete_me(user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    UserService::instance().delete_me(&user).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get(
    "",
    wrap = "crate::middlewares::AuthMiddleware::required_with_role(crate::domain::entities::Role::Admin)"
)]
pub async fn get_all_users(query: web::Query<Vec<(String, String)>>) -> Result<HttpResponse, AppError> {
    factory::get_all::<User>(&query, None).await
}

/// 관리자도 이 경로로 계정을 만들 수 없습니다.
#[post(
    "",
    wrap = "crate::middlewares::AuthMiddleware::required_with_role(crate::domain::entities::Role::Admin)"
)]
pub async fn create_user() -> HttpResponse {
    HttpResponse::InternalServerError().json(json!({
        "status": "error",
        "message": "This route is not defined! Please use /signup instead"
    }))
}

#[get(
    "/{id}",
    wrap = "crate::middlewares::AuthMiddleware::required_with_role(crate::domain::entities::Role::Admin)"
)]
pub async fn get_user(path: web::Path<String>) -> Result<HttpResponse, AppError> {
    factory::get_one::<User>(&path, Vec::new()).await
}

#[patch(
    "/{id}",
    wrap = "crate::middlewares::AuthMiddleware::required_with_role(crate::domain::entities::Role::Admin)"
)]
pub async fn update_user(
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let updated = UserService::instance()
        .update_user(&path, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with("data", updated)))
}

#[delete(
    "/{id}",
    wrap = "crate::middlewares::AuthMiddleware::required_with_role(crate::domain::entities::Role::Admin)"
)]
pub async fn delete_user(path: web::Path<String>) -> Result<HttpResponse, AppError> {
    factory::delete_one::<User>(&path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_with_photo(fields: &[(&str, &str)]) -> MultipartForm {
        MultipartForm {
            fields: fields.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            files: vec![UploadedFile { field: "photo".into(), content_type: Some("image/jpeg".into()), bytes: vec![0xFF, 0xD8] }],
        }
    }

    #[test]
    fn test_password_field_rejected_before_photo_is_taken() {
        let mut form = form_with_photo(&[("name", "Jonas"), ("password", "newpass123")]);

        assert!(matches!(profile_update_from_form(&mut form), Err(AppError::ValidationError(_))));
        assert_eq!(form.files.len(), 1);
    }

    #[test]
    fn test_valid_form_hands_over_photo() {
        let mut form = form_with_photo(&[("name", "Jonas")]);

        let (request, photo) = profile_update_from_form(&mut form).unwrap();
        assert_eq!(request.name.as_deref(), Some("Jonas"));
        assert!(photo.is_some());
        assert!(form.files.is_empty());
    }
}
