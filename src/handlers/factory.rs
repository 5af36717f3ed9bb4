//! # 제네릭 CRUD 핸들러
//!
//! 엔티티 타입만 바꿔 재사용하는 목록/단건/생성/수정/삭제 응답 생성기입니다.
//! 라우트 핸들러는 경로와 권한을 정하고 나머지는 여기에 위임합니다.
//!
//! | 연산         | 상태 코드 | 응답 본문                                      |
//! |--------------|-----------|------------------------------------------------|
//! | `get_all`    | 200       | `{status, results, data: {data: [...]}}`       |
//! | `get_one`    | 200       | `{status, data: {data}}`                       |
//! | `create_one` | 201       | `{status, data: {data}}`                       |
//! | `update_one` | 200       | `{status, data: {data}}`                       |
//! | `delete_one` | 204       | (없음)                                         |

use actix_web::HttpResponse;
use mongodb::bson::Document;

use crate::core::errors::AppResult;
use crate::domain::dto::common::ApiResponse;
use crate::domain::entities::{Entity, Population};
use crate::domain::models::query::QueryFeatures;
use crate::repositories::crud::CrudRepository;

pub async fn get_all<E: Entity>(pairs: &[(String, String)], scope: Option<Document>) -> AppResult<HttpResponse> {
    let features = QueryFeatures::parse(pairs, E::multi_value_fields())?;
    let documents = CrudRepository::<E>::instance().find_all(&features, scope).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::list("data", documents)))
}

pub async fn get_one<E: Entity>(id: &str, extra: Vec<Population>) -> AppResult<HttpResponse> {
    let document = CrudRepository::<E>::instance().find_one(id, extra).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with("data", document)))
}

pub async fn create_one<E: Entity>(entity: E) -> AppResult<HttpResponse> {
    let stored = CrudRepository::<E>::instance().create(entity).await?;
    Ok(HttpResponse::Created().json(ApiResponse::with("data", E::present(stored))))
}

pub async fn update_one<E: Entity>(id: &str, patch: Document) -> AppResult<HttpResponse> {
    let document = CrudRepository::<E>::instance().update(id, patch).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with("data", document)))
}

pub async fn delete_one<E: Entity>(id: &str) -> AppResult<HttpResponse> {
    CrudRepository::<E>::instance().delete(id).await?;
    Ok(HttpResponse::NoContent().finish())
}
