//! 투어 리포지토리

use mongodb::bson::{doc, oid::ObjectId};
use serde_json::Value;

use crate::core::errors::AppResult;
use crate::domain::entities::tours::Tour;
use crate::domain::models::query::QueryFeatures;
use crate::repositories::crud::CrudRepository;

pub type TourRepository = CrudRepository<Tour>;

impl CrudRepository<Tour> {
    /// 상세 페이지용 조회. 가이드와 리뷰(작성자 포함)를 함께 채웁니다.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Value>> {
        self.find_one_by(doc! { "slug": slug }, vec![Tour::review_population()])
            .await
    }

    /// 주어진 ID 목록에 해당하는 투어 (비밀 투어 제외)
    pub async fn find_by_ids(&self, ids: Vec<ObjectId>) -> AppResult<Vec<Value>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.find_all(&QueryFeatures::default(), Some(doc! { "_id": { "$in": ids } }))
            .await
    }
}
