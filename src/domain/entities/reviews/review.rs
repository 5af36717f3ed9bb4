//! Review Entity
//!
//! 한 사용자는 한 투어에 리뷰를 하나만 남길 수 있습니다 (`tour`, `user` 복합 고유 인덱스).

use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::options::IndexOptions;
use mongodb::IndexModel;
use serde::{Deserialize, Serialize};

use crate::core::errors::{AppError, AppResult};
use crate::domain::entities::entity::{Entity, Population};
use crate::domain::entities::users::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub review: String,
    pub rating: f64,
    #[serde(default = "DateTime::now")]
    pub created_at: DateTime,
    pub tour: ObjectId,
    pub user: ObjectId,
}

impl Review {
    pub fn new(review: String, rating: f64, tour: ObjectId, user: ObjectId) -> Self {
        Self {
            id: None,
            review,
            rating,
            created_at: DateTime::now(),
            tour,
            user,
        }
    }
}

impl Entity for Review {
    const COLLECTION: &'static str = "reviews";
    const LABEL: &'static str = "review";

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn before_save(&mut self) {
        self.review = self.review.trim().to_string();
    }

    fn validate(&self) -> AppResult<()> {
        if self.review.trim().is_empty() {
            return Err(AppError::ValidationError("Invalid input data. Review can not be empty!".to_string()));
        }
        if !(1.0..=5.0).contains(&self.rating) {
            return Err(AppError::ValidationError("Invalid input data. Rating must be between 1 and 5".to_string()));
        }
        Ok(())
    }

    /// 리뷰를 다른 투어나 작성자로 옮길 수 없습니다.
    fn protected_fields() -> &'static [&'static str] {
        &["_id", "tour", "user", "createdAt"]
    }

    fn populations() -> Vec<Population> {
        vec![Population::reference("user", User::COLLECTION, doc! { "name": 1, "photo": 1 }).single()]
    }

    fn indexes() -> Vec<IndexModel> {
        vec![IndexModel::builder()
            .keys(doc! { "tour": 1, "user": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build()]
    }
}
