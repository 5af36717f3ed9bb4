//! # 리뷰 DTO

use mongodb::bson::{oid::ObjectId, Document};
use serde::Deserialize;
use validator::Validate;

use crate::core::errors::AppResult;
use crate::domain::dto::common::{IntoUpdate, UpdateDocument};
use crate::domain::entities::reviews::Review;
use crate::utils::string_utils::deserialize_optional_string;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Review can not be empty!"))]
    pub review: String,

    #[validate(range(min = 1.0, max = 5.0, message = "Rating must be between 1 and 5"))]
    pub rating: f64,

    /// 중첩 라우트(`/tours/{id}/reviews`)에서는 경로 값이 우선합니다.
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub tour: Option<String>,
}

impl CreateReviewRequest {
    pub fn into_entity(self, tour: ObjectId, user: ObjectId) -> Review {
        Review::new(self.review, self.rating, tour, user)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateReviewRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(length(min = 1, message = "Review can not be empty!"))]
    pub review: Option<String>,

    #[validate(range(min = 1.0, max = 5.0, message = "Rating must be between 1 and 5"))]
    pub rating: Option<f64>,
}

impl IntoUpdate for UpdateReviewRequest {
    fn into_update(self) -> AppResult<Document> {
        Ok(UpdateDocument::new()
            .set("review", self.review)?
            .set("rating", self.rating)?
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_out_of_range() {
        let request: CreateReviewRequest =
            serde_json::from_value(serde_json::json!({ "review": "Meh", "rating": 6 })).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_into_entity_uses_given_refs() {
        let request: CreateReviewRequest =
            serde_json::from_value(serde_json::json!({ "review": "Amazing!", "rating": 5 })).unwrap();
        let (tour, user) = (ObjectId::new(), ObjectId::new());

        let review = request.into_entity(tour, user);
        assert_eq!(review.tour, tour);
        assert_eq!(review.user, user);
        assert_eq!(review.rating, 5.0);
    }
}
