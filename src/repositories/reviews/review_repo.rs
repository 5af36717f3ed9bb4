//! 리뷰 리포지토리
//!
//! 투어별 평점 집계를 담당합니다. 집계 결과는 [`RatingSummary`]로 정규화되어
//! 투어의 `ratingsAverage`, `ratingsQuantity`에 반영됩니다.

use mongodb::bson::{doc, oid::ObjectId, Document};

use crate::core::errors::AppResult;
use crate::domain::entities::reviews::Review;
use crate::domain::entities::tours::{Tour, DEFAULT_RATING};
use crate::repositories::crud::CrudRepository;

pub type ReviewRepository = CrudRepository<Review>;

/// 한 투어의 리뷰 집계
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    pub average: f64,
    pub quantity: i32,
}

impl Default for RatingSummary {
    /// 리뷰가 하나도 없을 때의 값
    fn default() -> Self {
        Self {
            average: DEFAULT_RATING,
            quantity: 0,
        }
    }
}

impl RatingSummary {
    /// `$group` 결과 문서를 해석합니다. 결과가 없거나 개수가 0이면 기본값입니다.
    pub fn from_group(group: Option<&Document>) -> Self {
        let Some(group) = group else {
            return Self::default();
        };

        let quantity = match group.get("nRating") {
            Some(mongodb::bson::Bson::Int32(n)) => *n,
            Some(mongodb::bson::Bson::Int64(n)) => i32::try_from(*n).unwrap_or(i32::MAX),
            _ => 0,
        };
        if quantity == 0 {
            return Self::default();
        }

        let average = group.get_f64("avgRating").unwrap_or(DEFAULT_RATING);
        Self {
            average: Tour::normalize_rating(average),
            quantity,
        }
    }
}

/// 투어 하나의 리뷰 개수와 평균을 구하는 파이프라인
pub fn rating_pipeline(tour: &ObjectId) -> Vec<Document> {
    vec![
        doc! { "$match": { "tour": *tour } },
        doc! {
            "$group": {
                "_id": "$tour",
                "nRating": { "$sum": 1 },
                "avgRating": { "$avg": "$rating" },
            }
        },
    ]
}

impl CrudRepository<Review> {
    pub async fn rating_summary(&self, tour: &ObjectId) -> AppResult<RatingSummary> {
        let groups = self.aggregate(rating_pipeline(tour)).await?;
        Ok(RatingSummary::from_group(groups.first()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_reviews_resets_to_default() {
        assert_eq!(RatingSummary::from_group(None), RatingSummary::default());
        assert_eq!(RatingSummary::default().average, 4.5);
    }

    #[test]
    fn test_average_is_rounded_to_one_decimal() {
        let group = doc! { "_id": ObjectId::new(), "nRating": 3, "avgRating": 4.666_666 };
        let summary = RatingSummary::from_group(Some(&group));
        assert_eq!(summary, RatingSummary { average: 4.7, quantity: 3 });
    }

    #[test]
    fn test_pipeline_matches_tour() {
        let tour = ObjectId::new();
        let pipeline = rating_pipeline(&tour);
        assert_eq!(pipeline[0], doc! { "$match": { "tour": tour } });
        assert!(pipeline[1].get_document("$group").unwrap().contains_key("avgRating"));
    }
}
