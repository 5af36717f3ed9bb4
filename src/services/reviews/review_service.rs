//! # 리뷰 서비스
//!
//! 리뷰 쓰기 연산 뒤에는 항상 해당 투어의 `ratingsQuantity`, `ratingsAverage`를
//! 다시 집계해 저장합니다. 같은 투어에 대한 동시 쓰기에서는 마지막 집계가 남습니다.

use std::sync::Arc;

use mongodb::bson::{doc, oid::ObjectId};
use serde_json::Value;
use validator::Validate;

use crate::core::errors::{AppError, AppResult};
use crate::core::registry::ServiceLocator;
use crate::domain::dto::common::IntoUpdate;
use crate::domain::dto::reviews::{CreateReviewRequest, UpdateReviewRequest};
use crate::domain::entities::{Entity, Review};
use crate::domain::models::auth::AuthenticatedUser;
use crate::repositories::reviews::ReviewRepository;
use crate::repositories::tours::TourRepository;
use crate::utils::string_utils::parse_object_id;

pub struct ReviewService {
    reviews: Arc<ReviewRepository>,
    tours: Arc<TourRepository>,
}

impl ReviewService {
    pub fn new(reviews: Arc<ReviewRepository>, tours: Arc<TourRepository>) -> Self {
        Self { reviews, tours }
    }

    pub fn instance() -> Arc<Self> {
        ServiceLocator::get::<Self>()
    }

    /// 작성자는 항상 현재 사용자입니다. 투어는 중첩 경로 값이 본문보다 우선합니다.
    pub async fn create(
        &self,
        author: &AuthenticatedUser,
        tour_from_path: Option<&str>,
        request: CreateReviewRequest,
    ) -> AppResult<Value> {
        request.validate()?;

        let tour_id = tour_from_path
            .map(str::to_string)
            .or_else(|| request.tour.clone())
            .ok_or_else(|| AppError::ValidationError("Invalid input data. Review must belong to a tour.".to_string()))?;
        let tour_id = parse_object_id(&tour_id)?;

        if self.tours.find_entity(&tour_id).await?.is_none() {
            return Err(TourRepository::not_found());
        }

        let stored = self
            .reviews
            .create(request.into_entity(tour_id, author.user_id))
            .await?;
        self.recompute_ratings(&tour_id).await?;

        Ok(Review::present(stored))
    }

    pub async fn update(&self, id: &str, request: UpdateReviewRequest) -> AppResult<Value> {
        request.validate()?;

        let review_id = parse_object_id(id)?;
        let existing = self
            .reviews
            .find_entity(&review_id)
            .await?
            .ok_or_else(ReviewRepository::not_found)?;

        let updated = self.reviews.update(id, request.into_update()?).await?;
        self.recompute_ratings(&existing.tour).await?;

        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let deleted = self.reviews.delete(id).await?;

        let tour = deleted
            .get_object_id("tour")
            .map_err(|e| AppError::InternalError(format!("리뷰에 투어 참조 없음: {}", e)))?;
        self.recompute_ratings(&tour).await
    }

    /// 투어의 평점 통계를 다시 계산해 저장합니다.
    pub async fn recompute_ratings(&self, tour: &ObjectId) -> AppResult<()> {
        let summary = self.reviews.rating_summary(tour).await?;

        self.tours
            .set_fields(
                tour,
                doc! {
                    "ratingsQuantity": summary.quantity,
                    "ratingsAverage": summary.average,
                },
            )
            .await?;

        log::debug!(
            "⭐ 평점 재계산: tour={} quantity={} average={}",
            tour.to_hex(),
            summary.quantity,
            summary.average
        );
        Ok(())
    }
}
