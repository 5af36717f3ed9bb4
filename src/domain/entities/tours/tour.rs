//! Tour Entity
//!
//! slug 는 이름에서, `durationWeeks` 는 기간에서 파생됩니다.
//! 평점 평균은 항상 1~5 범위로 잘리고 소수 첫째 자리로 반올림되어 저장됩니다.

use mongodb::bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use mongodb::IndexModel;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::errors::{AppError, AppResult};
use crate::domain::entities::entity::{exclusion, Entity, Population};
use crate::domain::entities::reviews::Review;
use crate::domain::entities::users::User;
use crate::utils::string_utils::{round_to_tenth, slugify};

pub const DEFAULT_RATING: f64 = 4.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Difficult,
}

/// GeoJSON Point. 좌표 순서는 `[경도, 위도]` 입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    #[serde(rename = "type", default = "point_type")]
    pub kind: String,
    pub coordinates: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<i32>,
}

fn point_type() -> String {
    "Point".to_string()
}

impl GeoLocation {
    fn is_valid(&self) -> bool {
        self.kind == "Point"
            && self.coordinates.len() == 2
            && (-180.0..=180.0).contains(&self.coordinates[0])
            && (-90.0..=90.0).contains(&self.coordinates[1])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    pub duration: i32,
    pub max_group_size: i32,
    pub difficulty: Difficulty,
    #[serde(default = "default_rating")]
    pub ratings_average: f64,
    #[serde(default)]
    pub ratings_quantity: i32,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_discount: Option<f64>,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub image_cover: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "DateTime::now")]
    pub created_at: DateTime,
    #[serde(default)]
    pub start_dates: Vec<DateTime>,
    #[serde(default)]
    pub secret_tour: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_location: Option<GeoLocation>,
    #[serde(default)]
    pub locations: Vec<GeoLocation>,
    #[serde(default)]
    pub guides: Vec<ObjectId>,
}

fn default_rating() -> f64 {
    DEFAULT_RATING
}

impl Tour {
    /// 평점 평균을 저장 가능한 값으로 정규화합니다.
    pub fn normalize_rating(value: f64) -> f64 {
        round_to_tenth(value.clamp(1.0, 5.0))
    }

    pub fn duration_weeks(duration: f64) -> f64 {
        duration / 7.0
    }

    /// 단건 조회 시 함께 내려주는 리뷰 목록 (작성자 포함)
    pub fn review_population() -> Population {
        Population {
            from: Review::COLLECTION,
            local_field: "_id",
            foreign_field: "tour",
            as_field: "reviews",
            select: doc! { "__v": 0 },
            filter: Document::new(),
            single: false,
            nested: Vec::new(),
        }
        .with_nested(Review::populations())
    }
}

impl Entity for Tour {
    const COLLECTION: &'static str = "tours";
    const LABEL: &'static str = "tour";

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn before_save(&mut self) {
        self.name = self.name.trim().to_string();
        self.summary = self.summary.trim().to_string();
        self.slug = slugify(&self.name);
        self.ratings_average = Self::normalize_rating(self.ratings_average);
    }

    fn validate(&self) -> AppResult<()> {
        let mut problems: Vec<&str> = Vec::new();

        let name_len = self.name.trim().chars().count();
        if name_len < 10 {
            problems.push("A tour name must have more or equal then 10 characters");
        }
        if name_len > 40 {
            problems.push("A tour name must have less or equal then 40 characters");
        }
        if self.duration <= 0 {
            problems.push("A tour must have a duration");
        }
        if self.max_group_size <= 0 {
            problems.push("A tour must have a group size");
        }
        if !(1.0..=5.0).contains(&self.ratings_average) {
            problems.push("Rating must be between 1.0 and 5.0");
        }
        if self.price < 0.0 {
            problems.push("A tour must have a price");
        }
        if let Some(discount) = self.price_discount {
            if discount >= self.price {
                problems.push("Discount price should be below regular price");
            }
        }
        if self.summary.trim().is_empty() {
            problems.push("A tour must have a description");
        }
        if self.image_cover.trim().is_empty() {
            problems.push("A tour must have a cover image");
        }
        let invalid_location = self
            .start_location
            .iter()
            .chain(self.locations.iter())
            .any(|location| !location.is_valid());
        if invalid_location {
            problems.push("Locations must be GeoJSON points [lng, lat]");
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AppError::ValidationError(format!("Invalid input data. {}", problems.join(". "))))
        }
    }

    /// 비밀 투어는 기본 조회에서 제외됩니다.
    fn default_filter() -> Document {
        doc! { "secretTour": { "$ne": true } }
    }

    fn derived_fields() -> &'static [&'static str] {
        &["slug", "ratingsAverage"]
    }

    fn protected_fields() -> &'static [&'static str] {
        &["_id", "ratingsQuantity", "createdAt"]
    }

    fn multi_value_fields() -> &'static [&'static str] {
        &["duration", "ratingsQuantity", "ratingsAverage", "maxGroupSize", "difficulty", "price"]
    }

    fn populations() -> Vec<Population> {
        vec![Population::reference("guides", User::COLLECTION, exclusion(User::hidden_fields()))
            .filtered(User::default_filter())]
    }

    fn indexes() -> Vec<IndexModel> {
        vec![
            IndexModel::builder()
                .keys(doc! { "name": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
            IndexModel::builder().keys(doc! { "price": 1, "ratingsAverage": -1 }).build(),
            IndexModel::builder().keys(doc! { "slug": 1 }).build(),
            IndexModel::builder().keys(doc! { "startLocation": "2dsphere" }).build(),
        ]
    }

    fn decorate(fields: &mut Map<String, Value>) {
        if let Some(duration) = fields.get("duration").and_then(Value::as_f64) {
            fields.insert("durationWeeks".to_string(), Value::from(Self::duration_weeks(duration)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;

    pub(crate) fn forest_hiker() -> Tour {
        serde_json::from_value(serde_json::json!({
            "name": "The Forest Hiker",
            "duration": 5,
            "maxGroupSize": 25,
            "difficulty": "easy",
            "price": 397,
            "summary": "  Breathtaking hike through the Canadian Banff National Park  ",
            "imageCover": "tour-1-cover.jpg"
        }))
        .unwrap()
    }

    #[test]
    fn test_defaults_for_new_tour() {
        let tour = forest_hiker();
        assert_eq!(tour.ratings_average, DEFAULT_RATING);
        assert_eq!(tour.ratings_quantity, 0);
        assert!(!tour.secret_tour);
        assert!(tour.images.is_empty());
    }

    #[test]
    fn test_before_save_derives_slug_and_trims() {
        let mut tour = forest_hiker();
        tour.ratings_average = 4.666_7;
        tour.before_save();

        assert_eq!(tour.slug, "the-forest-hiker");
        assert_eq!(tour.ratings_average, 4.7);
        assert!(tour.summary.starts_with("Breathtaking"));
        assert!(tour.validate().is_ok());
    }

    #[test]
    fn test_rating_is_clamped() {
        assert_eq!(Tour::normalize_rating(7.2), 5.0);
        assert_eq!(Tour::normalize_rating(0.2), 1.0);
    }

    #[test]
    fn test_discount_must_be_below_price() {
        let mut tour = forest_hiker();
        tour.price_discount = Some(397.0);

        let err = tour.validate().unwrap_err();
        assert!(err.client_message().contains("Discount price should be below regular price"));

        tour.price_discount = Some(100.0);
        assert!(tour.validate().is_ok());
    }

    #[test]
    fn test_name_length_bounds() {
        let mut tour = forest_hiker();
        tour.name = "Short".into();
        assert!(tour.validate().is_err());

        tour.name = "A".repeat(41);
        assert!(tour.validate().is_err());
    }

    #[test]
    fn test_invalid_difficulty_is_rejected_at_deserialization() {
        let result: Result<Tour, _> = serde_json::from_value(serde_json::json!({
            "name": "The Forest Hiker",
            "duration": 5,
            "maxGroupSize": 25,
            "difficulty": "extreme",
            "price": 397,
            "summary": "x",
            "imageCover": "x.jpg"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_presented_tour_has_duration_weeks() {
        let mut tour = forest_hiker();
        tour.duration = 14;
        let json = Tour::present(bson::to_document(&tour).unwrap());

        assert_eq!(json["durationWeeks"], 2.0);
    }

    #[test]
    fn test_secret_tours_are_filtered_by_default() {
        assert_eq!(Tour::default_filter(), doc! { "secretTour": { "$ne": true } });
    }

    #[test]
    fn test_geo_location_validation() {
        let mut tour = forest_hiker();
        tour.start_location = Some(GeoLocation {
            kind: "Point".into(),
            coordinates: vec![-80.185942, 25.774772],
            address: Some("301 Biscayne Blvd, Miami, FL 33132, USA".into()),
            description: Some("Miami, USA".into()),
            day: None,
        });
        assert!(tour.validate().is_ok());

        tour.locations.push(GeoLocation {
            kind: "Point".into(),
            coordinates: vec![25.0],
            address: None,
            description: None,
            day: Some(1),
        });
        assert!(tour.validate().is_err());
    }
}
