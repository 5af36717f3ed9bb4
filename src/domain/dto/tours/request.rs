//! # 투어 생성/수정 DTO
//!
//! 날짜는 RFC 3339 문자열, 가이드는 ObjectId hex 문자열로 받습니다.
//! 엔티티 수준 검증(이름 길이, 할인 가격 등)은 저장 직전에 [`Tour::validate`]가 담당합니다.

use chrono::{DateTime as ChronoDateTime, Utc};
use mongodb::bson::{oid::ObjectId, DateTime, Document};
use serde::Deserialize;
use validator::Validate;

use crate::core::errors::AppResult;
use crate::domain::dto::common::{IntoUpdate, UpdateDocument};
use crate::domain::entities::tours::{Difficulty, GeoLocation, Tour, DEFAULT_RATING};
use crate::utils::string_utils::parse_object_id;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTourRequest {
    #[validate(length(min = 10, max = 40, message = "A tour name must have between 10 and 40 characters"))]
    pub name: String,

    #[validate(range(min = 1, message = "A tour must have a duration"))]
    pub duration: i32,

    #[validate(range(min = 1, message = "A tour must have a group size"))]
    pub max_group_size: i32,

    pub difficulty: Difficulty,

    #[validate(range(min = 1.0, max = 5.0, message = "Rating must be between 1.0 and 5.0"))]
    pub ratings_average: Option<f64>,

    #[validate(range(min = 0.0, message = "A tour must have a price"))]
    pub price: f64,

    pub price_discount: Option<f64>,

    #[validate(length(min = 1, message = "A tour must have a description"))]
    pub summary: String,

    pub description: Option<String>,

    #[serde(default)]
    pub image_cover: String,

    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    pub start_dates: Vec<ChronoDateTime<Utc>>,

    #[serde(default)]
    pub secret_tour: bool,

    pub start_location: Option<GeoLocation>,

    #[serde(default)]
    pub locations: Vec<GeoLocation>,

    #[serde(default)]
    pub guides: Vec<String>,
}

impl CreateTourRequest {
    pub fn into_entity(self) -> AppResult<Tour> {
        let guides = parse_ids(&self.guides)?;

        Ok(Tour {
            id: None,
            name: self.name,
            slug: String::new(),
            duration: self.duration,
            max_group_size: self.max_group_size,
            difficulty: self.difficulty,
            ratings_average: self.ratings_average.unwrap_or(DEFAULT_RATING),
            ratings_quantity: 0,
            price: self.price,
            price_discount: self.price_discount,
            summary: self.summary,
            description: self.description,
            image_cover: self.image_cover,
            images: self.images,
            created_at: DateTime::now(),
            start_dates: to_bson_dates(&self.start_dates),
            secret_tour: self.secret_tour,
            start_location: self.start_location,
            locations: self.locations,
            guides,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTourRequest {
    #[validate(length(min = 10, max = 40, message = "A tour name must have between 10 and 40 characters"))]
    pub name: Option<String>,

    #[validate(range(min = 1, message = "A tour must have a duration"))]
    pub duration: Option<i32>,

    #[validate(range(min = 1, message = "A tour must have a group size"))]
    pub max_group_size: Option<i32>,

    pub difficulty: Option<Difficulty>,

    #[validate(range(min = 1.0, max = 5.0, message = "Rating must be between 1.0 and 5.0"))]
    pub ratings_average: Option<f64>,

    #[validate(range(min = 0.0, message = "A tour must have a price"))]
    pub price: Option<f64>,

    pub price_discount: Option<f64>,

    pub summary: Option<String>,

    pub description: Option<String>,

    /// 업로드 처리 후 서버가 채울 수도 있습니다.
    pub image_cover: Option<String>,

    pub images: Option<Vec<String>>,

    pub start_dates: Option<Vec<ChronoDateTime<Utc>>>,

    pub secret_tour: Option<bool>,

    pub start_location: Option<GeoLocation>,

    pub locations: Option<Vec<GeoLocation>>,

    pub guides: Option<Vec<String>>,
}

impl IntoUpdate for UpdateTourRequest {
    fn into_update(self) -> AppResult<Document> {
        let guides = match &self.guides {
            Some(ids) => Some(parse_ids(ids)?),
            None => None,
        };

        Ok(UpdateDocument::new()
            .set("name", self.name)?
            .set("duration", self.duration)?
            .set("maxGroupSize", self.max_group_size)?
            .set("difficulty", self.difficulty)?
            .set("ratingsAverage", self.ratings_average)?
            .set("price", self.price)?
            .set("priceDiscount", self.price_discount)?
            .set("summary", self.summary)?
            .set("description", self.description)?
            .set("imageCover", self.image_cover)?
            .set("images", self.images)?
            .set("startDates", self.start_dates.as_deref().map(to_bson_dates))?
            .set("secretTour", self.secret_tour)?
            .set("startLocation", self.start_location)?
            .set("locations", self.locations)?
            .set("guides", guides)?
            .build())
    }
}

fn parse_ids(ids: &[String]) -> AppResult<Vec<ObjectId>> {
    ids.iter().map(|id| parse_object_id(id)).collect()
}

fn to_bson_dates(dates: &[ChronoDateTime<Utc>]) -> Vec<DateTime> {
    dates
        .iter()
        .map(|date| DateTime::from_millis(date.timestamp_millis()))
        .collect()
}
