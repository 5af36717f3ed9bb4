//! # 투어 분석 서비스
//!
//! 집계 파이프라인으로 계산하는 읽기 전용 엔드포인트를 담당합니다.
//!
//! | 연산            | 파이프라인                                                  |
//! |-----------------|-------------------------------------------------------------|
//! | `tour_stats`    | `$match(평점 ≥ 4.5)` → `$group(난이도)` → `$sort(avgPrice)`  |
//! | `monthly_plan`  | `$unwind(startDates)` → `$match(연도)` → `$group(월)`        |
//! | `tours_within`  | `startLocation $geoWithin $centerSphere`                    |
//! | `distances`     | `$geoNear` (반드시 첫 단계)                                  |
//!
//! 비밀 투어는 모든 파이프라인에서 제외됩니다.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use mongodb::bson::{doc, DateTime, Document};
use serde_json::Value;

use crate::core::errors::{AppError, AppResult};
use crate::core::registry::ServiceLocator;
use crate::domain::entities::{Entity, Tour};
use crate::domain::models::query::QueryFeatures;
use crate::repositories::tours::TourRepository;
use crate::utils::bson_json::document_to_json;
use crate::utils::string_utils::parse_object_id;

const EARTH_RADIUS_MI: f64 = 3963.2;
const EARTH_RADIUS_KM: f64 = 6378.1;
const METERS_TO_MILES: f64 = 0.000621371;
const METERS_TO_KM: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceUnit {
    Miles,
    Kilometers,
}

impl DistanceUnit {
    pub fn parse(raw: &str) -> AppResult<Self> {
        match raw {
            "mi" => Ok(Self::Miles),
            "km" => Ok(Self::Kilometers),
            other => Err(AppError::ValidationError(format!(
                "Invalid unit: {}. Please use mi or km.",
                other
            ))),
        }
    }

    /// 거리 → `$centerSphere` 반경(라디안)
    pub fn radians(&self, distance: f64) -> f64 {
        match self {
            Self::Miles => distance / EARTH_RADIUS_MI,
            Self::Kilometers => distance / EARTH_RADIUS_KM,
        }
    }

    /// `$geoNear` 결과(미터)에 곱할 값
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Miles => METERS_TO_MILES,
            Self::Kilometers => METERS_TO_KM,
        }
    }
}

/// `"lat,lng"` → `(lat, lng)`
pub fn parse_lat_lng(raw: &str) -> AppResult<(f64, f64)> {
    let invalid = || {
        AppError::ValidationError("Please provide latitude and longitude in the format lat,lng.".to_string())
    };

    let (lat, lng) = raw.split_once(',').ok_or_else(invalid)?;
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let lng: f64 = lng.trim().parse().map_err(|_| invalid())?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(invalid());
    }
    Ok((lat, lng))
}

pub fn parse_distance(raw: &str) -> AppResult<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| AppError::ValidationError(format!("Invalid distance: {}.", raw)))
}

pub fn parse_year(raw: &str) -> AppResult<i32> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|year| (1970..=9999).contains(year))
        .ok_or_else(|| AppError::ValidationError(format!("Invalid year: {}.", raw)))
}

pub fn stats_pipeline() -> Vec<Document> {
    vec![
        doc! { "$match": Tour::default_filter() },
        doc! { "$match": { "ratingsAverage": { "$gte": 4.5 } } },
        doc! {
            "$group": {
                "_id": { "$toUpper": "$difficulty" },
                "numTours": { "$sum": 1 },
                "numRatings": { "$sum": "$ratingsQuantity" },
                "avgRating": { "$avg": "$ratingsAverage" },
                "avgPrice": { "$avg": "$price" },
                "minPrice": { "$min": "$price" },
                "maxPrice": { "$max": "$price" },
            }
        },
        doc! { "$sort": { "avgPrice": 1 } },
    ]
}

/// 해당 연도(UTC)에 시작하는 일정을 월별로 묶습니다.
pub fn monthly_plan_pipeline(year: i32) -> AppResult<Vec<Document>> {
    let start = year_start(year)?;
    let end = year_start(year + 1)?;

    Ok(vec![
        doc! { "$match": Tour::default_filter() },
        doc! { "$unwind": "$startDates" },
        doc! { "$match": { "startDates": { "$gte": start, "$lt": end } } },
        doc! {
            "$group": {
                "_id": { "$month": "$startDates" },
                "numTourStarts": { "$sum": 1 },
                "tours": { "$push": "$name" },
            }
        },
        doc! { "$addFields": { "month": "$_id" } },
        doc! { "$project": { "_id": 0 } },
        doc! { "$sort": { "numTourStarts": -1, "month": 1 } },
        doc! { "$limit": 12 },
    ])
}

fn year_start(year: i32) -> AppResult<DateTime> {
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .map(|start| DateTime::from_millis(start.timestamp_millis()))
        .ok_or_else(|| AppError::ValidationError(format!("Invalid year: {}.", year)))
}

pub fn within_filter(distance: f64, lat: f64, lng: f64, unit: DistanceUnit) -> Document {
    doc! {
        "startLocation": {
            "$geoWithin": { "$centerSphere": [[lng, lat], unit.radians(distance)] }
        }
    }
}

pub fn distances_pipeline(lat: f64, lng: f64, unit: DistanceUnit) -> Vec<Document> {
    vec![
        doc! {
            "$geoNear": {
                "near": { "type": "Point", "coordinates": [lng, lat] },
                "distanceField": "distance",
                "distanceMultiplier": unit.multiplier(),
                "query": Tour::default_filter(),
            }
        },
        doc! { "$project": { "distance": 1, "name": 1 } },
    ]
}

pub struct TourService {
    tours: Arc<TourRepository>,
}

impl TourService {
    pub fn new(tours: Arc<TourRepository>) -> Self {
        Self { tours }
    }

    pub fn instance() -> Arc<Self> {
        ServiceLocator::get::<Self>()
    }

    /// 기본 조회 조건으로 보이는 투어가 없으면 404
    pub async fn ensure_exists(&self, id: &str) -> AppResult<()> {
        let object_id = parse_object_id(id)?;
        self.tours
            .find_entity(&object_id)
            .await?
            .map(|_| ())
            .ok_or_else(TourRepository::not_found)
    }

    pub async fn tour_stats(&self) -> AppResult<Vec<Value>> {
        let stats = self.tours.aggregate(stats_pipeline()).await?;
        Ok(stats.into_iter().map(document_to_json).collect())
    }

    pub async fn monthly_plan(&self, year: &str) -> AppResult<Vec<Value>> {
        let pipeline = monthly_plan_pipeline(parse_year(year)?)?;
        let plan = self.tours.aggregate(pipeline).await?;
        Ok(plan.into_iter().map(document_to_json).collect())
    }

    pub async fn tours_within(&self, distance: &str, latlng: &str, unit: &str) -> AppResult<Vec<Value>> {
        let distance = parse_distance(distance)?;
        let (lat, lng) = parse_lat_lng(latlng)?;
        let unit = DistanceUnit::parse(unit)?;

        self.tours
            .find_all(&QueryFeatures::default(), Some(within_filter(distance, lat, lng, unit)))
            .await
    }

    pub async fn distances(&self, latlng: &str, unit: &str) -> AppResult<Vec<Value>> {
        let (lat, lng) = parse_lat_lng(latlng)?;
        let unit = DistanceUnit::parse(unit)?;

        let distances = self.tours.aggregate(distances_pipeline(lat, lng, unit)).await?;
        Ok(distances.into_iter().map(document_to_json).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lat_lng() {
        assert_eq!(parse_lat_lng("34.111745,-118.113491").unwrap(), (34.111745, -118.113491));
        assert!(parse_lat_lng("34.1").is_err());
        assert!(parse_lat_lng("abc,def").is_err());
        assert!(parse_lat_lng("120,10").is_err());
    }

    #[test]
    fn test_unit_radius_and_multiplier() {
        let mi = DistanceUnit::parse("mi").unwrap();
        let km = DistanceUnit::parse("km").unwrap();

        assert!((mi.radians(3963.2) - 1.0).abs() < 1e-9);
        assert!((km.radians(6378.1) - 1.0).abs() < 1e-9);
        assert_eq!(mi.multiplier(), 0.000621371);
        assert_eq!(km.multiplier(), 0.001);
        assert!(DistanceUnit::parse("ft").is_err());
    }

    #[test]
    fn test_within_filter_uses_lng_lat_order() {
        let filter = within_filter(233.0, 34.1, -118.1, DistanceUnit::Miles);
        let sphere = filter
            .get_document("startLocation")
            .unwrap()
            .get_document("$geoWithin")
            .unwrap()
            .get_array("$centerSphere")
            .unwrap();

        let center = sphere[0].as_array().unwrap();
        assert_eq!(center[0].as_f64(), Some(-118.1));
        assert_eq!(center[1].as_f64(), Some(34.1));
    }

    #[test]
    fn test_geo_near_is_first_stage() {
        let pipeline = distances_pipeline(34.1, -118.1, DistanceUnit::Kilometers);
        let geo_near = pipeline[0].get_document("$geoNear").unwrap();

        assert_eq!(geo_near.get_f64("distanceMultiplier").unwrap(), 0.001);
        assert_eq!(geo_near.get_document("query").unwrap(), &Tour::default_filter());
    }

    #[test]
    fn test_monthly_plan_bounds_year() {
        let pipeline = monthly_plan_pipeline(2021).unwrap();
        let range = pipeline[2]
            .get_document("$match")
            .unwrap()
            .get_document("startDates")
            .unwrap();

        let start = range.get_datetime("$gte").unwrap();
        let end = range.get_datetime("$lt").unwrap();
        assert_eq!(start.timestamp_millis(), 1_609_459_200_000);
        assert_eq!(end.timestamp_millis(), 1_640_995_200_000);
        assert!(parse_year("twenty").is_err());
    }

    #[test]
    fn test_stats_excludes_secret_tours_first() {
        let pipeline = stats_pipeline();
        assert_eq!(pipeline[0], doc! { "$match": { "secretTour": { "$ne": true } } });
        assert_eq!(pipeline.last().unwrap(), &doc! { "$sort": { "avgPrice": 1 } });
    }
}
