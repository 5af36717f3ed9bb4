//! # 예약 DTO (관리자용)

use mongodb::bson::Document;
use serde::Deserialize;
use validator::Validate;

use crate::core::errors::AppResult;
use crate::domain::dto::common::{IntoUpdate, UpdateDocument};
use crate::domain::entities::bookings::Booking;
use crate::utils::string_utils::parse_object_id;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub tour: String,
    pub user: String,

    #[validate(range(min = 0.0, message = "Booking must have a price."))]
    pub price: f64,

    #[serde(default = "default_paid")]
    pub paid: bool,
}

fn default_paid() -> bool {
    true
}

impl CreateBookingRequest {
    pub fn into_entity(self) -> AppResult<Booking> {
        Ok(Booking::new(
            parse_object_id(&self.tour)?,
            parse_object_id(&self.user)?,
            self.price,
            self.paid,
        ))
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateBookingRequest {
    #[validate(range(min = 0.0, message = "Booking must have a price."))]
    pub price: Option<f64>,

    pub paid: Option<bool>,
}

impl IntoUpdate for UpdateBookingRequest {
    fn into_update(self) -> AppResult<Document> {
        Ok(UpdateDocument::new()
            .set("price", self.price)?
            .set("paid", self.paid)?
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_booking_parses_refs() {
        let request: CreateBookingRequest = serde_json::from_value(serde_json::json!({
            "tour": "5c88fa8cf4afda39709c2955",
            "user": "5c8a1d5b0190b214360dc057",
            "price": 497,
        }))
        .unwrap();

        let booking = request.into_entity().unwrap();
        assert!(booking.paid);
        assert_eq!(booking.tour.to_hex(), "5c88fa8cf4afda39709c2955");
    }
}
