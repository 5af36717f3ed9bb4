//! # 예약 서비스
//!
//! 결제 게이트웨이 없이 체크아웃 시점에 미결제 예약을 만들고,
//! 사용자가 예약한 투어 목록을 제공합니다.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::core::errors::AppResult;
use crate::core::registry::ServiceLocator;
use crate::domain::entities::{Booking, Entity};
use crate::domain::models::auth::AuthenticatedUser;
use crate::repositories::bookings::BookingRepository;
use crate::repositories::tours::TourRepository;
use crate::utils::string_utils::parse_object_id;

pub struct BookingService {
    bookings: Arc<BookingRepository>,
    tours: Arc<TourRepository>,
}

impl BookingService {
    pub fn new(bookings: Arc<BookingRepository>, tours: Arc<TourRepository>) -> Self {
        Self { bookings, tours }
    }

    pub fn instance() -> Arc<Self> {
        ServiceLocator::get::<Self>()
    }

    /// 투어 가격으로 미결제 예약을 만들고 체크아웃 세션 정보를 돌려줍니다.
    pub async fn checkout(&self, customer: &AuthenticatedUser, tour_id: &str, base_url: &str) -> AppResult<Value> {
        let tour_id = parse_object_id(tour_id)?;
        let tour = self
            .tours
            .find_entity(&tour_id)
            .await?
            .ok_or_else(TourRepository::not_found)?;

        let booking = Booking::new(tour_id, customer.user_id, tour.price, false);
        let stored = self.bookings.create(booking).await?;

        log::info!("🧾 체크아웃: user={} tour={} price={}", customer.email, tour.name, tour.price);

        Ok(json!({
            "customerEmail": customer.email,
            "successUrl": format!("{}/my-tours", base_url),
            "cancelUrl": format!("{}/tour/{}", base_url, tour.slug),
            "lineItem": {
                "name": format!("{} Tour", tour.name),
                "description": tour.summary,
                "image": format!("{}/img/tours/{}", base_url, tour.image_cover),
                "amount": tour.price,
                "quantity": 1,
            },
            "booking": Booking::present(stored),
        }))
    }

    /// 현재 사용자가 예약한 투어 목록
    pub async fn my_tours(&self, customer: &AuthenticatedUser) -> AppResult<Vec<Value>> {
        let tour_ids = self.bookings.tour_ids_for_user(&customer.user_id).await?;
        self.tours.find_by_ids(tour_ids).await
    }
}
