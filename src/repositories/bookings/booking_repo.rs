//! 예약 리포지토리

use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};

use crate::core::errors::AppResult;
use crate::domain::entities::bookings::Booking;
use crate::repositories::crud::CrudRepository;

pub type BookingRepository = CrudRepository<Booking>;

impl CrudRepository<Booking> {
    /// 사용자가 예약한 투어 ID 목록 (중복 제거)
    pub async fn tour_ids_for_user(&self, user: &ObjectId) -> AppResult<Vec<ObjectId>> {
        let bookings: Vec<Booking> = self
            .collection()
            .find(doc! { "user": *user })
            .await?
            .try_collect()
            .await?;

        let mut tours: Vec<ObjectId> = Vec::with_capacity(bookings.len());
        for booking in bookings {
            if !tours.contains(&booking.tour) {
                tours.push(booking.tour);
            }
        }
        Ok(tours)
    }
}
