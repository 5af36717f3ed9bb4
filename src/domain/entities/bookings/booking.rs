//! Booking Entity

use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::IndexModel;
use serde::{Deserialize, Serialize};

use crate::core::errors::{AppError, AppResult};
use crate::domain::entities::entity::{exclusion, Entity, Population};
use crate::domain::entities::tours::Tour;
use crate::domain::entities::users::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub tour: ObjectId,
    pub user: ObjectId,
    pub price: f64,
    #[serde(default = "DateTime::now")]
    pub created_at: DateTime,
    #[serde(default = "default_paid")]
    pub paid: bool,
}

fn default_paid() -> bool {
    true
}

impl Booking {
    pub fn new(tour: ObjectId, user: ObjectId, price: f64, paid: bool) -> Self {
        Self {
            id: None,
            tour,
            user,
            price,
            created_at: DateTime::now(),
            paid,
        }
    }
}

impl Entity for Booking {
    const COLLECTION: &'static str = "bookings";
    const LABEL: &'static str = "booking";

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn validate(&self) -> AppResult<()> {
        if self.price < 0.0 {
            return Err(AppError::ValidationError("Invalid input data. Booking must have a price.".to_string()));
        }
        Ok(())
    }

    fn populations() -> Vec<Population> {
        vec![
            Population::reference("user", User::COLLECTION, exclusion(User::hidden_fields())).single(),
            Population::reference("tour", Tour::COLLECTION, doc! { "name": 1 }).single(),
        ]
    }

    fn indexes() -> Vec<IndexModel> {
        vec![IndexModel::builder().keys(doc! { "user": 1, "createdAt": -1 }).build()]
    }
}
