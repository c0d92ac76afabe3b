use crate::coerce::{self, as_f64, as_u32, coerce_timestamp};
use chrono::{DateTime, Utc};
use serde::Serialize;
use store::RawDocument;

/// A platform user as the dashboard sees them.
#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Lifetime order count; drives the first-time/repeat segmentation.
    pub order_count: u32,
    /// Lifetime spend / wallet balance.
    pub spent: f64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub photo_url: Option<String>,
}

impl Customer {
    pub fn from_raw(raw: &RawDocument) -> Self {
        let order_count = raw.get("orders").and_then(as_u32).unwrap_or_else(|| {
            coerce::defaulted(&raw.id, "orders");
            0
        });
        let spent = raw.get("spent").and_then(as_f64).unwrap_or_else(|| {
            coerce::defaulted(&raw.id, "spent");
            0.0
        });

        Self {
            id: raw.id.clone(),
            name: raw.str_field("name").unwrap_or_default().to_string(),
            email: raw.str_field("email").map(str::to_string),
            phone: raw.str_field("phone").map(str::to_string),
            address: raw.str_field("address").map(str::to_string),
            order_count,
            spent,
            created_at: raw.get("created_at").and_then(coerce_timestamp),
            updated_at: raw.get("updated_at").and_then(coerce_timestamp),
            photo_url: raw.str_field("photo").map(str::to_string),
        }
    }

    /// A customer is active once they have ordered at least once.
    pub fn is_active(&self) -> bool {
        self.order_count > 0
    }
}
