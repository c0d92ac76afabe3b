use crate::coerce::{as_u32, coerce_timestamp};
use chrono::{DateTime, Utc};
use serde::Serialize;
use store::RawDocument;

/// A customer review of a product/order.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: String,
    pub customer: String,
    pub product: Option<String>,
    /// 1..=5 stars. `None` when the stored value does not parse; such
    /// reviews are listed but never match a star filter.
    pub rating: Option<u8>,
    pub comment: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Review {
    pub fn from_raw(raw: &RawDocument) -> Self {
        let rating = raw
            .get("rating")
            .and_then(as_u32)
            .filter(|r| (1..=5).contains(r))
            .map(|r| r as u8);

        Self {
            id: raw.id.clone(),
            customer: raw.str_field("customer").unwrap_or_default().to_string(),
            product: raw.str_field("product").map(str::to_string),
            rating,
            comment: raw.str_field("comment").unwrap_or_default().to_string(),
            created_at: raw.get("time").and_then(coerce_timestamp),
        }
    }
}
