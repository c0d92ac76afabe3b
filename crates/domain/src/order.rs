use crate::coerce::{self, as_f64, as_u32, coerce_timestamp};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use store::RawDocument;

/// Order lifecycle status, normalized case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Preparing,
    InTransit,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Preparing,
        OrderStatus::InTransit,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Preparing => "preparing",
            OrderStatus::InTransit => "in_transit",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Parse a raw status. Missing or unknown values default to
    /// `Preparing`, the state every order starts in.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("in_transit") | Some("in transit") | Some("in-transit") => OrderStatus::InTransit,
            Some("delivered") => OrderStatus::Delivered,
            Some("cancelled") | Some("canceled") => OrderStatus::Cancelled,
            _ => OrderStatus::Preparing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
}

/// A customer order as consumed by the aggregation pipeline. Read-only
/// here; the consumer apps own its lifecycle.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: String,
    pub customer_name: String,
    pub customer_id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub status: OrderStatus,
    pub items: Vec<LineItem>,
    pub placed_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn from_raw(raw: &RawDocument) -> Self {
        let status_raw = raw.str_field("order_status");
        if status_raw.is_none() {
            coerce::defaulted(&raw.id, "order_status");
        }

        let items = match raw.get("items") {
            Some(Value::Array(items)) => items.iter().map(|i| line_item(&raw.id, i)).collect(),
            Some(_) | None => {
                coerce::defaulted(&raw.id, "items");
                Vec::new()
            }
        };

        let placed_at = raw.get("time").and_then(coerce_timestamp);
        if placed_at.is_none() {
            coerce::defaulted(&raw.id, "time");
        }

        Self {
            id: raw.id.clone(),
            customer_name: raw.str_field("name").unwrap_or_default().to_string(),
            customer_id: raw.str_field("customer_id").map(str::to_string),
            address: raw.str_field("address").map(str::to_string),
            phone: raw.str_field("phone").map(str::to_string),
            status: OrderStatus::parse(status_raw),
            items,
            placed_at,
        }
    }

    /// Derived total: Σ(unit price × quantity). An order without items
    /// contributes zero revenue.
    pub fn total(&self) -> f64 {
        self.items
            .iter()
            .map(|i| i.unit_price * f64::from(i.quantity))
            .sum()
    }
}

fn line_item(doc_id: &str, value: &Value) -> LineItem {
    let unit_price = value
        .get("price")
        .and_then(as_f64)
        .filter(|p| *p >= 0.0)
        .unwrap_or_else(|| {
            coerce::defaulted(doc_id, "items.price");
            0.0
        });
    let quantity = value
        .get("qnt")
        .and_then(as_u32)
        .filter(|q| *q >= 1)
        .unwrap_or_else(|| {
            coerce::defaulted(doc_id, "items.qnt");
            1
        });
    LineItem {
        name: value
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        unit_price,
        quantity,
    }
}
