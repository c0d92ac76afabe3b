use crate::coerce::{self, as_f64, as_string_list, as_u32};
use serde::Serialize;
use store::RawDocument;

/// Kitchen operating status, normalized case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestaurantStatus {
    Open,
    Closed,
    TemporarilyClosed,
}

impl RestaurantStatus {
    pub const ALL: [RestaurantStatus; 3] = [
        RestaurantStatus::Open,
        RestaurantStatus::Closed,
        RestaurantStatus::TemporarilyClosed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RestaurantStatus::Open => "open",
            RestaurantStatus::Closed => "closed",
            RestaurantStatus::TemporarilyClosed => "temporarily_closed",
        }
    }

    /// Missing or unknown statuses default to `Closed`; showing a kitchen
    /// as open when it is not is the worse failure.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("open") => RestaurantStatus::Open,
            Some("temporarily_closed") | Some("temporarily closed") => {
                RestaurantStatus::TemporarilyClosed
            }
            _ => RestaurantStatus::Closed,
        }
    }
}

/// A partner kitchen.
#[derive(Debug, Clone, Serialize)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub owner: Option<String>,
    pub cuisine: Vec<String>,
    pub specialities: Vec<String>,
    pub rating: f64,
    pub status: RestaurantStatus,
    pub price_for_one: f64,
    pub delivery_minutes: u32,
    pub revenue: f64,
}

impl Restaurant {
    pub fn from_raw(raw: &RawDocument) -> Self {
        let rating = raw.get("rating").and_then(as_f64).unwrap_or_else(|| {
            coerce::defaulted(&raw.id, "rating");
            0.0
        });

        Self {
            id: raw.id.clone(),
            name: raw.str_field("name").unwrap_or_default().to_string(),
            owner: raw.str_field("owner").map(str::to_string),
            cuisine: raw.get("cuisine").map(as_string_list).unwrap_or_default(),
            specialities: raw
                .get("specialities")
                .map(as_string_list)
                .unwrap_or_default(),
            rating: rating.clamp(0.0, 5.0),
            status: RestaurantStatus::parse(raw.str_field("status")),
            price_for_one: raw.get("priceForOne").and_then(as_f64).unwrap_or(0.0),
            delivery_minutes: raw.get("deliveryTime").and_then(as_u32).unwrap_or(0),
            revenue: raw.get("revenue").and_then(as_f64).unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawDocument {
        let serde_json::Value::Object(map) = value else {
            panic!("raw doc must be an object")
        };
        RawDocument::new("k1", map)
    }

    #[test]
    fn status_defaults_to_closed() {
        assert_eq!(RestaurantStatus::parse(None), RestaurantStatus::Closed);
        assert_eq!(RestaurantStatus::parse(Some("OPEN")), RestaurantStatus::Open);
        assert_eq!(
            RestaurantStatus::parse(Some("Temporarily Closed")),
            RestaurantStatus::TemporarilyClosed
        );
    }

    #[test]
    fn rating_parses_from_text_and_clamps() {
        assert_eq!(Restaurant::from_raw(&raw(json!({"rating": "4.3"}))).rating, 4.3);
        assert_eq!(Restaurant::from_raw(&raw(json!({"rating": "abc"}))).rating, 0.0);
        assert_eq!(Restaurant::from_raw(&raw(json!({"rating": 9.0}))).rating, 5.0);
    }

    #[test]
    fn cuisine_accepts_string_or_list() {
        let single = Restaurant::from_raw(&raw(json!({"cuisine": "Italian"})));
        assert_eq!(single.cuisine, vec!["Italian"]);
        let many = Restaurant::from_raw(&raw(json!({"cuisine": ["Thai", "Lao"]})));
        assert_eq!(many.cuisine.len(), 2);
    }
}
