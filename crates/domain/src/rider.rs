use crate::coerce::{self, as_f64, as_u32, coerce_location, GeoPoint};
use serde::Serialize;
use store::RawDocument;

/// A delivery driver.
///
/// "Active" is derived, never stored: a rider is active iff they are
/// currently carrying at least one order.
#[derive(Debug, Clone, Serialize)]
pub struct Rider {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub vehicle: Option<String>,
    pub plate: Option<String>,
    /// Rating out of 5, stored as text at the source. `None` when the
    /// stored value does not parse as a number.
    pub rating: Option<f64>,
    /// Lifetime completed deliveries.
    pub deliveries: u32,
    pub active_orders: u32,
    pub location: Option<GeoPoint>,
}

impl Rider {
    pub fn from_raw(raw: &RawDocument) -> Self {
        let rating = raw
            .get("rating")
            .and_then(as_f64)
            .filter(|r| (0.0..=5.0).contains(r));
        if raw.get("rating").is_some() && rating.is_none() {
            coerce::defaulted(&raw.id, "rating");
        }

        // Two field names exist in the wild for the same counter.
        let active_orders = raw
            .get("currentOrders")
            .or_else(|| raw.get("activeOrders"))
            .and_then(as_u32)
            .unwrap_or(0);

        let location = raw.get("location").and_then(coerce_location);
        if raw.get("location").is_some() && location.is_none() {
            coerce::defaulted(&raw.id, "location");
        }

        Self {
            id: raw.id.clone(),
            name: raw.str_field("name").unwrap_or_default().to_string(),
            email: raw.str_field("email").map(str::to_string),
            phone: raw.str_field("phone").map(str::to_string),
            vehicle: raw.str_field("vehicle").map(str::to_string),
            plate: raw.str_field("plate").map(str::to_string),
            rating,
            deliveries: raw.get("deliveries").and_then(as_u32).unwrap_or(0),
            active_orders,
            location,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active_orders > 0
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
        RawDocument::new("d1", map)
    }

    #[test]
    fn active_is_derived_from_order_count() {
        assert!(!Rider::from_raw(&raw(json!({"currentOrders": 0}))).is_active());
        assert!(Rider::from_raw(&raw(json!({"currentOrders": 2}))).is_active());
        assert!(Rider::from_raw(&raw(json!({"activeOrders": 1}))).is_active());
    }

    #[test]
    fn text_ratings_parse_and_garbage_is_none() {
        assert_eq!(Rider::from_raw(&raw(json!({"rating": "4.5"}))).rating, Some(4.5));
        assert_eq!(Rider::from_raw(&raw(json!({"rating": 4.9}))).rating, Some(4.9));
        assert_eq!(Rider::from_raw(&raw(json!({"rating": "N/A"}))).rating, None);
        assert_eq!(Rider::from_raw(&raw(json!({"rating": "7.2"}))).rating, None);
    }

    #[test]
    fn heterogeneous_locations_normalize() {
        let object = Rider::from_raw(&raw(json!({"location": {"lat": 40.7, "lng": -74.0}})));
        let string = Rider::from_raw(&raw(json!({"location": "40.7,-74.0"})));
        assert_eq!(object.location, string.location);

        let garbage = Rider::from_raw(&raw(json!({"location": "Brooklyn Heights"})));
        assert!(garbage.location.is_none());
    }
}
