//! Delivery page: rider roster, fleet counters, and map markers for
//! riders with a usable location.
//!
//! The fleet average rating divides by the number of riders with a
//! parsable rating, not the full roster, so a rider whose rating reads
//! "N/A" neither drags the average down nor counts as a zero.

use crate::common::ViewError;
use crate::view::{DerivedView, ViewHandle};
use domain::{collections, Rider};
use serde::Serialize;
use std::sync::Arc;
use store::DocumentStore;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Serialize)]
pub struct MapMarker {
    pub rider_id: String,
    pub name: String,
    pub active_orders: u32,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliverySnapshot {
    pub total_riders: u64,
    pub active_riders: u64,
    pub total_deliveries: u64,
    pub active_orders: u64,
    /// None when no rider has a parsable rating.
    pub average_rating: Option<f64>,
    pub markers: Vec<MapMarker>,
    pub riders: Vec<Rider>,
}

pub struct DeliveryService {
    store: Arc<dyn DocumentStore>,
    view: DerivedView<DeliverySnapshot>,
}

impl DeliveryService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            view: DerivedView::new(),
        }
    }

    pub fn handle(&self) -> ViewHandle<DeliverySnapshot> {
        self.view.handle()
    }

    pub fn recompute(riders: &[Rider]) -> DeliverySnapshot {
        let rated: Vec<f64> = riders.iter().filter_map(|r| r.rating).collect();
        let average_rating = if rated.is_empty() {
            None
        } else {
            Some(rated.iter().sum::<f64>() / rated.len() as f64)
        };

        let markers = riders
            .iter()
            .filter_map(|r| {
                r.location.as_ref().map(|loc| MapMarker {
                    rider_id: r.id.clone(),
                    name: r.name.clone(),
                    active_orders: r.active_orders,
                    lat: loc.lat,
                    lng: loc.lng,
                })
            })
            .collect();

        DeliverySnapshot {
            total_riders: riders.len() as u64,
            active_riders: riders.iter().filter(|r| r.is_active()).count() as u64,
            total_deliveries: riders.iter().map(|r| u64::from(r.deliveries)).sum(),
            active_orders: riders.iter().map(|r| u64::from(r.active_orders)).sum(),
            average_rating,
            markers,
            riders: riders.to_vec(),
        }
    }

    pub async fn snapshot(&self) -> Result<DeliverySnapshot, ViewError> {
        let riders: Vec<Rider> = self
            .store
            .fetch_all(collections::DRIVERS, None)
            .await?
            .iter()
            .map(Rider::from_raw)
            .collect();
        Ok(Self::recompute(&riders))
    }

    pub async fn spawn_watch(self: &Arc<Self>) -> Result<JoinHandle<()>, ViewError> {
        let mut sub = self.store.subscribe(collections::DRIVERS, None).await?;
        self.view.set_loading();
        let this = Arc::clone(self);
        Ok(tokio::spawn(async move {
            while let Some(docs) = sub.recv().await {
                this.view.set_refreshing();
                let riders: Vec<Rider> = docs.iter().map(Rider::from_raw).collect();
                this.view.publish(Self::recompute(&riders));
            }
            debug!("delivery subscription ended");
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use store::RawDocument;

    fn rider(id: &str, value: serde_json::Value) -> Rider {
        let serde_json::Value::Object(map) = value else {
            panic!("test doc must be an object")
        };
        Rider::from_raw(&RawDocument::new(id, map))
    }

    #[test]
    fn average_rating_excludes_unparsable_ratings_from_the_denominator() {
        let riders = vec![
            rider("d1", json!({"name": "A", "rating": 4.5})),
            rider("d2", json!({"name": "B", "rating": "4.9"})),
            rider("d3", json!({"name": "C", "rating": "N/A"})),
        ];
        let snapshot = DeliveryService::recompute(&riders);
        // (4.5 + 4.9) / 2, not / 3.
        assert!((snapshot.average_rating.unwrap() - 4.7).abs() < 1e-9);
    }

    #[test]
    fn no_parsable_rating_means_no_average() {
        let riders = vec![
            rider("d1", json!({"name": "A", "rating": "N/A"})),
            rider("d2", json!({"name": "B"})),
        ];
        assert_eq!(DeliveryService::recompute(&riders).average_rating, None);
    }

    #[test]
    fn markers_exist_only_for_riders_with_a_location() {
        let riders = vec![
            rider("d1", json!({"name": "A", "location": {"lat": 12.9, "lng": 77.6}, "currentOrders": 2})),
            rider("d2", json!({"name": "B", "location": "13.0,77.5"})),
            rider("d3", json!({"name": "C", "location": "somewhere downtown"})),
            rider("d4", json!({"name": "D"})),
        ];
        let snapshot = DeliveryService::recompute(&riders);
        assert_eq!(snapshot.markers.len(), 2);
        assert_eq!(snapshot.markers[0].rider_id, "d1");
        assert_eq!(snapshot.markers[0].active_orders, 2);
    }

    #[test]
    fn fleet_counters_sum_across_the_roster() {
        let riders = vec![
            rider("d1", json!({"name": "A", "deliveries": 120, "currentOrders": 2})),
            rider("d2", json!({"name": "B", "deliveries": 45, "activeOrders": 1})),
            rider("d3", json!({"name": "C"})),
        ];
        let snapshot = DeliveryService::recompute(&riders);
        assert_eq!(snapshot.total_riders, 3);
        assert_eq!(snapshot.active_riders, 2);
        assert_eq!(snapshot.total_deliveries, 165);
        assert_eq!(snapshot.active_orders, 3);
    }
}
