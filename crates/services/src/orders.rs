//! Live order board.
//!
//! Subscribes to the orders collection and folds every snapshot into
//! per-status counts plus a card per order with its derived total.

use crate::bucketing::BucketSpec;
use crate::common::ViewError;
use crate::view::{DerivedView, ViewHandle};
use chrono::{DateTime, Utc};
use domain::{collections, LineItem, Order, OrderStatus};
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;
use store::DocumentStore;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Serialize)]
pub struct OrderCard {
    pub id: String,
    pub customer_name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub status: OrderStatus,
    pub items: Vec<LineItem>,
    pub total: f64,
    pub placed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrdersSnapshot {
    pub total_orders: u64,
    /// One entry per status, in lifecycle order, zero-filled — the
    /// filter chips never change shape.
    pub status_counts: IndexMap<String, u64>,
    /// Newest first; orders without a timestamp sort last.
    pub orders: Vec<OrderCard>,
}

pub struct OrdersService {
    store: Arc<dyn DocumentStore>,
    view: DerivedView<OrdersSnapshot>,
}

impl OrdersService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            view: DerivedView::new(),
        }
    }

    pub fn handle(&self) -> ViewHandle<OrdersSnapshot> {
        self.view.handle()
    }

    /// Pure fold over normalized orders.
    pub fn recompute(orders: &[Order]) -> OrdersSnapshot {
        let by_status = BucketSpec::new(
            OrderStatus::ALL.iter().map(|s| s.as_str()),
            |o: &Order| Some(o.status.as_str().to_string()),
        )
        .compute(orders);

        let mut cards: Vec<OrderCard> = orders
            .iter()
            .map(|o| OrderCard {
                id: o.id.clone(),
                customer_name: o.customer_name.clone(),
                address: o.address.clone(),
                phone: o.phone.clone(),
                status: o.status,
                items: o.items.clone(),
                total: o.total(),
                placed_at: o.placed_at,
            })
            .collect();
        cards.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));

        OrdersSnapshot {
            total_orders: by_status.matched_count,
            status_counts: by_status
                .buckets
                .into_iter()
                .map(|(label, agg)| (label, agg.count))
                .collect(),
            orders: cards,
        }
    }

    /// One-shot fetch and fold.
    pub async fn snapshot(&self) -> Result<OrdersSnapshot, ViewError> {
        let raw = self.store.fetch_all(collections::ORDERS, None).await?;
        let orders: Vec<Order> = raw.iter().map(Order::from_raw).collect();
        Ok(Self::recompute(&orders))
    }

    /// Start the live recompute loop. Every delivered store snapshot is
    /// folded in full, in arrival order.
    pub async fn spawn_watch(self: &Arc<Self>) -> Result<JoinHandle<()>, ViewError> {
        let mut sub = self.store.subscribe(collections::ORDERS, None).await?;
        self.view.set_loading();
        let this = Arc::clone(self);
        Ok(tokio::spawn(async move {
            while let Some(docs) = sub.recv().await {
                this.view.set_refreshing();
                let orders: Vec<Order> = docs.iter().map(Order::from_raw).collect();
                this.view.publish(Self::recompute(&orders));
            }
            debug!("orders subscription ended");
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use store::{MemoryStore, RawDocument};

    fn order_doc(id: &str, value: serde_json::Value) -> RawDocument {
        let serde_json::Value::Object(map) = value else {
            panic!("test doc must be an object")
        };
        RawDocument::new(id, map)
    }

    #[test]
    fn status_counts_cover_all_statuses_with_zero_fill() {
        let orders: Vec<Order> = [
            order_doc("o1", json!({"order_status": "Delivered"})),
            order_doc("o2", json!({"order_status": "delivered"})),
            order_doc("o3", json!({})), // defaults to preparing
        ]
        .iter()
        .map(Order::from_raw)
        .collect();

        let snapshot = OrdersService::recompute(&orders);
        assert_eq!(snapshot.total_orders, 3);
        assert_eq!(snapshot.status_counts["delivered"], 2);
        assert_eq!(snapshot.status_counts["preparing"], 1);
        assert_eq!(snapshot.status_counts["in_transit"], 0);
        assert_eq!(snapshot.status_counts["cancelled"], 0);
        // Stable label set in lifecycle order.
        let labels: Vec<&str> = snapshot.status_counts.keys().map(String::as_str).collect();
        assert_eq!(labels, ["preparing", "in_transit", "delivered", "cancelled"]);
    }

    #[test]
    fn cards_sort_newest_first_with_untimed_last() {
        let orders: Vec<Order> = [
            order_doc("old", json!({"time": "2024-01-01T00:00:00Z"})),
            order_doc("untimed", json!({})),
            order_doc("new", json!({"time": "2024-03-01T00:00:00Z"})),
        ]
        .iter()
        .map(Order::from_raw)
        .collect();

        let snapshot = OrdersService::recompute(&orders);
        let ids: Vec<&str> = snapshot.orders.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["new", "old", "untimed"]);
    }

    #[tokio::test]
    async fn watch_publishes_on_every_mutation() {
        let store = Arc::new(MemoryStore::new());
        store
            .upsert("orders", "o1", {
                let serde_json::Value::Object(map) = json!({"order_status": "preparing"}) else {
                    unreachable!()
                };
                map
            })
            .await;

        let service = Arc::new(OrdersService::new(store.clone()));
        let mut handle = service.handle();
        let task = service.spawn_watch().await.unwrap();

        // Initial snapshot.
        assert!(handle.changed().await);
        while !handle.current().is_ready() {
            assert!(handle.changed().await);
        }
        assert_eq!(handle.current().snapshot().unwrap().total_orders, 1);

        store
            .upsert("orders", "o2", {
                let serde_json::Value::Object(map) = json!({"order_status": "delivered"}) else {
                    unreachable!()
                };
                map
            })
            .await;
        loop {
            assert!(handle.changed().await);
            if let Some(snap) = handle.current().snapshot() {
                if snap.total_orders == 2 {
                    break;
                }
            }
        }

        task.abort();
    }
}
