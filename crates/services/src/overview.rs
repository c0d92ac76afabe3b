//! Dashboard landing page: headline totals, the most recent orders, and
//! customer reviews.
//!
//! Totals recompute in full on every orders snapshot; customers and
//! reviews are refetched alongside so one publication covers the whole
//! page.

use crate::common::ViewError;
use crate::view::{DerivedView, ViewHandle};
use chrono::{DateTime, Utc};
use config::ViewsConfig;
use domain::{collections, Customer, Order, OrderStatus, Review};
use serde::Serialize;
use std::sync::Arc;
use store::DocumentStore;
use tokio::task::JoinHandle;
use tracing::{debug, error};

#[derive(Debug, Clone, Serialize)]
pub struct RecentOrder {
    pub id: String,
    pub customer_name: String,
    pub status: OrderStatus,
    pub total: f64,
    pub placed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverviewSnapshot {
    /// Sum of delivered order totals. Cancelled and in-flight orders
    /// contribute nothing.
    pub total_revenue: f64,
    pub total_orders: u64,
    pub delivered_orders: u64,
    pub total_customers: u64,
    pub active_customers: u64,
    pub recent_orders: Vec<RecentOrder>,
    pub reviews: Vec<Review>,
}

pub struct OverviewService {
    store: Arc<dyn DocumentStore>,
    recent_limit: usize,
    view: DerivedView<OverviewSnapshot>,
}

impl OverviewService {
    pub fn new(store: Arc<dyn DocumentStore>, views: &ViewsConfig) -> Self {
        Self {
            store,
            recent_limit: views.recent_orders_limit,
            view: DerivedView::new(),
        }
    }

    pub fn handle(&self) -> ViewHandle<OverviewSnapshot> {
        self.view.handle()
    }

    pub fn recompute(
        &self,
        orders: &[Order],
        customers: &[Customer],
        reviews: &[Review],
    ) -> OverviewSnapshot {
        let delivered: Vec<&Order> = orders
            .iter()
            .filter(|o| o.status == OrderStatus::Delivered)
            .collect();
        let total_revenue = delivered.iter().map(|o| o.total()).sum();

        let mut recent: Vec<RecentOrder> = orders
            .iter()
            .map(|o| RecentOrder {
                id: o.id.clone(),
                customer_name: o.customer_name.clone(),
                status: o.status,
                total: o.total(),
                placed_at: o.placed_at,
            })
            .collect();
        recent.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
        recent.truncate(self.recent_limit);

        OverviewSnapshot {
            total_revenue,
            total_orders: orders.len() as u64,
            delivered_orders: delivered.len() as u64,
            total_customers: customers.len() as u64,
            active_customers: customers.iter().filter(|c| c.is_active()).count() as u64,
            recent_orders: recent,
            reviews: reviews.to_vec(),
        }
    }

    /// Restrict reviews to one star rating. Unrated reviews never match
    /// a star filter.
    pub fn filter_reviews_by_star(reviews: &[Review], star: u8) -> Vec<Review> {
        reviews
            .iter()
            .filter(|r| r.rating == Some(star))
            .cloned()
            .collect()
    }

    async fn assemble(&self, orders: &[Order]) -> Result<OverviewSnapshot, ViewError> {
        let customers: Vec<Customer> = self
            .store
            .fetch_all(collections::USERS, None)
            .await?
            .iter()
            .map(Customer::from_raw)
            .collect();
        let reviews: Vec<Review> = self
            .store
            .fetch_all(collections::REVIEWS, None)
            .await?
            .iter()
            .map(Review::from_raw)
            .collect();
        Ok(self.recompute(orders, &customers, &reviews))
    }

    pub async fn snapshot(&self) -> Result<OverviewSnapshot, ViewError> {
        let orders: Vec<Order> = self
            .store
            .fetch_all(collections::ORDERS, None)
            .await?
            .iter()
            .map(Order::from_raw)
            .collect();
        self.assemble(&orders).await
    }

    pub async fn spawn_watch(self: &Arc<Self>) -> Result<JoinHandle<()>, ViewError> {
        let mut sub = self.store.subscribe(collections::ORDERS, None).await?;
        self.view.set_loading();
        let this = Arc::clone(self);
        Ok(tokio::spawn(async move {
            while let Some(docs) = sub.recv().await {
                this.view.set_refreshing();
                let orders: Vec<Order> = docs.iter().map(Order::from_raw).collect();
                match this.assemble(&orders).await {
                    Ok(snapshot) => this.view.publish(snapshot),
                    Err(err) => {
                        error!(error = %err, "overview recompute failed");
                        this.view.set_error(err.to_string());
                    }
                }
            }
            debug!("overview subscription ended");
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ViewState;
    use serde_json::{json, Map, Value};
    use store::{Filter, MemoryStore, RawDocument, StoreError, Subscription};

    fn doc(id: &str, value: serde_json::Value) -> RawDocument {
        let serde_json::Value::Object(map) = value else {
            panic!("test doc must be an object")
        };
        RawDocument::new(id, map)
    }

    fn service() -> OverviewService {
        OverviewService::new(
            Arc::new(store::MemoryStore::new()),
            &ViewsConfig::default(),
        )
    }

    #[test]
    fn revenue_counts_only_delivered_orders() {
        let orders: Vec<Order> = [
            doc("o1", json!({
                "order_status": "delivered",
                "items": [{"name": "Pizza", "price": 100, "qnt": 2}]
            })),
            doc("o2", json!({
                "order_status": "cancelled",
                "items": [{"name": "Burger", "price": 50, "qnt": 1}]
            })),
            doc("o3", json!({
                "order_status": "preparing",
                "items": [{"name": "Salad", "price": 30, "qnt": 1}]
            })),
        ]
        .iter()
        .map(Order::from_raw)
        .collect();

        let snapshot = service().recompute(&orders, &[], &[]);
        assert_eq!(snapshot.total_revenue, 200.0);
        assert_eq!(snapshot.total_orders, 3);
        assert_eq!(snapshot.delivered_orders, 1);
    }

    #[test]
    fn recent_orders_respect_the_configured_limit() {
        let orders: Vec<Order> = (0..30)
            .map(|i| {
                doc(
                    &format!("o{i}"),
                    json!({"time": format!("2024-01-{:02}T00:00:00Z", i % 28 + 1)}),
                )
            })
            .map(|d| Order::from_raw(&d))
            .collect();

        let snapshot = service().recompute(&orders, &[], &[]);
        assert_eq!(snapshot.recent_orders.len(), 20);
        // Newest first.
        assert!(snapshot.recent_orders[0].placed_at >= snapshot.recent_orders[1].placed_at);
    }

    #[test]
    fn active_customers_are_those_with_at_least_one_order() {
        let customers: Vec<Customer> = [
            doc("u1", json!({"name": "A", "orders": 3})),
            doc("u2", json!({"name": "B", "orders": 0})),
            doc("u3", json!({"name": "C"})),
        ]
        .iter()
        .map(Customer::from_raw)
        .collect();

        let snapshot = service().recompute(&[], &customers, &[]);
        assert_eq!(snapshot.total_customers, 3);
        assert_eq!(snapshot.active_customers, 1);
    }

    /// Orders stream fine but the users collection is unreachable.
    struct FailingUsersStore {
        inner: MemoryStore,
    }

    #[async_trait::async_trait]
    impl store::DocumentStore for FailingUsersStore {
        async fn fetch_all(
            &self,
            collection: &str,
            filter: Option<&Filter>,
        ) -> Result<Vec<RawDocument>, StoreError> {
            if collection == collections::USERS {
                return Err(StoreError::DataUnavailable("users offline".to_string()));
            }
            self.inner.fetch_all(collection, filter).await
        }

        async fn subscribe(
            &self,
            collection: &str,
            filter: Option<Filter>,
        ) -> Result<Subscription, StoreError> {
            self.inner.subscribe(collection, filter).await
        }

        async fn get_doc(
            &self,
            collection: &str,
            doc_id: &str,
        ) -> Result<RawDocument, StoreError> {
            self.inner.get_doc(collection, doc_id).await
        }

        async fn set_doc(
            &self,
            collection: &str,
            doc_id: &str,
            fields: Map<String, Value>,
        ) -> Result<(), StoreError> {
            self.inner.set_doc(collection, doc_id, fields).await
        }
    }

    #[tokio::test]
    async fn watch_surfaces_a_failed_secondary_fetch_as_errored() {
        let inner = MemoryStore::new();
        inner
            .upsert("orders", "o1", {
                let Value::Object(map) = json!({"order_status": "delivered"}) else {
                    unreachable!()
                };
                map
            })
            .await;
        let store = Arc::new(FailingUsersStore { inner });
        let service = Arc::new(OverviewService::new(store, &ViewsConfig::default()));
        let mut handle = service.handle();
        let task = service.spawn_watch().await.unwrap();

        loop {
            if matches!(handle.current(), ViewState::Errored(_)) {
                break;
            }
            assert!(handle.changed().await);
        }
        task.abort();
    }

    #[test]
    fn star_filter_excludes_unrated_reviews() {
        let reviews: Vec<Review> = [
            doc("r1", json!({"customer": "A", "rating": 5, "comment": "great"})),
            doc("r2", json!({"customer": "B", "rating": 3, "comment": "ok"})),
            doc("r3", json!({"customer": "C", "comment": "no rating"})),
        ]
        .iter()
        .map(Review::from_raw)
        .collect();

        let five_star = OverviewService::filter_reviews_by_star(&reviews, 5);
        assert_eq!(five_star.len(), 1);
        assert_eq!(five_star[0].customer, "A");
        assert!(OverviewService::filter_reviews_by_star(&reviews, 1).is_empty());
    }
}
