//! Customers page: roster with lifetime counters and a case-insensitive
//! search over name, email, and id.

use crate::common::ViewError;
use crate::view::{DerivedView, ViewHandle};
use domain::{collections, Customer};
use serde::Serialize;
use std::sync::Arc;
use store::DocumentStore;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Serialize)]
pub struct CustomersSnapshot {
    pub total_customers: u64,
    pub active_customers: u64,
    /// Sum of lifetime order counts across the listed customers.
    pub total_orders: u64,
    pub total_spent: f64,
    pub customers: Vec<Customer>,
}

pub struct CustomersService {
    store: Arc<dyn DocumentStore>,
    view: DerivedView<CustomersSnapshot>,
}

impl CustomersService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            view: DerivedView::new(),
        }
    }

    pub fn handle(&self) -> ViewHandle<CustomersSnapshot> {
        self.view.handle()
    }

    /// Fold the visible set. Counters describe what is listed, so a
    /// search narrows them too.
    pub fn recompute(customers: &[Customer], query: Option<&str>) -> CustomersSnapshot {
        let visible: Vec<Customer> = match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => {
                let needle = q.to_lowercase();
                customers
                    .iter()
                    .filter(|c| Self::matches(c, &needle))
                    .cloned()
                    .collect()
            }
            None => customers.to_vec(),
        };

        CustomersSnapshot {
            total_customers: visible.len() as u64,
            active_customers: visible.iter().filter(|c| c.is_active()).count() as u64,
            total_orders: visible.iter().map(|c| u64::from(c.order_count)).sum(),
            total_spent: visible.iter().map(|c| c.spent).sum(),
            customers: visible,
        }
    }

    fn matches(customer: &Customer, needle: &str) -> bool {
        customer.name.to_lowercase().contains(needle)
            || customer.id.to_lowercase().contains(needle)
            || customer
                .email
                .as_deref()
                .is_some_and(|e| e.to_lowercase().contains(needle))
    }

    pub async fn snapshot(&self, query: Option<&str>) -> Result<CustomersSnapshot, ViewError> {
        let customers: Vec<Customer> = self
            .store
            .fetch_all(collections::USERS, None)
            .await?
            .iter()
            .map(Customer::from_raw)
            .collect();
        Ok(Self::recompute(&customers, query))
    }

    pub async fn spawn_watch(self: &Arc<Self>) -> Result<JoinHandle<()>, ViewError> {
        let mut sub = self.store.subscribe(collections::USERS, None).await?;
        self.view.set_loading();
        let this = Arc::clone(self);
        Ok(tokio::spawn(async move {
            while let Some(docs) = sub.recv().await {
                this.view.set_refreshing();
                let customers: Vec<Customer> = docs.iter().map(Customer::from_raw).collect();
                this.view.publish(Self::recompute(&customers, None));
            }
            debug!("customers subscription ended");
        }))
    }
}
