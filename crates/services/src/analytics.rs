//! Analytics page: revenue trend, cancellation impact, customer
//! segments, and order-frequency shares.

use crate::bucketing::{
    frequency_label, month_key_in_window, trailing_months, Baseline, BucketSpec, FREQ_MONTHLY,
    FREQ_OCCASIONAL, FREQ_WEEKLY,
};
use crate::common::ViewError;
use crate::view::{DerivedView, ViewHandle};
use chrono::{DateTime, Utc};
use config::ViewsConfig;
use domain::{collections, Customer, Order, OrderStatus};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use store::DocumentStore;
use tokio::task::JoinHandle;
use tracing::{debug, error};

#[derive(Debug, Clone, Serialize)]
pub struct MonthRevenue {
    pub month: String,
    pub revenue: f64,
    pub orders: u64,
    /// Bar height relative to the view's baseline, in [0, 100].
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerSegments {
    pub first_time: u64,
    pub repeat: u64,
    pub occasional: u64,
    pub total: u64,
    /// Share of repeat customers among all customers, in [0, 100].
    pub retention_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FrequencyShare {
    pub label: String,
    pub customers: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSnapshot {
    /// Oldest month first, one entry per month in the window even when
    /// empty.
    pub revenue_trend: Vec<MonthRevenue>,
    /// Delivered revenue inside the trend window.
    pub window_revenue: f64,
    pub delivered_count: u64,
    pub cancelled_count: u64,
    /// Revenue that would have been earned had cancelled orders
    /// completed.
    pub cancelled_total: f64,
    pub avg_order_value: f64,
    pub segments: CustomerSegments,
    pub order_frequency: Vec<FrequencyShare>,
}

pub struct AnalyticsService {
    store: Arc<dyn DocumentStore>,
    views: ViewsConfig,
    view: DerivedView<AnalyticsSnapshot>,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn DocumentStore>, views: ViewsConfig) -> Self {
        Self {
            store,
            views,
            view: DerivedView::new(),
        }
    }

    pub fn handle(&self) -> ViewHandle<AnalyticsSnapshot> {
        self.view.handle()
    }

    pub fn recompute(
        &self,
        orders: &[Order],
        customers: &[Customer],
        now: DateTime<Utc>,
    ) -> AnalyticsSnapshot {
        let window = trailing_months(now, self.views.revenue_trend_months);

        // Absolute baseline when a revenue target is configured,
        // otherwise the best month scales to 100%.
        let baseline = self
            .views
            .monthly_revenue_target
            .map(Baseline::Fixed)
            .unwrap_or(Baseline::ObservedMax);

        let delivered = BucketSpec::new(
            window.iter().map(|(_, _, l)| l.clone()),
            |o: &Order| month_key_in_window(&window, o.placed_at),
        )
        .filter(|o| o.status == OrderStatus::Delivered)
        .weight(Order::total)
        .baseline(baseline)
        .compute(orders);

        let revenue_trend: Vec<MonthRevenue> = delivered
            .buckets
            .iter()
            .map(|(month, agg)| MonthRevenue {
                month: month.clone(),
                revenue: agg.sum,
                orders: agg.count,
                percentage: agg.percentage,
            })
            .collect();
        let window_revenue: f64 = revenue_trend.iter().map(|m| m.revenue).sum();
        let window_orders: u64 = revenue_trend.iter().map(|m| m.orders).sum();

        let cancelled = BucketSpec::new(
            window.iter().map(|(_, _, l)| l.clone()),
            |o: &Order| month_key_in_window(&window, o.placed_at),
        )
        .filter(|o| o.status == OrderStatus::Cancelled)
        .weight(Order::total)
        .compute(orders);

        AnalyticsSnapshot {
            revenue_trend,
            window_revenue,
            delivered_count: delivered.matched_count,
            cancelled_count: cancelled.matched_count,
            cancelled_total: cancelled.matched_total,
            avg_order_value: if window_orders > 0 {
                window_revenue / window_orders as f64
            } else {
                0.0
            },
            segments: self.segment(customers),
            order_frequency: self.frequency(orders, now),
        }
    }

    /// Partition customers by lifetime order count. The bands are
    /// deliberately non-adjacent; counts in the gap land in
    /// `occasional`.
    fn segment(&self, customers: &[Customer]) -> CustomerSegments {
        let mut segments = CustomerSegments {
            first_time: 0,
            repeat: 0,
            occasional: 0,
            total: customers.len() as u64,
            retention_percent: 0.0,
        };
        for customer in customers {
            if customer.order_count <= self.views.first_time_max_orders {
                segments.first_time += 1;
            } else if customer.order_count >= self.views.repeat_min_orders {
                segments.repeat += 1;
            } else {
                segments.occasional += 1;
            }
        }
        if segments.total > 0 {
            segments.retention_percent =
                (segments.repeat as f64 / segments.total as f64 * 100.0).clamp(0.0, 100.0);
        }
        segments
    }

    /// Bucket customers by the recency of their latest order. Orders
    /// without a resolvable timestamp or customer key are skipped.
    fn frequency(&self, orders: &[Order], now: DateTime<Utc>) -> Vec<FrequencyShare> {
        let mut latest: HashMap<&str, DateTime<Utc>> = HashMap::new();
        for order in orders {
            let key = order
                .customer_id
                .as_deref()
                .unwrap_or(order.customer_name.as_str());
            if key.is_empty() {
                continue;
            }
            if let Some(at) = order.placed_at {
                let entry = latest.entry(key).or_insert(at);
                if at > *entry {
                    *entry = at;
                }
            }
        }
        let stamps: Vec<DateTime<Utc>> = latest.into_values().collect();

        let summary = BucketSpec::new(
            [FREQ_WEEKLY, FREQ_MONTHLY, FREQ_OCCASIONAL],
            |at: &DateTime<Utc>| Some(frequency_label(now, *at).to_string()),
        )
        .baseline(Baseline::Fixed(stamps.len() as f64))
        .compute(&stamps);

        summary
            .buckets
            .into_iter()
            .map(|(label, agg)| FrequencyShare {
                label,
                customers: agg.count,
                percentage: agg.percentage,
            })
            .collect()
    }

    async fn assemble(&self, orders: &[Order]) -> Result<AnalyticsSnapshot, ViewError> {
        let customers: Vec<Customer> = self
            .store
            .fetch_all(collections::USERS, None)
            .await?
            .iter()
            .map(Customer::from_raw)
            .collect();
        Ok(self.recompute(orders, &customers, Utc::now()))
    }

    pub async fn snapshot(&self) -> Result<AnalyticsSnapshot, ViewError> {
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
                        error!(error = %err, "analytics recompute failed");
                        this.view.set_error(err.to_string());
                    }
                }
            }
            debug!("analytics subscription ended");
        }))
    }
}
