//! Bucketing engine.
//!
//! The computational core of every dashboard page: fold a set of
//! normalized records into named buckets in a single O(n) pass, then
//! derive a percentage per bucket from an explicitly declared baseline.
//! Buckets are fixed up front so chart axis labels stay stable; a record
//! whose key resolves to no configured bucket is dropped from the buckets
//! but still counted in the pass's bucket-independent totals.

use chrono::{DateTime, Datelike, Utc};
use indexmap::IndexMap;
use serde::Serialize;

/// How bucket percentages are scaled.
///
/// The two choices give different chart semantics; a view declares one
/// and never mixes them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Baseline {
    /// Largest bucket sum = 100% (relative scaling).
    ObservedMax,
    /// A configured constant = 100% (absolute scaling); sums above it
    /// clamp to 100.
    Fixed(f64),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BucketAggregate {
    pub count: u64,
    pub sum: f64,
    /// Always in [0, 100], regardless of baseline choice.
    pub percentage: f64,
}

/// Result of one aggregation pass.
#[derive(Debug, Clone, Serialize)]
pub struct BucketSummary {
    /// Per-bucket aggregates in declared label order.
    pub buckets: IndexMap<String, BucketAggregate>,
    /// Records that passed the filter, bucketed or not.
    pub matched_count: u64,
    /// Total weight of all matched records, bucketed or not.
    pub matched_total: f64,
    /// Matched records whose key resolved to no configured bucket
    /// (documented drop, e.g. an unresolvable timestamp).
    pub unbucketed: u64,
}

/// A bucketing specification: which records count, which bucket each
/// lands in, what each contributes, and how percentages scale.
pub struct BucketSpec<'a, R> {
    labels: Vec<String>,
    key: Box<dyn Fn(&R) -> Option<String> + 'a>,
    filter: Option<Box<dyn Fn(&R) -> bool + 'a>>,
    weight: Box<dyn Fn(&R) -> f64 + 'a>,
    baseline: Baseline,
}

impl<'a, R> BucketSpec<'a, R> {
    pub fn new(
        labels: impl IntoIterator<Item = impl Into<String>>,
        key: impl Fn(&R) -> Option<String> + 'a,
    ) -> Self {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            key: Box::new(key),
            filter: None,
            weight: Box::new(|_| 1.0),
            baseline: Baseline::ObservedMax,
        }
    }

    pub fn filter(mut self, filter: impl Fn(&R) -> bool + 'a) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn weight(mut self, weight: impl Fn(&R) -> f64 + 'a) -> Self {
        self.weight = Box::new(weight);
        self
    }

    pub fn baseline(mut self, baseline: Baseline) -> Self {
        self.baseline = baseline;
        self
    }

    /// One pass over all records.
    pub fn compute(&self, records: &[R]) -> BucketSummary {
        let mut buckets: IndexMap<String, BucketAggregate> = self
            .labels
            .iter()
            .map(|l| (l.clone(), BucketAggregate::default()))
            .collect();
        let mut matched_count = 0u64;
        let mut matched_total = 0.0f64;
        let mut unbucketed = 0u64;

        for record in records {
            if let Some(filter) = &self.filter {
                if !filter(record) {
                    continue;
                }
            }
            let weight = (self.weight)(record);
            matched_count += 1;
            matched_total += weight;

            match (self.key)(record).and_then(|label| buckets.get_mut(&label)) {
                Some(bucket) => {
                    bucket.count += 1;
                    bucket.sum += weight;
                }
                // Never create buckets ad hoc; the axis is fixed.
                None => unbucketed += 1,
            }
        }

        let baseline = match self.baseline {
            Baseline::ObservedMax => buckets.values().map(|b| b.sum).fold(0.0, f64::max),
            Baseline::Fixed(value) => value,
        };
        for bucket in buckets.values_mut() {
            bucket.percentage = if baseline > 0.0 {
                (bucket.sum / baseline * 100.0).clamp(0.0, 100.0)
            } else {
                0.0
            };
        }

        BucketSummary {
            buckets,
            matched_count,
            matched_total,
            unbucketed,
        }
    }
}

/// The trailing `n` calendar months ending at `now`, oldest first, as
/// (year, month, label) triples.
pub fn trailing_months(now: DateTime<Utc>, n: u32) -> Vec<(i32, u32, String)> {
    let mut year = now.year();
    let mut month = now.month();
    let mut months = Vec::with_capacity(n as usize);
    for _ in 0..n {
        months.push((year, month, month_label_of(month)));
        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
    }
    months.reverse();
    months
}

fn month_label_of(month: u32) -> String {
    const NAMES: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    NAMES[(month as usize - 1) % 12].to_string()
}

/// Key function for calendar-month bucketing restricted to a trailing
/// window. A timestamp outside the window (or absent) resolves to no
/// bucket, so the record is dropped from the trend but still counted in
/// the pass's totals.
pub fn month_key_in_window(
    window: &[(i32, u32, String)],
    at: Option<DateTime<Utc>>,
) -> Option<String> {
    let at = at?;
    window
        .iter()
        .find(|(year, month, _)| *year == at.year() && *month == at.month())
        .map(|(_, _, label)| label.clone())
}

pub const FREQ_WEEKLY: &str = "weekly";
pub const FREQ_MONTHLY: &str = "monthly";
pub const FREQ_OCCASIONAL: &str = "occasional";

/// Order-frequency membership: last activity within 7 days is weekly,
/// within 30 days monthly, anything older occasional.
pub fn frequency_label(now: DateTime<Utc>, last_order: DateTime<Utc>) -> &'static str {
    let age = now.signed_duration_since(last_order);
    if age <= chrono::Duration::days(7) {
        FREQ_WEEKLY
    } else if age <= chrono::Duration::days(30) {
        FREQ_MONTHLY
    } else {
        FREQ_OCCASIONAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use domain::{Order, OrderStatus};
    use serde_json::json;
    use store::RawDocument;

    fn order(value: serde_json::Value) -> Order {
        let serde_json::Value::Object(map) = value else {
            panic!("test order must be an object")
        };
        Order::from_raw(&RawDocument::new("o", map))
    }

    fn jan(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap()
    }

    fn january_orders() -> Vec<Order> {
        vec![
            order(json!({
                "order_status": "delivered",
                "items": [{"name": "Pizza", "price": 100, "qnt": 2}],
                "time": "2024-01-15T12:00:00Z"
            })),
            order(json!({
                "order_status": "cancelled",
                "items": [{"name": "Burger", "price": 50, "qnt": 1}],
                "time": "2024-01-20T12:00:00Z"
            })),
        ]
    }

    #[test]
    fn delivered_revenue_excludes_cancelled_orders() {
        let orders = january_orders();
        let months = trailing_months(jan(31), 6);

        let delivered = BucketSpec::new(
            months.iter().map(|(_, _, l)| l.clone()),
            |o: &Order| month_key_in_window(&months, o.placed_at),
        )
        .filter(|o| o.status == OrderStatus::Delivered)
        .weight(Order::total)
        .compute(&orders);

        let jan_bucket = &delivered.buckets["Jan"];
        assert_eq!(jan_bucket.sum, 200.0);
        assert_eq!(jan_bucket.count, 1);

        let cancelled = BucketSpec::new(
            months.iter().map(|(_, _, l)| l.clone()),
            |o: &Order| month_key_in_window(&months, o.placed_at),
        )
        .filter(|o| o.status == OrderStatus::Cancelled)
        .weight(Order::total)
        .compute(&orders);

        assert_eq!(cancelled.matched_count, 1);
        assert_eq!(cancelled.matched_total, 50.0);
    }

    #[test]
    fn bucket_sums_never_exceed_the_unbucketed_total() {
        let mut orders = january_orders();
        // One delivered order with no resolvable timestamp: counted in the
        // matched totals, dropped from the time buckets.
        orders.push(order(json!({
            "order_status": "delivered",
            "items": [{"name": "Salad", "price": 30, "qnt": 1}]
        })));

        let months = trailing_months(jan(31), 6);
        let summary = BucketSpec::new(
            months.iter().map(|(_, _, l)| l.clone()),
            |o: &Order| month_key_in_window(&months, o.placed_at),
        )
        .filter(|o| o.status == OrderStatus::Delivered)
        .weight(Order::total)
        .compute(&orders);

        let bucketed: f64 = summary.buckets.values().map(|b| b.sum).sum();
        assert_eq!(bucketed, 200.0);
        assert_eq!(summary.matched_total, 230.0);
        assert!(bucketed <= summary.matched_total);
        assert_eq!(summary.unbucketed, 1);
    }

    #[test]
    fn every_timestamp_bucketed_means_totals_agree() {
        let orders = january_orders();
        let months = trailing_months(jan(31), 6);
        let summary = BucketSpec::new(
            months.iter().map(|(_, _, l)| l.clone()),
            |o: &Order| month_key_in_window(&months, o.placed_at),
        )
        .weight(Order::total)
        .compute(&orders);

        let bucketed: f64 = summary.buckets.values().map(|b| b.sum).sum();
        assert_eq!(bucketed, summary.matched_total);
        assert_eq!(summary.unbucketed, 0);
    }

    #[test]
    fn percentages_stay_in_bounds_for_both_baselines() {
        let orders = january_orders();
        let months = trailing_months(jan(31), 6);

        let relative = BucketSpec::new(
            months.iter().map(|(_, _, l)| l.clone()),
            |o: &Order| month_key_in_window(&months, o.placed_at),
        )
        .weight(Order::total)
        .baseline(Baseline::ObservedMax)
        .compute(&orders);
        assert_eq!(relative.buckets["Jan"].percentage, 100.0);

        // Fixed baseline below the observed sum clamps to 100.
        let clamped = BucketSpec::new(
            months.iter().map(|(_, _, l)| l.clone()),
            |o: &Order| month_key_in_window(&months, o.placed_at),
        )
        .weight(Order::total)
        .baseline(Baseline::Fixed(100.0))
        .compute(&orders);
        for bucket in clamped.buckets.values() {
            assert!((0.0..=100.0).contains(&bucket.percentage));
        }
        assert_eq!(clamped.buckets["Jan"].percentage, 100.0);

        // Zero baseline yields zero percentages, never NaN.
        let degenerate = BucketSpec::new(["Jan"], |_: &Order| Some("Jan".to_string()))
            .baseline(Baseline::Fixed(0.0))
            .compute(&orders);
        assert_eq!(degenerate.buckets["Jan"].percentage, 0.0);
    }

    #[test]
    fn unknown_labels_never_create_buckets() {
        let summary = BucketSpec::new(["a"], |s: &&str| Some(s.to_string())).compute(&["a", "b"]);
        assert_eq!(summary.buckets.len(), 1);
        assert_eq!(summary.buckets["a"].count, 1);
        assert_eq!(summary.unbucketed, 1);
        assert_eq!(summary.matched_count, 2);
    }

    #[test]
    fn trailing_months_wrap_the_year_boundary() {
        let now = Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap();
        let months = trailing_months(now, 6);
        let labels: Vec<&str> = months.iter().map(|(_, _, l)| l.as_str()).collect();
        assert_eq!(labels, ["Sep", "Oct", "Nov", "Dec", "Jan", "Feb"]);
        assert_eq!(months[0].0, 2023);
        assert_eq!(months[5].0, 2024);
    }

    #[test]
    fn window_key_rejects_same_month_of_a_prior_year() {
        let now = Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap();
        let months = trailing_months(now, 6);
        let last_year = Utc.with_ymd_and_hms(2023, 2, 10, 0, 0, 0).unwrap();
        assert_eq!(month_key_in_window(&months, Some(last_year)), None);
        assert_eq!(
            month_key_in_window(&months, Some(now)),
            Some("Feb".to_string())
        );
        assert_eq!(month_key_in_window(&months, None), None);
    }

    #[test]
    fn frequency_windows_partition_by_age() {
        let now = jan(31);
        assert_eq!(frequency_label(now, jan(28)), FREQ_WEEKLY);
        assert_eq!(frequency_label(now, jan(10)), FREQ_MONTHLY);
        assert_eq!(
            frequency_label(now, Utc.with_ymd_and_hms(2023, 10, 1, 0, 0, 0).unwrap()),
            FREQ_OCCASIONAL
        );
    }
}
