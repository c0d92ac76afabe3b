//! Restaurant page: partner kitchens with status counts and a rating
//! histogram.

use crate::bucketing::BucketSpec;
use crate::common::ViewError;
use crate::view::{DerivedView, ViewHandle};
use domain::{collections, Restaurant, RestaurantStatus};
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;
use store::DocumentStore;
use tokio::task::JoinHandle;
use tracing::debug;

const TIER_TOP: &str = "4.5+";
const TIER_GOOD: &str = "3.5+";
const TIER_FAIR: &str = "2.5+";
const TIER_LOW: &str = "below_2.5";

#[derive(Debug, Clone, Serialize)]
pub struct RestaurantsSnapshot {
    pub total_restaurants: u64,
    pub status_counts: IndexMap<String, u64>,
    /// Mean over all listed kitchens; ratings are already clamped to
    /// [0, 5] at normalization.
    pub average_rating: f64,
    pub rating_tiers: IndexMap<String, u64>,
    pub restaurants: Vec<Restaurant>,
}

pub struct RestaurantsService {
    store: Arc<dyn DocumentStore>,
    view: DerivedView<RestaurantsSnapshot>,
}

impl RestaurantsService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            view: DerivedView::new(),
        }
    }

    pub fn handle(&self) -> ViewHandle<RestaurantsSnapshot> {
        self.view.handle()
    }

    fn tier(rating: f64) -> &'static str {
        if rating >= 4.5 {
            TIER_TOP
        } else if rating >= 3.5 {
            TIER_GOOD
        } else if rating >= 2.5 {
            TIER_FAIR
        } else {
            TIER_LOW
        }
    }

    pub fn recompute(restaurants: &[Restaurant]) -> RestaurantsSnapshot {
        let by_status = BucketSpec::new(
            RestaurantStatus::ALL.iter().map(|s| s.as_str()),
            |r: &Restaurant| Some(r.status.as_str().to_string()),
        )
        .compute(restaurants);

        let tiers = BucketSpec::new(
            [TIER_TOP, TIER_GOOD, TIER_FAIR, TIER_LOW],
            |r: &Restaurant| Some(Self::tier(r.rating).to_string()),
        )
        .compute(restaurants);

        let average_rating = if restaurants.is_empty() {
            0.0
        } else {
            restaurants.iter().map(|r| r.rating).sum::<f64>() / restaurants.len() as f64
        };

        RestaurantsSnapshot {
            total_restaurants: restaurants.len() as u64,
            status_counts: by_status
                .buckets
                .into_iter()
                .map(|(label, agg)| (label, agg.count))
                .collect(),
            average_rating,
            rating_tiers: tiers
                .buckets
                .into_iter()
                .map(|(label, agg)| (label, agg.count))
                .collect(),
            restaurants: restaurants.to_vec(),
        }
    }

    pub async fn snapshot(&self) -> Result<RestaurantsSnapshot, ViewError> {
        let restaurants: Vec<Restaurant> = self
            .store
            .fetch_all(collections::RESTAURANTS, None)
            .await?
            .iter()
            .map(Restaurant::from_raw)
            .collect();
        Ok(Self::recompute(&restaurants))
    }

    pub async fn spawn_watch(self: &Arc<Self>) -> Result<JoinHandle<()>, ViewError> {
        let mut sub = self.store.subscribe(collections::RESTAURANTS, None).await?;
        self.view.set_loading();
        let this = Arc::clone(self);
        Ok(tokio::spawn(async move {
            while let Some(docs) = sub.recv().await {
                this.view.set_refreshing();
                let restaurants: Vec<Restaurant> =
                    docs.iter().map(Restaurant::from_raw).collect();
                this.view.publish(Self::recompute(&restaurants));
            }
            debug!("restaurants subscription ended");
        }))
    }
}
