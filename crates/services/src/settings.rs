//! Settings persistence.
//!
//! Each category is one document saved wholesale: the submitted form
//! replaces the stored document, so a field absent from the submission
//! is gone after the save. Reads of a never-saved category fall back to
//! built-in defaults. Reads go through the snapshot cache; a save
//! invalidates its category so the next read sees the new document.

use crate::cache::{SnapshotCache, ViewKey};
use config::CacheConfig;
use domain::collections;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use store::{DocumentStore, StoreError};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsCategory {
    Notifications,
    Delivery,
    Menu,
}

impl SettingsCategory {
    pub const ALL: [SettingsCategory; 3] = [
        SettingsCategory::Notifications,
        SettingsCategory::Delivery,
        SettingsCategory::Menu,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingsCategory::Notifications => "notifications",
            SettingsCategory::Delivery => "delivery",
            SettingsCategory::Menu => "menu",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "notifications" => Some(SettingsCategory::Notifications),
            "delivery" => Some(SettingsCategory::Delivery),
            "menu" => Some(SettingsCategory::Menu),
            _ => None,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("unknown settings category '{0}'")]
    UnknownCategory(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct SettingsService {
    store: Arc<dyn DocumentStore>,
    cache: SnapshotCache<Map<String, Value>>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn DocumentStore>, cache: &CacheConfig) -> Self {
        Self {
            store,
            cache: SnapshotCache::new(cache),
        }
    }

    fn cache_key(category: SettingsCategory) -> ViewKey {
        ViewKey::new(collections::SETTINGS, "", category.as_str())
    }

    /// The stored document for a category, or its defaults when none was
    /// ever saved.
    pub async fn get(&self, category: SettingsCategory) -> Result<Map<String, Value>, SettingsError> {
        let key = Self::cache_key(category);
        if let Some(cached) = self.cache.get(&key).await {
            return Ok((*cached).clone());
        }

        let fields = match self
            .store
            .get_doc(collections::SETTINGS, category.as_str())
            .await
        {
            Ok(doc) => doc.fields,
            Err(StoreError::NotFound(_)) => Self::defaults(category),
            Err(err) => return Err(err.into()),
        };
        self.cache.insert(key, fields.clone()).await;
        Ok(fields)
    }

    /// Replace the category document with exactly the submitted fields.
    pub async fn save(
        &self,
        category: SettingsCategory,
        fields: Map<String, Value>,
    ) -> Result<(), SettingsError> {
        self.store
            .set_doc(collections::SETTINGS, category.as_str(), fields)
            .await?;
        self.cache.invalidate(&Self::cache_key(category)).await;
        info!(category = category.as_str(), "settings saved");
        Ok(())
    }

    fn defaults(category: SettingsCategory) -> Map<String, Value> {
        let value = match category {
            SettingsCategory::Notifications => json!({
                "new_orders": true,
                "order_updates": true,
                "promotions": false,
            }),
            SettingsCategory::Delivery => json!({
                "minimum_order_amount": 0.0,
                "delivery_fee": 4.99,
                "delivery_radius_km": 8.0,
                "avg_prep_time_minutes": 20,
                "avg_delivery_time_minutes": 30,
            }),
            SettingsCategory::Menu => json!({
                "auto_accept_orders": false,
                "show_out_of_stock": true,
                "max_items_per_order": 25,
            }),
        };
        let Value::Object(map) = value else {
            unreachable!("defaults are object literals")
        };
        map
    }
}
