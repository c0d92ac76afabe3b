use crate::{DocumentStore, Filter, RawDocument, StoreError, Subscription};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};

const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

struct CollectionState {
    docs: BTreeMap<String, Map<String, Value>>,
    tx: broadcast::Sender<Arc<Vec<RawDocument>>>,
}

impl CollectionState {
    fn new() -> Self {
        let (tx, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Self {
            docs: BTreeMap::new(),
            tx,
        }
    }

    fn snapshot(&self) -> Vec<RawDocument> {
        self.docs
            .iter()
            .map(|(id, fields)| RawDocument::new(id.clone(), fields.clone()))
            .collect()
    }

    fn notify(&self) {
        // No receivers is fine; nobody is watching this collection.
        let _ = self.tx.send(Arc::new(self.snapshot()));
    }
}

/// In-process document store.
///
/// Collections are created lazily; reading a collection that was never
/// written is an empty result, not an error, matching the hosted store's
/// semantics. Every mutation republishes the full collection snapshot to
/// all live subscriptions.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, CollectionState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document, notifying subscribers.
    pub async fn upsert(
        &self,
        collection: &str,
        doc_id: impl Into<String>,
        fields: Map<String, Value>,
    ) {
        let mut collections = self.collections.write().await;
        let state = collections
            .entry(collection.to_string())
            .or_insert_with(CollectionState::new);
        state.docs.insert(doc_id.into(), fields);
        state.notify();
    }

    /// Remove a document, notifying subscribers. Removing a missing
    /// document is a no-op.
    pub async fn delete(&self, collection: &str, doc_id: &str) {
        let mut collections = self.collections.write().await;
        if let Some(state) = collections.get_mut(collection) {
            if state.docs.remove(doc_id).is_some() {
                state.notify();
            }
        }
    }

    /// Load a JSON seed file of the shape
    /// `{ "collection": [ {"id": "...", "fields": {...}}, ... ] }`.
    /// Returns the number of documents loaded. Subscribers are not
    /// notified; seeding happens before anything watches.
    pub async fn load_seed<P: AsRef<Path>>(&self, path: P) -> Result<usize, StoreError> {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| StoreError::DataUnavailable(format!("seed file unreadable: {e}")))?;
        let seed: HashMap<String, Vec<RawDocument>> = serde_json::from_str(&content)
            .map_err(|e| StoreError::DataUnavailable(format!("seed file malformed: {e}")))?;

        let mut loaded = 0;
        let mut collections = self.collections.write().await;
        for (collection, docs) in seed {
            let state = collections
                .entry(collection.clone())
                .or_insert_with(CollectionState::new);
            for doc in docs {
                state.docs.insert(doc.id, doc.fields);
                loaded += 1;
            }
        }
        info!(documents = loaded, "seeded in-memory store");
        Ok(loaded)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn fetch_all(
        &self,
        collection: &str,
        filter: Option<&Filter>,
    ) -> Result<Vec<RawDocument>, StoreError> {
        if let Some(filter) = filter {
            filter.validate()?;
        }
        let collections = self.collections.read().await;
        let docs = match collections.get(collection) {
            Some(state) => state.snapshot(),
            None => Vec::new(),
        };
        let docs = match filter {
            Some(filter) => docs.into_iter().filter(|d| filter.matches(d)).collect(),
            None => docs,
        };
        debug!(collection, count = docs.len(), "fetch_all");
        Ok(docs)
    }

    async fn subscribe(
        &self,
        collection: &str,
        filter: Option<Filter>,
    ) -> Result<Subscription, StoreError> {
        if let Some(filter) = &filter {
            filter.validate()?;
        }
        // Create the collection entry eagerly so later mutations notify
        // subscriptions opened before the first write.
        let mut collections = self.collections.write().await;
        let state = collections
            .entry(collection.to_string())
            .or_insert_with(CollectionState::new);
        let initial = match &filter {
            Some(f) => state
                .snapshot()
                .into_iter()
                .filter(|d| f.matches(d))
                .collect(),
            None => state.snapshot(),
        };
        debug!(collection, "subscription opened");
        Ok(Subscription::new(
            collection.to_string(),
            initial,
            state.tx.subscribe(),
            filter,
        ))
    }

    async fn get_doc(&self, collection: &str, doc_id: &str) -> Result<RawDocument, StoreError> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .and_then(|state| state.docs.get(doc_id))
            .map(|fields| RawDocument::new(doc_id, fields.clone()))
            .ok_or_else(|| StoreError::NotFound(format!("{collection}/{doc_id}")))
    }

    async fn set_doc(
        &self,
        collection: &str,
        doc_id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        self.upsert(collection, doc_id, fields).await;
        Ok(())
    }
}
