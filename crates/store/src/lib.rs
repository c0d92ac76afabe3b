//! Document store adapter.
//!
//! The hosted document database is an external collaborator; this crate
//! pins down the two capabilities the dashboard needs from it (one-shot
//! reads and live full-snapshot subscriptions) plus the wholesale
//! read/overwrite used by the settings page. `MemoryStore` is the
//! in-process implementation used for local development and tests.

use async_trait::async_trait;
use serde_json::{Map, Value};

mod document;
mod error;
mod filter;
mod memory;
mod subscription;

pub use document::RawDocument;
pub use error::StoreError;
pub use filter::{FieldCondition, Filter, FilterOp};
pub use memory::MemoryStore;
pub use subscription::Subscription;

/// Capabilities the dashboard requires from the document database.
///
/// All consistency guarantees are delegated to the implementation; this
/// layer performs no caching of its own.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// One-shot read of a (filtered) collection.
    async fn fetch_all(
        &self,
        collection: &str,
        filter: Option<&Filter>,
    ) -> Result<Vec<RawDocument>, StoreError>;

    /// Establish a live feed over a (filtered) collection.
    ///
    /// The subscription yields the current snapshot immediately and a full
    /// snapshot after every subsequent mutation, in emission order.
    async fn subscribe(
        &self,
        collection: &str,
        filter: Option<Filter>,
    ) -> Result<Subscription, StoreError>;

    /// Read a single document wholesale.
    async fn get_doc(&self, collection: &str, doc_id: &str) -> Result<RawDocument, StoreError>;

    /// Overwrite a single document wholesale (last-writer-wins).
    async fn set_doc(
        &self,
        collection: &str,
        doc_id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError>;
}
