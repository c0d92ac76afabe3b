use crate::{Filter, RawDocument};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// A live feed over one collection.
///
/// The first `recv` returns the snapshot taken at subscribe time; every
/// later `recv` returns the full collection snapshot emitted by the next
/// mutation. After `unsubscribe`, `recv` returns `None` and the feed can
/// never trigger another recompute.
#[derive(Debug)]
pub struct Subscription {
    collection: String,
    initial: Option<Vec<RawDocument>>,
    rx: Option<broadcast::Receiver<Arc<Vec<RawDocument>>>>,
    filter: Option<Filter>,
}

impl Subscription {
    pub(crate) fn new(
        collection: String,
        initial: Vec<RawDocument>,
        rx: broadcast::Receiver<Arc<Vec<RawDocument>>>,
        filter: Option<Filter>,
    ) -> Self {
        Self {
            collection,
            initial: Some(initial),
            rx: Some(rx),
            filter,
        }
    }

    /// Wait for the next full snapshot. `None` once unsubscribed or the
    /// store has shut down.
    pub async fn recv(&mut self) -> Option<Vec<RawDocument>> {
        if let Some(initial) = self.initial.take() {
            return Some(initial);
        }
        let rx = self.rx.as_mut()?;
        loop {
            match rx.recv().await {
                Ok(snapshot) => {
                    let docs = match &self.filter {
                        Some(filter) => snapshot
                            .iter()
                            .filter(|d| filter.matches(d))
                            .cloned()
                            .collect(),
                        None => snapshot.as_ref().clone(),
                    };
                    return Some(docs);
                }
                // A slow consumer only ever needs the latest full snapshot,
                // which the next successful recv delivers.
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(
                        collection = %self.collection,
                        skipped, "subscription lagged, catching up to latest snapshot"
                    );
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Stop delivery and release the feed. Safe to call more than once.
    pub fn unsubscribe(&mut self) {
        if self.rx.take().is_some() {
            debug!(collection = %self.collection, "subscription cancelled");
        }
        self.initial = None;
    }

    pub fn is_active(&self) -> bool {
        self.rx.is_some() || self.initial.is_some()
    }
}
