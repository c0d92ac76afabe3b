//! Derived-view store.
//!
//! Each page service publishes its recomputed snapshot through a watch
//! channel. Publication replaces the whole `Arc` snapshot at once, so a
//! reader either sees the previous snapshot or the new one — never a mix
//! of bucket values from both.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

/// Lifecycle of one view.
///
/// `Uninitialized → Loading → Ready ⇄ Refreshing`; any fetch error lands
/// in `Errored`, and a later refresh may retry from `Loading`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", content = "snapshot", rename_all = "snake_case")]
pub enum ViewState<T> {
    Uninitialized,
    Loading,
    Ready(T),
    Refreshing(T),
    Errored(String),
}

impl<T> ViewState<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, ViewState::Ready(_) | ViewState::Refreshing(_))
    }

    pub fn snapshot(&self) -> Option<&T> {
        match self {
            ViewState::Ready(s) | ViewState::Refreshing(s) => Some(s),
            _ => None,
        }
    }
}

/// Publisher side of a derived view.
pub struct DerivedView<T> {
    tx: watch::Sender<ViewState<Arc<T>>>,
    // Keeps the channel open while no handle is subscribed.
    _rx: watch::Receiver<ViewState<Arc<T>>>,
}

impl<T> Default for DerivedView<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DerivedView<T> {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(ViewState::Uninitialized);
        Self { tx, _rx: rx }
    }

    pub fn set_loading(&self) {
        self.tx.send_replace(ViewState::Loading);
    }

    /// Atomically replace the published snapshot.
    pub fn publish(&self, snapshot: T) {
        self.tx.send_replace(ViewState::Ready(Arc::new(snapshot)));
    }

    /// Mark a live view as recomputing. The previous snapshot stays
    /// visible until the next `publish`.
    pub fn set_refreshing(&self) {
        self.tx.send_modify(|state| {
            if let ViewState::Ready(snapshot) = state {
                *state = ViewState::Refreshing(Arc::clone(snapshot));
            }
        });
    }

    pub fn set_error(&self, message: impl Into<String>) {
        self.tx.send_replace(ViewState::Errored(message.into()));
    }

    pub fn handle(&self) -> ViewHandle<T> {
        ViewHandle {
            rx: self.tx.subscribe(),
        }
    }
}

/// Reader side of a derived view; cheap to clone and hand to the
/// presentation layer.
#[derive(Clone)]
pub struct ViewHandle<T> {
    rx: watch::Receiver<ViewState<Arc<T>>>,
}

impl<T> ViewHandle<T> {
    /// The current state. Always a complete snapshot or a non-data state.
    pub fn current(&self) -> ViewState<Arc<T>> {
        self.rx.borrow().clone()
    }

    /// Wait until the next publication.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Snap {
        total: f64,
        count: u64,
    }

    #[tokio::test]
    async fn state_machine_walks_the_documented_path() {
        let view: DerivedView<Snap> = DerivedView::new();
        let handle = view.handle();
        assert!(matches!(handle.current(), ViewState::Uninitialized));

        view.set_loading();
        assert!(matches!(handle.current(), ViewState::Loading));

        view.publish(Snap { total: 10.0, count: 1 });
        assert!(handle.current().is_ready());

        view.set_refreshing();
        let refreshing = handle.current();
        assert!(matches!(refreshing, ViewState::Refreshing(_)));
        // The old snapshot stays visible while recomputing.
        assert_eq!(refreshing.snapshot().unwrap().count, 1);

        view.publish(Snap { total: 20.0, count: 2 });
        assert_eq!(handle.current().snapshot().unwrap().count, 2);
    }

    #[tokio::test]
    async fn refreshing_without_a_snapshot_is_a_no_op() {
        let view: DerivedView<Snap> = DerivedView::new();
        view.set_loading();
        view.set_refreshing();
        assert!(matches!(view.handle().current(), ViewState::Loading));
    }

    #[tokio::test]
    async fn readers_never_observe_a_torn_snapshot() {
        let view: DerivedView<Snap> = DerivedView::new();
        view.publish(Snap { total: 100.0, count: 10 });
        let handle = view.handle();

        // A snapshot read mid-update is either wholly old or wholly new;
        // both fields always agree.
        for i in 0..100u64 {
            view.publish(Snap {
                total: (i * 10) as f64,
                count: i,
            });
            if let Some(snap) = handle.current().snapshot() {
                assert_eq!(snap.total, (snap.count * 10) as f64);
            }
        }
    }

    #[tokio::test]
    async fn error_state_replaces_content_until_retry() {
        let view: DerivedView<Snap> = DerivedView::new();
        view.publish(Snap { total: 1.0, count: 1 });
        view.set_error("store unreachable");
        assert!(matches!(view.handle().current(), ViewState::Errored(_)));

        // A new mount retries from Loading.
        view.set_loading();
        assert!(matches!(view.handle().current(), ViewState::Loading));
    }
}
