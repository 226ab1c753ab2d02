//! Table-level change fan-out for reactive queries.
//!
//! # Responsibility
//! - Keep the set of live observers for one database handle.
//! - Deliver `TableChange` events to every observer after a committed write.
//!
//! # Invariants
//! - Observers are invoked without the registry lock held, so a callback may
//!   subscribe or cancel without deadlocking.
//! - A cancelled or dropped `Subscription` never receives another event.

use log::debug;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

type Observer = Arc<dyn Fn(&TableChange) + Send + Sync>;

/// One committed write that changed at least one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableChange {
    /// Table name the write touched.
    pub table: &'static str,
    /// Affected row id, or `None` when the write may have touched many rows.
    pub row_id: Option<i64>,
}

/// Registry of observers for one database handle.
#[derive(Default)]
pub struct InvalidationTracker {
    next_id: AtomicU64,
    observers: Mutex<BTreeMap<u64, Observer>>,
}

impl InvalidationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer and returns the handle that keeps it alive.
    pub fn subscribe(
        self: &Arc<Self>,
        observer: impl Fn(&TableChange) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut observers) = self.observers.lock() {
            observers.insert(id, Arc::new(observer));
        }
        debug!("event=observer_subscribe module=db status=ok observer_id={id}");
        Subscription {
            id,
            tracker: Arc::downgrade(self),
        }
    }

    /// Delivers one change to every registered observer.
    pub fn publish(&self, change: TableChange) {
        let snapshot: Vec<Observer> = match self.observers.lock() {
            Ok(observers) => observers.values().cloned().collect(),
            Err(_) => return,
        };
        debug!(
            "event=table_change module=db status=ok table={} observers={}",
            change.table,
            snapshot.len()
        );
        for observer in snapshot {
            observer(&change);
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.lock().map_or(0, |observers| observers.len())
    }

    fn remove(&self, id: u64) {
        if let Ok(mut observers) = self.observers.lock() {
            observers.remove(&id);
        }
    }
}

/// Handle for one registered observer.
///
/// Dropping the handle cancels the subscription.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    tracker: Weak<InvalidationTracker>,
}

impl Subscription {
    /// Stops delivery to this observer.
    pub fn cancel(self) {
        // Drop does the work.
    }

    /// Returns whether the owning tracker is still alive.
    pub fn is_active(&self) -> bool {
        self.tracker.strong_count() > 0
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(tracker) = self.tracker.upgrade() {
            tracker.remove(self.id);
            debug!(
                "event=observer_cancel module=db status=ok observer_id={}",
                self.id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{InvalidationTracker, TableChange};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const CHANGE: TableChange = TableChange {
        table: "bookmarks",
        row_id: Some(1),
    };

    #[test]
    fn publish_reaches_live_observers_only() {
        let tracker = Arc::new(InvalidationTracker::new());
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        let subscription = tracker.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tracker.publish(CHANGE);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        subscription.cancel();
        tracker.publish(CHANGE);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.observer_count(), 0);
    }

    #[test]
    fn observer_can_subscribe_from_inside_callback() {
        let tracker = Arc::new(InvalidationTracker::new());
        let inner_tracker = Arc::clone(&tracker);
        let nested = Arc::new(std::sync::Mutex::new(Vec::new()));
        let nested_store = Arc::clone(&nested);

        let _outer = tracker.subscribe(move |_| {
            let handle = inner_tracker.subscribe(|_| {});
            nested_store.lock().unwrap().push(handle);
        });

        tracker.publish(CHANGE);
        assert_eq!(tracker.observer_count(), 2);
    }

    #[test]
    fn subscription_is_inactive_once_tracker_is_gone() {
        let tracker = Arc::new(InvalidationTracker::new());
        let subscription = tracker.subscribe(|_| {});
        assert!(subscription.is_active());

        drop(tracker);
        assert!(!subscription.is_active());
    }
}
