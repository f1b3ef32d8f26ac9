//! In-memory event store.
//!
//! Holds the timetable in a `Vec` behind a mutex. Subscribers are notified
//! synchronously on the mutating thread, after the lock is released, so a
//! callback may safely read the store again.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::{ScheduleEvent, Semester};
use crate::store::{
    ensure_unique_ids, EventFilter, EventStore, SnapshotCallback, StoreError, Subscription,
};

type SharedCallback = Arc<dyn Fn(Vec<ScheduleEvent>) + Send + Sync + 'static>;

struct Subscriber {
    id: u64,
    filter: EventFilter,
    callback: SharedCallback,
}

#[derive(Default)]
struct Inner {
    events: Vec<ScheduleEvent>,
    semester: Option<Semester>,
    subscribers: Vec<Subscriber>,
    next_subscriber: u64,
}

/// Thread-safe in-memory [`EventStore`].
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with events.
    ///
    /// Fails with `DuplicateId` if two events share an id.
    pub fn with_events(events: Vec<ScheduleEvent>) -> Result<Self, StoreError> {
        ensure_unique_ids(events.iter().map(|event| event.id.as_str()))?;

        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                events,
                ..Default::default()
            })),
        })
    }

    pub fn set_semester(&self, semester: Semester) -> Result<(), StoreError> {
        self.lock()?.semester = Some(semester);
        Ok(())
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.lock().map(|inner| inner.subscribers.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Sends each subscriber its filtered view of the current events.
    fn notify(&self) -> Result<(), StoreError> {
        let deliveries: Vec<(SharedCallback, Vec<ScheduleEvent>)> = {
            let inner = self.lock()?;
            inner
                .subscribers
                .iter()
                .map(|sub| (Arc::clone(&sub.callback), sub.filter.apply(&inner.events)))
                .collect()
        };

        for (callback, snapshot) in deliveries {
            callback(snapshot);
        }

        Ok(())
    }
}

impl EventStore for MemoryStore {
    fn list_events(&self, filter: &EventFilter) -> Result<Vec<ScheduleEvent>, StoreError> {
        Ok(filter.apply(&self.lock()?.events))
    }

    fn insert_event(&self, event: ScheduleEvent) -> Result<(), StoreError> {
        {
            let mut inner = self.lock()?;
            if inner.events.iter().any(|existing| existing.id == event.id) {
                return Err(StoreError::DuplicateId(event.id));
            }
            tracing::debug!(id = %event.id, course = %event.course_id, "event inserted");
            inner.events.push(event);
        }
        self.notify()
    }

    fn remove_event(&self, id: &str) -> Result<ScheduleEvent, StoreError> {
        let removed = {
            let mut inner = self.lock()?;
            let position = inner
                .events
                .iter()
                .position(|event| event.id == id)
                .ok_or_else(|| StoreError::EventNotFound(id.to_string()))?;
            inner.events.remove(position)
        };
        tracing::debug!(id, course = %removed.course_id, "event removed");
        self.notify()?;
        Ok(removed)
    }

    fn semester(&self) -> Result<Option<Semester>, StoreError> {
        Ok(self.lock()?.semester)
    }

    fn subscribe(
        &self,
        filter: EventFilter,
        callback: SnapshotCallback,
    ) -> Result<Subscription, StoreError> {
        let id = {
            let mut inner = self.lock()?;
            let id = inner.next_subscriber;
            inner.next_subscriber += 1;
            inner.subscribers.push(Subscriber {
                id,
                filter,
                callback: Arc::from(callback),
            });
            id
        };

        let inner = Arc::downgrade(&self.inner);
        Ok(Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                if let Ok(mut inner) = inner.lock() {
                    inner.subscribers.retain(|sub| sub.id != id);
                }
            }
        }))
    }
}
