use std::collections::HashMap;

use tokio::sync::RwLock;

use super::DocumentStore;
use crate::error::{StoreError, StoreResult};
use crate::models::{Booking, Event};

#[derive(Default)]
struct Collections {
    events: HashMap<String, Event>,
    bookings: HashMap<String, Booking>,
}

/// Process-local store. The write lock is held across the slug check and the
/// insert, so concurrent writers cannot both claim a slug.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn exists_event(&self, id: &str) -> StoreResult<bool> {
        Ok(self.inner.read().await.events.contains_key(id))
    }

    async fn find_event(&self, id: &str) -> StoreResult<Option<Event>> {
        Ok(self.inner.read().await.events.get(id).cloned())
    }

    async fn find_event_by_slug(&self, slug: &str) -> StoreResult<Option<Event>> {
        let guard = self.inner.read().await;
        Ok(guard.events.values().find(|e| e.slug == slug).cloned())
    }

    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        let mut events: Vec<Event> = self.inner.read().await.events.values().cloned().collect();
        events.sort_by(|a, b| (&a.date, &a.time, &a.slug).cmp(&(&b.date, &b.time, &b.slug)));
        Ok(events)
    }

    async fn insert_or_update_event(&self, event: Event) -> StoreResult<Event> {
        let mut guard = self.inner.write().await;
        let taken = guard
            .events
            .values()
            .any(|other| other.slug == event.slug && other.id != event.id);
        if taken {
            return Err(StoreError::DuplicateSlug { slug: event.slug });
        }
        guard.events.insert(event.id.clone(), event.clone());
        Ok(event)
    }

    async fn find_booking(&self, id: &str) -> StoreResult<Option<Booking>> {
        Ok(self.inner.read().await.bookings.get(id).cloned())
    }

    async fn list_bookings_for_event(&self, event_id: &str) -> StoreResult<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self
            .inner
            .read()
            .await
            .bookings
            .values()
            .filter(|b| b.event_id == event_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        Ok(bookings)
    }

    async fn insert_or_update_booking(&self, booking: Booking) -> StoreResult<Booking> {
        self.inner
            .write()
            .await
            .bookings
            .insert(booking.id.clone(), booking.clone());
        Ok(booking)
    }
}
