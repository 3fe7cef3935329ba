pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::StoreResult;
use crate::models::{Booking, Event};

/// Persistence backend for events and bookings.
///
/// Implementations own slug uniqueness: a write whose slug belongs to a
/// different event id must fail with `StoreError::DuplicateSlug` and leave
/// the store untouched. There is no referential enforcement between the
/// two collections at this layer.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn exists_event(&self, id: &str) -> StoreResult<bool>;

    async fn find_event(&self, id: &str) -> StoreResult<Option<Event>>;

    async fn find_event_by_slug(&self, slug: &str) -> StoreResult<Option<Event>>;

    /// All events ordered by date, time, then slug.
    async fn list_events(&self) -> StoreResult<Vec<Event>>;

    async fn insert_or_update_event(&self, event: Event) -> StoreResult<Event>;

    async fn find_booking(&self, id: &str) -> StoreResult<Option<Booking>>;

    /// Bookings for one event, oldest first.
    async fn list_bookings_for_event(&self, event_id: &str) -> StoreResult<Vec<Booking>>;

    async fn insert_or_update_booking(&self, booking: Booking) -> StoreResult<Booking>;
}
