use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::{BookingError, ValidationError};
use crate::models::{new_id, Booking, BookingDraft};
use crate::store::DocumentStore;
use crate::validation::{validate, Check, FieldRule, FieldValue};

pub const BOOKING_RULES: &[FieldRule<BookingDraft>] = &[
    FieldRule {
        field: "eventId",
        value: |d| FieldValue::Text(&d.event_id),
        checks: &[(Check::NonEmptyString, "Event id is required.")],
    },
    FieldRule {
        field: "email",
        value: |d| FieldValue::Text(&d.email),
        checks: &[
            (Check::NonEmptyString, "Email is required."),
            (Check::Email, "Email must be a valid email address."),
        ],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingChanges {
    pub is_new: bool,
    pub event_id_changed: bool,
}

impl BookingChanges {
    pub fn between(previous: Option<&Booking>, draft: &BookingDraft) -> Self {
        match previous {
            None => Self {
                is_new: true,
                event_id_changed: true,
            },
            Some(prev) => Self {
                is_new: false,
                event_id_changed: prev.event_id != draft.event_id.trim(),
            },
        }
    }

    pub fn should_recheck_reference(&self) -> bool {
        self.is_new || self.event_id_changed
    }
}

/// Validation and normalization for a booking write; the reference check
/// against the event collection is left to the controller.
pub fn prepare_booking(
    previous: Option<&Booking>,
    draft: &BookingDraft,
    now: DateTime<Utc>,
) -> Result<Booking, ValidationError> {
    validate(draft, BOOKING_RULES)?;
    Ok(Booking {
        id: previous.map(|p| p.id.clone()).unwrap_or_else(new_id),
        event_id: draft.event_id.trim().to_string(),
        email: draft.email.trim().to_lowercase(),
        created_at: previous.map(|p| p.created_at).unwrap_or(now),
        updated_at: now,
    })
}

pub struct BookingController<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for BookingController<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: DocumentStore + ?Sized> BookingController<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn create(&self, draft: BookingDraft) -> Result<Booking, BookingError> {
        self.save(None, draft).await
    }

    pub async fn update(&self, id: &str, draft: BookingDraft) -> Result<Booking, BookingError> {
        let previous = self
            .store
            .find_booking(id)
            .await?
            .ok_or_else(|| BookingError::NotFound { id: id.to_string() })?;
        self.save(Some(previous), draft).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Booking>, BookingError> {
        Ok(self.store.find_booking(id).await?)
    }

    pub async fn list_for_event(&self, event_id: &str) -> Result<Vec<Booking>, BookingError> {
        Ok(self.store.list_bookings_for_event(event_id).await?)
    }

    async fn save(
        &self,
        previous: Option<Booking>,
        draft: BookingDraft,
    ) -> Result<Booking, BookingError> {
        let booking = prepare_booking(previous.as_ref(), &draft, Utc::now())?;

        let changes = BookingChanges::between(previous.as_ref(), &draft);
        if changes.should_recheck_reference() {
            if !self.store.exists_event(&booking.event_id).await? {
                warn!(event_id = %booking.event_id, "booking references a missing event");
                return Err(BookingError::DanglingReference {
                    event_id: booking.event_id,
                });
            }
        } else {
            debug!(id = %booking.id, "event reference unchanged, skipping lookup");
        }

        let saved = self.store.insert_or_update_booking(booking).await?;
        debug!(id = %saved.id, event_id = %saved.event_id, "booking saved");
        Ok(saved)
    }
}
