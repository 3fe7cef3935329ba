use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::EventError;
use crate::models::{new_id, Event, EventDraft};
use crate::slug::slugify;
use crate::store::DocumentStore;
use crate::temporal::{normalize_date, normalize_time};
use crate::validation::{validate, Check, FieldRule, FieldValue};

const REQUIRED: Check = Check::NonEmptyString;
const NON_EMPTY_LIST: Check = Check::NonEmptyStringList;

pub const EVENT_RULES: &[FieldRule<EventDraft>] = &[
    FieldRule {
        field: "title",
        value: |d| FieldValue::Text(&d.title),
        checks: &[(REQUIRED, "Title is required.")],
    },
    FieldRule {
        field: "description",
        value: |d| FieldValue::Text(&d.description),
        checks: &[(REQUIRED, "Description is required.")],
    },
    FieldRule {
        field: "overview",
        value: |d| FieldValue::Text(&d.overview),
        checks: &[(REQUIRED, "Overview is required.")],
    },
    FieldRule {
        field: "image",
        value: |d| FieldValue::Text(&d.image),
        checks: &[(REQUIRED, "Image is required.")],
    },
    FieldRule {
        field: "venue",
        value: |d| FieldValue::Text(&d.venue),
        checks: &[(REQUIRED, "Venue is required.")],
    },
    FieldRule {
        field: "location",
        value: |d| FieldValue::Text(&d.location),
        checks: &[(REQUIRED, "Location is required.")],
    },
    FieldRule {
        field: "date",
        value: |d| FieldValue::Text(&d.date),
        checks: &[(REQUIRED, "Date is required.")],
    },
    FieldRule {
        field: "time",
        value: |d| FieldValue::Text(&d.time),
        checks: &[(REQUIRED, "Time is required.")],
    },
    FieldRule {
        field: "mode",
        value: |d| FieldValue::Text(&d.mode),
        checks: &[(REQUIRED, "Mode is required.")],
    },
    FieldRule {
        field: "audience",
        value: |d| FieldValue::Text(&d.audience),
        checks: &[(REQUIRED, "Audience is required.")],
    },
    FieldRule {
        field: "agenda",
        value: |d| FieldValue::List(&d.agenda),
        checks: &[(NON_EMPTY_LIST, "Agenda must contain at least one item.")],
    },
    FieldRule {
        field: "organizer",
        value: |d| FieldValue::Text(&d.organizer),
        checks: &[(REQUIRED, "Organizer is required.")],
    },
    FieldRule {
        field: "tags",
        value: |d| FieldValue::List(&d.tags),
        checks: &[(NON_EMPTY_LIST, "Tags must contain at least one item.")],
    },
];

/// What differs between the stored event (if any) and a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventChanges {
    pub is_new: bool,
    pub title_changed: bool,
    pub slug_present: bool,
    pub date_changed: bool,
    pub time_changed: bool,
}

impl EventChanges {
    pub fn between(previous: Option<&Event>, draft: &EventDraft) -> Self {
        let explicit_slug = explicit_slug(draft).is_some();
        match previous {
            None => Self {
                is_new: true,
                title_changed: true,
                slug_present: explicit_slug,
                date_changed: true,
                time_changed: true,
            },
            Some(prev) => Self {
                is_new: false,
                title_changed: prev.title != draft.title.trim(),
                slug_present: explicit_slug || !prev.slug.trim().is_empty(),
                date_changed: prev.date != draft.date.trim(),
                time_changed: prev.time != draft.time.trim(),
            },
        }
    }

    pub fn should_recompute_slug(&self) -> bool {
        self.is_new || self.title_changed || !self.slug_present
    }

    pub fn should_recompute_date(&self) -> bool {
        self.is_new || self.date_changed
    }

    pub fn should_recompute_time(&self) -> bool {
        self.is_new || self.time_changed
    }
}

fn explicit_slug(draft: &EventDraft) -> Option<&str> {
    draft
        .slug
        .as_deref()
        .map(str::trim)
        .filter(|slug| !slug.is_empty())
}

fn trimmed_list(items: &[String]) -> Vec<String> {
    items.iter().map(|item| item.trim().to_string()).collect()
}

/// Runs the full normalization pipeline for one write.
///
/// Nothing is returned unless every step succeeds, so a failed write never
/// carries a half-normalized record.
pub fn prepare_event(
    previous: Option<&Event>,
    draft: &EventDraft,
    now: DateTime<Utc>,
) -> Result<Event, EventError> {
    validate(draft, EVENT_RULES)?;

    let changes = EventChanges::between(previous, draft);
    let title = draft.title.trim().to_string();

    let slug = if changes.should_recompute_slug() {
        let slug = slugify(&title)?;
        debug!(%slug, "derived slug from title");
        slug
    } else {
        match (explicit_slug(draft), previous) {
            (Some(explicit), _) => slugify(explicit)?,
            (None, Some(prev)) => prev.slug.clone(),
            (None, None) => slugify(&title)?,
        }
    };

    let date = match previous {
        Some(prev) if !changes.should_recompute_date() => prev.date.clone(),
        _ => normalize_date(&draft.date)?,
    };
    let time = match previous {
        Some(prev) if !changes.should_recompute_time() => prev.time.clone(),
        _ => normalize_time(&draft.time)?,
    };

    Ok(Event {
        id: previous.map(|p| p.id.clone()).unwrap_or_else(new_id),
        title,
        slug,
        description: draft.description.trim().to_string(),
        overview: draft.overview.trim().to_string(),
        image: draft.image.trim().to_string(),
        venue: draft.venue.trim().to_string(),
        location: draft.location.trim().to_string(),
        date,
        time,
        mode: draft.mode.trim().to_string(),
        audience: draft.audience.trim().to_string(),
        agenda: trimmed_list(&draft.agenda),
        organizer: draft.organizer.trim().to_string(),
        tags: trimmed_list(&draft.tags),
        created_at: previous.map(|p| p.created_at).unwrap_or(now),
        updated_at: now,
    })
}

pub struct EventController<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for EventController<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: DocumentStore + ?Sized> EventController<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn create(&self, draft: EventDraft) -> Result<Event, EventError> {
        let event = prepare_event(None, &draft, Utc::now()).map_err(|err| {
            warn!(%err, title = %draft.title, "rejected new event");
            err
        })?;
        self.persist(event).await
    }

    pub async fn update(&self, id: &str, draft: EventDraft) -> Result<Event, EventError> {
        let previous = self
            .store
            .find_event(id)
            .await?
            .ok_or_else(|| EventError::NotFound { id: id.to_string() })?;
        let event = prepare_event(Some(&previous), &draft, Utc::now()).map_err(|err| {
            warn!(%err, id, "rejected event update");
            err
        })?;
        self.persist(event).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Event>, EventError> {
        Ok(self.store.find_event(id).await?)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Event>, EventError> {
        Ok(self.store.find_event_by_slug(slug).await?)
    }

    pub async fn list(&self) -> Result<Vec<Event>, EventError> {
        Ok(self.store.list_events().await?)
    }

    async fn persist(&self, event: Event) -> Result<Event, EventError> {
        let id = event.id.clone();
        match self.store.insert_or_update_event(event).await {
            Ok(saved) => {
                debug!(id = %saved.id, slug = %saved.slug, "event saved");
                Ok(saved)
            }
            Err(err) => {
                let err = EventError::from(err);
                warn!(%err, %id, "event write failed");
                Err(err)
            }
        }
    }
}
