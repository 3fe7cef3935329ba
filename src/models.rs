use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub overview: String,
    pub image: String,
    pub venue: String,
    pub location: String,
    pub date: String, // YYYY-MM-DD
    pub time: String, // HH:mm, 24h
    pub mode: String,
    pub audience: String,
    pub agenda: Vec<String>,
    pub organizer: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Candidate event as submitted by a caller, before normalization.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct EventDraft {
    pub title: String,
    pub slug: Option<String>,
    pub description: String,
    pub overview: String,
    pub image: String,
    pub venue: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub mode: String,
    pub audience: String,
    pub agenda: Vec<String>,
    pub organizer: String,
    pub tags: Vec<String>,
}

impl From<&Event> for EventDraft {
    fn from(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            slug: Some(event.slug.clone()),
            description: event.description.clone(),
            overview: event.overview.clone(),
            image: event.image.clone(),
            venue: event.venue.clone(),
            location: event.location.clone(),
            date: event.date.clone(),
            time: event.time.clone(),
            mode: event.mode.clone(),
            audience: event.audience.clone(),
            agenda: event.agenda.clone(),
            organizer: event.organizer.clone(),
            tags: event.tags.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub event_id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingDraft {
    pub event_id: String,
    pub email: String,
}

impl From<&Booking> for BookingDraft {
    fn from(booking: &Booking) -> Self {
        Self {
            event_id: booking.event_id.clone(),
            email: booking.email.clone(),
        }
    }
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn persisted_field_names_are_camel_case() {
        let now = Utc::now();
        let booking = Booking {
            id: "b1".into(),
            event_id: "e1".into(),
            email: "ada@example.org".into(),
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(&booking).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        for key in ["id", "eventId", "email", "createdAt", "updatedAt"] {
            assert!(keys.contains(&key), "missing {key}");
        }
    }

    #[test]
    fn drafts_accept_partial_json() {
        let draft: EventDraft = serde_json::from_value(json!({
            "title": "RustConf",
            "agenda": ["Keynote"],
        }))
        .unwrap();
        assert_eq!(draft.title, "RustConf");
        assert_eq!(draft.slug, None);
        assert!(draft.tags.is_empty());
    }
}
