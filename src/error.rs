use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unable to generate slug from title")]
pub struct EmptySlugError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid date format: {input:?}")]
pub struct InvalidDateError {
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTimeError {
    #[error("invalid time format: {0:?}")]
    Format(String),
    #[error("invalid minutes value: {0}")]
    Minute(u32),
    #[error("invalid hour value for 12-hour time: {0}")]
    Hour12(u32),
    #[error("invalid hour value for 24-hour time: {0}")]
    Hour24(u32),
}

/// One failed rule on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: &'static str,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field rule that failed for a record, in table order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn fields(&self) -> Vec<&'static str> {
        self.violations.iter().map(|v| v.field).collect()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "validation failed: {joined}")
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("slug already in use: {slug}")]
    DuplicateSlug { slug: String },
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("store connection poisoned")]
    Poisoned,
    #[error("store task failed: {0}")]
    Task(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum EventError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    EmptySlug(#[from] EmptySlugError),
    #[error(transparent)]
    InvalidDate(#[from] InvalidDateError),
    #[error(transparent)]
    InvalidTime(#[from] InvalidTimeError),
    #[error("an event with slug {slug:?} already exists")]
    DuplicateSlug { slug: String },
    #[error("event not found: {id}")]
    NotFound { id: String },
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for EventError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateSlug { slug } => EventError::DuplicateSlug { slug },
            other => EventError::Store(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Event does not exist for the provided eventId: {event_id}")]
    DanglingReference { event_id: String },
    #[error("booking not found: {id}")]
    NotFound { id: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_slug_is_lifted_out_of_store_errors() {
        let err: EventError = StoreError::DuplicateSlug {
            slug: "rustconf".into(),
        }
        .into();
        assert!(matches!(err, EventError::DuplicateSlug { ref slug } if slug == "rustconf"));

        let err: EventError = StoreError::Poisoned.into();
        assert!(matches!(err, EventError::Store(StoreError::Poisoned)));
    }

    #[test]
    fn validation_error_lists_every_field() {
        let err = ValidationError {
            violations: vec![
                FieldViolation {
                    field: "agenda",
                    message: "Agenda must contain at least one item.",
                },
                FieldViolation {
                    field: "tags",
                    message: "Tags must contain at least one item.",
                },
            ],
        };
        assert_eq!(err.fields(), vec!["agenda", "tags"]);
        assert_eq!(
            err.to_string(),
            "validation failed: agenda: Agenda must contain at least one item.; \
             tags: Tags must contain at least one item."
        );
    }
}
