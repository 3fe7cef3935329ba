pub mod booking;
pub mod config;
pub mod error;
pub mod event;
pub mod models;
pub mod seed;
pub mod slug;
pub mod store;
pub mod temporal;
mod utils;
pub mod validation;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub use booking::{BookingChanges, BookingController};
pub use config::{AppConfig, ConfigStore};
pub use error::{
    BookingError, EmptySlugError, EventError, FieldViolation, InvalidDateError, InvalidTimeError,
    StoreError, ValidationError,
};
pub use event::{EventChanges, EventController};
pub use models::{Booking, BookingDraft, Event, EventDraft};
pub use slug::slugify;
pub use store::{DocumentStore, MemoryStore, SqliteStore};
pub use temporal::{normalize_date, normalize_time};

const DEFAULT_LOG_FILTER: &str = "dev_event=info";

/// Installs the global fmt subscriber. Later calls are no-ops.
pub fn init_logging(config: &AppConfig) {
    let filter = config
        .log_filter
        .as_deref()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Both entity controllers sharing one store.
pub struct DevEvents<S: ?Sized> {
    pub events: EventController<S>,
    pub bookings: BookingController<S>,
}

impl<S: DocumentStore + ?Sized> DevEvents<S> {
    pub fn with_store(store: Arc<S>) -> Self {
        Self {
            events: EventController::new(Arc::clone(&store)),
            bookings: BookingController::new(store),
        }
    }
}

impl DevEvents<SqliteStore> {
    /// Opens the SQLite database named by `config`, seeding the sample
    /// catalogue when enabled and the database is empty.
    pub async fn open(config: &AppConfig) -> Result<Self> {
        let path = config.resolved_database_path();
        let store = SqliteStore::open(&path)
            .with_context(|| format!("unable to open database {}", path.display()))?;
        let app = Self::with_store(Arc::new(store));
        if config.seed_sample_events {
            let seeded = seed::seed_if_empty(&app.events)
                .await
                .context("seeding sample events")?;
            if seeded > 0 {
                info!(seeded, "sample catalogue created");
            }
        }
        Ok(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_seeds_a_fresh_database_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            database_path: Some(dir.path().join("events.sqlite")),
            log_filter: Some("dev_event=debug".to_string()),
            seed_sample_events: true,
        };
        init_logging(&config);

        let app = DevEvents::open(&config).await.unwrap();
        assert_eq!(app.events.list().await.unwrap().len(), 6);
        drop(app);

        let reopened = DevEvents::open(&config).await.unwrap();
        assert_eq!(reopened.events.list().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn seeding_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            database_path: Some(dir.path().join("events.sqlite")),
            log_filter: None,
            seed_sample_events: false,
        };
        let app = DevEvents::open(&config).await.unwrap();
        assert!(app.events.list().await.unwrap().is_empty());
    }
}
