use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::DocumentStore;
use crate::error::{StoreError, StoreResult};
use crate::models::{Booking, Event};
use crate::utils;

/// SQLite-backed store. Records are kept as JSON payloads next to the
/// columns that need indexing; `events.slug` carries the unique index.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        utils::ensure_parent(path);
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "opened event database");
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&guard)
        })
        .await
        .map_err(|err| StoreError::Task(err.to_string()))?
    }
}

fn init_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS events(
            id TEXT PRIMARY KEY,
            slug TEXT NOT NULL,
            date TEXT NOT NULL,
            time TEXT NOT NULL,
            payload TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS events_slug_idx ON events(slug);
        CREATE TABLE IF NOT EXISTS bookings(
            id TEXT PRIMARY KEY,
            event_id TEXT NOT NULL,
            payload TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS bookings_event_id_idx ON bookings(event_id);",
    )?;
    debug!("event schema ready");
    Ok(())
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn decode_all<T: serde::de::DeserializeOwned>(payloads: Vec<String>) -> StoreResult<Vec<T>> {
    payloads
        .iter()
        .map(|payload| serde_json::from_str(payload).map_err(StoreError::from))
        .collect()
}

fn query_payloads(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> StoreResult<Vec<String>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| row.get::<_, String>(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn query_payload(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> StoreResult<Option<String>> {
    Ok(conn
        .query_row(sql, params, |row| row.get::<_, String>(0))
        .optional()?)
}

#[async_trait::async_trait]
impl DocumentStore for SqliteStore {
    async fn exists_event(&self, id: &str) -> StoreResult<bool> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let found: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM events WHERE id = ?1)",
                params![id],
                |row| row.get(0),
            )?;
            Ok(found)
        })
        .await
    }

    async fn find_event(&self, id: &str) -> StoreResult<Option<Event>> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            query_payload(conn, "SELECT payload FROM events WHERE id = ?1", params![id])?
                .map(|payload| serde_json::from_str(&payload).map_err(StoreError::from))
                .transpose()
        })
        .await
    }

    async fn find_event_by_slug(&self, slug: &str) -> StoreResult<Option<Event>> {
        let slug = slug.to_string();
        self.with_conn(move |conn| {
            query_payload(conn, "SELECT payload FROM events WHERE slug = ?1", params![slug])?
                .map(|payload| serde_json::from_str(&payload).map_err(StoreError::from))
                .transpose()
        })
        .await
    }

    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        self.with_conn(|conn| {
            let payloads = query_payloads(
                conn,
                "SELECT payload FROM events ORDER BY date, time, slug",
                [],
            )?;
            decode_all(payloads)
        })
        .await
    }

    async fn insert_or_update_event(&self, event: Event) -> StoreResult<Event> {
        self.with_conn(move |conn| {
            let payload = serde_json::to_string(&event)?;
            let written = conn.execute(
                "INSERT INTO events (id, slug, date, time, payload, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(id) DO UPDATE SET
                   slug = excluded.slug,
                   date = excluded.date,
                   time = excluded.time,
                   payload = excluded.payload,
                   updated_at = excluded.updated_at",
                params![
                    event.id,
                    event.slug,
                    event.date,
                    event.time,
                    payload,
                    event.created_at,
                    event.updated_at
                ],
            );
            match written {
                Ok(_) => Ok(event),
                Err(err) if is_unique_violation(&err) => Err(StoreError::DuplicateSlug {
                    slug: event.slug.clone(),
                }),
                Err(err) => Err(err.into()),
            }
        })
        .await
    }

    async fn find_booking(&self, id: &str) -> StoreResult<Option<Booking>> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            query_payload(conn, "SELECT payload FROM bookings WHERE id = ?1", params![id])?
                .map(|payload| serde_json::from_str(&payload).map_err(StoreError::from))
                .transpose()
        })
        .await
    }

    async fn list_bookings_for_event(&self, event_id: &str) -> StoreResult<Vec<Booking>> {
        let event_id = event_id.to_string();
        self.with_conn(move |conn| {
            let payloads = query_payloads(
                conn,
                "SELECT payload FROM bookings WHERE event_id = ?1 ORDER BY created_at, id",
                params![event_id],
            )?;
            decode_all(payloads)
        })
        .await
    }

    async fn insert_or_update_booking(&self, booking: Booking) -> StoreResult<Booking> {
        self.with_conn(move |conn| {
            let payload = serde_json::to_string(&booking)?;
            conn.execute(
                "INSERT INTO bookings (id, event_id, payload, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                   event_id = excluded.event_id,
                   payload = excluded.payload,
                   updated_at = excluded.updated_at",
                params![
                    booking.id,
                    booking.event_id,
                    payload,
                    booking.created_at,
                    booking.updated_at
                ],
            )?;
            Ok(booking)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn sample_event(id: &str, slug: &str, date: &str) -> Event {
        let now = Utc::now();
        Event {
            id: id.to_string(),
            title: slug.replace('-', " "),
            slug: slug.to_string(),
            description: "A day of talks".to_string(),
            overview: "Talks and workshops".to_string(),
            image: "/images/event1.png".to_string(),
            venue: "Moscone Center".to_string(),
            location: "San Francisco, CA, USA".to_string(),
            date: date.to_string(),
            time: "09:00".to_string(),
            mode: "offline".to_string(),
            audience: "Developers".to_string(),
            agenda: vec!["Keynote".to_string()],
            organizer: "Dev Community".to_string(),
            tags: vec!["rust".to_string()],
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn round_trips_events_and_enforces_unique_slugs() {
        let store = SqliteStore::open_in_memory().expect("open store");
        let first = sample_event("e1", "rustconf", "2025-09-02");
        store
            .insert_or_update_event(first.clone())
            .await
            .expect("insert first");

        assert!(store.exists_event("e1").await.unwrap());
        assert!(!store.exists_event("e2").await.unwrap());
        assert_eq!(store.find_event("e1").await.unwrap(), Some(first.clone()));
        assert_eq!(
            store.find_event_by_slug("rustconf").await.unwrap().map(|e| e.id),
            Some("e1".to_string())
        );

        let clash = sample_event("e2", "rustconf", "2025-10-01");
        let err = store.insert_or_update_event(clash).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateSlug { ref slug } if slug == "rustconf"));
        assert!(!store.exists_event("e2").await.unwrap());

        let mut renamed = first.clone();
        renamed.description = "Updated".to_string();
        store.insert_or_update_event(renamed).await.expect("update same id");
        let stored = store.find_event("e1").await.unwrap().unwrap();
        assert_eq!(stored.description, "Updated");
    }

    #[tokio::test]
    async fn lists_events_in_calendar_order() {
        let store = SqliteStore::open_in_memory().unwrap();
        for (id, slug, date) in [
            ("a", "late", "2025-12-01"),
            ("b", "early", "2025-01-15"),
            ("c", "middle", "2025-06-30"),
        ] {
            store
                .insert_or_update_event(sample_event(id, slug, date))
                .await
                .unwrap();
        }
        let slugs: Vec<String> = store
            .list_events()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.slug)
            .collect();
        assert_eq!(slugs, vec!["early", "middle", "late"]);
    }

    #[tokio::test]
    async fn bookings_are_listed_per_event() {
        let store = SqliteStore::open_in_memory().unwrap();
        let base = Utc::now();
        for (offset, id, event_id) in [(2, "b2", "e1"), (1, "b1", "e1"), (0, "b3", "e2")] {
            let at = base + Duration::seconds(offset);
            store
                .insert_or_update_booking(Booking {
                    id: id.to_string(),
                    event_id: event_id.to_string(),
                    email: format!("{id}@example.org"),
                    created_at: at,
                    updated_at: at,
                })
                .await
                .unwrap();
        }
        let ids: Vec<String> = store
            .list_bookings_for_event("e1")
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec!["b1", "b2"]);
        assert_eq!(
            store.find_booking("b3").await.unwrap().map(|b| b.event_id),
            Some("e2".to_string())
        );
        assert_eq!(store.find_booking("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn data_survives_reopening_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("events.sqlite");
        {
            let store = SqliteStore::open(&path).expect("open");
            store
                .insert_or_update_event(sample_event("e1", "jsconf", "2025-05-05"))
                .await
                .unwrap();
        }
        let reopened = SqliteStore::open(&path).expect("reopen");
        assert!(reopened.exists_event("e1").await.unwrap());
    }
}
