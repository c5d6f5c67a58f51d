//! SQLite event store implementation.

use crate::{Error, Event, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Params, params};
use std::path::Path;
use uuid::Uuid;

const INSERT_EVENT: &str =
    "INSERT INTO events (id, policy_id, timestamp, kind, data) VALUES (?1, ?2, ?3, ?4, ?5)";

/// SQLite-backed event journal.
pub struct EventStore {
    conn: Connection,
}

impl EventStore {
    /// Open or create an event store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory event store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS events (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                policy_id TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                kind TEXT NOT NULL,
                data TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_events_policy
                ON events(policy_id, seq);
            "#,
        )?;
        Ok(())
    }

    /// Append an event to the store.
    pub fn append(&self, event: &Event) -> Result<()> {
        self.conn.execute(
            INSERT_EVENT,
            params![
                event.id.to_string(),
                event.kind.policy_id().to_string(),
                event.timestamp.to_rfc3339(),
                event.kind.name(),
                serde_json::to_string(&event.kind)?,
            ],
        )?;
        Ok(())
    }

    /// Append a batch of events in one transaction.
    pub fn append_all(&mut self, events: &[Event]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        for event in events {
            tx.execute(
                INSERT_EVENT,
                params![
                    event.id.to_string(),
                    event.kind.policy_id().to_string(),
                    event.timestamp.to_rfc3339(),
                    event.kind.name(),
                    serde_json::to_string(&event.kind)?,
                ],
            )?;
        }
        tx.commit()?;
        Ok(events.len())
    }

    /// Load all events about a policy, in emission order.
    pub fn load_policy(&self, policy_id: Uuid) -> Result<Vec<Event>> {
        self.query(
            "SELECT id, timestamp, data FROM events WHERE policy_id = ?1 ORDER BY seq",
            params![policy_id.to_string()],
        )
    }

    /// Load events, optionally filtered by kind name (e.g. `spent_flushed`).
    pub fn load_events(&self, kind: Option<&str>) -> Result<Vec<Event>> {
        match kind {
            Some(kind) => self.query(
                "SELECT id, timestamp, data FROM events WHERE kind = ?1 ORDER BY seq",
                params![kind],
            ),
            None => self.query(
                "SELECT id, timestamp, data FROM events ORDER BY seq",
                params![],
            ),
        }
    }

    fn query(&self, sql: &str, args: impl Params) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare(sql)?;

        let events = stmt
            .query_map(args, |row| {
                let id: String = row.get(0)?;
                let timestamp: String = row.get(1)?;
                let data: String = row.get(2)?;
                Ok((id, timestamp, data))
            })?
            .map(|row| {
                let (id, timestamp, data) = row?;
                decode(id, &timestamp, &data)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(events)
    }
}

/// Rebuild an event from its stored columns. Any undecodable column fails
/// the whole load.
fn decode(id: String, timestamp: &str, data: &str) -> Result<Event> {
    let corrupt = |reason: String| Error::Corrupt {
        id: id.clone(),
        reason,
    };
    let uuid = id
        .parse::<Uuid>()
        .map_err(|e| corrupt(e.to_string()))?;
    let timestamp = timestamp
        .parse::<DateTime<Utc>>()
        .map_err(|e| corrupt(e.to_string()))?;
    Ok(Event {
        id: uuid,
        timestamp,
        kind: serde_json::from_str(data)?,
    })
}
