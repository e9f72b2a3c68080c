//! SQLite-backed host storage.
//!
//! Provides persistent storage for:
//! - The scheduler state (JSON in the key-value table)
//! - Armed reminder timers, one row per label
//! - A log of delivered reminders

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::data_dir;
use crate::clock::{EpochMs, MINUTE_MS};
use crate::engine::DeliveryPayload;
use crate::error::StoreError;
use crate::state::SchedulerState;

const STATE_KEY: &str = "scheduler_state";

/// How long delivery log entries are kept.
pub const DELIVERY_RETENTION_DAYS: i64 = 30;

/// An armed timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerRecord {
    pub label: String,
    pub at: EpochMs,
}

/// A logged delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub id: i64,
    pub reminder: String,
    pub delivered_at: EpochMs,
    pub subtle: bool,
    pub escalated: bool,
    pub payload: DeliveryPayload,
}

/// SQLite database holding the scheduler state, timers and delivery log.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/wellcadence/wellcadence.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        Self::open_at(&data_dir()?.join("wellcadence.db"))
    }

    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS timers (
                label TEXT PRIMARY KEY,
                at_ms INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS deliveries (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                reminder     TEXT NOT NULL,
                delivered_at INTEGER NOT NULL,
                subtle       INTEGER NOT NULL DEFAULT 0,
                escalated    INTEGER NOT NULL DEFAULT 0,
                payload      TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_timers_at ON timers(at_ms);
            CREATE INDEX IF NOT EXISTS idx_deliveries_delivered_at ON deliveries(delivered_at);",
        )?;
        Ok(())
    }

    // ── Key-value ────────────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    // ── Scheduler state ──────────────────────────────────────────────

    pub fn load_state(&self) -> Result<Option<SchedulerState>, StoreError> {
        match self.kv_get(STATE_KEY)? {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| StoreError::CorruptState(e.to_string())),
            None => Ok(None),
        }
    }

    pub fn save_state(&self, state: &SchedulerState) -> Result<(), StoreError> {
        let json = serde_json::to_string(state).map_err(|e| StoreError::CorruptState(e.to_string()))?;
        self.kv_set(STATE_KEY, &json)?;
        Ok(())
    }

    // ── Timers ───────────────────────────────────────────────────────

    /// Arm `label` at `at`, replacing any earlier timer with that label.
    pub fn arm_timer(&self, label: &str, at: EpochMs) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO timers (label, at_ms) VALUES (?1, ?2)",
            params![label, at],
        )?;
        Ok(())
    }

    pub fn clear_timer(&self, label: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute("DELETE FROM timers WHERE label = ?1", params![label])?;
        Ok(())
    }

    /// All armed timers, soonest first.
    pub fn timers(&self) -> Result<Vec<TimerRecord>, rusqlite::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT label, at_ms FROM timers ORDER BY at_ms ASC, label ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok(TimerRecord {
                label: row.get(0)?,
                at: row.get(1)?,
            })
        })?;
        rows.collect()
    }

    /// Timers due at or before `now`, soonest first.
    pub fn due_timers(&self, now: EpochMs) -> Result<Vec<TimerRecord>, rusqlite::Error> {
        Ok(self.timers()?.into_iter().filter(|t| t.at <= now).collect())
    }

    // ── Deliveries ───────────────────────────────────────────────────

    /// Append to the delivery log, dropping entries older than
    /// [`DELIVERY_RETENTION_DAYS`] relative to this one.
    pub fn record_delivery(&self, payload: &DeliveryPayload) -> Result<i64, StoreError> {
        let json = serde_json::to_string(payload).map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        self.conn.execute(
            "INSERT INTO deliveries (reminder, delivered_at, subtle, escalated, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                payload.reminder.as_str(),
                payload.delivered_at,
                payload.subtle,
                payload.escalated,
                json,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        let cutoff = payload.delivered_at - DELIVERY_RETENTION_DAYS * 24 * 60 * MINUTE_MS;
        self.conn
            .execute("DELETE FROM deliveries WHERE delivered_at < ?1", params![cutoff])?;
        Ok(id)
    }

    /// Most recent deliveries, newest first.
    pub fn recent_deliveries(&self, limit: usize) -> Result<Vec<DeliveryRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, reminder, delivered_at, subtle, escalated, payload
             FROM deliveries
             ORDER BY delivered_at DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, bool>(3)?,
                row.get::<_, bool>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, reminder, delivered_at, subtle, escalated, json) = row?;
            let payload = serde_json::from_str(&json).map_err(|e| StoreError::CorruptState(e.to_string()))?;
            records.push(DeliveryRecord {
                id,
                reminder,
                delivered_at,
                subtle,
                escalated,
                payload,
            });
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Calendar;
    use crate::reminder::ReminderType;
    use crate::settings::default_reminder;
    use crate::state::ReminderCounters;
    use crate::suppression::Decision;

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
    }

    #[test]
    fn state_roundtrip() {
        let db = Database::open_memory().unwrap();
        assert!(db.load_state().unwrap().is_none());
        let mut state = SchedulerState::new(0, &Calendar::utc());
        state.record_fire(ReminderType::Posture, 1_000);
        db.save_state(&state).unwrap();
        assert_eq!(db.load_state().unwrap(), Some(state));
    }

    #[test]
    fn corrupt_state_is_reported() {
        let db = Database::open_memory().unwrap();
        db.kv_set(STATE_KEY, "{not json").unwrap();
        assert!(matches!(db.load_state(), Err(StoreError::CorruptState(_))));
    }

    #[test]
    fn arming_replaces_by_label() {
        let db = Database::open_memory().unwrap();
        db.arm_timer("wellcadence-eye", 500).unwrap();
        db.arm_timer("wellcadence-eye", 300).unwrap();
        db.arm_timer("wellcadence-hydration", 100).unwrap();
        let timers = db.timers().unwrap();
        assert_eq!(timers.len(), 2);
        assert_eq!(timers[0].label, "wellcadence-hydration");
        assert_eq!(db.due_timers(300).unwrap().len(), 2);
        db.clear_timer("wellcadence-eye").unwrap();
        assert_eq!(db.timers().unwrap().len(), 1);
    }

    #[test]
    fn deliveries_are_logged_newest_first() {
        let db = Database::open_memory().unwrap();
        let cadence = default_reminder(ReminderType::Eye);
        for at in [10, 20] {
            let payload =
                DeliveryPayload::build(ReminderType::Eye, &cadence, &ReminderCounters::default(), &Decision::active(), at);
            db.record_delivery(&payload).unwrap();
        }
        let records = db.recent_deliveries(10).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].delivered_at, 20);
        assert_eq!(records[0].reminder, "eye");
        assert_eq!(records[0].payload.title, "Eye break");
    }

    #[test]
    fn old_deliveries_are_pruned() {
        let db = Database::open_memory().unwrap();
        let cadence = default_reminder(ReminderType::Hydration);
        let day = 24 * 60 * MINUTE_MS;
        let now = 100 * day;
        for at in [now - 40 * day, now - 29 * day, now] {
            let payload = DeliveryPayload::build(
                ReminderType::Hydration,
                &cadence,
                &ReminderCounters::default(),
                &Decision::active(),
                at,
            );
            db.record_delivery(&payload).unwrap();
        }
        let kept: Vec<_> = db.recent_deliveries(10).unwrap().iter().map(|r| r.delivered_at).collect();
        assert_eq!(kept, vec![now, now - 29 * day]);
    }
}
