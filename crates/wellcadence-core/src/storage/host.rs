use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

use super::database::Database;
use crate::clock::EpochMs;
use crate::engine::{DeliveryPayload, DeliverySink, StateStore, TimerHost};
use crate::error::{Result, StoreError};
use crate::state::SchedulerState;

/// [`Database`] shared with the engine as state store, timer host and
/// delivery log.
pub struct SqliteHost {
    db: Mutex<Database>,
}

impl SqliteHost {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    /// Direct access for host-side queries (due timers, delivery log).
    pub fn db(&self) -> Result<MutexGuard<'_, Database>, StoreError> {
        self.db.lock().map_err(|_| StoreError::Locked)
    }
}

#[async_trait]
impl StateStore for SqliteHost {
    async fn load(&self) -> Result<Option<SchedulerState>> {
        Ok(self.db()?.load_state()?)
    }

    async fn save(&self, state: &SchedulerState) -> Result<()> {
        Ok(self.db()?.save_state(state)?)
    }
}

impl TimerHost for SqliteHost {
    fn arm(&self, label: &str, at: EpochMs) -> Result<()> {
        Ok(self.db()?.arm_timer(label, at)?)
    }

    fn clear(&self, label: &str) -> Result<()> {
        Ok(self.db()?.clear_timer(label)?)
    }
}

impl DeliverySink for SqliteHost {
    fn deliver(&self, payload: &DeliveryPayload) {
        let recorded = self.db().and_then(|db| db.record_delivery(payload));
        if let Err(e) = recorded {
            tracing::warn!(reminder = %payload.reminder, error = %e, "failed to log delivery");
        }
    }
}
