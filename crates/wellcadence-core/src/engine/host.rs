use async_trait::async_trait;

use super::payload::DeliveryPayload;
use crate::clock::EpochMs;
use crate::error::Result;
use crate::reminder::ReminderType;
use crate::state::SchedulerState;
use crate::suppression::IdleState;

/// Durable home of the [`SchedulerState`].
///
/// The engine loads the freshest copy at the start of every entry point and
/// saves once at the end. Both calls happen while the engine's lock is held.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// `Ok(None)` on first run.
    async fn load(&self) -> Result<Option<SchedulerState>>;

    async fn save(&self, state: &SchedulerState) -> Result<()>;
}

/// The host's alarm primitive. One label per reminder type; arming a label
/// replaces any earlier alarm with the same label.
pub trait TimerHost: Send + Sync {
    fn arm(&self, label: &str, at: EpochMs) -> Result<()>;

    fn clear(&self, label: &str) -> Result<()>;
}

/// Where delivered reminders go.
pub trait DeliverySink: Send + Sync {
    fn deliver(&self, payload: &DeliveryPayload);

    /// Out-of-band audio cue. `volume` is 0.0..=1.0.
    fn cue(&self, _reminder: ReminderType, _volume: f64) {
        // default no-op
    }
}

/// Host observations used by the suppression chain.
#[async_trait]
pub trait SignalSource: Send + Sync {
    /// Whether the user has been away for at least `threshold_secs`.
    /// Errors and slow answers are treated as [`IdleState::Active`].
    async fn idle_state(&self, threshold_secs: u32) -> Result<IdleState>;

    /// Hostname of the foreground browser tab.
    fn active_hostname(&self) -> Option<String> {
        None
    }

    fn focus_active(&self) -> bool {
        false
    }

    /// Time of the last keyboard or pointer input.
    fn last_activity_at(&self) -> Option<EpochMs> {
        None
    }
}
