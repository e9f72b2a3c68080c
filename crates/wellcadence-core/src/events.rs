use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::EpochMs;
use crate::reminder::ReminderType;
use crate::state::UserAction;
use crate::suppression::SuppressionReason;

/// Every engine entry point reports what it did as a list of events.
/// Hosts log them, print them, or forward them to a UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The local day changed and today's counters were reset.
    DayRolledOver {
        today: String,
        at: DateTime<Utc>,
    },
    ReminderDelivered {
        reminder: ReminderType,
        /// `ACTIVE`, or `MEETING` for a subtle delivery.
        reason: SuppressionReason,
        subtle: bool,
        escalated: bool,
        /// An unresolved earlier delivery was counted as ignored.
        replaced_pending: bool,
        at: DateTime<Utc>,
    },
    ReminderSuppressed {
        reminder: ReminderType,
        reason: SuppressionReason,
        at: DateTime<Utc>,
    },
    /// A timer fired for a reminder whose schedule has since moved on.
    StaleFireIgnored {
        reminder: ReminderType,
        scheduled_at: EpochMs,
        at: DateTime<Utc>,
    },
    ActionRecorded {
        reminder: ReminderType,
        action: UserAction,
        snoozed_until: Option<EpochMs>,
        at: DateTime<Utc>,
    },
    SnoozeAllStarted {
        until: EpochMs,
        at: DateTime<Utc>,
    },
    PanicStarted {
        until: EpochMs,
        at: DateTime<Utc>,
    },
    /// Global snooze, panic and per-type snoozes were lifted.
    OverridesCleared {
        at: DateTime<Utc>,
    },
    SettingsApplied {
        at: DateTime<Utc>,
    },
    Rescheduled {
        next_reminder_type: Option<ReminderType>,
        next_reminder_at: EpochMs,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::DayRolledOver { .. } => "DayRolledOver",
            Event::ReminderDelivered { .. } => "ReminderDelivered",
            Event::ReminderSuppressed { .. } => "ReminderSuppressed",
            Event::StaleFireIgnored { .. } => "StaleFireIgnored",
            Event::ActionRecorded { .. } => "ActionRecorded",
            Event::SnoozeAllStarted { .. } => "SnoozeAllStarted",
            Event::PanicStarted { .. } => "PanicStarted",
            Event::OverridesCleared { .. } => "OverridesCleared",
            Event::SettingsApplied { .. } => "SettingsApplied",
            Event::Rescheduled { .. } => "Rescheduled",
        }
    }
}

/// Epoch milliseconds as a UTC timestamp for event records.
pub fn stamp(at: EpochMs) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(at).unwrap_or_default()
}
