use serde::{Deserialize, Serialize};

use crate::clock::EpochMs;
use crate::escalation::is_escalated;
use crate::reminder::ReminderType;
use crate::settings::{DeliveryConfig, ReminderCadence};
use crate::state::ReminderCounters;
use crate::suppression::{Decision, SuppressionReason};

/// Everything the UI needs to present one delivered reminder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryPayload {
    pub reminder: ReminderType,
    pub title: String,
    pub body: String,
    pub delivery: DeliveryConfig,
    pub escalated: bool,
    pub default_snooze_min: u32,
    pub snooze_choices: Vec<u32>,
    pub completed_count: u32,
    pub fired_count: u32,
    /// Hydration only.
    pub daily_goal: Option<u32>,
    /// Present quietly: a meeting is on, or the type is configured gentle.
    pub subtle: bool,
    pub reason: SuppressionReason,
    pub delivered_at: EpochMs,
}

impl DeliveryPayload {
    pub fn build(
        reminder: ReminderType,
        cadence: &ReminderCadence,
        counters: &ReminderCounters,
        decision: &Decision,
        now: EpochMs,
    ) -> Self {
        let (title, body) = reminder_copy(reminder);
        Self {
            reminder,
            title: title.to_string(),
            body: body.to_string(),
            delivery: cadence.delivery.clone(),
            escalated: is_escalated(cadence, counters),
            default_snooze_min: cadence.default_snooze_min(),
            snooze_choices: cadence.snooze_minutes.clone(),
            completed_count: counters.completed_count,
            fired_count: counters.fired_count,
            daily_goal: (reminder == ReminderType::Hydration).then_some(cadence.daily_goal_glasses),
            subtle: decision.subtle || cadence.delivery.gentle,
            reason: decision.reason,
            delivered_at: now,
        }
    }

    /// Whether the host should also play the audio cue.
    pub fn wants_sound(&self) -> bool {
        self.delivery.sound && !self.subtle
    }
}

/// Default title and body for each reminder type.
pub fn reminder_copy(reminder: ReminderType) -> (&'static str, &'static str) {
    match reminder {
        ReminderType::Eye => ("Eye break", "Focus on something far away for 20 seconds and blink slowly."),
        ReminderType::Movement => ("Move", "Stand up and walk around for a minute."),
        ReminderType::Posture => ("Posture check", "You have been still a while. Sit back, drop your shoulders, reset."),
        ReminderType::Hydration => ("Hydrate", "Drink a glass of water and log it."),
        ReminderType::Breathwork => ("Breathe", "Four slow breaths: in for four, hold for four, out for six."),
        ReminderType::DailyAudit => ("Daily audit", "Two minutes to review today: what worked, what drained you."),
    }
}
