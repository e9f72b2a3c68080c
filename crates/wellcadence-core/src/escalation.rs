//! Escalation after repeated ignores.
//!
//! Advisory only: the flag rides along in the delivery payload and the host
//! decides how much louder to be. The engine never changes its own behaviour.

use crate::settings::{ReminderCadence, ESCALATE_AFTER_RANGE};
use crate::state::ReminderCounters;

/// Ignore threshold, clamped to its valid range.
pub fn escalation_threshold(cadence: &ReminderCadence) -> u32 {
    cadence
        .escalate_after_ignores
        .clamp(*ESCALATE_AFTER_RANGE.start(), *ESCALATE_AFTER_RANGE.end())
}

pub fn is_escalated(cadence: &ReminderCadence, counters: &ReminderCounters) -> bool {
    cadence.escalate_if_ignored && counters.ignored_count >= escalation_threshold(cadence)
}

/// Ignores left before escalation, or `None` when escalation is off.
pub fn ignores_until_escalation(cadence: &ReminderCadence, counters: &ReminderCounters) -> Option<u32> {
    cadence
        .escalate_if_ignored
        .then(|| escalation_threshold(cadence).saturating_sub(counters.ignored_count))
}
