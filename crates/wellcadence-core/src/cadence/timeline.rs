use serde::{Deserialize, Serialize};

use super::calculator::next_trigger_at;
use crate::clock::{Calendar, ClockTime, EpochMs};
use crate::reminder::ReminderType;
use crate::settings::CadenceSettings;

const MAX_PER_TYPE: usize = 8;

/// One projected reminder occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub reminder: ReminderType,
    pub at: EpochMs,
    pub label: String,
}

/// Project up to eight occurrences per enabled type between `start` and
/// `end` on the local day containing `now`. An `end` at or before `start`
/// runs into the next day. Suppression is not applied.
pub fn build_timeline_preview(
    settings: &CadenceSettings,
    start: ClockTime,
    end: ClockTime,
    now: EpochMs,
    calendar: &Calendar,
) -> Vec<TimelineEntry> {
    let from = calendar.today_at(now, start);
    let mut until = calendar.today_at(now, end);
    if until <= from {
        until = calendar.at_clock(calendar.local_date(now) + chrono::Duration::days(1), end);
    }

    let mut entries = Vec::new();
    for reminder in ReminderType::ALL {
        let cadence = settings.reminder(reminder);
        let mut cursor = from;
        let mut last = 0;
        for _ in 0..MAX_PER_TYPE {
            let seed = if last > 0 { last } else { cursor };
            let Some(next) = next_trigger_at(cadence, seed, cursor, calendar) else {
                break;
            };
            if next > until {
                break;
            }
            entries.push(TimelineEntry {
                reminder,
                at: next,
                label: reminder.timeline_label().to_string(),
            });
            last = next;
            cursor = next;
        }
    }

    // Stable sort keeps declaration order for simultaneous entries.
    entries.sort_by_key(|entry| entry.at);
    entries
}
