//! Pure rescheduling: settings + state + now → next trigger per type.

use crate::cadence::next_trigger_at;
use crate::clock::{Calendar, ClockTime, EpochMs};
use crate::reminder::ReminderType;
use crate::settings::{CadenceSettings, MissedDayFallback, ReminderCadence};
use crate::state::SchedulerState;

const MORNING: ClockTime = ClockTime::from_minutes(9 * 60);

/// Next trigger for one type. Applies the daily-audit catch-up and never
/// lands inside an active per-type snooze.
pub fn plan_next(
    reminder: ReminderType,
    settings: &CadenceSettings,
    state: &SchedulerState,
    now: EpochMs,
    calendar: &Calendar,
) -> Option<EpochMs> {
    let cadence = settings.reminder(reminder);
    let counters = state.counters(reminder);

    let mut next = next_trigger_at(cadence, counters.last_triggered_at, now, calendar)?;
    if reminder == ReminderType::DailyAudit {
        next = daily_audit_fallback(cadence, counters.last_completed_at, next, now, calendar);
    }
    Some(next.max(counters.snoozed_until))
}

/// Recompute `next_at` for all six types and the overall next reminder.
pub fn plan_all(settings: &CadenceSettings, state: &mut SchedulerState, now: EpochMs, calendar: &Calendar) {
    for reminder in ReminderType::ALL {
        let next = plan_next(reminder, settings, state, now, calendar);
        state.set_next(reminder, next);
    }
    state.refresh_next_reminder();
}

/// The audit's windows are short and once a day; after a missed day the
/// regular schedule would just wait for tomorrow's window. If the audit was
/// not completed today or yesterday, snap to a catch-up time instead.
pub fn daily_audit_fallback(
    cadence: &ReminderCadence,
    last_completed_at: EpochMs,
    computed: EpochMs,
    now: EpochMs,
    calendar: &Calendar,
) -> EpochMs {
    if completed_recently(last_completed_at, now, calendar) {
        return computed;
    }
    // Strictly after now, so a fire at the catch-up time moves on.
    let after = now + 1;
    match cadence.missed_day_fallback {
        MissedDayFallback::NextMorning => calendar.next_occurrence(after, MORNING),
        MissedDayFallback::NextWorkWindow => match cadence.schedule.window_bounds().first() {
            Some(&(start, _)) => calendar.next_occurrence(after, ClockTime::from_minutes(start)),
            None => computed,
        },
        MissedDayFallback::Skip => computed,
    }
}

fn completed_recently(last_completed_at: EpochMs, now: EpochMs, calendar: &Calendar) -> bool {
    if last_completed_at <= 0 {
        return false;
    }
    let day = calendar.day_key(last_completed_at);
    day == calendar.day_key(now) || day == calendar.day_key_offset(now, -1)
}
