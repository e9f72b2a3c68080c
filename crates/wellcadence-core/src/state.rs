//! Persisted scheduler state and its daily counters.
//!
//! One [`SchedulerState`] exists per process. Every mutating operation first
//! passes through [`SchedulerState::ensure_today`], which is the only place
//! day rollover happens. There is no midnight job; a new day is noticed the
//! next time anything touches the state.
//!
//! Counters are unsigned and decremented with saturation, so bookkeeping
//! mistakes clamp at zero instead of surfacing as errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::clock::{Calendar, EpochMs, MINUTE_MS};
use crate::reminder::{PerReminder, ReminderType};

/// Per-type schedule and today's counters. Timestamps of 0 mean "none".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderCounters {
    pub next_at: EpochMs,
    pub last_triggered_at: EpochMs,
    pub last_completed_at: EpochMs,
    pub fired_count: u32,
    pub completed_count: u32,
    pub ignored_count: u32,
    pub suppressed_count: u32,
    /// Delivered but unresolved. 0 or 1 once a fire has been recorded.
    pub pending_count: u32,
    pub snoozed_until: EpochMs,
}

impl ReminderCounters {
    fn reset_for_new_day(&mut self) {
        self.next_at = 0;
        self.fired_count = 0;
        self.completed_count = 0;
        self.ignored_count = 0;
        self.suppressed_count = 0;
        self.pending_count = 0;
    }

    fn resolve_pending(&mut self) {
        self.pending_count = self.pending_count.saturating_sub(1);
    }
}

/// What the user did with a delivered reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum UserAction {
    Complete,
    Dismiss,
    /// Closed without acting; counted the same as a dismissal.
    Ignored,
    /// Delay this type. `None` uses the type's default snooze length.
    Snooze { minutes: Option<u32> },
}

impl UserAction {
    pub fn as_str(self) -> &'static str {
        match self {
            UserAction::Complete => "complete",
            UserAction::Dismiss => "dismiss",
            UserAction::Ignored => "ignored",
            UserAction::Snooze { .. } => "snooze",
        }
    }
}

impl fmt::Display for UserAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "complete" | "done" => Ok(UserAction::Complete),
            "dismiss" => Ok(UserAction::Dismiss),
            "ignored" | "ignore" => Ok(UserAction::Ignored),
            "snooze" => Ok(UserAction::Snooze { minutes: None }),
            other => Err(format!("unknown action '{other}'")),
        }
    }
}

/// Result of recording a delivered fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireRecord {
    /// A previous delivery was still pending and has been counted as ignored.
    pub rolled_stale_pending: bool,
}

/// The single scheduler record shared by all reminder types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerState {
    /// Local day key (`YYYY-MM-DD`) the counters belong to.
    pub today: String,
    pub reminders: PerReminder<ReminderCounters>,
    pub next_reminder_type: Option<ReminderType>,
    pub next_reminder_at: EpochMs,
    pub snooze_all_until: EpochMs,
    pub panic_until: EpochMs,
}

impl SchedulerState {
    /// Fresh state with zeroed counters for the day containing `now`.
    pub fn new(now: EpochMs, calendar: &Calendar) -> Self {
        Self {
            today: calendar.day_key(now),
            ..Self::default()
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn counters(&self, reminder: ReminderType) -> &ReminderCounters {
        &self.reminders[reminder]
    }

    pub fn counters_mut(&mut self, reminder: ReminderType) -> &mut ReminderCounters {
        &mut self.reminders[reminder]
    }

    pub fn is_panic_active(&self, now: EpochMs) -> bool {
        self.panic_until > now
    }

    pub fn is_snooze_all_active(&self, now: EpochMs) -> bool {
        self.snooze_all_until > now
    }

    pub fn is_snoozed(&self, reminder: ReminderType, now: EpochMs) -> bool {
        self.reminders[reminder].snoozed_until > now
    }

    // ── Rollover ─────────────────────────────────────────────────────

    /// Roll counters over if the local day changed since the last call.
    /// Returns whether a rollover happened; a second call on the same day
    /// is a no-op.
    pub fn ensure_today(&mut self, now: EpochMs, calendar: &Calendar) -> bool {
        let key = calendar.day_key(now);
        if self.today == key {
            return false;
        }
        for reminder in ReminderType::ALL {
            self.reminders[reminder].reset_for_new_day();
        }
        self.next_reminder_type = None;
        self.next_reminder_at = 0;
        self.today = key;
        true
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// A due reminder was vetoed. Pending is left alone.
    pub fn record_suppressed(&mut self, reminder: ReminderType) {
        let counters = &mut self.reminders[reminder];
        counters.suppressed_count = counters.suppressed_count.saturating_add(1);
    }

    /// A due reminder was delivered. An unresolved earlier delivery of the
    /// same type is counted as ignored and replaced.
    pub fn record_fire(&mut self, reminder: ReminderType, now: EpochMs) -> FireRecord {
        let counters = &mut self.reminders[reminder];
        counters.fired_count = counters.fired_count.saturating_add(1);

        let rolled_stale_pending = counters.pending_count > 0;
        if rolled_stale_pending {
            counters.ignored_count = counters.ignored_count.saturating_add(1);
        }
        counters.pending_count = 1;
        counters.last_triggered_at = now;

        FireRecord { rolled_stale_pending }
    }

    /// Apply a user action. `default_snooze_min` is used when a snooze does
    /// not name its own length. Returns the snooze deadline, if any.
    pub fn apply_action(
        &mut self,
        reminder: ReminderType,
        action: UserAction,
        now: EpochMs,
        default_snooze_min: u32,
    ) -> Option<EpochMs> {
        let counters = &mut self.reminders[reminder];
        counters.resolve_pending();
        match action {
            UserAction::Complete => {
                counters.completed_count = counters.completed_count.saturating_add(1);
                counters.last_completed_at = now;
                None
            }
            UserAction::Dismiss | UserAction::Ignored => {
                counters.ignored_count = counters.ignored_count.saturating_add(1);
                None
            }
            UserAction::Snooze { minutes } => {
                let minutes = minutes.filter(|m| *m > 0).unwrap_or(default_snooze_min).max(1);
                let until = now.saturating_add(i64::from(minutes) * MINUTE_MS);
                counters.snoozed_until = until;
                Some(until)
            }
        }
    }

    // ── Global overrides ─────────────────────────────────────────────

    pub fn snooze_all(&mut self, now: EpochMs, minutes: u32) -> EpochMs {
        self.snooze_all_until = now.saturating_add(i64::from(minutes.max(1)) * MINUTE_MS);
        self.snooze_all_until
    }

    pub fn panic_off(&mut self, now: EpochMs, minutes: u32) -> EpochMs {
        self.panic_until = now.saturating_add(i64::from(minutes.max(1)) * MINUTE_MS);
        self.panic_until
    }

    /// Lift every global and per-type snooze and the panic override.
    pub fn resume_all(&mut self) {
        self.snooze_all_until = 0;
        self.panic_until = 0;
        for reminder in ReminderType::ALL {
            self.reminders[reminder].snoozed_until = 0;
        }
    }

    // ── Schedule bookkeeping ─────────────────────────────────────────

    /// Store the next trigger time for a type; `None` clears it.
    pub fn set_next(&mut self, reminder: ReminderType, next_at: Option<EpochMs>) {
        self.reminders[reminder].next_at = next_at.unwrap_or(0);
    }

    /// Recompute `next_reminder_type`/`next_reminder_at` as the earliest
    /// non-zero `next_at`. Ties go to the type declared first.
    pub fn refresh_next_reminder(&mut self) {
        let earliest = ReminderType::ALL
            .into_iter()
            .map(|reminder| (reminder, self.reminders[reminder].next_at))
            .filter(|(_, at)| *at > 0)
            .min_by_key(|(_, at)| *at);
        match earliest {
            Some((reminder, at)) => {
                self.next_reminder_type = Some(reminder);
                self.next_reminder_at = at;
            }
            None => {
                self.next_reminder_type = None;
                self.next_reminder_at = 0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ms(d: u32, h: u32, m: u32) -> EpochMs {
        Utc.with_ymd_and_hms(2026, 3, d, h, m, 0).unwrap().timestamp_millis()
    }

    fn fresh() -> (SchedulerState, Calendar) {
        let cal = Calendar::utc();
        (SchedulerState::new(ms(10, 8, 0), &cal), cal)
    }

    #[test]
    fn fire_then_complete() {
        let (mut state, _) = fresh();
        state.record_fire(ReminderType::Eye, ms(10, 9, 0));
        assert_eq!(state.counters(ReminderType::Eye).pending_count, 1);
        state.apply_action(ReminderType::Eye, UserAction::Complete, ms(10, 9, 1), 20);
        let c = state.counters(ReminderType::Eye);
        assert_eq!((c.pending_count, c.completed_count, c.fired_count), (0, 1, 1));
        assert_eq!(c.last_completed_at, ms(10, 9, 1));
    }

    #[test]
    fn second_fire_rolls_stale_pending_into_ignored() {
        let (mut state, _) = fresh();
        assert!(!state.record_fire(ReminderType::Hydration, ms(10, 9, 0)).rolled_stale_pending);
        assert!(state.record_fire(ReminderType::Hydration, ms(10, 10, 0)).rolled_stale_pending);
        let c = state.counters(ReminderType::Hydration);
        assert_eq!((c.fired_count, c.ignored_count, c.pending_count), (2, 1, 1));
    }

    #[test]
    fn action_without_pending_never_goes_negative() {
        let (mut state, _) = fresh();
        state.apply_action(ReminderType::Posture, UserAction::Dismiss, ms(10, 9, 0), 15);
        state.apply_action(ReminderType::Posture, UserAction::Dismiss, ms(10, 9, 0), 15);
        let c = state.counters(ReminderType::Posture);
        assert_eq!(c.pending_count, 0);
        assert_eq!(c.ignored_count, 2);
    }

    #[test]
    fn snooze_uses_default_when_unspecified() {
        let (mut state, _) = fresh();
        let now = ms(10, 9, 0);
        let until = state.apply_action(ReminderType::Eye, UserAction::Snooze { minutes: None }, now, 20);
        assert_eq!(until, Some(now + 20 * MINUTE_MS));
        let until = state.apply_action(ReminderType::Eye, UserAction::Snooze { minutes: Some(5) }, now, 20);
        assert_eq!(until, Some(now + 5 * MINUTE_MS));
        assert!(state.is_snoozed(ReminderType::Eye, now));
    }

    #[test]
    fn suppression_leaves_pending_alone() {
        let (mut state, _) = fresh();
        state.record_fire(ReminderType::Movement, ms(10, 9, 0));
        state.record_suppressed(ReminderType::Movement);
        let c = state.counters(ReminderType::Movement);
        assert_eq!((c.suppressed_count, c.pending_count), (1, 1));
    }

    #[test]
    fn rollover_resets_counters_once() {
        let (mut state, cal) = fresh();
        for reminder in ReminderType::ALL {
            state.record_fire(reminder, ms(10, 9, 0));
            state.set_next(reminder, Some(ms(10, 10, 0)));
        }
        state.snooze_all(ms(10, 23, 50), 30);
        state.refresh_next_reminder();

        assert!(!state.ensure_today(ms(10, 23, 0), &cal));
        assert!(state.ensure_today(ms(11, 0, 5), &cal));
        assert!(!state.ensure_today(ms(11, 1, 0), &cal));

        assert_eq!(state.today, "2026-03-11");
        for reminder in ReminderType::ALL {
            let c = state.counters(reminder);
            assert_eq!(
                (c.fired_count, c.completed_count, c.ignored_count, c.suppressed_count, c.pending_count),
                (0, 0, 0, 0, 0)
            );
            assert_eq!(c.next_at, 0);
            assert_eq!(c.last_triggered_at, ms(10, 9, 0));
        }
        assert_eq!(state.next_reminder_type, None);
        assert!(state.is_snooze_all_active(ms(11, 0, 5)));
    }

    #[test]
    fn earliest_next_wins_and_ties_follow_declaration_order() {
        let (mut state, _) = fresh();
        state.set_next(ReminderType::Hydration, Some(ms(10, 9, 30)));
        state.set_next(ReminderType::Movement, Some(ms(10, 9, 30)));
        state.set_next(ReminderType::DailyAudit, Some(ms(10, 17, 0)));
        state.set_next(ReminderType::Eye, None);
        state.refresh_next_reminder();
        assert_eq!(state.next_reminder_type, Some(ReminderType::Movement));
        assert_eq!(state.next_reminder_at, ms(10, 9, 30));
    }

    #[test]
    fn resume_all_clears_every_override() {
        let (mut state, _) = fresh();
        let now = ms(10, 9, 0);
        state.panic_off(now, 60);
        state.snooze_all(now, 30);
        state.apply_action(ReminderType::Eye, UserAction::Snooze { minutes: Some(10) }, now, 20);
        state.resume_all();
        assert!(!state.is_panic_active(now));
        assert!(!state.is_snooze_all_active(now));
        assert!(!state.is_snoozed(ReminderType::Eye, now));
    }

    #[test]
    fn partial_json_fills_every_type() {
        let state: SchedulerState =
            serde_json::from_str(r#"{"today":"2026-03-10","reminders":{"eye":{"fired_count":2}}}"#).unwrap();
        assert_eq!(state.counters(ReminderType::Eye).fired_count, 2);
        assert_eq!(state.counters(ReminderType::DailyAudit), &ReminderCounters::default());
    }

    #[test]
    fn action_parsing() {
        assert_eq!("Complete".parse::<UserAction>().unwrap(), UserAction::Complete);
        assert_eq!("ignore".parse::<UserAction>().unwrap(), UserAction::Ignored);
        assert!("explode".parse::<UserAction>().is_err());
    }
}
