//! Next-trigger computation for the three schedule modes.

use super::jitter::jittered_minutes;
use crate::clock::{in_clock_window, Calendar, ClockTime, EpochMs, MINUTE_MS};
use crate::settings::{ReminderCadence, ScheduleConfig, ScheduleMode};

/// When `cadence` should next fire, or `None` when it is disabled.
///
/// `last_triggered_at` is 0 when the reminder has never fired. Never fails:
/// malformed schedules degrade to interval behaviour with a one-minute floor.
pub fn next_trigger_at(
    cadence: &ReminderCadence,
    last_triggered_at: EpochMs,
    now: EpochMs,
    calendar: &Calendar,
) -> Option<EpochMs> {
    if !cadence.enabled {
        return None;
    }
    Some(next_for_schedule(&cadence.schedule, last_triggered_at, now, calendar))
}

/// Mode dispatch without the enabled check.
pub fn next_for_schedule(
    schedule: &ScheduleConfig,
    last_triggered_at: EpochMs,
    now: EpochMs,
    calendar: &Calendar,
) -> EpochMs {
    match schedule.mode {
        ScheduleMode::Interval => next_interval(schedule, last_triggered_at, now),
        ScheduleMode::WorkBlocks => next_work_block(schedule, now, calendar),
        ScheduleMode::TimeWindows => next_time_window(schedule, last_triggered_at, now, calendar),
    }
}

fn next_interval(schedule: &ScheduleConfig, last_triggered_at: EpochMs, now: EpochMs) -> EpochMs {
    let (seed, base) = if last_triggered_at > 0 {
        (last_triggered_at, last_triggered_at.max(now))
    } else {
        (now, now)
    };
    let minutes = jittered_minutes(schedule.interval_min, schedule.jitter_min, seed);
    base.saturating_add(minutes * MINUTE_MS)
}

/// Work/break cycle anchored at the most recent `anchor_time` at or before
/// `now`. Inside a work block the reminder lands when the block ends; inside
/// a break it lands as the next work block begins.
fn next_work_block(schedule: &ScheduleConfig, now: EpochMs, calendar: &Calendar) -> EpochMs {
    let work = i64::from(schedule.work_min.max(1));
    let cycle = work + i64::from(schedule.break_min);

    let anchor = calendar.last_occurrence(now, schedule.anchor());
    let elapsed_min = (now - anchor).div_euclid(MINUTE_MS);
    let offset = elapsed_min.rem_euclid(cycle);

    let wait_min = if offset < work {
        work - offset
    } else {
        cycle - offset
    };
    now.saturating_add(wait_min.max(1) * MINUTE_MS)
}

/// Interval cadence inside any window; otherwise the next window start,
/// today if one is still ahead, else the earliest start tomorrow.
fn next_time_window(
    schedule: &ScheduleConfig,
    last_triggered_at: EpochMs,
    now: EpochMs,
    calendar: &Calendar,
) -> EpochMs {
    let windows = schedule.window_bounds();
    if windows.is_empty() {
        return next_interval(schedule, last_triggered_at, now);
    }

    let now_min = calendar.minutes_since_midnight(now);
    if windows
        .iter()
        .any(|&(start, end)| in_clock_window(now_min, start, end))
    {
        return next_interval(schedule, last_triggered_at, now);
    }

    let upcoming_today = windows
        .iter()
        .map(|&(start, _)| start)
        .filter(|&start| start > now_min)
        .min();
    match upcoming_today {
        Some(start) => calendar.today_at(now, ClockTime::from_minutes(start)),
        None => {
            let earliest = windows.iter().map(|&(start, _)| start).min().unwrap_or(0);
            let tomorrow = calendar.local_date(now) + chrono::Duration::days(1);
            calendar.at_clock(tomorrow, ClockTime::from_minutes(earliest))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::TimeWindow;
    use chrono::{TimeZone, Utc};

    fn at(h: u32, m: u32) -> EpochMs {
        Utc.with_ymd_and_hms(2026, 3, 10, h, m, 0).unwrap().timestamp_millis()
    }

    fn cadence(schedule: ScheduleConfig) -> ReminderCadence {
        ReminderCadence {
            schedule,
            ..ReminderCadence::default()
        }
    }

    fn work_blocks() -> ScheduleConfig {
        ScheduleConfig {
            mode: ScheduleMode::WorkBlocks,
            work_min: 50,
            break_min: 10,
            anchor_time: "09:00".into(),
            ..ScheduleConfig::default()
        }
    }

    fn windows(list: &[(&str, &str)]) -> ScheduleConfig {
        ScheduleConfig {
            mode: ScheduleMode::TimeWindows,
            interval_min: 30,
            windows: list.iter().map(|(s, e)| TimeWindow::new(s, e)).collect(),
            ..ScheduleConfig::default()
        }
    }

    #[test]
    fn disabled_returns_none() {
        let mut c = cadence(ScheduleConfig::default());
        c.enabled = false;
        assert_eq!(next_trigger_at(&c, 0, at(10, 0), &Calendar::utc()), None);
    }

    #[test]
    fn interval_without_history_counts_from_now() {
        let c = cadence(ScheduleConfig {
            interval_min: 20,
            jitter_min: 0,
            ..ScheduleConfig::default()
        });
        let now = at(10, 0);
        assert_eq!(next_trigger_at(&c, 0, now, &Calendar::utc()), Some(now + 20 * MINUTE_MS));
    }

    #[test]
    fn interval_counts_from_later_of_last_and_now() {
        let c = cadence(ScheduleConfig::default());
        let now = at(10, 0);
        let future_last = at(10, 5);
        assert_eq!(
            next_trigger_at(&c, future_last, now, &Calendar::utc()),
            Some(future_last + 20 * MINUTE_MS)
        );
        let past_last = at(9, 0);
        assert_eq!(
            next_trigger_at(&c, past_last, now, &Calendar::utc()),
            Some(now + 20 * MINUTE_MS)
        );
    }

    #[test]
    fn work_block_inside_work_lands_at_block_end() {
        let now = at(9, 30);
        let next = next_for_schedule(&work_blocks(), 0, now, &Calendar::utc());
        assert_eq!(next, at(9, 50));
    }

    #[test]
    fn work_block_scenario_lands_at_ten() {
        let now = at(9, 55);
        let next = next_for_schedule(&work_blocks(), 0, now, &Calendar::utc());
        assert_eq!(next, now + 5 * MINUTE_MS);
        assert_eq!(next, at(10, 0));
    }

    #[test]
    fn work_block_at_end_of_break_is_one_minute_out() {
        let now = at(9, 59);
        let next = next_for_schedule(&work_blocks(), 0, now, &Calendar::utc());
        assert_eq!(next, now + MINUTE_MS);
    }

    #[test]
    fn work_block_mid_break_waits_for_next_block() {
        let next = next_for_schedule(&work_blocks(), 0, at(9, 50), &Calendar::utc());
        assert_eq!(next, at(10, 0));
    }

    #[test]
    fn work_block_before_anchor_uses_previous_day() {
        // 08:00 is 23h after yesterday's 09:00 anchor: 1380 % 60 = 0, start of work.
        let now = at(8, 0);
        let next = next_for_schedule(&work_blocks(), 0, now, &Calendar::utc());
        assert_eq!(next, at(8, 50));
    }

    #[test]
    fn time_window_outside_goes_to_next_start() {
        let sched = windows(&[("10:30", "11:15")]);
        let next = next_for_schedule(&sched, 0, at(9, 0), &Calendar::utc());
        assert_eq!(next, at(10, 30));
    }

    #[test]
    fn time_window_inside_behaves_like_interval() {
        let sched = windows(&[("10:30", "11:15")]);
        let now = at(10, 40);
        assert_eq!(next_for_schedule(&sched, 0, now, &Calendar::utc()), now + 30 * MINUTE_MS);
    }

    #[test]
    fn time_window_picks_nearest_not_first_listed() {
        let sched = windows(&[("15:00", "16:00"), ("12:00", "12:30")]);
        let next = next_for_schedule(&sched, 0, at(11, 0), &Calendar::utc());
        assert_eq!(next, at(12, 0));
    }

    #[test]
    fn time_window_after_last_wraps_to_tomorrow() {
        let sched = windows(&[("15:00", "16:00"), ("10:30", "11:00")]);
        let next = next_for_schedule(&sched, 0, at(18, 0), &Calendar::utc());
        let tomorrow = Utc.with_ymd_and_hms(2026, 3, 11, 10, 30, 0).unwrap().timestamp_millis();
        assert_eq!(next, tomorrow);
    }

    #[test]
    fn empty_windows_degrade_to_interval() {
        let sched = windows(&[]);
        let now = at(3, 0);
        assert_eq!(next_for_schedule(&sched, 0, now, &Calendar::utc()), now + 30 * MINUTE_MS);
    }

    #[test]
    fn calendar_offset_moves_window_boundaries() {
        let sched = windows(&[("10:30", "11:15")]);
        // 07:00 UTC is 09:00 at UTC+2, so the window opens at 08:30 UTC.
        let cal = Calendar::from_offset_minutes(120);
        assert_eq!(next_for_schedule(&sched, 0, at(7, 0), &cal), at(8, 30));
    }
}
