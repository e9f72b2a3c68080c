//! Integration tests for the schedule calculator.
//!
//! Fixed scenarios for each mode, plus property tests for determinism,
//! jitter bounds and forward progress.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use wellcadence_core::cadence::{next_for_schedule, next_trigger_at};
use wellcadence_core::clock::{Calendar, EpochMs, MINUTE_MS};
use wellcadence_core::engine::daily_audit_fallback;
use wellcadence_core::escalation::is_escalated;
use wellcadence_core::reminder::ReminderType;
use wellcadence_core::settings::{
    default_reminder, CadenceFeatures, CadenceSettings, MissedDayFallback, ReminderCadence, ScheduleConfig,
    ScheduleMode, TimeWindow,
};
use wellcadence_core::state::ReminderCounters;

fn at(h: u32, m: u32) -> EpochMs {
    Utc.with_ymd_and_hms(2026, 5, 4, h, m, 0).unwrap().timestamp_millis()
}

fn interval(interval_min: u32, jitter_min: u32) -> ReminderCadence {
    ReminderCadence {
        schedule: ScheduleConfig {
            mode: ScheduleMode::Interval,
            interval_min,
            jitter_min,
            ..ScheduleConfig::default()
        },
        ..ReminderCadence::default()
    }
}

#[test]
fn test_interval_scenario() {
    let now = at(10, 0);
    let next = next_trigger_at(&interval(20, 0), 0, now, &Calendar::utc());
    assert_eq!(next, Some(now + 20 * 60_000));
}

#[test]
fn test_work_blocks_scenario() {
    let cadence = ReminderCadence {
        schedule: ScheduleConfig {
            mode: ScheduleMode::WorkBlocks,
            work_min: 50,
            break_min: 10,
            anchor_time: "09:00".into(),
            ..ScheduleConfig::default()
        },
        ..ReminderCadence::default()
    };
    let now = at(9, 55);
    assert_eq!(next_trigger_at(&cadence, 0, now, &Calendar::utc()), Some(now + 5 * MINUTE_MS));
}

#[test]
fn test_time_windows_scenario() {
    let cadence = ReminderCadence {
        schedule: ScheduleConfig {
            mode: ScheduleMode::TimeWindows,
            windows: vec![TimeWindow::new("10:30", "11:15")],
            ..ScheduleConfig::default()
        },
        ..ReminderCadence::default()
    };
    assert_eq!(next_trigger_at(&cadence, 0, at(9, 0), &Calendar::utc()), Some(at(10, 30)));
}

#[test]
fn test_escalation_scenario() {
    let cadence = ReminderCadence {
        escalate_if_ignored: true,
        escalate_after_ignores: 3,
        ..ReminderCadence::default()
    };
    let three = ReminderCounters {
        ignored_count: 3,
        ..ReminderCounters::default()
    };
    let two = ReminderCounters {
        ignored_count: 2,
        ..ReminderCounters::default()
    };
    assert!(is_escalated(&cadence, &three));
    assert!(!is_escalated(&cadence, &two));
}

#[test]
fn test_daily_audit_fallback_scenario() {
    let cal = Calendar::utc();
    let mut cadence = default_reminder(ReminderType::DailyAudit);
    cadence.missed_day_fallback = MissedDayFallback::NextMorning;
    let now = at(14, 0);
    let raw = next_trigger_at(&cadence, 0, now, &cal).unwrap();
    assert_eq!(raw, at(17, 0));

    let tomorrow_nine = Utc.with_ymd_and_hms(2026, 5, 5, 9, 0, 0).unwrap().timestamp_millis();
    assert_eq!(daily_audit_fallback(&cadence, 0, raw, now, &cal), tomorrow_nine);
}

#[test]
fn test_empty_windows_degrade_to_interval() {
    let schedule = ScheduleConfig {
        mode: ScheduleMode::TimeWindows,
        interval_min: 15,
        windows: vec![],
        ..ScheduleConfig::default()
    };
    let now = at(3, 0);
    assert_eq!(next_for_schedule(&schedule, 0, now, &Calendar::utc()), now + 15 * MINUTE_MS);
}

#[test]
fn test_malformed_windows_degrade_to_interval() {
    let schedule = ScheduleConfig {
        mode: ScheduleMode::TimeWindows,
        interval_min: 15,
        windows: vec![TimeWindow::new("late", "later")],
        ..ScheduleConfig::default()
    };
    let now = at(3, 0);
    assert_eq!(next_for_schedule(&schedule, 0, now, &Calendar::utc()), now + 15 * MINUTE_MS);
}

#[test]
fn test_normalized_windows_are_never_empty() {
    let mut settings = CadenceSettings::default();
    settings.reminder_mut(ReminderType::Breathwork).schedule.windows.clear();
    let settings = settings.normalized(&CadenceFeatures::unlocked());
    assert_eq!(
        settings.reminder(ReminderType::Breathwork).schedule.windows,
        vec![TimeWindow::full_day()]
    );
}

fn any_mode() -> impl Strategy<Value = ScheduleMode> {
    prop_oneof![
        Just(ScheduleMode::Interval),
        Just(ScheduleMode::WorkBlocks),
        Just(ScheduleMode::TimeWindows),
    ]
}

fn any_cadence() -> impl Strategy<Value = ReminderCadence> {
    (any_mode(), 5u32..=360, 0u32..=3, 15u32..=120, 5u32..=60, 0u32..24, 0u32..60, 0u32..1440, 1u32..1440).prop_map(
        |(mode, interval_min, jitter_min, work_min, break_min, ah, am, ws, wlen)| {
            let start = wellcadence_core::ClockTime::from_minutes(ws);
            let end = wellcadence_core::ClockTime::from_minutes(ws + wlen);
            ReminderCadence {
                schedule: ScheduleConfig {
                    mode,
                    interval_min,
                    jitter_min,
                    work_min,
                    break_min,
                    anchor_time: format!("{ah:02}:{am:02}"),
                    windows: vec![TimeWindow::new(&start.to_string(), &end.to_string())],
                },
                ..ReminderCadence::default()
            }
        },
    )
}

const YEAR_2026: EpochMs = 1_767_225_600_000;

proptest! {
    #[test]
    fn prop_next_trigger_is_deterministic(
        cadence in any_cadence(),
        last in prop_oneof![Just(0i64), YEAR_2026..YEAR_2026 + 365 * 86_400_000],
        now in YEAR_2026..YEAR_2026 + 365 * 86_400_000,
        offset in -720i32..=840,
    ) {
        let cal = Calendar::from_offset_minutes(offset);
        prop_assert_eq!(
            next_trigger_at(&cadence, last, now, &cal),
            next_trigger_at(&cadence, last, now, &cal)
        );
    }

    #[test]
    fn prop_jitter_stays_within_bounds(
        interval_min in 1u32..=360,
        jitter_min in 0u32..=3,
        last in YEAR_2026..YEAR_2026 + 365 * 86_400_000,
        lag_min in 0i64..600,
    ) {
        let now = last + lag_min * MINUTE_MS;
        let cadence = interval(interval_min, jitter_min);
        let next = next_trigger_at(&cadence, last, now, &Calendar::utc()).unwrap();
        let minutes = (next - now) / MINUTE_MS;
        prop_assert!(minutes >= 1);
        prop_assert!((minutes - i64::from(interval_min)).abs() <= i64::from(jitter_min));
    }

    #[test]
    fn prop_next_trigger_is_after_fire(
        cadence in any_cadence(),
        now in YEAR_2026..YEAR_2026 + 365 * 86_400_000,
        offset in -720i32..=840,
    ) {
        // A fire records last_triggered_at = now, then reschedules.
        let cal = Calendar::from_offset_minutes(offset);
        let next = next_trigger_at(&cadence, now, now, &cal).unwrap();
        prop_assert!(next > now);
    }

    #[test]
    fn prop_disabled_is_always_none(
        mut cadence in any_cadence(),
        now in YEAR_2026..YEAR_2026 + 365 * 86_400_000,
    ) {
        cadence.enabled = false;
        prop_assert_eq!(next_trigger_at(&cadence, 0, now, &Calendar::utc()), None);
    }
}
