//! Integration tests for the suppression chain.
//!
//! Every one of the 2^8 on/off combinations of the eight conditions must
//! report the highest-priority active condition.

use chrono::{TimeZone, Utc};
use wellcadence_core::clock::{Calendar, EpochMs, MINUTE_MS};
use wellcadence_core::reminder::ReminderType;
use wellcadence_core::settings::CadenceSettings;
use wellcadence_core::state::{SchedulerState, UserAction};
use wellcadence_core::suppression::{evaluate, IdleState, Signals, SuppressionContext, SuppressionReason};

const PRIORITY: [SuppressionReason; 8] = [
    SuppressionReason::PanicOff,
    SuppressionReason::SnoozeAll,
    SuppressionReason::SnoozeType,
    SuppressionReason::QuietHours,
    SuppressionReason::Focus,
    SuppressionReason::NotStillEnough,
    SuppressionReason::Idle,
    SuppressionReason::Meeting,
];

fn noon() -> EpochMs {
    Utc.with_ymd_and_hms(2026, 5, 4, 12, 0, 0).unwrap().timestamp_millis()
}

/// Posture is the only type every condition can apply to.
fn scenario(mask: u8) -> (CadenceSettings, SchedulerState, Signals) {
    let now = noon();
    let cal = Calendar::utc();
    let on = |bit: usize| mask & (1 << bit) != 0;

    let mut settings = CadenceSettings::default();
    let mut state = SchedulerState::new(now, &cal);
    let mut signals = Signals {
        last_activity_at: Some(now - 120 * MINUTE_MS),
        ..Signals::default()
    };

    if on(0) {
        state.panic_off(now, 30);
    }
    if on(1) {
        state.snooze_all(now, 30);
    }
    if on(2) {
        state.apply_action(ReminderType::Posture, UserAction::Snooze { minutes: Some(30) }, now, 15);
    }
    if on(3) {
        settings.global.quiet_hours_start = "11:00".into();
        settings.global.quiet_hours_end = "13:00".into();
    }
    if on(4) {
        signals.focus_active = true;
    }
    if on(5) {
        signals.last_activity_at = Some(now - 5 * MINUTE_MS);
    }
    if on(6) {
        signals.idle_state = IdleState::Idle;
    }
    if on(7) {
        settings.global.meeting_mode_manual = true;
    }
    (settings, state, signals)
}

#[test]
fn test_priority_holds_for_all_combinations() {
    let cal = Calendar::utc();
    for mask in 0..=u8::MAX {
        let (settings, state, signals) = scenario(mask);
        let decision = evaluate(&SuppressionContext {
            reminder: ReminderType::Posture,
            now: noon(),
            settings: &settings,
            state: &state,
            signals: &signals,
            calendar: &cal,
        });

        let expected = (0..8)
            .find(|bit| mask & (1 << bit) != 0)
            .map(|bit| PRIORITY[bit])
            .unwrap_or(SuppressionReason::Active);
        assert_eq!(decision.reason, expected, "mask {mask:08b}");

        let delivers = matches!(expected, SuppressionReason::Active | SuppressionReason::Meeting);
        assert_eq!(decision.suppressed, !delivers, "mask {mask:08b}");
        assert_eq!(decision.subtle, expected == SuppressionReason::Meeting, "mask {mask:08b}");
    }
}

#[test]
fn test_panic_wins_over_quiet_hours() {
    let (settings, state, signals) = scenario(0b0000_1001);
    let decision = evaluate(&SuppressionContext {
        reminder: ReminderType::Posture,
        now: noon(),
        settings: &settings,
        state: &state,
        signals: &signals,
        calendar: &Calendar::utc(),
    });
    assert_eq!(decision.reason, SuppressionReason::PanicOff);
}

#[test]
fn test_expired_overrides_do_not_match() {
    let cal = Calendar::utc();
    let mut state = SchedulerState::new(noon(), &cal);
    state.panic_off(noon() - 60 * MINUTE_MS, 30);
    state.snooze_all(noon() - 60 * MINUTE_MS, 30);
    let settings = CadenceSettings::default();
    let decision = evaluate(&SuppressionContext {
        reminder: ReminderType::Eye,
        now: noon(),
        settings: &settings,
        state: &state,
        signals: &Signals::default(),
        calendar: &cal,
    });
    assert_eq!(decision.reason, SuppressionReason::Active);
}

#[test]
fn test_snooze_of_other_type_does_not_apply() {
    let cal = Calendar::utc();
    let mut state = SchedulerState::new(noon(), &cal);
    state.apply_action(ReminderType::Eye, UserAction::Snooze { minutes: Some(30) }, noon(), 20);
    let settings = CadenceSettings::default();
    let decision = evaluate(&SuppressionContext {
        reminder: ReminderType::Hydration,
        now: noon(),
        settings: &settings,
        state: &state,
        signals: &Signals::default(),
        calendar: &cal,
    });
    assert_eq!(decision.reason, SuppressionReason::Active);
}
