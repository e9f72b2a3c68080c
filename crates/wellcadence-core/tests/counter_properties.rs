//! Property tests for the daily counters.

use proptest::prelude::*;
use wellcadence_core::clock::{Calendar, EpochMs, MINUTE_MS};
use wellcadence_core::reminder::ReminderType;
use wellcadence_core::state::{SchedulerState, UserAction};

const YEAR_2026: EpochMs = 1_767_225_600_000;

#[derive(Debug, Clone)]
enum Step {
    Fire(usize),
    Suppress(usize),
    Act(usize, UserAction),
    Advance(i64),
}

fn any_action() -> impl Strategy<Value = UserAction> {
    prop_oneof![
        Just(UserAction::Complete),
        Just(UserAction::Dismiss),
        Just(UserAction::Ignored),
        proptest::option::of(0u32..120).prop_map(|minutes| UserAction::Snooze { minutes }),
    ]
}

fn any_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0usize..6).prop_map(Step::Fire),
        (0usize..6).prop_map(Step::Suppress),
        (0usize..6, any_action()).prop_map(|(i, a)| Step::Act(i, a)),
        (1i64..600).prop_map(Step::Advance),
    ]
}

proptest! {
    #[test]
    fn prop_pending_never_exceeds_one(steps in proptest::collection::vec(any_step(), 1..80)) {
        let cal = Calendar::utc();
        let mut now = YEAR_2026;
        let mut state = SchedulerState::new(now, &cal);

        for step in steps {
            match step {
                Step::Fire(i) => {
                    state.record_fire(ReminderType::ALL[i], now);
                }
                Step::Suppress(i) => state.record_suppressed(ReminderType::ALL[i]),
                Step::Act(i, action) => {
                    state.apply_action(ReminderType::ALL[i], action, now, 15);
                }
                Step::Advance(minutes) => {
                    now += minutes * MINUTE_MS;
                    state.ensure_today(now, &cal);
                }
            }
            for reminder in ReminderType::ALL {
                let c = state.counters(reminder);
                prop_assert!(c.pending_count <= 1);
                prop_assert!(c.fired_count >= c.pending_count);
            }
        }
    }

    #[test]
    fn prop_rollover_is_idempotent(
        fires in proptest::collection::vec(0usize..6, 0..20),
        days in 1i64..30,
        later_min in 0i64..60,
    ) {
        let cal = Calendar::utc();
        let mut state = SchedulerState::new(YEAR_2026, &cal);
        for i in fires {
            state.record_fire(ReminderType::ALL[i], YEAR_2026);
        }

        let next_day = YEAR_2026 + days * 1_440 * MINUTE_MS;
        prop_assert!(state.ensure_today(next_day, &cal));
        let once = state.clone();
        prop_assert!(!state.ensure_today(next_day + later_min * MINUTE_MS, &cal));
        prop_assert_eq!(&state, &once);

        for reminder in ReminderType::ALL {
            let c = state.counters(reminder);
            prop_assert_eq!(c.fired_count + c.pending_count + c.ignored_count, 0);
        }
    }
}
