use wellcadence_core::state::UserAction;

use crate::host::{block_on, parse_reminder, print_events, CliResult, Host};

pub enum Kind {
    Complete,
    Dismiss,
    Snooze(Option<u32>),
}

pub fn run(now: i64, reminder: &str, kind: Kind) -> CliResult {
    let reminder = parse_reminder(reminder)?;
    let action = match kind {
        Kind::Complete => UserAction::Complete,
        Kind::Dismiss => UserAction::Dismiss,
        Kind::Snooze(minutes) => UserAction::Snooze { minutes },
    };
    let host = Host::open(now)?;
    let engine = host.engine();
    let events = block_on(engine.on_user_action(reminder, action, now))?;
    print_events(&events)
}
