use wellcadence_core::reminder::ReminderType;

use crate::host::{block_on, parse_reminder, print_events, CliResult, Host, SignalArgs};

/// Fire one reminder as if its timer went off at `now`.
pub fn fire(now: i64, reminder: &str, signals: SignalArgs) -> CliResult {
    let reminder = parse_reminder(reminder)?;
    let host = Host::open(now)?;
    let engine = host.engine_with(signals);
    let events = block_on(engine.on_reminder_due(reminder, now))?;
    print_events(&events)
}

/// Fire every armed timer whose time has come, earliest first.
pub fn tick(now: i64, signals: SignalArgs) -> CliResult {
    let host = Host::open(now)?;
    let due: Vec<ReminderType> = {
        let db = host.store.db()?;
        db.due_timers(now)?
            .iter()
            .filter_map(|timer| ReminderType::from_timer_label(&timer.label))
            .collect()
    };
    if due.is_empty() {
        tracing::debug!(now, "nothing due");
        return Ok(());
    }

    let engine = host.engine_with(signals);
    block_on(async {
        for reminder in due {
            print_events(&engine.on_reminder_due(reminder, now).await)?;
        }
        Ok::<_, Box<dyn std::error::Error>>(())
    })?
}
