use crate::host::{block_on, print_events, CliResult, Host};

pub fn status(now: i64) -> CliResult {
    let host = Host::open(now)?;
    let engine = host.engine();
    let status = block_on(engine.status(now))?;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

pub fn reschedule(now: i64) -> CliResult {
    let host = Host::open(now)?;
    let engine = host.engine();
    let events = block_on(engine.reschedule(now))?;
    print_events(&events)
}
