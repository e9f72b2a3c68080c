use crate::host::{block_on, print_events, CliResult, Host};

pub fn snooze_all(now: i64, minutes: u32) -> CliResult {
    let host = Host::open(now)?;
    let engine = host.engine();
    print_events(&block_on(engine.snooze_all(minutes, now))?)
}

pub fn panic(now: i64, minutes: u32) -> CliResult {
    let host = Host::open(now)?;
    let engine = host.engine();
    print_events(&block_on(engine.panic_off(minutes, now))?)
}

pub fn resume(now: i64) -> CliResult {
    let host = Host::open(now)?;
    let engine = host.engine();
    print_events(&block_on(engine.resume_all(now))?)
}
