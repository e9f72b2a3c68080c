use clap::Subcommand;
use wellcadence_core::Config;

use crate::host::{block_on, CliResult, Host};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Dot-separated key (e.g. "cadence.reminders.eye.schedule.interval_min")
        key: String,
    },
    /// Set a config value and reschedule
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(now: i64, action: ConfigAction) -> CliResult {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            apply(now)?;
            println!("ok");
        }
        ConfigAction::List => {
            for (key, value) in Config::load()?.list() {
                println!("{key} = {value}");
            }
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            apply(now)?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}

/// Push freshly saved settings through the engine so timers follow them.
fn apply(now: i64) -> CliResult {
    let host = Host::open(now)?;
    let engine = host.engine();
    let settings = host.config.cadence.clone();
    block_on(engine.on_settings_changed(settings, now))?;
    Ok(())
}
