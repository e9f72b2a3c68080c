//! Wires the engine to the on-disk database and to command-line signals.

use async_trait::async_trait;
use clap::Args;
use std::error::Error;
use std::future::Future;
use std::sync::Arc;

use wellcadence_core::clock::{EpochMs, MINUTE_MS};
use wellcadence_core::engine::{CadenceEngine, DeliveryPayload, DeliverySink, EngineHost, SignalSource};
use wellcadence_core::events::Event;
use wellcadence_core::reminder::ReminderType;
use wellcadence_core::suppression::IdleState;
use wellcadence_core::{Config, Database, SqliteHost};

pub type CliResult<T = ()> = Result<T, Box<dyn Error>>;

pub fn parse_instant(value: &str) -> Result<i64, String> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.timestamp_millis())
        .map_err(|e| format!("invalid instant '{value}': {e}"))
}

pub fn parse_reminder(value: &str) -> CliResult<ReminderType> {
    Ok(value.parse::<ReminderType>()?)
}

/// What the host knows about the user at fire time.
#[derive(Args, Debug, Clone, Default)]
pub struct SignalArgs {
    /// The user has been idle past the configured threshold
    #[arg(long)]
    pub idle: bool,
    /// The screen is locked
    #[arg(long)]
    pub locked: bool,
    /// A focus session is running
    #[arg(long)]
    pub focus: bool,
    /// Hostname of the foreground browser tab
    #[arg(long)]
    pub host: Option<String>,
    /// Minutes since the last keyboard or pointer input
    #[arg(long)]
    pub inactive_min: Option<u32>,
}

struct FlagSignals {
    args: SignalArgs,
    now: EpochMs,
}

#[async_trait]
impl SignalSource for FlagSignals {
    async fn idle_state(&self, _threshold_secs: u32) -> wellcadence_core::error::Result<IdleState> {
        Ok(if self.args.locked {
            IdleState::Locked
        } else if self.args.idle {
            IdleState::Idle
        } else {
            IdleState::Active
        })
    }

    fn active_hostname(&self) -> Option<String> {
        self.args.host.clone()
    }

    fn focus_active(&self) -> bool {
        self.args.focus
    }

    fn last_activity_at(&self) -> Option<EpochMs> {
        self.args
            .inactive_min
            .map(|min| self.now - i64::from(min) * MINUTE_MS)
    }
}

/// Logs each delivery to the database and prints it as a JSON line.
struct PrintingSink {
    store: Arc<SqliteHost>,
}

impl DeliverySink for PrintingSink {
    fn deliver(&self, payload: &DeliveryPayload) {
        self.store.deliver(payload);
        match serde_json::to_string(payload) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "failed to print delivery"),
        }
    }

    fn cue(&self, reminder: ReminderType, volume: f64) {
        tracing::info!(reminder = %reminder, volume, "audio cue");
    }
}

/// Loaded configuration plus the database the engine persists to.
pub struct Host {
    pub config: Config,
    pub store: Arc<SqliteHost>,
    pub now: EpochMs,
}

impl Host {
    pub fn open(now: EpochMs) -> CliResult<Self> {
        let config = Config::load()?;
        let store = Arc::new(SqliteHost::new(Database::open()?));
        Ok(Self { config, store, now })
    }

    pub fn engine(&self) -> CadenceEngine {
        self.engine_with(SignalArgs::default())
    }

    pub fn engine_with(&self, signals: SignalArgs) -> CadenceEngine {
        let host = EngineHost {
            store: self.store.clone(),
            timers: self.store.clone(),
            sink: Arc::new(PrintingSink {
                store: self.store.clone(),
            }),
            signals: Arc::new(FlagSignals { args: signals, now: self.now }),
        };
        CadenceEngine::new(self.config.cadence.clone(), host, self.config.calendar())
    }
}

/// Run one engine call to completion on a single-threaded runtime.
pub fn block_on<F: Future>(future: F) -> CliResult<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    Ok(runtime.block_on(future))
}

pub fn print_events(events: &[Event]) -> CliResult {
    for event in events {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}
