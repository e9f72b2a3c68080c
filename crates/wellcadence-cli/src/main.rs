use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod host;

#[derive(Parser)]
#[command(name = "wellcadence", version, about = "Wellness reminder scheduler")]
struct Cli {
    /// Treat this RFC 3339 instant as "now" instead of the system clock
    #[arg(long, global = true, value_parser = host::parse_instant)]
    at: Option<i64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print counters and the next scheduled reminder as JSON
    Status,
    /// Recompute every schedule and re-arm timers
    Reschedule,
    /// Fire every timer that is due
    Tick {
        #[command(flatten)]
        signals: host::SignalArgs,
    },
    /// Fire one reminder's timer now
    Fire {
        /// Reminder type (eye, movement, posture, hydration, breathwork, dailyAudit)
        reminder: String,
        #[command(flatten)]
        signals: host::SignalArgs,
    },
    /// Mark a reminder as done
    Complete { reminder: String },
    /// Dismiss a reminder without doing it
    Dismiss { reminder: String },
    /// Push one reminder back
    Snooze {
        reminder: String,
        /// Minutes to snooze; defaults to the type's configured snooze
        #[arg(long)]
        minutes: Option<u32>,
    },
    /// Suppress every reminder for a while
    SnoozeAll {
        #[arg(long)]
        minutes: u32,
    },
    /// Turn every reminder off for a while, overriding everything else
    Panic {
        #[arg(long, default_value = "60")]
        minutes: u32,
    },
    /// Lift panic mode and all snoozes
    Resume,
    /// Show upcoming reminders between two clock times
    Preview(commands::preview::PreviewArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("WELLCADENCE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let now = cli.at.unwrap_or_else(wellcadence_core::now_ms);

    let result = match cli.command {
        Commands::Status => commands::status::status(now),
        Commands::Reschedule => commands::status::reschedule(now),
        Commands::Tick { signals } => commands::fire::tick(now, signals),
        Commands::Fire { reminder, signals } => commands::fire::fire(now, &reminder, signals),
        Commands::Complete { reminder } => commands::action::run(now, &reminder, commands::action::Kind::Complete),
        Commands::Dismiss { reminder } => commands::action::run(now, &reminder, commands::action::Kind::Dismiss),
        Commands::Snooze { reminder, minutes } => {
            commands::action::run(now, &reminder, commands::action::Kind::Snooze(minutes))
        }
        Commands::SnoozeAll { minutes } => commands::overrides::snooze_all(now, minutes),
        Commands::Panic { minutes } => commands::overrides::panic(now, minutes),
        Commands::Resume => commands::overrides::resume(now),
        Commands::Preview(args) => commands::preview::run(now, args),
        Commands::Config { action } => commands::config::run(now, action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
