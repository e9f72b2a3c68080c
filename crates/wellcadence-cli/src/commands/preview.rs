use clap::Args;
use wellcadence_core::cadence::build_timeline_preview;
use wellcadence_core::clock::ClockTime;
use wellcadence_core::Config;

use crate::host::CliResult;

#[derive(Args)]
pub struct PreviewArgs {
    /// Start of the preview range (HH:MM, local)
    #[arg(long, default_value = "09:00")]
    pub start: String,
    /// End of the preview range; at or before start runs into tomorrow
    #[arg(long, default_value = "18:00")]
    pub end: String,
    /// Print entries as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(now: i64, args: PreviewArgs) -> CliResult {
    let start = ClockTime::parse(&args.start).ok_or_else(|| format!("invalid start time: {}", args.start))?;
    let end = ClockTime::parse(&args.end).ok_or_else(|| format!("invalid end time: {}", args.end))?;

    let config = Config::load()?;
    let calendar = config.calendar();
    let entries = build_timeline_preview(&config.cadence, start, end, now, &calendar);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    for entry in &entries {
        let local = calendar.local_datetime(entry.at);
        println!("{}  {}", local.format("%H:%M"), entry.label);
    }
    Ok(())
}
