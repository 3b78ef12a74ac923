use chrono::{DateTime, Utc};
use clap::Args;
use std::path::{Path, PathBuf};

use taskslot_core::{
    AvailabilityProvider, CalendarProvider, Config, FixedOffsetProvider, PassReport, ProviderKind,
    Scheduler, SequentialProvider, TaskDraft,
};

use crate::input;

/// Options shared by every command that runs a pass.
#[derive(Args)]
pub struct PassArgs {
    /// Provider to use: sequential, fixed-offset or calendar
    #[arg(long)]
    provider: Option<ProviderKind>,
    /// Reference time (RFC 3339) instead of now
    #[arg(long)]
    anchor: Option<String>,
    /// Minutes between the reference time and the first slot
    #[arg(long)]
    offset_minutes: Option<u32>,
    /// JSON file of busy calendar events (calendar provider)
    #[arg(long)]
    busy: Option<PathBuf>,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
pub struct RunArgs {
    /// Task file: JSON array or TOML with [[task]] tables
    #[arg(long)]
    tasks: PathBuf,
    #[command(flatten)]
    pass: PassArgs,
}

pub fn run(args: RunArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let drafts = input::load_drafts(&args.tasks)?;
    execute(drafts, args.pass, config_path)
}

pub fn demo(args: PassArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let drafts = vec![
        TaskDraft::hours("Task 1", "High priority task", 1, 2.0),
        TaskDraft::hours("Task 2", "Medium priority task", 2, 1.5),
        TaskDraft::hours("Task 3", "Lower priority task", 3, 3.0),
    ];
    execute(drafts, args, config_path)
}

fn execute(
    drafts: Vec<TaskDraft>,
    args: PassArgs,
    config_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = input::load_config(config_path)?;
    if let Some(kind) = args.provider {
        config.scheduler.provider = kind;
    }
    if let Some(offset) = args.offset_minutes {
        config.scheduler.offset_minutes = offset;
    }
    let anchor = args.anchor.as_deref().map(parse_anchor).transpose()?;
    let provider = build_provider(&config, anchor, args.busy.as_deref())?;

    let mut scheduler = Scheduler::with_config(provider, config.scheduler_config());
    let names: Vec<String> = drafts.iter().map(|d| d.name.clone()).collect();
    for (name, result) in names.iter().zip(scheduler.submit_batch(drafts)) {
        match result {
            Ok(_) => eprintln!("Task '{name}' added successfully."),
            Err(e) => eprintln!("skipped: {e}"),
        }
    }

    match scheduler.run_pass() {
        Ok(report) => {
            print_report(&report, args.json)?;
            Ok(())
        }
        Err(err) => {
            // The partial report lists the tasks the fault left unattempted.
            print_report(err.partial_report(), args.json)?;
            Err(err.into())
        }
    }
}

fn parse_anchor(raw: &str) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid --anchor '{raw}': {e}").into())
}

fn build_provider(
    config: &Config,
    anchor: Option<DateTime<Utc>>,
    busy: Option<&Path>,
) -> Result<Box<dyn AvailabilityProvider + Send>, Box<dyn std::error::Error>> {
    let offset = config.offset();
    let provider: Box<dyn AvailabilityProvider + Send> = match config.scheduler.provider {
        ProviderKind::FixedOffset => Box::new(match anchor {
            Some(anchor) => FixedOffsetProvider::anchored(anchor, offset),
            None => FixedOffsetProvider::from_now(offset),
        }),
        ProviderKind::Sequential => {
            let start = anchor.unwrap_or_else(Utc::now) + offset;
            Box::new(SequentialProvider::new(start).with_gap(config.gap()))
        }
        ProviderKind::Calendar => {
            let busy_path = busy
                .map(Path::to_path_buf)
                .or_else(|| config.calendar.busy_file.as_ref().map(PathBuf::from));
            let events = match busy_path {
                Some(path) => input::load_busy(&path)?,
                None => Vec::new(),
            };
            Box::new(CalendarProvider::new(
                events,
                config.working_hours()?,
                anchor.unwrap_or_else(Utc::now) + offset,
                config.calendar.horizon_days,
            ))
        }
    };
    tracing::debug!(provider = provider.name(), "provider ready");
    Ok(provider)
}

fn print_report(report: &PassReport, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}
