//! `slots` — resolve bookable appointment slots from the command line.
//!
//! Thin wrapper over `slot-engine`: reads a schedule (and optionally existing
//! bookings) as JSON, resolves the requested date range, and prints JSON to
//! stdout. Logs go to stderr.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use slot_engine::{
    format_for_display, parse_date, present_slots, resolve_range, to_utc, AvailabilitySchedule,
    BookingInterval, FoldPolicy, RangeQuery, ResolverOptions, WallTime, Zone,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "slots", version, about = "Timezone-aware appointment slot resolver")]
struct Cli {
    /// Log resolver decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve bookable slots for a date or date range
    Resolve {
        /// Schedule file: JSON array of availability rules
        #[arg(long)]
        schedule: PathBuf,

        /// First date (YYYY-MM-DD, provider's home calendar)
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,

        /// Last date, inclusive (defaults to --date)
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,

        /// Session length in minutes (defaults to each rule's session length)
        #[arg(long)]
        duration: Option<i64>,

        /// Bookings file: JSON array of {"start", "end"} RFC 3339 instants
        #[arg(long)]
        bookings: Option<PathBuf>,

        /// Request time (RFC 3339); defaults to the system clock
        #[arg(long, value_parser = parse_instant)]
        now: Option<DateTime<Utc>>,

        /// Show slots in this viewer timezone
        #[arg(long, value_parser = Zone::parse)]
        viewer_tz: Option<Zone>,

        /// Which occurrence of a repeated (fall-back) hour to use
        #[arg(long, value_enum, default_value_t = Fold::Earliest)]
        fold: Fold,
    },

    /// Convert a wall-clock date and time in a zone to UTC
    Convert {
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,

        /// Wall-clock time (HH:MM)
        #[arg(long, value_parser = WallTime::parse)]
        time: WallTime,

        #[arg(long, value_parser = Zone::parse)]
        zone: Zone,
    },

    /// Format a UTC instant in a viewer timezone
    Display {
        /// RFC 3339 instant
        #[arg(long, value_parser = parse_instant)]
        instant: DateTime<Utc>,

        #[arg(long, value_parser = Zone::parse)]
        zone: Zone,

        /// strftime pattern
        #[arg(long, default_value = slot_engine::display::DEFAULT_PATTERN)]
        pattern: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Fold {
    Earliest,
    Latest,
}

impl From<Fold> for FoldPolicy {
    fn from(fold: Fold) -> Self {
        match fold {
            Fold::Earliest => FoldPolicy::Earliest,
            Fold::Latest => FoldPolicy::Latest,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Resolve {
            schedule,
            date,
            to,
            duration,
            bookings,
            now,
            viewer_tz,
            fold,
        } => {
            let schedule: AvailabilitySchedule = read_json(&schedule)?;
            let bookings: Vec<BookingInterval> = match bookings {
                Some(path) => read_json(&path)?,
                None => Vec::new(),
            };
            let now = now.unwrap_or_else(Utc::now);
            let to = to.unwrap_or(date);
            tracing::info!(%date, %to, rules = schedule.len(), bookings = bookings.len(), %now, "resolving");

            let mut query = RangeQuery::new(now).with_bookings(&bookings);
            if let Some(minutes) = duration {
                query = query.with_duration(minutes);
            }
            let options = ResolverOptions {
                fold_policy: fold.into(),
            };
            let slots = resolve_range(&schedule, date, to, &query, &options)
                .with_context(|| format!("failed to resolve slots for {date}..={to}"))?;

            let json = match viewer_tz {
                Some(viewer) => serde_json::to_string_pretty(&present_slots(&slots, &viewer))?,
                None => serde_json::to_string_pretty(&slots)?,
            };
            println!("{json}");
        }
        Command::Convert { date, time, zone } => {
            let utc = to_utc(date, time, &zone)
                .with_context(|| format!("cannot place {date} {time} in {zone}"))?;
            println!("{}", utc.to_rfc3339());
        }
        Command::Display {
            instant,
            zone,
            pattern,
        } => {
            println!("{}", format_for_display(instant, &zone, &pattern)?);
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("'{s}' is not an RFC 3339 instant"))
}
