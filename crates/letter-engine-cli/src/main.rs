use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use letter_engine::{
    current_instant, format_instant, get_variant, list_variants, next_variants_after,
    table_of_contents, timeline_projection, variants_active_at, DateToken, ProgramCalendar,
    Variant, VariantStore, VariantSummary,
};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "letters", version, about = "Query the New Year's Eve letter program")]
struct Cli {
    /// Schedule document (JSON) to load instead of the built-in program
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Calendar year of the eve date; the next day falls in the year after
    #[arg(long, global = true)]
    eve_year: Option<i32>,

    /// Print single-line JSON
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List letters ordered by start
    List {
        /// Include special letters and ids outside the two tracks
        #[arg(long)]
        all: bool,
    },
    /// Show a single letter
    Show {
        /// Letter id, e.g. 14a
        id: String,
    },
    /// Letters active now, or at the given "DD.MM HH:MM"
    Now {
        #[arg(long)]
        at: Option<String>,
    },
    /// Letters active at a date and time
    Active {
        /// Date token, e.g. 31.12
        date: String,
        /// Clock time, e.g. 23:55
        time: String,
    },
    /// Letters starting strictly after a date and time
    Next { date: String, time: String },
    /// Two-column timeline layout
    Timeline,
    /// Start slots with the letters in each
    Toc,
}

#[derive(Serialize)]
struct NowReport {
    date: DateToken,
    time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    full_date: Option<String>,
    instant: String,
    active: Vec<VariantSummary>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = load_store(&cli)?;

    match &cli.command {
        Command::List { all } => emit(&list_variants(&store, *all), cli.compact),
        Command::Show { id } => {
            let summary =
                get_variant(&store, id).with_context(|| format!("cannot show letter '{id}'"))?;
            emit(&summary, cli.compact)
        }
        Command::Now { at } => emit(&now_report(&store, at.as_deref())?, cli.compact),
        Command::Active { date, time } => {
            let instant = store
                .calendar()
                .resolve_tokens(date, time)
                .with_context(|| format!("cannot resolve '{date} {time}'"))?;
            let active = summarize(&store, variants_active_at(&store, instant))?;
            emit(&active, cli.compact)
        }
        Command::Next { date, time } => {
            let next = next_variants_after(&store, date, time)
                .with_context(|| format!("cannot resolve '{date} {time}'"))?;
            emit(&summarize(&store, next)?, cli.compact)
        }
        Command::Timeline => emit(&timeline_projection(&store), cli.compact),
        Command::Toc => emit(&table_of_contents(&store), cli.compact),
    }
}

fn load_store(cli: &Cli) -> Result<VariantStore> {
    let calendar = cli
        .eve_year
        .map(ProgramCalendar::with_eve_year)
        .unwrap_or_default();

    match &cli.data {
        Some(path) => {
            debug!(path = %path.display(), "loading schedule document");
            let json = fs::read_to_string(path)
                .with_context(|| format!("cannot read schedule '{}'", path.display()))?;
            VariantStore::from_json(&json, calendar)
                .with_context(|| format!("cannot load schedule '{}'", path.display()))
        }
        None => VariantStore::builtin_with(calendar).context("cannot load built-in schedule"),
    }
}

fn now_report(store: &VariantStore, at: Option<&str>) -> Result<NowReport> {
    let (date, time, full_date, instant) = match at {
        Some(at) => {
            let Some((date, time)) = at.split_once(' ') else {
                bail!("expected \"DD.MM HH:MM\", got '{at}'");
            };
            let instant = store
                .calendar()
                .resolve_tokens(date, time.trim())
                .with_context(|| format!("cannot resolve '{at}'"))?;
            (date.parse::<DateToken>()?, time.trim().to_string(), None, instant)
        }
        None => {
            let moment = current_instant(store)?;
            (moment.date, moment.time, Some(moment.full_date), moment.instant)
        }
    };

    Ok(NowReport {
        date,
        time,
        full_date,
        instant: format_instant(&instant),
        active: summarize(store, variants_active_at(store, instant))?,
    })
}

fn summarize(store: &VariantStore, variants: Vec<&Variant>) -> Result<Vec<VariantSummary>> {
    variants
        .into_iter()
        .map(|v| get_variant(store, v.id()).map_err(Into::into))
        .collect()
}

fn emit<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{json}");
    Ok(())
}
