use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{NaiveDate, Weekday};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use trip_planner::clock::SystemClock;
use trip_planner::domain::{DateRange, StopId, Trip, parse_calendar_date};
use trip_planner::engine::{
    DateEngine, EngineConfig, InsertPosition, Itinerary, RedatePolicy, Resolution, route_points,
};
use trip_planner::snapshot::{load_trip, store_itinerary};

#[derive(Parser)]
#[command(name = "trip-planner", about = "Keep a trip's stop dates consistent")]
struct Cli {
    /// First day of each calendar week
    #[arg(long, global = true, env = "TRIP_PLANNER_WEEK_START", default_value = "mon")]
    week_start: Weekday,

    /// Nights proposed for a new stop when none are given
    #[arg(long, global = true, default_value_t = 1)]
    default_nights: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Propose dates and an order index for a new stop
    Propose {
        /// Trip snapshot
        file: PathBuf,
        /// Insert after this stop instead of at the start of the trip
        #[arg(long)]
        after: Option<u64>,
        /// Nights to stay (values below 1 become 1)
        #[arg(long, allow_negative_numbers = true)]
        nights: Option<i64>,
    },
    /// Check whether new dates for a stop collide with the next stop
    Check {
        file: PathBuf,
        #[arg(long)]
        stop: u64,
        #[arg(long, value_parser = parse_calendar_date)]
        start: NaiveDate,
        #[arg(long, value_parser = parse_calendar_date)]
        end: NaiveDate,
    },
    /// Change a stop's dates, resolving any collision with the next stop
    Shift {
        file: PathBuf,
        #[arg(long)]
        stop: u64,
        #[arg(long, value_parser = parse_calendar_date)]
        start: NaiveDate,
        #[arg(long, value_parser = parse_calendar_date)]
        end: NaiveDate,
        #[arg(long, value_enum)]
        strategy: Strategy,
        /// Write the updated trip back to the snapshot
        #[arg(long)]
        write: bool,
    },
    /// Reorder the stops
    Reorder {
        file: PathBuf,
        /// Stop ids in their new order
        #[arg(long, value_delimiter = ',', required = true)]
        order: Vec<u64>,
        /// Re-chain dates from the trip's first arrival in the new order
        #[arg(long)]
        rechain: bool,
        /// Write the updated trip back to the snapshot
        #[arg(long)]
        write: bool,
    },
    /// Month grid of the trip's days
    Calendar {
        file: PathBuf,
        /// Number of months to show from the first
        #[arg(long)]
        months: Option<u32>,
    },
    /// Nights per stop, trip totals and date issues
    Nights { file: PathBuf },
    /// Points in route drawing order
    Route { file: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    /// Push every following stop later by the same number of days
    ShiftAll,
    /// Move only the next stop's arrival
    AdjustNext,
}

impl From<Strategy> for Resolution {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::ShiftAll => Resolution::ShiftAll,
            Strategy::AdjustNext => Resolution::AdjustNext,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = EngineConfig {
        default_nights: cli.default_nights,
        week_start: cli.week_start,
        ..EngineConfig::default()
    };
    let engine = DateEngine::new(SystemClock, config);

    let output = match cli.command {
        Command::Propose {
            file,
            after,
            nights,
        } => {
            let (_, itinerary) = open(&file)?;
            let position = after.map_or(InsertPosition::StartOfTrip, |id| {
                InsertPosition::After(StopId(id))
            });
            let dates = match nights {
                Some(nights) => engine.propose_dates(&itinerary, position, nights)?,
                None => engine.propose_default_dates(&itinerary, position)?,
            };
            let plan = itinerary.plan_insertion(position)?;
            json!({ "dates": dates, "plan": plan })
        }
        Command::Check {
            file,
            stop,
            start,
            end,
        } => {
            let (_, itinerary) = open(&file)?;
            let check = engine.detect_duration_conflict(&itinerary, StopId(stop), start, end)?;
            serde_json::to_value(check)?
        }
        Command::Shift {
            file,
            stop,
            start,
            end,
            strategy,
            write,
        } => {
            let (trip, itinerary) = open(&file)?;
            let new_dates = DateRange::new(start, end)?;
            let updates =
                engine.resolve_edit(&itinerary, StopId(stop), new_dates, strategy.into())?;

            if write {
                let updated = itinerary.apply_updates(&updates)?;
                save(trip, updated, &file)?;
            }
            json!({ "updates": updates })
        }
        Command::Reorder {
            file,
            order,
            rechain,
            write,
        } => {
            let (trip, itinerary) = open(&file)?;
            let order: Vec<StopId> = order.into_iter().map(StopId).collect();
            let policy = if rechain {
                RedatePolicy::Rechain
            } else {
                RedatePolicy::KeepDates
            };
            let plan = itinerary.plan_reorder(&order, policy)?;

            if write {
                let updated = itinerary.apply_reorder(&plan)?;
                save(trip, updated, &file)?;
            }
            serde_json::to_value(plan)?
        }
        Command::Calendar { file, months } => {
            let (_, itinerary) = open(&file)?;
            serde_json::to_value(engine.compute_calendar_grid(&itinerary, months)?)?
        }
        Command::Nights { file } => {
            let (_, itinerary) = open(&file)?;
            let stops: Vec<_> = itinerary
                .stops()
                .iter()
                .map(|s| json!({ "id": s.id, "name": s.name, "nights": s.nights() }))
                .collect();
            json!({
                "stops": stops,
                "total_nights": itinerary.total_nights(),
                "span": itinerary.span(),
                "issues": itinerary.check_consistency(),
            })
        }
        Command::Route { file } => {
            let trip = load_trip(&file)?;
            serde_json::to_value(route_points(&trip))?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn open(path: &Path) -> anyhow::Result<(Trip, Itinerary)> {
    let trip = load_trip(path)?;
    let itinerary = Itinerary::from_trip(&trip)?;
    if itinerary.is_empty() {
        info!(path = %path.display(), "trip has no stops");
    }
    Ok((trip, itinerary))
}

fn save(trip: Trip, itinerary: Itinerary, path: &Path) -> anyhow::Result<()> {
    let trip = store_itinerary(trip, itinerary, path)
        .with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), trip = %trip.id, "saved trip snapshot");
    Ok(())
}
