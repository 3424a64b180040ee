use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;

use lapboard::data::Dataset;
use lapboard::laps::{best_lap, LapFilter, LapScope};
use lapboard::output::{self, render_table, render_tsv, Table};
use lapboard::scoring::ScoringConfig;
use lapboard::EngineError;

const EXIT_SUCCESS: i32 = 0;
const EXIT_DATA: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Tsv,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score one competition (race weekend)
    Competition { id: u32 },
    /// Championship standings with dropped rounds and participation adjustments
    Championship { id: u32 },
    /// League standings across all tiers, with consistency bonus
    League { id: u32 },
    /// Time-attack leaderboard of a competition
    TimeAttack {
        id: u32,
        /// Evaluate the deadline at this instant instead of now (RFC 3339)
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// Best valid lap for a scope
    BestLap {
        #[arg(long)]
        session: Option<String>,
        #[arg(long)]
        track: Option<String>,
        #[arg(long)]
        driver: Option<u32>,
        #[arg(long)]
        competition: Option<u32>,
        /// Only sessions linked to a competition
        #[arg(long)]
        official: bool,
        /// Only registered drivers
        #[arg(long)]
        trusted: bool,
    },
    /// All-time record of a track
    TrackRecord {
        track: String,
        /// Include unofficial sessions and guests
        #[arg(long)]
        all_sessions: bool,
    },
    /// Records of every track, fastest first
    Tracks {
        #[arg(long)]
        all_sessions: bool,
    },
    /// Per-driver bests on a track
    Leaderboard {
        track: String,
        #[arg(long)]
        all_sessions: bool,
        /// Show at most this many drivers
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Usage statistics of a track
    TrackStats {
        track: String,
        #[arg(long)]
        all_sessions: bool,
    },
    /// A driver's personal best on every track
    DriverBests {
        driver: u32,
        #[arg(long)]
        all_sessions: bool,
    },
    /// Career summary of a driver
    Driver { driver: u32 },
    /// Session activity between two dates (inclusive, YYYY-MM-DD)
    Sessions {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
    },
    /// Report every dangling reference in the dataset
    Check,
    /// Write a starter config file
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "lapboard")]
#[command(about = "Standings and leaderboards for sim-racing leagues", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/lapboard/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Dataset file (JSON, or YAML by extension); overrides `data:` in the config
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Install the stderr log subscriber. RUST_LOG wins over --verbose.
fn init_logging(verbose: bool) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Commands::Init { force } = cli.command {
        let path = match cli.config.map(Ok).unwrap_or_else(lapboard::config::get_config_path) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Config error: {}", e);
                std::process::exit(EXIT_CONFIG);
            }
        };
        if let Err(e) = lapboard::config::write_default_config(&path, force) {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
        println!("Wrote default config to {}", path.display());
        std::process::exit(EXIT_SUCCESS);
    }

    // Load config
    let config = match lapboard::config::load_config(cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate scoring config at startup
    let scoring = config.effective_scoring();
    if let Err(errors) = lapboard::scoring::validate_scoring(&scoring) {
        eprintln!("Scoring config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let Some(data_path) = cli.data.or(config.data) else {
        eprintln!("No dataset given. Pass --data <file> or add to ~/.config/lapboard/config.yaml:");
        eprintln!("  data: /path/to/results.json");
        std::process::exit(EXIT_CONFIG);
    };

    let data = match lapboard::data::load_dataset(&data_path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Data error: {:#}", e);
            std::process::exit(EXIT_DATA);
        }
    };

    let use_colors = output::should_use_colors();
    match run(cli.command, &data, &scoring, cli.format, use_colors) {
        Ok(text) => {
            if !text.is_empty() {
                println!("{}", text);
            }
        }
        Err(e) => {
            let code = match e.downcast_ref::<EngineError>() {
                Some(EngineError::InvalidConfiguration(_)) => EXIT_CONFIG,
                _ => EXIT_DATA,
            };
            eprintln!("Error: {:#}", e);
            std::process::exit(code);
        }
    }

    std::process::exit(EXIT_SUCCESS);
}

fn emit<T: Serialize + ?Sized>(value: &T, table: Table, format: OutputFormat, use_colors: bool) -> Result<String> {
    Ok(match format {
        OutputFormat::Table => render_table(&table, use_colors),
        OutputFormat::Tsv => render_tsv(&table),
        OutputFormat::Json => serde_json::to_string_pretty(value).context("Failed to serialize output")?,
    })
}

fn lap_scope(
    session: Option<String>,
    track: Option<String>,
    driver: Option<u32>,
    competition: Option<u32>,
) -> LapScope {
    match (session, track, driver, competition) {
        (Some(session), ..) => LapScope::Session(session),
        (None, Some(track), Some(driver), _) => LapScope::TrackDriver { track, driver },
        (None, Some(track), None, _) => LapScope::Track(track),
        (None, None, Some(driver), _) => LapScope::Driver(driver),
        (None, None, None, Some(id)) => LapScope::Competition(id),
        (None, None, None, None) => LapScope::All,
    }
}

fn day_bounds(from: NaiveDate, to: NaiveDate) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    if from > to {
        anyhow::bail!("--from {} is after --to {}", from, to);
    }
    let start = from.and_time(NaiveTime::MIN).and_utc();
    let end = to.and_time(NaiveTime::MIN).and_utc() + chrono::Duration::days(1)
        - chrono::Duration::milliseconds(1);
    Ok((start, end))
}

fn run(
    command: Commands,
    data: &Dataset,
    scoring: &ScoringConfig,
    format: OutputFormat,
    use_colors: bool,
) -> Result<String> {
    match command {
        Commands::Competition { id } => {
            let rows = lapboard::scoring::score_competition(data, id, scoring)?;
            emit(&rows, output::competition_table(&rows), format, use_colors)
        }
        Commands::Championship { id } => {
            let rows = lapboard::standings::aggregate_championship(data, id, scoring)?;
            emit(&rows, output::championship_table(&rows), format, use_colors)
        }
        Commands::League { id } => {
            let rows = lapboard::standings::aggregate_league(data, id, scoring)?;
            emit(&rows, output::league_table(&rows), format, use_colors)
        }
        Commands::TimeAttack { id, now } => {
            let now = now.unwrap_or_else(Utc::now);
            let entries = lapboard::time_attack::rank_time_attack(data, id, scoring, now)?;
            emit(&entries, output::time_attack_table(&entries), format, use_colors)
        }
        Commands::BestLap {
            session,
            track,
            driver,
            competition,
            official,
            trusted,
        } => {
            let mut filter = LapFilter::all_sessions();
            if official {
                filter = filter.official();
            }
            if trusted {
                filter = filter.trusted();
            }
            let scope = lap_scope(session, track, driver, competition);
            let lap = best_lap(data, &scope, &filter)?;
            emit(&lap, output::best_lap_table(lap.as_ref()), format, use_colors)
        }
        Commands::TrackRecord { track, all_sessions } => {
            let record = lapboard::records::track_record(data, &track, !all_sessions)?;
            let table = output::best_lap_table(record.as_ref().map(|r| &r.lap));
            emit(&record, table, format, use_colors)
        }
        Commands::Tracks { all_sessions } => {
            let records = lapboard::records::all_track_records(data, !all_sessions)?;
            emit(&records, output::track_records_table(&records), format, use_colors)
        }
        Commands::Leaderboard {
            track,
            all_sessions,
            limit,
        } => {
            let entries = lapboard::records::track_leaderboard(data, &track, !all_sessions, limit)?;
            emit(&entries, output::leaderboard_table(&entries), format, use_colors)
        }
        Commands::TrackStats { track, all_sessions } => {
            let stats = lapboard::records::track_statistics(data, &track, !all_sessions)?;
            emit(&stats, output::track_stats_table(stats.as_ref()), format, use_colors)
        }
        Commands::DriverBests { driver, all_sessions } => {
            let bests = lapboard::records::driver_best_times(data, driver, !all_sessions)?;
            emit(&bests, output::driver_bests_table(&bests), format, use_colors)
        }
        Commands::Driver { driver } => {
            let profile = lapboard::records::driver_profile(data, driver, scoring)?;
            emit(&profile, output::driver_profile_table(&profile), format, use_colors)
        }
        Commands::Sessions { from, to } => {
            let (start, end) = day_bounds(from, to)?;
            let stats = lapboard::records::session_statistics(data, start, end)?;
            emit(&stats, output::session_stats_table(&stats), format, use_colors)
        }
        Commands::Check => match data.check_integrity() {
            Ok(()) => Ok(format!(
                "Dataset OK: {} drivers, {} sessions, {} laps",
                data.drivers().count(),
                data.sessions().count(),
                data.laps().len()
            )),
            Err(errors) => {
                for error in &errors {
                    eprintln!("  - {}", error);
                }
                anyhow::bail!("{} integrity problems found", errors.len())
            }
        },
        Commands::Init { .. } => Ok(String::new()),
    }
}
