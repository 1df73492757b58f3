//! Next-field command-line driver.
//!
//! # Usage
//!
//! ```bash
//! # Create an empty progress ledger for a footprint
//! nextfield init footprint.csv progress.json
//!
//! # Pick the next tile (printed as JSON on stdout)
//! nextfield select obsplan.csv 58850.21 --progress progress.json \
//!     --previous 150.0,2.5 --moon -12.0,95.0
//!
//! # Record a finished exposure
//! nextfield record progress.json 1001 58850.22 1000 0.65 1.08 1.1
//!
//! # Per-tile summary as CSV
//! nextfield summary progress.json observed
//! ```
//!
//! # Environment Variables
//!
//! - `SCHEDULER_CONFIG`: path to the TOML configuration, same as `--config`
//!   (default: search `scheduler.toml`, `backend/scheduler.toml`,
//!   `../scheduler.toml`)
//! - `RUST_LOG`: Log level (default: info)

use std::collections::BTreeSet;
use std::env;
use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use survey_scheduler::config::SchedulerConfig;
use survey_scheduler::models::{
    HorizontalPosition, ModifiedJulianDate, Pointing, SummaryFilter, TileId,
};
use survey_scheduler::parsing::{parse_footprint_csv, parse_plan};
use survey_scheduler::progress::{write_summary_csv, ProgressStore};
use survey_scheduler::scheduler::{PrefetchedMoon, SelectionRequest, TileSelector};

/// Pick survey tiles and track exposure progress.
#[derive(Parser)]
#[command(name = "nextfield")]
#[command(about = "Pick the next survey tile and track exposure progress")]
#[command(version)]
struct Cli {
    /// Scheduler configuration file
    #[arg(short, long, value_name = "FILE", env = "SCHEDULER_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty progress ledger for a footprint
    Init {
        /// Footprint CSV (TILEID, PASS, RA, DEC)
        footprint: PathBuf,
        /// Progress file to write
        progress: PathBuf,
    },

    /// Select the next tile to observe
    Select {
        /// Nightly plan (.csv or .json)
        plan: PathBuf,
        /// Current time as MJD
        mjd: f64,
        /// Progress file whose observed tiles are skipped
        #[arg(short, long, value_name = "FILE")]
        progress: Option<PathBuf>,
        /// Previous pointing as <ra>,<dec> in degrees
        #[arg(long, value_name = "RA,DEC", value_parser = parse_pointing, allow_hyphen_values = true)]
        previous: Option<Pointing>,
        /// Moon position as <alt>,<az> in degrees
        #[arg(long, value_name = "ALT,AZ", value_parser = parse_horizontal, allow_hyphen_values = true)]
        moon: Option<HorizontalPosition>,
        /// Telescope is already on target
        #[arg(long)]
        no_slew: bool,
    },

    /// Record a finished exposure
    Record {
        /// Progress file to update in place
        progress: PathBuf,
        tile_id: TileId,
        mjd: f64,
        /// Exposure time in seconds
        exptime: f64,
        /// Fraction of the design SNR² reached
        snr2frac: f64,
        airmass: f64,
        /// Seeing FWHM in arcseconds
        seeing: f64,
    },

    /// Print the per-tile summary as CSV
    Summary {
        /// Progress file to read
        progress: PathBuf,
        #[arg(value_enum, default_value_t = SummaryKind::All)]
        filter: SummaryKind,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SummaryKind {
    All,
    Observed,
    Completed,
}

impl From<SummaryKind> for SummaryFilter {
    fn from(kind: SummaryKind) -> Self {
        match kind {
            SummaryKind::All => SummaryFilter::All,
            SummaryKind::Observed => SummaryFilter::Observed,
            SummaryKind::Completed => SummaryFilter::Completed,
        }
    }
}

fn parse_pair(value: &str) -> Result<(f64, f64), String> {
    let (a, b) = value
        .split_once(',')
        .ok_or_else(|| format!("expected <a>,<b>, got '{}'", value))?;
    let a = a.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let b = b.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok((a, b))
}

fn parse_pointing(value: &str) -> Result<Pointing, String> {
    parse_pair(value).map(|(ra, dec)| Pointing::new(ra, dec))
}

fn parse_horizontal(value: &str) -> Result<HorizontalPosition, String> {
    parse_pair(value).map(|(alt, az)| HorizontalPosition::new(alt, az))
}

fn load_config(path: Option<&PathBuf>) -> Result<SchedulerConfig> {
    let config = match path {
        Some(path) => SchedulerConfig::from_file(path)?,
        None => SchedulerConfig::from_default_location_or_default()?,
    };
    Ok(config)
}

fn run_select(
    config: SchedulerConfig,
    plan: PathBuf,
    mjd: f64,
    progress: Option<PathBuf>,
    previous: Option<Pointing>,
    moon: Option<HorizontalPosition>,
    no_slew: bool,
) -> Result<()> {
    let plan = parse_plan(&plan)?;
    let mjd = ModifiedJulianDate::new(mjd);

    let observed = match progress {
        Some(path) => ProgressStore::load(path, &config.progress)?.get_observed(true),
        None => BTreeSet::new(),
    };

    let ephemeris = PrefetchedMoon::new(config.site.latitude);
    let selector = TileSelector::new(config, ephemeris);
    let request = SelectionRequest {
        mjd,
        observed: &observed,
        slew_required: !no_slew,
        previous: previous.unwrap_or(Pointing::new(0.0, 0.0)),
        // Without a Moon position, assume it is below the horizon.
        moon: moon.unwrap_or(HorizontalPosition::new(-90.0, 0.0)),
    };

    match selector.select_next_tile(&plan, &request) {
        Some((tile, overhead)) => {
            let output = serde_json::json!({
                "tile": tile,
                "overhead": overhead.value(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        None => {
            info!("No tile available at MJD {}", mjd);
            println!("null");
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_record(
    config: &SchedulerConfig,
    path: PathBuf,
    tile_id: TileId,
    mjd: f64,
    exptime: f64,
    snr2frac: f64,
    airmass: f64,
    seeing: f64,
) -> Result<()> {
    let mut store = ProgressStore::load(&path, &config.progress)?;
    let status = store.add_exposure(
        tile_id,
        ModifiedJulianDate::new(mjd),
        exptime,
        snr2frac,
        airmass,
        seeing,
    )?;
    store.save(&path)?;

    info!(
        "Tile {} is now {} ({:.2} tiles completed)",
        tile_id,
        status,
        store.completed(None, true)
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Init {
            footprint,
            progress,
        } => {
            let footprint = parse_footprint_csv(&footprint)?;
            ProgressStore::from_config(&footprint, &config.progress).save(progress)?;
            Ok(())
        }
        Commands::Select {
            plan,
            mjd,
            progress,
            previous,
            moon,
            no_slew,
        } => run_select(config, plan, mjd, progress, previous, moon, no_slew),
        Commands::Record {
            progress,
            tile_id,
            mjd,
            exptime,
            snr2frac,
            airmass,
            seeing,
        } => run_record(
            &config, progress, tile_id, mjd, exptime, snr2frac, airmass, seeing,
        ),
        Commands::Summary { progress, filter } => {
            let store = ProgressStore::load(progress, &config.progress)?;
            write_summary_csv(io::stdout().lock(), &store.get_summary(filter.into()))?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_select_parses_typed_positions() {
        let cli = Cli::try_parse_from([
            "nextfield", "select", "plan.csv", "58850.21", "--previous", "150.0,2.5", "--moon",
            "-12.0,95.0", "--no-slew",
        ])
        .unwrap();
        match cli.command {
            Commands::Select {
                mjd,
                previous,
                moon,
                no_slew,
                progress,
                ..
            } => {
                assert_eq!(mjd, 58850.21);
                assert_eq!(previous, Some(Pointing::new(150.0, 2.5)));
                assert_eq!(moon, Some(HorizontalPosition::new(-12.0, 95.0)));
                assert!(no_slew);
                assert!(progress.is_none());
            }
            _ => panic!("expected select"),
        }
    }

    #[test]
    fn test_malformed_pair_rejected() {
        assert!(Cli::try_parse_from(["nextfield", "select", "plan.csv", "1.0", "--moon", "12"]).is_err());
        assert!(parse_pair("1.0,abc").is_err());
    }

    #[test]
    fn test_summary_filter_keywords() {
        let cli = Cli::try_parse_from(["nextfield", "summary", "p.json", "completed"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Summary { filter: SummaryKind::Completed, .. }
        ));
        let cli = Cli::try_parse_from(["nextfield", "summary", "p.json"]).unwrap();
        assert!(matches!(cli.command, Commands::Summary { filter: SummaryKind::All, .. }));
        assert!(Cli::try_parse_from(["nextfield", "summary", "p.json", "partial"]).is_err());
    }
}
