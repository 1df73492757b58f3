//! # Survey Scheduler
//!
//! Next-tile selection and exposure bookkeeping for a multi-pass sky survey.
//!
//! Each night an afternoon planner produces an ordered list of candidate
//! tiles. While observing, the [`scheduler`] walks that list and returns the
//! first tile whose LST window, Moon separation and object-avoidance checks
//! pass once the telescope setup overhead is accounted for. After each
//! exposure the caller appends the result to the [`progress`] ledger, which
//! tracks per-tile completion and feeds the set of already observed tiles
//! back into the next decision.
//!
//! ## Architecture
//!
//! - [`models`]: tile, plan, exposure and time types
//! - [`config`]: TOML scheduler configuration
//! - [`parsing`]: plan and footprint file loaders
//! - [`scheduler`]: overhead model, observability predicate, selection engine
//! - [`progress`]: append-only exposure ledger and its persistence
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use survey_scheduler::config::SchedulerConfig;
//! use survey_scheduler::models::{HorizontalPosition, ModifiedJulianDate, Pointing};
//! use survey_scheduler::parsing::{parse_footprint_csv, parse_plan};
//! use survey_scheduler::progress::ProgressStore;
//! use survey_scheduler::scheduler::{PrefetchedMoon, SelectionRequest, TileSelector};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = SchedulerConfig::from_default_location_or_default()?;
//! let plan = parse_plan(Path::new("obsplan.csv"))?;
//! let footprint = parse_footprint_csv(Path::new("footprint.csv"))?;
//! let mut progress = ProgressStore::from_config(&footprint, &config.progress);
//!
//! let selector = TileSelector::new(config.clone(), PrefetchedMoon::new(config.site.latitude));
//! let observed = progress.get_observed(true);
//! let request = SelectionRequest {
//!     mjd: ModifiedJulianDate::new(58850.2),
//!     observed: &observed,
//!     slew_required: true,
//!     previous: Pointing::new(0.0, 30.0),
//!     moon: HorizontalPosition::new(-20.0, 100.0),
//! };
//! if let Some((tile, overhead)) = selector.select_next_tile(&plan, &request) {
//!     let start = ModifiedJulianDate::new(58850.2 + overhead.value() / 86400.0);
//!     progress.add_exposure(tile.tile_id, start, 1000.0, 0.6, 1.1, 1.0)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod models;
pub mod parsing;
pub mod progress;
pub mod scheduler;
