//! Parsers for planner and footprint input files.
//!
//! - [`plan`]: nightly observing plans, as CSV or JSON
//! - [`footprint`]: the survey footprint tile list (CSV)
//!
//! # Example
//!
//! ```no_run
//! use survey_scheduler::parsing::plan::parse_plan;
//! use std::path::Path;
//!
//! let plan = parse_plan(Path::new("obsplan20200101.csv"))
//!     .expect("Failed to parse plan");
//! ```

pub mod footprint;
pub mod plan;

#[cfg(test)]
mod plan_tests;

pub use footprint::{parse_footprint_csv, parse_footprint_csv_str};
pub use plan::{parse_plan, parse_plan_csv, parse_plan_csv_str, parse_plan_json, parse_plan_json_str};
