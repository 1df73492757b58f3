//! Survey progress ledger.
//!
//! [`ProgressStore`] owns one [`TileProgress`](crate::models::TileProgress)
//! per footprint tile and accepts exposures in time order. Snapshots are
//! saved as versioned JSON and refused on load when the version differs.

pub mod error;
pub mod snapshot;
pub mod store;

pub use error::{ProgressError, ProgressResult};
pub use snapshot::{calculate_checksum, write_summary_csv};
pub use store::{ProgressStore, DEFAULT_MAX_EXPOSURES};

/// Schema version written to, and required from, persisted stores.
pub const PROGRESS_SCHEMA_VERSION: u32 = 1;
