//! Error types for progress store operations.

use crate::models::{ModifiedJulianDate, TileId};

/// Result type for progress store operations
pub type ProgressResult<T> = Result<T, ProgressError>;

/// Error type for progress store operations.
///
/// Every failing mutation leaves the store exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    /// A persisted store was written with a different schema version.
    #[error("Schema version mismatch: found {found}, expected {expected}")]
    SchemaVersionMismatch { found: u32, expected: u32 },

    /// The tile ID is missing from the footprint (`matches == 0`) or is
    /// ambiguous because the footprint lists it more than once.
    #[error("Unknown tile {tile_id}: {matches} matching footprint entries")]
    UnknownTile { tile_id: TileId, matches: usize },

    /// The tile already holds the maximum number of exposures.
    #[error("Tile {tile_id} already has the maximum of {max_exposures} exposures")]
    CapacityExceeded { tile_id: TileId, max_exposures: usize },

    /// Exposures must be appended in strictly increasing time order.
    #[error("Exposure MJD {mjd} is not after the last recorded MJD {last_mjd}")]
    NonMonotonicTime {
        mjd: ModifiedJulianDate,
        last_mjd: ModifiedJulianDate,
    },

    /// An exposure field that must be a finite number is NaN or infinite.
    #[error("Exposure of tile {tile_id} has non-finite {field}: {value}")]
    NonFiniteValue {
        tile_id: TileId,
        field: &'static str,
        value: f64,
    },

    /// Unrecognised summary filter keyword.
    #[error("Invalid summary filter '{0}': expected one of all, observed, completed")]
    InvalidSummaryFilter(String),

    /// The stored tile table does not hash to the recorded checksum.
    #[error("Checksum mismatch: stored {stored}, computed {computed}")]
    ChecksumMismatch { stored: String, computed: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ProgressError {
    /// Whether the error was caused by the arguments of a single
    /// `add_exposure` call rather than by persisted data.
    pub fn is_rejected_exposure(&self) -> bool {
        matches!(
            self,
            Self::UnknownTile { .. }
                | Self::CapacityExceeded { .. }
                | Self::NonFiniteValue { .. }
                | Self::NonMonotonicTime { .. }
        )
    }
}

impl From<serde_json::Error> for ProgressError {
    fn from(err: serde_json::Error) -> Self {
        ProgressError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for ProgressError {
    fn from(err: csv::Error) -> Self {
        ProgressError::Serialization(err.to_string())
    }
}
