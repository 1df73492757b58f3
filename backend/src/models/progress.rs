//! Exposure ledger records and per-tile completion status.

use qtty::Degrees;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::tile::{FootprintTile, TileId};
use super::time::ModifiedJulianDate;

/// Summed SNR² fraction at which a tile counts as done.
pub const COMPLETION_THRESHOLD: f64 = 1.0;

/// One completed exposure. Never mutated after it is appended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Exposure {
    /// Exposure start time.
    pub mjd: ModifiedJulianDate,
    pub exptime_seconds: f64,
    /// Fraction of the design SNR² reached by this exposure.
    pub snr2frac: f64,
    pub airmass: f64,
    pub seeing_arcsec: f64,
}

/// Completion status of a tile, ordered `None < Partial < Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TileStatus {
    None,
    Partial,
    Done,
}

impl TileStatus {
    /// Status implied by a number of exposures and their summed SNR² fraction.
    pub fn from_exposures(num_exposures: usize, snr2_sum: f64) -> Self {
        if num_exposures == 0 {
            TileStatus::None
        } else if snr2_sum >= COMPLETION_THRESHOLD {
            TileStatus::Done
        } else {
            TileStatus::Partial
        }
    }

    /// Numeric code used in tabular output: 0=none, 1=partial, 2=done.
    pub fn code(&self) -> u8 {
        match self {
            TileStatus::None => 0,
            TileStatus::Partial => 1,
            TileStatus::Done => 2,
        }
    }
}

impl fmt::Display for TileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TileStatus::None => "NONE",
            TileStatus::Partial => "PARTIAL",
            TileStatus::Done => "DONE",
        };
        f.write_str(s)
    }
}

/// Observing history of one footprint tile.
///
/// The exposure list only grows through the progress store, which enforces
/// capacity and time ordering; `status` is re-derived on every append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileProgress {
    pub tile_id: TileId,
    pub pass_number: i32,
    pub ra: Degrees,
    pub dec: Degrees,
    status: TileStatus,
    exposures: Vec<Exposure>,
}

impl TileProgress {
    pub fn new(tile: &FootprintTile) -> Self {
        Self {
            tile_id: tile.tile_id,
            pass_number: tile.pass_number,
            ra: tile.ra,
            dec: tile.dec,
            status: TileStatus::None,
            exposures: Vec::new(),
        }
    }

    pub fn status(&self) -> TileStatus {
        self.status
    }

    pub fn exposures(&self) -> &[Exposure] {
        &self.exposures
    }

    pub fn num_exposures(&self) -> usize {
        self.exposures.len()
    }

    pub fn snr2_sum(&self) -> f64 {
        self.exposures.iter().fold(0.0, |acc, e| acc + e.snr2frac)
    }

    /// SNR² fraction accumulated by exposures that started before `cutoff`.
    pub fn snr2_sum_before(&self, cutoff: ModifiedJulianDate) -> f64 {
        self.exposures
            .iter()
            .filter(|e| e.mjd < cutoff)
            .fold(0.0, |acc, e| acc + e.snr2frac)
    }

    pub fn last_exposure(&self) -> Option<&Exposure> {
        self.exposures.last()
    }

    pub(crate) fn push_exposure(&mut self, exposure: Exposure) {
        self.exposures.push(exposure);
        self.refresh_status();
    }

    /// Re-derive `status` from the exposure list. Returns true when it changed.
    pub(crate) fn refresh_status(&mut self) -> bool {
        let status = TileStatus::from_exposures(self.exposures.len(), self.snr2_sum());
        let changed = status != self.status;
        self.status = status;
        changed
    }

    pub fn summary(&self) -> TileSummary {
        let n = self.exposures.len();
        let mean = |f: fn(&Exposure) -> f64| {
            if n == 0 {
                0.0
            } else {
                self.exposures.iter().fold(0.0, |acc, e| acc + f(e)) / n as f64
            }
        };

        TileSummary {
            tile_id: self.tile_id,
            pass_number: self.pass_number,
            ra: self.ra.value(),
            dec: self.dec.value(),
            status: self.status,
            num_exposures: n,
            mjd_min: self.exposures.first().map(|e| e.mjd),
            mjd_max: self.exposures.last().map(|e| e.mjd),
            exptime: self.exposures.iter().fold(0.0, |acc, e| acc + e.exptime_seconds),
            snr2frac: self.snr2_sum(),
            airmass: mean(|e| e.airmass),
            seeing: mean(|e| e.seeing_arcsec),
        }
    }
}

/// Decoupled per-tile snapshot returned by `ProgressStore::get_summary`.
///
/// `exptime` and `snr2frac` are sums over exposures; `airmass` and `seeing`
/// are means (zero for unobserved tiles).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSummary {
    pub tile_id: TileId,
    pub pass_number: i32,
    pub ra: f64,
    pub dec: f64,
    pub status: TileStatus,
    pub num_exposures: usize,
    pub mjd_min: Option<ModifiedJulianDate>,
    pub mjd_max: Option<ModifiedJulianDate>,
    pub exptime: f64,
    pub snr2frac: f64,
    pub airmass: f64,
    pub seeing: f64,
}

/// Minimum status a tile needs to appear in a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryFilter {
    #[default]
    All,
    Observed,
    Completed,
}

impl SummaryFilter {
    pub fn min_status(&self) -> TileStatus {
        match self {
            SummaryFilter::All => TileStatus::None,
            SummaryFilter::Observed => TileStatus::Partial,
            SummaryFilter::Completed => TileStatus::Done,
        }
    }
}

impl FromStr for SummaryFilter {
    type Err = crate::progress::ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(SummaryFilter::All),
            "observed" => Ok(SummaryFilter::Observed),
            "completed" => Ok(SummaryFilter::Completed),
            other => Err(crate::progress::ProgressError::InvalidSummaryFilter(
                other.to_string(),
            )),
        }
    }
}
