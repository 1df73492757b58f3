//! Append-only exposure ledger for the survey footprint.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use super::error::{ProgressError, ProgressResult};
use crate::config::ProgressSettings;
use crate::models::{
    Exposure, FootprintTile, ModifiedJulianDate, SummaryFilter, TileId, TileProgress, TileStatus,
    TileSummary, COMPLETION_THRESHOLD,
};

/// Default per-tile exposure capacity.
pub const DEFAULT_MAX_EXPOSURES: usize = 16;

/// Observing progress of every footprint tile.
///
/// Tiles are kept in footprint order. Exposures are only ever appended, and
/// `last_mjd` tracks the latest exposure accepted across the whole store.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressStore {
    pub(super) tiles: Vec<TileProgress>,
    pub(super) max_exposures: usize,
    pub(super) last_mjd: Option<ModifiedJulianDate>,
}

impl ProgressStore {
    /// Create an empty store with one entry per footprint tile.
    ///
    /// Duplicate tile IDs are kept; any later lookup of such an ID fails
    /// with [`ProgressError::UnknownTile`].
    pub fn new(footprint: &[FootprintTile], max_exposures: usize) -> Self {
        log::debug!(
            "Initializing progress for {} tiles (max {} exposures each)",
            footprint.len(),
            max_exposures
        );
        Self {
            tiles: footprint.iter().map(TileProgress::new).collect(),
            max_exposures,
            last_mjd: None,
        }
    }

    pub fn from_config(footprint: &[FootprintTile], settings: &ProgressSettings) -> Self {
        Self::new(footprint, settings.max_exposures)
    }

    pub fn num_tiles(&self) -> usize {
        self.tiles.len()
    }

    pub fn max_exposures(&self) -> usize {
        self.max_exposures
    }

    /// Start time of the most recent exposure, if any.
    pub fn last_mjd(&self) -> Option<ModifiedJulianDate> {
        self.last_mjd
    }

    pub fn tiles(&self) -> impl Iterator<Item = &TileProgress> {
        self.tiles.iter()
    }

    pub fn get_tile(&self, tile_id: TileId) -> ProgressResult<&TileProgress> {
        let index = self.locate(tile_id)?;
        Ok(&self.tiles[index])
    }

    fn locate(&self, tile_id: TileId) -> ProgressResult<usize> {
        let mut found = None;
        let mut matches = 0;
        for (index, tile) in self.tiles.iter().enumerate() {
            if tile.tile_id == tile_id {
                found = Some(index);
                matches += 1;
            }
        }
        match found {
            Some(index) if matches == 1 => Ok(index),
            _ => Err(ProgressError::UnknownTile { tile_id, matches }),
        }
    }

    /// Record a completed exposure of `tile_id`.
    ///
    /// Checks run in order: tile lookup, per-tile capacity, finiteness of
    /// `mjd`, `exptime_seconds` and `snr2frac`, then time ordering against
    /// `last_mjd`. On any failure nothing is changed.
    pub fn add_exposure(
        &mut self,
        tile_id: TileId,
        mjd: ModifiedJulianDate,
        exptime_seconds: f64,
        snr2frac: f64,
        airmass: f64,
        seeing_arcsec: f64,
    ) -> ProgressResult<TileStatus> {
        let index = self.locate(tile_id)?;

        if self.tiles[index].num_exposures() >= self.max_exposures {
            return Err(ProgressError::CapacityExceeded {
                tile_id,
                max_exposures: self.max_exposures,
            });
        }

        for (field, value) in [
            ("mjd", mjd.value()),
            ("exptime", exptime_seconds),
            ("snr2frac", snr2frac),
        ] {
            if !value.is_finite() {
                return Err(ProgressError::NonFiniteValue {
                    tile_id,
                    field,
                    value,
                });
            }
        }

        if let Some(last_mjd) = self.last_mjd {
            if mjd.partial_cmp(&last_mjd) != Some(Ordering::Greater) {
                return Err(ProgressError::NonMonotonicTime { mjd, last_mjd });
            }
        }

        let tile = &mut self.tiles[index];
        tile.push_exposure(Exposure {
            mjd,
            exptime_seconds,
            snr2frac,
            airmass,
            seeing_arcsec,
        });
        self.last_mjd = Some(mjd);

        log::debug!(
            "Tile {} exposure {} at MJD {}: snr2frac {:.3} (total {:.3}, {})",
            tile_id,
            tile.num_exposures(),
            mjd,
            snr2frac,
            tile.snr2_sum(),
            tile.status()
        );

        Ok(tile.status())
    }

    /// Number of completed tiles.
    ///
    /// With `before`, only exposures that started strictly earlier count,
    /// both toward the SNR² sums and the completion test. With
    /// `include_partial`, the SNR² fractions of incomplete tiles are added.
    pub fn completed(&self, before: Option<ModifiedJulianDate>, include_partial: bool) -> f64 {
        self.tiles.iter().fold(0.0, |total, tile| {
            let sum = match before {
                Some(cutoff) => tile.snr2_sum_before(cutoff),
                None => tile.snr2_sum(),
            };
            let credit = if sum >= COMPLETION_THRESHOLD {
                1.0
            } else if include_partial {
                sum
            } else {
                0.0
            };
            total + credit
        })
    }

    /// IDs of tiles with at least one exposure (`include_partial`) or that
    /// are done.
    pub fn get_observed(&self, include_partial: bool) -> BTreeSet<TileId> {
        let min_status = if include_partial {
            TileStatus::Partial
        } else {
            TileStatus::Done
        };
        self.tiles
            .iter()
            .filter(|tile| tile.status() >= min_status)
            .map(|tile| tile.tile_id)
            .collect()
    }

    /// Per-tile summaries in footprint order.
    pub fn get_summary(&self, filter: SummaryFilter) -> Vec<TileSummary> {
        let min_status = filter.min_status();
        self.tiles
            .iter()
            .filter(|tile| tile.status() >= min_status)
            .map(TileProgress::summary)
            .collect()
    }
}
