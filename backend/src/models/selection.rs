use serde::{Deserialize, Serialize};

use super::tile::{ObsConditions, Program, TileCandidate, TileId};

/// Reference SNR² the exposure-time calculator normalises against.
pub const DESIGN_SNR2: f64 = 100.0;

/// Horizontal (alt/az) position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HorizontalPosition {
    pub alt: f64,
    pub az: f64,
}

impl HorizontalPosition {
    pub fn new(alt: f64, az: f64) -> Self {
        Self { alt, az }
    }
}

/// Moon position relative to a candidate tile, as reported by an ephemeris.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MoonLocation {
    /// Angular distance between the tile centre and the Moon.
    pub separation_deg: f64,
    pub alt_deg: f64,
    pub az_deg: f64,
}

/// The tile chosen for the next exposure, with everything the caller needs to
/// run and then record the observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedTile {
    pub tile_id: TileId,
    pub ra: f64,
    pub dec: f64,
    pub pass_number: i32,
    pub program: Program,
    /// Median E(B-V) of the tile.
    pub extinction: f64,
    /// Ceiling on the exposure duration, twice the planned length.
    pub max_exposure_length: f64,
    pub moon_illumination_fraction: f64,
    pub moon_separation: f64,
    pub moon_alt: f64,
    pub moon_az: f64,
    pub target_snr2: f64,
    /// Planner-assigned status of the candidate.
    pub status: i32,
    pub obs_conditions: ObsConditions,
    /// Actual exposure duration, filled in after the observation.
    pub exposure_seconds: Option<f64>,
    /// Achieved SNR², filled in after the observation.
    pub observed_snr2: Option<f64>,
}

impl SelectedTile {
    pub fn from_candidate(
        candidate: &TileCandidate,
        moon_illumination_fraction: f64,
        moon: MoonLocation,
    ) -> Self {
        Self {
            tile_id: candidate.tile_id,
            ra: candidate.ra.value(),
            dec: candidate.dec.value(),
            pass_number: candidate.pass_number,
            program: candidate.program,
            extinction: candidate.extinction,
            max_exposure_length: 2.0 * candidate.expected_exposure_length.value(),
            moon_illumination_fraction,
            moon_separation: moon.separation_deg,
            moon_alt: moon.alt_deg,
            moon_az: moon.az_deg,
            target_snr2: DESIGN_SNR2,
            status: candidate.status,
            obs_conditions: candidate.obs_conditions,
            exposure_seconds: None,
            observed_snr2: None,
        }
    }

    /// Fill in the placeholders once the exposure has been taken.
    pub fn record_observation(&mut self, exposure_seconds: f64, observed_snr2: f64) {
        self.exposure_seconds = Some(exposure_seconds);
        self.observed_snr2 = Some(observed_snr2);
    }

    /// Achieved fraction of the design SNR², once observed.
    pub fn snr2_fraction(&self) -> Option<f64> {
        self.observed_snr2.map(|snr2| snr2 / self.target_snr2)
    }
}
