//! Tile, program and observing-condition types shared by the plan, the
//! selection engine and the progress store.

use qtty::{Degrees, Seconds};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

crate::define_id_type!(i32, TileId);

/// Observing program a tile belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Program {
    Dark,
    Gray,
    Bright,
}

impl Program {
    pub fn as_str(&self) -> &'static str {
        match self {
            Program::Dark => "DARK",
            Program::Gray => "GRAY",
            Program::Bright => "BRIGHT",
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Program {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DARK" => Ok(Program::Dark),
            "GRAY" | "GREY" => Ok(Program::Gray),
            "BRIGHT" => Ok(Program::Bright),
            other => Err(format!("Unknown program: {}", other)),
        }
    }
}

/// Bitmask of sky conditions a tile may be observed under.
///
/// Bit values follow the survey targeting mask. Bits this type does not name
/// are carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObsConditions(pub u32);

impl ObsConditions {
    pub const DARK: ObsConditions = ObsConditions(1);
    pub const GRAY: ObsConditions = ObsConditions(1 << 1);
    pub const BRIGHT: ObsConditions = ObsConditions(1 << 2);
    pub const POOR: ObsConditions = ObsConditions(1 << 3);
    pub const TWILIGHT12: ObsConditions = ObsConditions(1 << 4);
    pub const TWILIGHT18: ObsConditions = ObsConditions(1 << 5);

    pub fn bits(&self) -> u32 {
        self.0
    }

    /// True when every bit of `other` is set in `self`.
    pub fn contains(&self, other: ObsConditions) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    /// True when the mask admits bright-sky observing.
    pub fn allows_bright(&self) -> bool {
        self.contains(Self::BRIGHT)
    }
}

impl std::ops::BitOr for ObsConditions {
    type Output = ObsConditions;

    fn bitor(self, rhs: Self) -> Self::Output {
        ObsConditions(self.0 | rhs.0)
    }
}

/// A telescope pointing in equatorial coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pointing {
    pub ra: Degrees,
    pub dec: Degrees,
}

impl Pointing {
    pub fn new(ra: f64, dec: f64) -> Self {
        Self {
            ra: Degrees::new(ra),
            dec: Degrees::new(dec),
        }
    }
}

/// One row of the nightly observing plan produced by the afternoon planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileCandidate {
    pub tile_id: TileId,
    pub ra: Degrees,
    pub dec: Degrees,
    pub pass_number: i32,
    pub program: Program,
    /// Start of the allowed LST window. May be numerically larger than `lst_max`.
    pub lst_min: Degrees,
    pub lst_max: Degrees,
    pub expected_exposure_length: Seconds,
    /// Median E(B-V) over the tile.
    pub extinction: f64,
    /// Status code assigned by the planner.
    pub status: i32,
    pub obs_conditions: ObsConditions,
    /// Planner priority (0-10). Only the merit ranking strategy reads it.
    #[serde(default)]
    pub priority: Option<f64>,
    /// LST the planner assigned to this tile. Only the merit ranking strategy reads it.
    #[serde(default)]
    pub lst_assigned: Option<f64>,
}

impl TileCandidate {
    pub fn position(&self) -> Pointing {
        Pointing {
            ra: self.ra,
            dec: self.dec,
        }
    }

    /// Centre of the LST window, used when the planner did not assign an LST.
    pub fn window_center(&self) -> Degrees {
        Degrees::new(0.5 * (self.lst_min.value() + self.lst_max.value()))
    }
}

/// Ordered candidate list for one night. Plan order is the selection tie-break.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservingPlan {
    pub tiles: Vec<TileCandidate>,
    /// Moon illumination fraction valid for the whole night.
    pub moon_illumination_fraction: f64,
}

impl ObservingPlan {
    pub fn new(tiles: Vec<TileCandidate>, moon_illumination_fraction: f64) -> Self {
        Self {
            tiles,
            moon_illumination_fraction,
        }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TileCandidate> {
        self.tiles.iter()
    }
}

/// Static identity of one tile in the survey footprint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FootprintTile {
    pub tile_id: TileId,
    pub pass_number: i32,
    pub ra: Degrees,
    pub dec: Degrees,
}

impl FootprintTile {
    pub fn new(tile_id: i32, pass_number: i32, ra: f64, dec: f64) -> Self {
        Self {
            tile_id: TileId(tile_id),
            pass_number,
            ra: Degrees::new(ra),
            dec: Degrees::new(dec),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_parse_is_case_insensitive() {
        assert_eq!("dark".parse::<Program>().unwrap(), Program::Dark);
        assert_eq!(" Bright ".parse::<Program>().unwrap(), Program::Bright);
        assert_eq!("GREY".parse::<Program>().unwrap(), Program::Gray);
        assert!("twilight".parse::<Program>().is_err());
    }

    #[test]
    fn test_program_serializes_upper_case() {
        let json = serde_json::to_string(&Program::Gray).unwrap();
        assert_eq!(json, "\"GRAY\"");
    }

    #[test]
    fn test_obs_conditions_bright_bit() {
        assert!(ObsConditions(4).allows_bright());
        assert!((ObsConditions::DARK | ObsConditions::BRIGHT).allows_bright());
        assert!(!(ObsConditions::DARK | ObsConditions::GRAY).allows_bright());
        assert!(!ObsConditions::default().allows_bright());
    }

    #[test]
    fn test_tile_id_from_str() {
        assert_eq!("  1234 ".parse::<TileId>().unwrap(), TileId(1234));
        assert!("abc".parse::<TileId>().is_err());
    }
}
