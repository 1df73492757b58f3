#![allow(dead_code)]

//! Shared fixtures for the integration tests.

use qtty::{Degrees, Seconds};

use survey_scheduler::config::SchedulerConfig;
use survey_scheduler::models::{
    FootprintTile, ModifiedJulianDate, MoonLocation, ObsConditions, ObservingPlan, Program,
    TileCandidate, TileId,
};
use survey_scheduler::scheduler::{SkyEphemeris, SkyQuery};

/// Early evening of the reference night.
pub const NIGHT_MJD: f64 = 58_850.125;

/// Configuration whose site longitude puts the local sidereal time at
/// exactly `lst` degrees at [`NIGHT_MJD`].
pub fn config_at_lst(lst: f64) -> SchedulerConfig {
    let gmst = ModifiedJulianDate::new(NIGHT_MJD)
        .greenwich_sidereal_time()
        .value();
    let mut config = SchedulerConfig::default();
    config.site.longitude = lst - gmst;
    config
}

/// Plan candidate with a dark-time mask and a 1000 s exposure.
pub fn candidate(id: i32, ra: f64, dec: f64, lst_min: f64, lst_max: f64) -> TileCandidate {
    TileCandidate {
        tile_id: TileId(id),
        ra: Degrees::new(ra),
        dec: Degrees::new(dec),
        pass_number: id % 5,
        program: Program::Dark,
        lst_min: Degrees::new(lst_min),
        lst_max: Degrees::new(lst_max),
        expected_exposure_length: Seconds::new(1000.0),
        extinction: 0.02,
        status: 0,
        obs_conditions: ObsConditions::DARK,
        priority: None,
        lst_assigned: None,
    }
}

/// A strip of `count` tiles along the equator, each visible for a wide
/// window around its own RA.
pub fn equatorial_plan(count: i32) -> ObservingPlan {
    let tiles = (1..=count)
        .map(|id| {
            let ra = 5.0 * id as f64;
            candidate(id, ra, 0.0, ra - 40.0, ra + 40.0)
        })
        .collect();
    ObservingPlan::new(tiles, 0.1)
}

/// Footprint matching every tile of `plan`.
pub fn footprint_for(plan: &ObservingPlan) -> Vec<FootprintTile> {
    plan.iter()
        .map(|t| FootprintTile {
            tile_id: t.tile_id,
            pass_number: t.pass_number,
            ra: t.ra,
            dec: t.dec,
        })
        .collect()
}

/// Ephemeris with the Moon permanently on the far side of the sky.
pub struct MoonlessSky;

impl SkyEphemeris for MoonlessSky {
    fn moon_location(&self, query: &SkyQuery) -> MoonLocation {
        MoonLocation {
            separation_deg: 180.0,
            alt_deg: query.prefetched_moon.alt,
            az_deg: query.prefetched_moon.az,
        }
    }

    fn avoid_object(&self, _mjd: ModifiedJulianDate, _ra: Degrees, _dec: Degrees) -> bool {
        true
    }
}

pub const PLAN_CSV: &str = "\
# MOONFRAC = 0.35
TILEID,RA,DEC,PASS,PROGRAM,LSTMIN,LSTMAX,EXPLEN,EBV_MED,STATUS,OBSCONDITIONS
11,15.0,10.0,0,DARK,0.0,2.0,1000.0,0.02,0,1
12,20.0,10.0,0,DARK,0.0,2.0,1000.0,0.02,0,1
13,25.0,10.0,1,GRAY,0.0,2.0,800.0,0.03,0,3
";

pub const FOOTPRINT_CSV: &str = "\
TILEID,PASS,RA,DEC
11,0,15.0,10.0
12,0,20.0,10.0
13,1,25.0,10.0
14,1,30.0,10.0
";
