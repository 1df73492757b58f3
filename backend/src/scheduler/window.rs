//! Time-window and sky-avoidance predicate for a single candidate tile.

use qtty::{Degrees, Seconds};
use serde::{Deserialize, Serialize};

use super::ephemeris::{SkyEphemeris, SkyQuery};
use crate::config::SelectionSettings;
use crate::models::{
    seconds_to_lst_degrees, HorizontalPosition, ModifiedJulianDate, MoonLocation, ObsConditions,
    TileCandidate,
};

/// How an LST window whose `lst_max` is below its `lst_min` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LstWindowPolicy {
    /// Plain numeric test `lst_min <= lst <= lst_max`. The planner is
    /// expected to hand over already-unwrapped windows, so an inverted window
    /// never matches.
    #[default]
    Literal,
    /// An inverted window crosses 0°/360° and matches `lst >= lst_min || lst <= lst_max`.
    WrapAround,
}

impl LstWindowPolicy {
    pub fn contains(&self, lst: Degrees, lst_min: Degrees, lst_max: Degrees) -> bool {
        let (lst, lo, hi) = (lst.value(), lst_min.value(), lst_max.value());
        match self {
            LstWindowPolicy::Literal => lo <= lst && lst <= hi,
            LstWindowPolicy::WrapAround if hi < lo => lst >= lo || lst <= hi,
            LstWindowPolicy::WrapAround => lo <= lst && lst <= hi,
        }
    }
}

/// Why a candidate was found unobservable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    OutsideLstWindow,
    ObjectAvoidance,
    MoonTooClose,
}

/// Outcome of the observability predicate for one candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observability {
    pub observable: bool,
    /// Predicted LST at the exposure midpoint.
    pub lst_midpoint: Degrees,
    /// Only looked up for candidates that pass the LST window test.
    pub moon: Option<MoonLocation>,
    pub rejection: Option<Rejection>,
}

/// LST at the middle of an exposure that starts after `overhead`, in `[0, 360)`.
pub fn exposure_midpoint_lst(
    current_lst: Degrees,
    overhead: Seconds,
    exposure_length: Seconds,
) -> Degrees {
    let mid = current_lst
        + seconds_to_lst_degrees(overhead)
        + seconds_to_lst_degrees(Seconds::new(0.5 * exposure_length.value()));
    mid.wrap_pos()
}

/// Minimum Moon separation a tile with these conditions must keep.
pub fn min_moon_separation(conditions: ObsConditions, settings: &SelectionSettings) -> f64 {
    if conditions.allows_bright() {
        settings.min_moon_sep_bright
    } else {
        settings.min_moon_sep
    }
}

/// Inputs shared by every candidate evaluated for one decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservingInstant {
    pub mjd: ModifiedJulianDate,
    pub lst: Degrees,
    pub prefetched_moon: HorizontalPosition,
}

/// Decide whether `candidate` can be observed if its setup starts now and
/// takes `overhead`.
///
/// The LST test runs first; the ephemeris is only consulted for candidates
/// inside their window.
pub fn is_observable<E: SkyEphemeris>(
    candidate: &TileCandidate,
    instant: &ObservingInstant,
    overhead: Seconds,
    ephemeris: &E,
    settings: &SelectionSettings,
) -> Observability {
    let lst_midpoint =
        exposure_midpoint_lst(instant.lst, overhead, candidate.expected_exposure_length);

    if !settings
        .lst_window_policy
        .contains(lst_midpoint, candidate.lst_min, candidate.lst_max)
    {
        return Observability {
            observable: false,
            lst_midpoint,
            moon: None,
            rejection: Some(Rejection::OutsideLstWindow),
        };
    }

    let moon = ephemeris.moon_location(&SkyQuery {
        mjd: instant.mjd,
        lst: instant.lst,
        target: candidate.position(),
        prefetched_moon: instant.prefetched_moon,
    });

    let rejection = if !ephemeris.avoid_object(instant.mjd, candidate.ra, candidate.dec) {
        Some(Rejection::ObjectAvoidance)
    } else if moon.separation_deg <= min_moon_separation(candidate.obs_conditions, settings) {
        Some(Rejection::MoonTooClose)
    } else {
        None
    };

    Observability {
        observable: rejection.is_none(),
        lst_midpoint,
        moon: Some(moon),
        rejection,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deg(v: f64) -> Degrees {
        Degrees::new(v)
    }

    #[test]
    fn test_midpoint_adds_overhead_and_half_exposure() {
        // 120 s overhead = 0.5°, 1200 s exposure -> half is 2.5°
        let mid = exposure_midpoint_lst(deg(10.0), Seconds::new(120.0), Seconds::new(1200.0));
        assert!((mid.value() - 13.0).abs() < 1e-12);
    }

    #[test]
    fn test_midpoint_wraps_past_360() {
        let mid = exposure_midpoint_lst(deg(359.0), Seconds::new(240.0), Seconds::new(480.0));
        assert!((mid.value() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_literal_policy() {
        let policy = LstWindowPolicy::Literal;
        assert!(policy.contains(deg(15.0), deg(10.0), deg(20.0)));
        assert!(policy.contains(deg(10.0), deg(10.0), deg(20.0)));
        assert!(policy.contains(deg(20.0), deg(10.0), deg(20.0)));
        assert!(!policy.contains(deg(20.5), deg(10.0), deg(20.0)));
        // Inverted window never matches
        assert!(!policy.contains(deg(355.0), deg(350.0), deg(10.0)));
        assert!(!policy.contains(deg(5.0), deg(350.0), deg(10.0)));
    }

    #[test]
    fn test_wrap_around_policy() {
        let policy = LstWindowPolicy::WrapAround;
        assert!(policy.contains(deg(355.0), deg(350.0), deg(10.0)));
        assert!(policy.contains(deg(5.0), deg(350.0), deg(10.0)));
        assert!(!policy.contains(deg(180.0), deg(350.0), deg(10.0)));
        // Ordinary windows behave exactly like Literal
        assert!(policy.contains(deg(15.0), deg(10.0), deg(20.0)));
        assert!(!policy.contains(deg(25.0), deg(10.0), deg(20.0)));
    }

    #[test]
    fn test_bright_threshold_selection() {
        let settings = SelectionSettings {
            min_moon_sep: 50.0,
            min_moon_sep_bright: 35.0,
            ..Default::default()
        };
        assert_eq!(min_moon_separation(ObsConditions::BRIGHT, &settings), 35.0);
        assert_eq!(
            min_moon_separation(ObsConditions::DARK | ObsConditions::GRAY, &settings),
            50.0
        );
    }
}
