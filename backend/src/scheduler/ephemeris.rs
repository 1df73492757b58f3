//! Interface to the sky ephemeris provider.
//!
//! The selection engine never computes Moon or planet positions itself; it
//! asks a [`SkyEphemeris`] implementation. [`PrefetchedMoon`] is a lightweight
//! implementation that works from a Moon alt/az the caller already looked up
//! for the current decision.

use qtty::Degrees;

use crate::models::{HorizontalPosition, ModifiedJulianDate, MoonLocation, Pointing};

/// Everything an ephemeris may need to place the Moon relative to a tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyQuery {
    pub mjd: ModifiedJulianDate,
    /// Local sidereal time at `mjd`.
    pub lst: Degrees,
    pub target: Pointing,
    /// Moon horizontal position supplied by the caller for this decision.
    pub prefetched_moon: HorizontalPosition,
}

/// Source of Moon positions and transient exclusion zones.
pub trait SkyEphemeris {
    /// Moon separation from the query target, with the Moon's alt/az.
    fn moon_location(&self, query: &SkyQuery) -> MoonLocation;

    /// False when `(ra, dec)` is too close to a planet or other excluded object.
    fn avoid_object(&self, mjd: ModifiedJulianDate, ra: Degrees, dec: Degrees) -> bool;
}

impl<E: SkyEphemeris + ?Sized> SkyEphemeris for &E {
    fn moon_location(&self, query: &SkyQuery) -> MoonLocation {
        (**self).moon_location(query)
    }

    fn avoid_object(&self, mjd: ModifiedJulianDate, ra: Degrees, dec: Degrees) -> bool {
        (**self).avoid_object(mjd, ra, dec)
    }
}

/// Ephemeris built on the caller's pre-fetched Moon alt/az.
///
/// The target's alt/az is derived from the LST and site latitude and the
/// separation is the great-circle distance on the horizontal sphere. No
/// objects are avoided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrefetchedMoon {
    pub latitude: Degrees,
}

impl PrefetchedMoon {
    pub fn new(latitude: f64) -> Self {
        Self {
            latitude: Degrees::new(latitude),
        }
    }
}

impl SkyEphemeris for PrefetchedMoon {
    fn moon_location(&self, query: &SkyQuery) -> MoonLocation {
        let target = equatorial_to_horizontal(query.target, query.lst, self.latitude);
        let moon = query.prefetched_moon;
        MoonLocation {
            separation_deg: horizontal_separation(target, moon),
            alt_deg: moon.alt,
            az_deg: moon.az,
        }
    }

    fn avoid_object(&self, _mjd: ModifiedJulianDate, _ra: Degrees, _dec: Degrees) -> bool {
        true
    }
}

/// Alt/az of an equatorial position. Azimuth is measured from north through east.
pub fn equatorial_to_horizontal(
    target: Pointing,
    lst: Degrees,
    latitude: Degrees,
) -> HorizontalPosition {
    let hour_angle = (lst - target.ra).value().to_radians();
    let dec = target.dec.value().to_radians();
    let lat = latitude.value().to_radians();

    let sin_alt = dec.sin() * lat.sin() + dec.cos() * lat.cos() * hour_angle.cos();
    let alt = sin_alt.clamp(-1.0, 1.0).asin();

    let y = -dec.cos() * hour_angle.sin();
    let x = dec.sin() * lat.cos() - dec.cos() * lat.sin() * hour_angle.cos();
    let az = Degrees::new(y.atan2(x).to_degrees()).wrap_pos();

    HorizontalPosition::new(alt.to_degrees(), az.value())
}

/// Great-circle distance in degrees between two horizontal positions (haversine form).
pub fn horizontal_separation(a: HorizontalPosition, b: HorizontalPosition) -> f64 {
    let (alt1, az1) = (a.alt.to_radians(), a.az.to_radians());
    let (alt2, az2) = (b.alt.to_radians(), b.az.to_radians());
    let h = (0.5 * (alt1 - alt2)).sin().powi(2)
        + alt1.cos() * alt2.cos() * (0.5 * (az1 - az2)).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin().to_degrees()
}
