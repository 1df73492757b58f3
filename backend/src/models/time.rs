use qtty::Degrees;
use serde::*;

/// Offset between Julian Date and Modified Julian Date.
pub const MJD_OFFSET: f64 = 2_400_000.5;

/// MJD of the J2000.0 epoch (2000-01-01 12:00 TT, taken as UT here).
pub const J2000_MJD: f64 = 51_544.5;

/// Seconds of time per degree of sidereal rotation (86400 s / 360°).
pub const SECONDS_PER_LST_DEGREE: f64 = 240.0;

/// Modified Julian Date representation.
/// MJD 0 = 1858-11-17 00:00:00 UTC
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModifiedJulianDate(qtty::Days);

impl ModifiedJulianDate {
    /// Create a new MJD value.
    pub fn new<V: Into<qtty::Days>>(v: V) -> Self {
        Self(v.into())
    }

    /// Raw MJD value as f64.
    pub fn value(&self) -> f64 {
        self.0.value()
    }

    /// Julian Date corresponding to this MJD.
    pub fn to_julian_date(&self) -> f64 {
        self.value() + MJD_OFFSET
    }

    /// Convert to Unix timestamp (seconds since 1970-01-01 00:00:00 UTC).
    pub fn to_unix_timestamp(&self) -> f64 {
        (self.value() - 40587.0) * 86400.0
    }

    /// Create from Unix timestamp (seconds since 1970-01-01 00:00:00 UTC).
    pub fn from_unix_timestamp(timestamp: f64) -> Self {
        Self::new(timestamp / 86400.0 + 40587.0)
    }

    /// Convert to chrono DateTime<Utc>.
    pub fn to_datetime(&self) -> chrono::DateTime<chrono::Utc> {
        let secs = self.to_unix_timestamp();
        let secs_i64 = secs.floor() as i64;
        let nanos = ((secs - secs.floor()) * 1e9) as u32;
        chrono::DateTime::from_timestamp(secs_i64, nanos)
            .unwrap_or(chrono::DateTime::UNIX_EPOCH)
    }

    /// Create from chrono DateTime<Utc>.
    pub fn from_datetime(dt: chrono::DateTime<chrono::Utc>) -> Self {
        Self::from_unix_timestamp(dt.timestamp() as f64 + dt.timestamp_subsec_nanos() as f64 / 1e9)
    }

    /// Greenwich mean sidereal time, wrapped into `[0, 360)` degrees.
    ///
    /// Uses the IAU 1982 expression (Meeus, *Astronomical Algorithms*, eq. 12.4),
    /// treating UTC as UT1. The sub-second difference is irrelevant at the
    /// LST-window resolution the scheduler works with.
    pub fn greenwich_sidereal_time(&self) -> Degrees {
        let days = self.value() - J2000_MJD;
        let t = days / 36_525.0;
        let gmst = 280.460_618_37 + 360.985_647_366_29 * days + 0.000_387_933 * t * t
            - t * t * t / 38_710_000.0;
        Degrees::new(gmst).wrap_pos()
    }

    /// Local sidereal time at a site with the given east-positive longitude.
    pub fn local_sidereal_time(&self, longitude: Degrees) -> Degrees {
        (self.greenwich_sidereal_time() + longitude).wrap_pos()
    }
}

impl From<f64> for ModifiedJulianDate {
    fn from(v: f64) -> Self {
        ModifiedJulianDate::new(v)
    }
}

impl std::fmt::Display for ModifiedJulianDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5}", self.value())
    }
}

/// Convert a duration in seconds of time into degrees of sidereal rotation.
pub fn seconds_to_lst_degrees(seconds: qtty::Seconds) -> Degrees {
    Degrees::new(seconds.value() / SECONDS_PER_LST_DEGREE)
}
