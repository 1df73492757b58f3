//! Telescope setup-time model (focus plus slew).
//!
//! Readout is assumed to overlap the slew, so only focus and slew count.

use qtty::{Degrees, Seconds};

use crate::config::OverheadConfig;
use crate::models::Pointing;

/// Shortest-path RA difference in degrees, always in `[0, 180]`.
pub fn ra_delta(a: Degrees, b: Degrees) -> Degrees {
    a.abs_separation(b)
}

/// Setup time before an exposure of `candidate` can start, given the
/// telescope was last pointed at `previous`.
///
/// The slew term is driven by the larger of the RA and Dec offsets; the
/// result is never below `config.min_overhead`.
pub fn compute_overhead(
    previous: Pointing,
    candidate: Pointing,
    slew_required: bool,
    config: &OverheadConfig,
) -> Seconds {
    let slew_time = if slew_required {
        let d_ra = ra_delta(candidate.ra, previous.ra).value();
        let d_dec = (candidate.dec.value() - previous.dec.value()).abs();
        config.slew_settle_time + d_ra.max(d_dec) / config.slew_rate
    } else {
        0.0
    };

    Seconds::new((config.focus_time + slew_time).max(config.min_overhead))
}
