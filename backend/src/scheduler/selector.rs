//! Next-tile selection engine.
//!
//! A single deterministic pass over the nightly plan: for each candidate the
//! setup overhead is computed from the previous pointing, the observability
//! predicate is evaluated, and the first eligible tile that has not already
//! been observed wins. Nothing is mutated.

use qtty::{Degrees, Seconds};
use std::collections::BTreeSet;

use super::ephemeris::SkyEphemeris;
use super::overhead::compute_overhead;
use super::ranking::{candidate_merit, SelectionStrategy};
use super::window::{is_observable, ObservingInstant};
use crate::config::SchedulerConfig;
use crate::models::{
    HorizontalPosition, ModifiedJulianDate, ObservingPlan, Pointing, SelectedTile, TileId,
};

/// Per-decision inputs supplied by the observing loop.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionRequest<'a> {
    pub mjd: ModifiedJulianDate,
    /// Tiles to skip, normally `ProgressStore::get_observed`.
    pub observed: &'a BTreeSet<TileId>,
    /// Whether the telescope has to move before the next exposure.
    pub slew_required: bool,
    pub previous: Pointing,
    /// Moon alt/az already looked up by the caller for `mjd`.
    pub moon: HorizontalPosition,
}

/// Selection engine bound to a configuration and an ephemeris provider.
pub struct TileSelector<E> {
    config: SchedulerConfig,
    ephemeris: E,
}

impl<E: SkyEphemeris> TileSelector<E> {
    pub fn new(config: SchedulerConfig, ephemeris: E) -> Self {
        Self { config, ephemeris }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn ephemeris(&self) -> &E {
        &self.ephemeris
    }

    /// Local sidereal time at the configured site.
    pub fn local_sidereal_time(&self, mjd: ModifiedJulianDate) -> Degrees {
        mjd.local_sidereal_time(Degrees::new(self.config.site.longitude))
    }

    /// Pick the next tile to observe.
    ///
    /// Returns the chosen tile and the setup overhead needed to reach it, or
    /// `None` when no candidate is currently eligible. `None` is a normal
    /// outcome, not a failure.
    pub fn select_next_tile(
        &self,
        plan: &ObservingPlan,
        request: &SelectionRequest<'_>,
    ) -> Option<(SelectedTile, Seconds)> {
        let instant = ObservingInstant {
            mjd: request.mjd,
            lst: self.local_sidereal_time(request.mjd),
            prefetched_moon: request.moon,
        };
        let strategy = self.config.selection.strategy;

        log::debug!(
            "Selecting from {} candidates at MJD {} (LST {:.3} deg, {} observed, strategy {:?})",
            plan.len(),
            request.mjd,
            instant.lst.value(),
            request.observed.len(),
            strategy
        );

        let mut best: Option<(f64, SelectedTile, Seconds)> = None;

        for candidate in plan.iter() {
            let overhead = compute_overhead(
                request.previous,
                candidate.position(),
                request.slew_required,
                &self.config.overhead,
            );

            let observability = is_observable(
                candidate,
                &instant,
                overhead,
                &self.ephemeris,
                &self.config.selection,
            );

            if let Some(reason) = observability.rejection {
                log::trace!(
                    "Tile {} rejected: {:?} (midpoint LST {:.3}, window [{:.3}, {:.3}])",
                    candidate.tile_id,
                    reason,
                    observability.lst_midpoint.value(),
                    candidate.lst_min.value(),
                    candidate.lst_max.value()
                );
                continue;
            }

            if request.observed.contains(&candidate.tile_id) {
                log::trace!("Tile {} eligible but already observed", candidate.tile_id);
                continue;
            }

            let moon = observability.moon.unwrap_or_default();
            let selected =
                SelectedTile::from_candidate(candidate, plan.moon_illumination_fraction, moon);

            match strategy {
                SelectionStrategy::FirstEligible => {
                    log::info!(
                        "Selected tile {} (pass {}, {}) with overhead {:.1} s",
                        selected.tile_id,
                        selected.pass_number,
                        selected.program,
                        overhead.value()
                    );
                    return Some((selected, overhead));
                }
                SelectionStrategy::BestMerit => {
                    let score = candidate_merit(
                        candidate,
                        instant.lst.value(),
                        self.config.selection.window_resolution,
                    );
                    let better = best.as_ref().map_or(true, |(s, _, _)| score > *s);
                    if better {
                        best = Some((score, selected, overhead));
                    }
                }
            }
        }

        match best {
            Some((score, selected, overhead)) => {
                log::info!(
                    "Selected tile {} (pass {}, {}) with merit {:.3} and overhead {:.1} s",
                    selected.tile_id,
                    selected.pass_number,
                    selected.program,
                    score,
                    overhead.value()
                );
                Some((selected, overhead))
            }
            None => {
                log::info!("No eligible tile at MJD {}", request.mjd);
                None
            }
        }
    }
}
