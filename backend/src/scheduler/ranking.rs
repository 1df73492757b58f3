//! Candidate ranking.
//!
//! The default engine takes the first eligible tile in plan order.
//! [`merit`] scores a tile by planner priority and distance from its assigned
//! LST; it only drives selection under [`SelectionStrategy::BestMerit`].

use serde::{Deserialize, Serialize};

use crate::models::TileCandidate;

/// How the engine chooses among eligible, unobserved candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionStrategy {
    /// Stop at the first eligible candidate in plan order.
    #[default]
    FirstEligible,
    /// Evaluate every eligible candidate and keep the highest merit.
    /// Ties go to the earlier candidate.
    BestMerit,
}

/// Merit of a tile: `priority - ((assigned_lst - current_lst) / window_resolution)^2`.
pub fn merit(priority: f64, assigned_lst: f64, current_lst: f64, window_resolution: f64) -> f64 {
    let offset = (assigned_lst - current_lst) / window_resolution;
    priority - offset * offset
}

/// Merit of a plan candidate. A missing priority counts as 0 and a missing
/// assigned LST falls back to the centre of the tile's LST window.
pub fn candidate_merit(candidate: &TileCandidate, current_lst: f64, window_resolution: f64) -> f64 {
    let priority = candidate.priority.unwrap_or(0.0);
    let assigned = candidate
        .lst_assigned
        .unwrap_or_else(|| candidate.window_center().value());
    merit(priority, assigned, current_lst, window_resolution)
}
