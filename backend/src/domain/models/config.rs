//! Tunable knobs for the assignment and scoring engines.
//!
//! Persisted under the `engine` key of `global_config.yaml`. Every field has a serde
//! default so an older or partial file still loads with the standard household rules.

use serde::{Deserialize, Serialize};
use shared::DEFAULT_CHORE_POINTS;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub assignment: AssignmentWeights,
    #[serde(default)]
    pub scoring: ScoringPolicy,
}

/// Weights of the fairness score used to pick a person for an occurrence (lower wins)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentWeights {
    /// Cost of each task already given to a person in this run
    pub task_weight: f64,
    /// Multiplied by the chore's points when the person marked the day unavailable
    pub unavailable_factor: f64,
    /// Subtracted (times points) when the day is preferred
    pub preferred_factor: f64,
    /// Subtracted (times points) when the day is marked available
    pub available_factor: f64,
}

impl Default for AssignmentWeights {
    fn default() -> Self {
        Self {
            task_weight: 100.0,
            unavailable_factor: 2.0,
            preferred_factor: 0.3,
            available_factor: 0.1,
        }
    }
}

/// Where the scoring engine reads an assignment's base points from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointsSource {
    /// Current point value of the chore; edits to a chore change historical totals
    LiveChore,
    /// Points captured on the assignment when it was created
    Snapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    /// Base points used when the chore no longer exists
    pub fallback_points: u32,
    /// Average rating below which a penalty applies
    pub rating_threshold: f64,
    pub points_source: PointsSource,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            fallback_points: DEFAULT_CHORE_POINTS,
            rating_threshold: 3.0,
            points_source: PointsSource::LiveChore,
        }
    }
}
