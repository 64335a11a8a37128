//! # Scoring Engine
//!
//! Turns completed assignments into weekly and yearly point totals.
//!
//! Totals are always rebuilt from the full assignment list. Ratings can be appended to
//! old assignments at any time and must change the totals they already contributed to,
//! so nothing here is ever patched incrementally.
//!
//! ## Rating penalty
//!
//! When an assignment's average rating falls below the threshold (3 by default) the
//! penalty is `round((threshold - average) * base)`, and the assignment contributes
//! `max(0, base - penalty)`. A badly rated chore can therefore be worth nothing, but
//! never costs points.

use chrono::NaiveDateTime;
use log::{debug, info};
use shared::{Assignment, Chore, Person, PointsSnapshot, WeekKey};
use std::collections::HashMap;

use crate::domain::models::{PointsSource, ScoringPolicy};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    policy: ScoringPolicy,
}

impl ScoringEngine {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    /// Recompute every person's totals for the week and year containing `as_of`
    pub fn compute_points(
        &self,
        people: &[Person],
        chores: &[Chore],
        assignments: &[Assignment],
        as_of: NaiveDateTime,
    ) -> Vec<PointsSnapshot> {
        let week = WeekKey::from_datetime(&as_of);
        let chores_by_id: HashMap<&str, &Chore> =
            chores.iter().map(|c| (c.id.as_str(), c)).collect();

        let snapshots: Vec<PointsSnapshot> = people
            .iter()
            .map(|person| {
                let mut weekly_points = 0;
                let mut yearly_points = 0;

                for assignment in assignments
                    .iter()
                    .filter(|a| a.person_id == person.id && a.completed && a.year == week.year)
                {
                    let earned = self.net_points(assignment, &chores_by_id);
                    yearly_points += earned;
                    if assignment.week_number == week.week_number {
                        weekly_points += earned;
                    }
                }

                debug!(
                    "{}: {} weekly / {} yearly points for {}",
                    person.name, weekly_points, yearly_points, week
                );

                PointsSnapshot {
                    person_id: person.id.clone(),
                    week_number: week.week_number,
                    year: week.year,
                    weekly_points,
                    yearly_points,
                    last_updated: as_of,
                }
            })
            .collect();

        info!("Recomputed points for {} people ({})", snapshots.len(), week);
        snapshots
    }

    /// Base points of an assignment before any rating penalty
    pub fn base_points(&self, assignment: &Assignment, chores_by_id: &HashMap<&str, &Chore>) -> u32 {
        let chore_points = chores_by_id
            .get(assignment.chore_id.as_str())
            .map(|chore| chore.points_or_default());

        match self.policy.points_source {
            PointsSource::LiveChore => chore_points.unwrap_or(self.policy.fallback_points),
            PointsSource::Snapshot => assignment.points,
        }
    }

    /// Points deducted for poor ratings, zero when unrated or rated at/above the threshold
    pub fn rating_penalty(&self, assignment: &Assignment, base: u32) -> u32 {
        match assignment.average_rating() {
            Some(average) if average < self.policy.rating_threshold => {
                ((self.policy.rating_threshold - average) * base as f64).round() as u32
            }
            _ => 0,
        }
    }

    /// What a completed assignment is worth after ratings
    pub fn net_points(&self, assignment: &Assignment, chores_by_id: &HashMap<&str, &Chore>) -> u32 {
        let base = self.base_points(assignment, chores_by_id);
        base.saturating_sub(self.rating_penalty(assignment, base))
    }
}

/// Append a peer rating. Ratings outside 1-5 are ignored; returns whether it was recorded.
pub fn add_rating(assignment: &mut Assignment, rating: u8) -> bool {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        debug!("Ignoring out-of-range rating {} for {}", rating, assignment.id);
        return false;
    }

    assignment.ratings.push(rating);
    true
}
