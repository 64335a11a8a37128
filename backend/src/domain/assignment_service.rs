//! # Assignment Service
//!
//! Glue between stored data and the [`AssignmentEngine`]: reads a consistent snapshot of
//! the catalog, roster and assignment history, hands it to the engine, and writes back
//! whatever the engine produced. Also owns the completion and rating mutations.
//!
//! The service never recomputes points itself; callers refresh points after a mutation.

use anyhow::Result;
use chrono::NaiveDateTime;
use log::{debug, info, warn};
use rand::Rng;
use shared::{Assignment, Chore, WeekKey};
use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::assignment_engine::AssignmentEngine;
use crate::domain::commands::assignment::{
    EnsureWeekResult, RateAssignmentCommand, RateAssignmentResult,
};
use crate::domain::scoring_engine::add_rating;
use crate::storage::csv::{
    AssignmentRepository, ChoreRepository, CsvConnection, GlobalConfigRepository,
    GlobalConfigStorage, PersonRepository, RatingLedgerRepository,
};
use crate::storage::traits::{AssignmentStorage, ChoreStorage, PersonStorage, RatingLedgerStorage};

#[derive(Clone)]
pub struct AssignmentService {
    chore_repository: ChoreRepository,
    person_repository: PersonRepository,
    assignment_repository: AssignmentRepository,
    rating_ledger: RatingLedgerRepository,
    global_config_repository: GlobalConfigRepository,
}

impl AssignmentService {
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self {
            chore_repository: ChoreRepository::new((*csv_conn).clone()),
            person_repository: PersonRepository::new((*csv_conn).clone()),
            assignment_repository: AssignmentRepository::new((*csv_conn).clone()),
            rating_ledger: RatingLedgerRepository::new((*csv_conn).clone()),
            global_config_repository: GlobalConfigRepository::new((*csv_conn).clone()),
        }
    }

    fn engine(&self) -> Result<AssignmentEngine> {
        let config = self.global_config_repository.get_global_config()?;
        Ok(AssignmentEngine::new(config.engine.assignment))
    }

    /// Make sure the week containing `now` has assignments, generating them if needed.
    /// Nothing is written when the existing set for the week is reused.
    pub fn ensure_current_week<R: Rng>(&self, now: NaiveDateTime, rng: &mut R) -> Result<EnsureWeekResult> {
        let week = WeekKey::from_datetime(&now);
        info!("Ensuring assignments for {}", week);

        // Load a snapshot of catalog, roster and history
        let chores = self.chore_repository.list_chores()?;
        let people = self.person_repository.list_people()?;
        let existing = self.assignment_repository.list_assignments()?;
        let reused = existing.iter().any(|a| a.is_in_week(week));

        let assignments = self.engine()?.assign(&chores, &people, &existing, now, rng);

        // Only a freshly generated week needs storing
        if !reused {
            self.assignment_repository.store_assignments(&assignments)?;
        }

        Ok(EnsureWeekResult {
            week,
            assignments,
            generated: !reused,
        })
    }

    /// Throw away the current week's assignments and distribute the week again from scratch
    pub fn reassign_current_week<R: Rng>(&self, now: NaiveDateTime, rng: &mut R) -> Result<EnsureWeekResult> {
        let week = WeekKey::from_datetime(&now);
        info!("Reassigning chores for {}", week);

        let chores = self.chore_repository.list_chores()?;
        let people = self.person_repository.list_people()?;

        // No history passed in, so the engine always draws a fresh week
        let assignments = self.engine()?.assign(&chores, &people, &[], now, rng);

        // Swap the week in one write so a failure never leaves it empty
        let removed = self
            .assignment_repository
            .replace_week_assignments(week, &assignments)?;
        debug!("Reassignment dropped {} previous assignments", removed);

        Ok(EnsureWeekResult {
            week,
            assignments,
            generated: true,
        })
    }

    /// Flip completion; completing stamps `now`, reopening clears the stamp
    pub fn toggle_completion(&self, assignment_id: &str, now: NaiveDateTime) -> Result<Assignment> {
        let mut assignment = self.require_assignment(assignment_id)?;

        // Flip the flag and stamp or clear the completion time
        assignment.completed = !assignment.completed;
        assignment.completed_at = if assignment.completed { Some(now) } else { None };

        // Store in database
        self.assignment_repository.update_assignment(&assignment)?;

        info!(
            "Assignment {} marked {}",
            assignment.id,
            if assignment.completed { "complete" } else { "incomplete" }
        );
        Ok(assignment)
    }

    /// Add an anonymous peer rating to a completed assignment. Ratings on open assignments,
    /// out-of-range ratings and repeat ratings from this data directory leave the
    /// assignment untouched.
    pub fn rate_assignment(&self, command: RateAssignmentCommand) -> Result<RateAssignmentResult> {
        let mut assignment = self.require_assignment(&command.assignment_id)?;

        // Only finished work can be rated
        if !assignment.completed {
            warn!("Assignment {} is not completed yet, ignoring rating", assignment.id);
            return Ok(unchanged(assignment));
        }

        // One rating per assignment from this device
        if self.rating_ledger.has_rated(&assignment.id)? {
            warn!("Assignment {} was already rated from this device", assignment.id);
            return Ok(unchanged(assignment));
        }

        if !add_rating(&mut assignment, command.rating) {
            warn!(
                "Rejected rating {} for {}: must be between 1 and 5",
                command.rating, assignment.id
            );
            return Ok(unchanged(assignment));
        }

        // Store the rating, then remember that this device used its vote
        self.assignment_repository.update_assignment(&assignment)?;
        self.rating_ledger.record_rating(&assignment.id)?;
        info!("Recorded rating {} for {}", command.rating, assignment.id);

        Ok(RateAssignmentResult {
            average_rating: assignment.average_rating(),
            assignment,
            recorded: true,
        })
    }

    /// Every assignment ever given to a person
    pub fn assignments_for_person(&self, person_id: &str) -> Result<Vec<Assignment>> {
        Ok(self
            .assignment_repository
            .list_assignments()?
            .into_iter()
            .filter(|a| a.person_id == person_id)
            .collect())
    }

    /// Catalog chores that appear in any of the person's assignments
    pub fn chores_for_person(&self, person_id: &str) -> Result<Vec<Chore>> {
        let chore_ids: HashSet<String> = self
            .assignments_for_person(person_id)?
            .into_iter()
            .map(|a| a.chore_id)
            .collect();

        Ok(self
            .chore_repository
            .list_chores()?
            .into_iter()
            .filter(|c| chore_ids.contains(&c.id))
            .collect())
    }

    pub fn week_assignments(&self, now: NaiveDateTime) -> Result<Vec<Assignment>> {
        let week = WeekKey::from_datetime(&now);
        let mut assignments: Vec<Assignment> = self
            .assignment_repository
            .list_assignments()?
            .into_iter()
            .filter(|a| a.is_in_week(week))
            .collect();
        assignments.sort_by_key(|a| a.day_of_week);
        Ok(assignments)
    }

    fn require_assignment(&self, assignment_id: &str) -> Result<Assignment> {
        self.assignment_repository
            .get_assignment(assignment_id)?
            .ok_or_else(|| anyhow::anyhow!("Assignment not found: {}", assignment_id))
    }
}

fn unchanged(assignment: Assignment) -> RateAssignmentResult {
    RateAssignmentResult {
        average_rating: assignment.average_rating(),
        assignment,
        recorded: false,
    }
}
