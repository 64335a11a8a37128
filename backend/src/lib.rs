//! # Chore Rota Backend
//!
//! Weekly chore distribution and points accounting for a shared household.
//!
//! All operations are synchronous and file-backed. The [`Backend`] struct wires every
//! service to one data directory; front ends (the `chore-rota` binary, a scheduler) talk
//! to it rather than to storage directly.

use anyhow::Result;
use chrono::NaiveDateTime;
use rand::Rng;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod domain;
pub mod storage;

pub use storage::csv::CsvConnection;

use domain::commands::assignment::{RateAssignmentCommand, RateAssignmentResult};
use shared::Assignment;

/// Main backend struct that orchestrates all services
pub struct Backend {
    pub chore_service: domain::ChoreService,
    pub person_service: domain::PersonService,
    pub assignment_service: domain::AssignmentService,
    pub points_service: domain::PointsService,
    pub weekly_reset_service: domain::WeeklyResetService,
    data_directory: PathBuf,
}

impl Backend {
    /// Open the backend on an explicit data directory, or the default one when `None`
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let csv_conn = match data_dir {
            Some(dir) => CsvConnection::new(dir)?,
            None => CsvConnection::new_default()?,
        };
        Ok(Self::from_connection(Arc::new(csv_conn)))
    }

    pub fn from_connection(csv_conn: Arc<CsvConnection>) -> Self {
        let chore_service = domain::ChoreService::new(csv_conn.clone());
        let person_service = domain::PersonService::new(csv_conn.clone());
        let assignment_service = domain::AssignmentService::new(csv_conn.clone());
        let points_service = domain::PointsService::new(csv_conn.clone());
        let weekly_reset_service = domain::WeeklyResetService::new(
            csv_conn.clone(),
            assignment_service.clone(),
            points_service.clone(),
        );

        Backend {
            chore_service,
            person_service,
            assignment_service,
            points_service,
            weekly_reset_service,
            data_directory: csv_conn.base_directory().to_path_buf(),
        }
    }

    pub fn data_directory(&self) -> &Path {
        &self.data_directory
    }

    /// Toggle completion and recompute points so totals reflect the change
    pub fn toggle_completion(&self, assignment_id: &str, now: NaiveDateTime) -> Result<Assignment> {
        let assignment = self.assignment_service.toggle_completion(assignment_id, now)?;
        self.points_service.refresh_points(now)?;
        Ok(assignment)
    }

    /// Rate an assignment and recompute points when the rating was accepted
    pub fn rate_assignment(
        &self,
        command: RateAssignmentCommand,
        now: NaiveDateTime,
    ) -> Result<RateAssignmentResult> {
        let result = self.assignment_service.rate_assignment(command)?;
        if result.recorded {
            self.points_service.refresh_points(now)?;
        }
        Ok(result)
    }

    /// Weekly rollover followed by making sure the current week is populated
    pub fn rollover<R: Rng>(&self, now: NaiveDateTime, rng: &mut R) -> Result<domain::ResetOutcome> {
        let outcome = self.weekly_reset_service.run_if_due(now, rng)?;
        let ensured = self.assignment_service.ensure_current_week(now, rng)?;
        if ensured.generated {
            self.points_service.refresh_points(now)?;
        }
        Ok(outcome)
    }
}
