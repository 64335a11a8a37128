use anyhow::Result;
use chrono::Utc;
use log::{info, warn};
use shared::Chore;
use std::sync::Arc;

use crate::domain::commands::chore::{
    CreateChoreCommand, CreateChoreResult, DeleteChoreResult, UpdateChoreCommand,
    UpdateChoreResult,
};
use crate::domain::models::validation::{
    validate_chore_name, validate_times_per_week, ChoreValidationError,
};
use crate::storage::csv::{AssignmentRepository, ChoreRepository, CsvConnection};
use crate::storage::traits::{AssignmentStorage, ChoreStorage};

/// Service for managing the chore catalog
#[derive(Clone)]
pub struct ChoreService {
    chore_repository: ChoreRepository,
    assignment_repository: AssignmentRepository,
}

impl ChoreService {
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        let chore_repository = ChoreRepository::new((*csv_conn).clone());
        let assignment_repository = AssignmentRepository::new((*csv_conn).clone());
        Self {
            chore_repository,
            assignment_repository,
        }
    }

    pub fn create_chore(&self, command: CreateChoreCommand) -> Result<CreateChoreResult> {
        info!(
            "Creating chore: name={}, times_per_week={}",
            command.name, command.times_per_week
        );

        // Validate the command
        validate_chore_name(&command.name)?;
        validate_times_per_week(command.times_per_week)?;
        let floor = normalize_floor(command.floor)?;

        // Generate timestamps and ID
        let now = Utc::now();
        let chore = Chore {
            id: Chore::generate_id(now.timestamp_millis() as u64),
            name: command.name.trim().to_string(),
            description: command.description.filter(|d| !d.trim().is_empty()),
            times_per_week: command.times_per_week,
            points: command.points,
            floor,
            created_at: now,
            updated_at: now,
        };

        // Store in database
        self.chore_repository.store_chore(&chore)?;
        info!("Created chore: {} with ID: {}", chore.name, chore.id);

        Ok(CreateChoreResult { chore })
    }

    pub fn get_chore(&self, chore_id: &str) -> Result<Option<Chore>> {
        let chore = self.chore_repository.get_chore(chore_id)?;
        if chore.is_none() {
            warn!("Chore not found: {}", chore_id);
        }
        Ok(chore)
    }

    /// All chores ordered by name
    pub fn list_chores(&self) -> Result<Vec<Chore>> {
        self.chore_repository.list_chores()
    }

    pub fn update_chore(&self, command: UpdateChoreCommand) -> Result<UpdateChoreResult> {
        info!("Updating chore: {}", command.chore_id);

        let mut chore = self
            .chore_repository
            .get_chore(&command.chore_id)?
            .ok_or_else(|| anyhow::anyhow!("Chore not found: {}", command.chore_id))?;

        // Apply only the fields the caller provided
        if let Some(name) = command.name {
            validate_chore_name(&name)?;
            chore.name = name.trim().to_string();
        }
        if let Some(description) = command.description {
            chore.description = description.filter(|d| !d.trim().is_empty());
        }
        if let Some(times_per_week) = command.times_per_week {
            validate_times_per_week(times_per_week)?;
            chore.times_per_week = times_per_week;
        }
        if let Some(points) = command.points {
            chore.points = points;
        }
        if let Some(floor) = command.floor {
            chore.floor = normalize_floor(floor)?;
        }

        // Update timestamp and save
        chore.updated_at = Utc::now();
        self.chore_repository.update_chore(&chore)?;
        info!("Updated chore: {} with ID: {}", chore.name, chore.id);

        Ok(UpdateChoreResult { chore })
    }

    /// Delete a chore together with every assignment that references it
    pub fn delete_chore(&self, chore_id: &str) -> Result<DeleteChoreResult> {
        info!("Deleting chore: {}", chore_id);

        let chore = self
            .chore_repository
            .get_chore(chore_id)?
            .ok_or_else(|| anyhow::anyhow!("Chore not found: {}", chore_id))?;

        // Assignments go first so none is left pointing at a missing chore
        let removed_assignments = self.assignment_repository.delete_assignments_for_chore(chore_id)?;
        self.chore_repository.delete_chore(chore_id)?;

        info!(
            "Deleted chore: {} and {} of its assignments",
            chore.name, removed_assignments
        );

        Ok(DeleteChoreResult {
            removed_assignments,
            success_message: format!("Chore '{}' deleted successfully", chore.name),
        })
    }
}

fn normalize_floor(floor: Option<String>) -> Result<Option<String>, ChoreValidationError> {
    match floor {
        Some(floor) if floor.trim().is_empty() => Err(ChoreValidationError::BlankFloor),
        Some(floor) => Ok(Some(floor.trim().to_string())),
        None => Ok(None),
    }
}
