use anyhow::Result;
use chrono::Utc;
use log::{info, warn};
use shared::{day_name, is_valid_day_of_week, Person};
use std::sync::Arc;

use crate::domain::commands::person::{
    CreatePersonCommand, CreatePersonResult, DeletePersonResult, SetDayPreferenceCommand,
    UpdatePersonCommand, UpdatePersonResult,
};
use crate::domain::models::validation::{validate_person_name, PersonValidationError};
use crate::storage::csv::{AssignmentRepository, CsvConnection, PersonRepository, PointsRepository};
use crate::storage::traits::{AssignmentStorage, PersonStorage, PointsStorage};

/// Service for managing the household roster
#[derive(Clone)]
pub struct PersonService {
    person_repository: PersonRepository,
    assignment_repository: AssignmentRepository,
    points_repository: PointsRepository,
}

impl PersonService {
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self {
            person_repository: PersonRepository::new((*csv_conn).clone()),
            assignment_repository: AssignmentRepository::new((*csv_conn).clone()),
            points_repository: PointsRepository::new((*csv_conn).clone()),
        }
    }

    pub fn create_person(&self, command: CreatePersonCommand) -> Result<CreatePersonResult> {
        info!("Creating person: name={}", command.name);

        // Validate the command
        validate_person_name(&command.name)?;
        let floor = normalize_floor(command.floor)?;
        if let Some(&day) = command
            .day_preferences
            .keys()
            .find(|&&day| !is_valid_day_of_week(day))
        {
            return Err(PersonValidationError::InvalidDayOfWeek(day).into());
        }

        // Generate timestamps and ID
        let now = Utc::now();
        let person = Person {
            id: Person::generate_id(now.timestamp_millis() as u64),
            name: command.name.trim().to_string(),
            floor,
            day_preferences: command.day_preferences,
            is_admin: command.is_admin,
            created_at: now,
            updated_at: now,
        };

        // Store in database
        self.person_repository.store_person(&person)?;
        info!("Created person: {} with ID: {}", person.name, person.id);

        Ok(CreatePersonResult { person })
    }

    pub fn get_person(&self, person_id: &str) -> Result<Option<Person>> {
        let person = self.person_repository.get_person(person_id)?;
        if person.is_none() {
            warn!("Person not found: {}", person_id);
        }
        Ok(person)
    }

    pub fn list_people(&self) -> Result<Vec<Person>> {
        self.person_repository.list_people()
    }

    pub fn update_person(&self, command: UpdatePersonCommand) -> Result<UpdatePersonResult> {
        info!("Updating person: {}", command.person_id);

        let mut person = self.require_person(&command.person_id)?;

        // Apply only the fields the caller provided
        if let Some(name) = command.name {
            validate_person_name(&name)?;
            person.name = name.trim().to_string();
        }
        if let Some(floor) = command.floor {
            person.floor = normalize_floor(floor)?;
        }
        if let Some(is_admin) = command.is_admin {
            person.is_admin = is_admin;
        }

        // Update timestamp and save
        person.updated_at = Utc::now();
        self.person_repository.update_person(&person)?;

        Ok(UpdatePersonResult { person })
    }

    pub fn set_day_preference(&self, command: SetDayPreferenceCommand) -> Result<UpdatePersonResult> {
        if !is_valid_day_of_week(command.day_of_week) {
            return Err(PersonValidationError::InvalidDayOfWeek(command.day_of_week).into());
        }

        let mut person = self.require_person(&command.person_id)?;
        // `None` clears the day back to neutral
        match command.preference {
            Some(preference) => {
                info!(
                    "{} is now {:?} on {}",
                    person.name,
                    preference,
                    day_name(command.day_of_week)
                );
                person.day_preferences.insert(command.day_of_week, preference);
            }
            None => {
                info!(
                    "Cleared {}'s preference for {}",
                    person.name,
                    day_name(command.day_of_week)
                );
                person.day_preferences.remove(&command.day_of_week);
            }
        }

        person.updated_at = Utc::now();
        self.person_repository.update_person(&person)?;

        Ok(UpdatePersonResult { person })
    }

    /// Delete a person with their assignments and stored point snapshots
    pub fn delete_person(&self, person_id: &str) -> Result<DeletePersonResult> {
        info!("Deleting person: {}", person_id);

        let person = self.require_person(person_id)?;

        // Remove dependent rows before the person
        let removed_assignments = self.assignment_repository.delete_assignments_for_person(person_id)?;
        let removed_points = self.points_repository.delete_points_for_person(person_id)?;
        self.person_repository.delete_person(person_id)?;

        info!(
            "Deleted person: {} ({} assignments, {} point snapshots)",
            person.name, removed_assignments, removed_points
        );

        Ok(DeletePersonResult {
            removed_assignments,
            removed_points,
            success_message: format!("Person '{}' deleted successfully", person.name),
        })
    }

    fn require_person(&self, person_id: &str) -> Result<Person> {
        self.person_repository
            .get_person(person_id)?
            .ok_or_else(|| anyhow::anyhow!("Person not found: {}", person_id))
    }
}

fn normalize_floor(floor: Option<String>) -> Result<Option<String>, PersonValidationError> {
    match floor {
        Some(floor) if floor.trim().is_empty() => Err(PersonValidationError::BlankFloor),
        Some(floor) => Ok(Some(floor.trim().to_string())),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::{at, sample_assignment, TestEnvironment};
    use shared::{DayPreference, PointsSnapshot, WeekKey};
    use std::collections::BTreeMap;

    fn create_command(name: &str) -> CreatePersonCommand {
        CreatePersonCommand {
            name: name.to_string(),
            floor: None,
            day_preferences: BTreeMap::new(),
            is_admin: false,
        }
    }

    #[test]
    fn test_create_and_update_person() {
        let env = TestEnvironment::new().unwrap();
        let service = PersonService::new(env.shared_connection());

        let person = service.create_person(create_command(" Sam ")).unwrap().person;
        assert_eq!(person.name, "Sam");
        assert!(person.id.starts_with("person::"));

        let updated = service
            .update_person(UpdatePersonCommand {
                person_id: person.id.clone(),
                floor: Some(Some("upstairs".to_string())),
                is_admin: Some(true),
                ..Default::default()
            })
            .unwrap()
            .person;
        assert_eq!(updated.name, "Sam");
        assert_eq!(updated.floor.as_deref(), Some("upstairs"));
        assert!(updated.is_admin);
    }

    #[test]
    fn test_create_rejects_invalid_day_preference() {
        let env = TestEnvironment::new().unwrap();
        let service = PersonService::new(env.shared_connection());
        let mut command = create_command("Sam");
        command.day_preferences.insert(7, DayPreference::Preferred);

        let err = service.create_person(command).unwrap_err();
        assert_eq!(
            err.downcast_ref::<PersonValidationError>(),
            Some(&PersonValidationError::InvalidDayOfWeek(7))
        );
    }

    #[test]
    fn test_set_and_clear_day_preference() {
        let env = TestEnvironment::new().unwrap();
        let service = PersonService::new(env.shared_connection());
        let person = service.create_person(create_command("Sam")).unwrap().person;

        let command = |preference| SetDayPreferenceCommand {
            person_id: person.id.clone(),
            day_of_week: 0,
            preference,
        };

        let updated = service
            .set_day_preference(command(Some(DayPreference::Unavailable)))
            .unwrap()
            .person;
        assert_eq!(updated.preference_for(0), Some(DayPreference::Unavailable));

        let cleared = service.set_day_preference(command(None)).unwrap().person;
        assert_eq!(cleared.preference_for(0), None);

        let invalid = service.set_day_preference(SetDayPreferenceCommand {
            person_id: person.id.clone(),
            day_of_week: 9,
            preference: Some(DayPreference::Available),
        });
        assert!(invalid.is_err());
    }

    #[test]
    fn test_delete_person_cascades() {
        let env = TestEnvironment::new().unwrap();
        let service = PersonService::new(env.shared_connection());
        let assignments = AssignmentRepository::new(env.connection.clone());
        let points = PointsRepository::new(env.connection.clone());
        let sam = service.create_person(create_command("Sam")).unwrap().person;
        let kim = service.create_person(create_command("Kim")).unwrap().person;

        assignments
            .store_assignments(&[
                sample_assignment("a1", "chore::1", &sam.id, WeekKey::new(5, 2024)),
                sample_assignment("a2", "chore::1", &kim.id, WeekKey::new(5, 2024)),
            ])
            .unwrap();
        points
            .replace_points(&[PointsSnapshot {
                person_id: sam.id.clone(),
                week_number: 5,
                year: 2024,
                weekly_points: 10,
                yearly_points: 30,
                last_updated: at(2024, 1, 30, 9, 0),
            }])
            .unwrap();

        let result = service.delete_person(&sam.id).unwrap();

        assert_eq!(result.removed_assignments, 1);
        assert_eq!(result.removed_points, 1);
        assert_eq!(service.list_people().unwrap(), vec![kim]);
        assert!(points.list_points().unwrap().is_empty());
        assert!(service.delete_person(&sam.id).is_err());
    }
}
