//! # Person Repository
//!
//! The household roster, stored as a `people.yaml` list. Day preferences are kept as
//! a map from day index to preference so the file stays readable:
//!
//! ```yaml
//! - id: person::1718000000000_1a2b3c4d
//!   name: Sam
//!   floor: upstairs
//!   day_preferences:
//!     0: unavailable
//!     3: preferred
//! ```

use anyhow::Result;
use log::{debug, info, warn};
use shared::Person;

use super::connection::CsvConnection;
use crate::storage::traits::PersonStorage;

#[derive(Clone)]
pub struct PersonRepository {
    connection: CsvConnection,
}

impl PersonRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn load_people(&self) -> Result<Vec<Person>> {
        self.connection
            .read_yaml_or_default(&self.connection.people_file_path())
    }

    fn save_people(&self, people: &[Person]) -> Result<()> {
        self.connection
            .write_yaml(&self.connection.people_file_path(), people)
    }
}

impl PersonStorage for PersonRepository {
    fn store_person(&self, person: &Person) -> Result<()> {
        let mut people = self.load_people()?;
        if people.iter().any(|p| p.id == person.id) {
            return Err(anyhow::anyhow!("Person already exists: {}", person.id));
        }

        people.push(person.clone());
        self.save_people(&people)?;
        info!("Stored person '{}' ({})", person.name, person.id);
        Ok(())
    }

    fn get_person(&self, person_id: &str) -> Result<Option<Person>> {
        Ok(self.load_people()?.into_iter().find(|p| p.id == person_id))
    }

    fn list_people(&self) -> Result<Vec<Person>> {
        let mut people = self.load_people()?;
        people.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(people)
    }

    fn update_person(&self, person: &Person) -> Result<()> {
        let mut people = self.load_people()?;
        let existing = people
            .iter_mut()
            .find(|p| p.id == person.id)
            .ok_or_else(|| anyhow::anyhow!("Person not found: {}", person.id))?;

        *existing = person.clone();
        self.save_people(&people)?;
        debug!("Updated person {}", person.id);
        Ok(())
    }

    fn delete_person(&self, person_id: &str) -> Result<bool> {
        let mut people = self.load_people()?;
        let before = people.len();
        people.retain(|p| p.id != person_id);

        if people.len() == before {
            warn!("No person found to delete: {}", person_id);
            return Ok(false);
        }

        self.save_people(&people)?;
        Ok(true)
    }
}
