//! # Chore Repository
//!
//! The chore catalog lives in a single `chores.yaml` list at the root of the data
//! directory. The file is small, so every operation reads and rewrites the whole list.

use anyhow::Result;
use log::{debug, info, warn};
use shared::Chore;

use super::connection::CsvConnection;
use crate::storage::traits::ChoreStorage;

#[derive(Clone)]
pub struct ChoreRepository {
    connection: CsvConnection,
}

impl ChoreRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn load_chores(&self) -> Result<Vec<Chore>> {
        self.connection
            .read_yaml_or_default(&self.connection.chores_file_path())
    }

    fn save_chores(&self, chores: &[Chore]) -> Result<()> {
        self.connection
            .write_yaml(&self.connection.chores_file_path(), chores)
    }
}

impl ChoreStorage for ChoreRepository {
    fn store_chore(&self, chore: &Chore) -> Result<()> {
        let mut chores = self.load_chores()?;
        if chores.iter().any(|c| c.id == chore.id) {
            return Err(anyhow::anyhow!("Chore already exists: {}", chore.id));
        }

        chores.push(chore.clone());
        self.save_chores(&chores)?;
        info!("Stored chore '{}' ({})", chore.name, chore.id);
        Ok(())
    }

    fn get_chore(&self, chore_id: &str) -> Result<Option<Chore>> {
        let chore = self.load_chores()?.into_iter().find(|c| c.id == chore_id);
        if chore.is_none() {
            debug!("Chore {} not found", chore_id);
        }
        Ok(chore)
    }

    fn list_chores(&self) -> Result<Vec<Chore>> {
        let mut chores = self.load_chores()?;
        chores.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(chores)
    }

    fn update_chore(&self, chore: &Chore) -> Result<()> {
        let mut chores = self.load_chores()?;
        let existing = chores
            .iter_mut()
            .find(|c| c.id == chore.id)
            .ok_or_else(|| anyhow::anyhow!("Chore not found: {}", chore.id))?;

        *existing = chore.clone();
        self.save_chores(&chores)?;
        debug!("Updated chore {}", chore.id);
        Ok(())
    }

    fn delete_chore(&self, chore_id: &str) -> Result<bool> {
        let mut chores = self.load_chores()?;
        let before = chores.len();
        chores.retain(|c| c.id != chore_id);

        if chores.len() == before {
            warn!("No chore found to delete: {}", chore_id);
            return Ok(false);
        }

        self.save_chores(&chores)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::{sample_chore, TestEnvironment};

    #[test]
    fn test_store_and_get_chore() {
        let env = TestEnvironment::new().unwrap();
        let repo = ChoreRepository::new(env.connection.clone());
        let chore = sample_chore("chore::1", "Dishes", 7, Some(10));

        repo.store_chore(&chore).unwrap();

        assert_eq!(repo.get_chore("chore::1").unwrap(), Some(chore));
        assert_eq!(repo.get_chore("chore::missing").unwrap(), None);
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let env = TestEnvironment::new().unwrap();
        let repo = ChoreRepository::new(env.connection.clone());
        let chore = sample_chore("chore::1", "Dishes", 7, Some(10));

        repo.store_chore(&chore).unwrap();
        assert!(repo.store_chore(&chore).is_err());
    }

    #[test]
    fn test_list_is_sorted_by_name() {
        let env = TestEnvironment::new().unwrap();
        let repo = ChoreRepository::new(env.connection.clone());
        repo.store_chore(&sample_chore("chore::1", "vacuum", 2, None)).unwrap();
        repo.store_chore(&sample_chore("chore::2", "Bins", 1, None)).unwrap();
        repo.store_chore(&sample_chore("chore::3", "dishes", 7, None)).unwrap();

        let names: Vec<String> = repo.list_chores().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Bins", "dishes", "vacuum"]);
    }

    #[test]
    fn test_update_and_delete() {
        let env = TestEnvironment::new().unwrap();
        let repo = ChoreRepository::new(env.connection.clone());
        let mut chore = sample_chore("chore::1", "Dishes", 7, Some(10));
        repo.store_chore(&chore).unwrap();

        chore.points = Some(25);
        chore.floor = Some("upstairs".to_string());
        repo.update_chore(&chore).unwrap();
        assert_eq!(repo.get_chore("chore::1").unwrap().unwrap().points, Some(25));

        assert!(repo.delete_chore("chore::1").unwrap());
        assert!(!repo.delete_chore("chore::1").unwrap());
        assert!(repo.list_chores().unwrap().is_empty());
    }

    #[test]
    fn test_update_missing_chore_fails() {
        let env = TestEnvironment::new().unwrap();
        let repo = ChoreRepository::new(env.connection.clone());
        let chore = sample_chore("chore::1", "Dishes", 7, Some(10));

        assert!(repo.update_chore(&chore).is_err());
    }
}
