use anyhow::Result;
use log::debug;
use std::collections::BTreeSet;

use super::connection::CsvConnection;
use crate::storage::traits::RatingLedgerStorage;

/// Remembers which assignments have been rated from this data directory.
/// Ratings themselves stay anonymous on the assignment; only the IDs live here.
#[derive(Clone)]
pub struct RatingLedgerRepository {
    connection: CsvConnection,
}

impl RatingLedgerRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn load(&self) -> Result<BTreeSet<String>> {
        self.connection
            .read_yaml_or_default(&self.connection.rating_ledger_file_path())
    }
}

impl RatingLedgerStorage for RatingLedgerRepository {
    fn has_rated(&self, assignment_id: &str) -> Result<bool> {
        Ok(self.load()?.contains(assignment_id))
    }

    fn record_rating(&self, assignment_id: &str) -> Result<()> {
        let mut rated = self.load()?;
        if rated.insert(assignment_id.to_string()) {
            self.connection
                .write_yaml(&self.connection.rating_ledger_file_path(), &rated)?;
            debug!("Recorded rating for {}", assignment_id);
        }
        Ok(())
    }
}
