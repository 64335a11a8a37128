use anyhow::{Context, Result};
use ::csv::{Reader, Writer};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use shared::PointsSnapshot;

use super::assignment_repository::TIMESTAMP_FORMAT;
use super::connection::CsvConnection;
use crate::storage::traits::PointsStorage;

/// Flat row as written to `points.csv`
#[derive(Debug, Serialize, Deserialize)]
struct PointsRow {
    person_id: String,
    week_number: u32,
    year: i32,
    weekly_points: u32,
    yearly_points: u32,
    last_updated: String,
}

impl From<&PointsSnapshot> for PointsRow {
    fn from(snapshot: &PointsSnapshot) -> Self {
        Self {
            person_id: snapshot.person_id.clone(),
            week_number: snapshot.week_number,
            year: snapshot.year,
            weekly_points: snapshot.weekly_points,
            yearly_points: snapshot.yearly_points,
            last_updated: snapshot.last_updated.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

impl TryFrom<PointsRow> for PointsSnapshot {
    type Error = anyhow::Error;

    fn try_from(row: PointsRow) -> Result<Self> {
        let last_updated = chrono::NaiveDateTime::parse_from_str(&row.last_updated, TIMESTAMP_FORMAT)
            .with_context(|| format!("Invalid last_updated '{}'", row.last_updated))?;
        Ok(Self {
            person_id: row.person_id,
            week_number: row.week_number,
            year: row.year,
            weekly_points: row.weekly_points,
            yearly_points: row.yearly_points,
            last_updated,
        })
    }
}

/// Derived point snapshots; the whole file is rewritten on every refresh
#[derive(Clone)]
pub struct PointsRepository {
    connection: CsvConnection,
}

impl PointsRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn write_rows(&self, snapshots: &[PointsSnapshot]) -> Result<()> {
        let mut csv_writer = Writer::from_writer(Vec::new());
        for snapshot in snapshots {
            csv_writer.serialize(PointsRow::from(snapshot))?;
        }
        let contents = csv_writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush points: {}", e))?;
        self.connection
            .write_atomically(&self.connection.points_file_path(), &contents)
    }
}

impl PointsStorage for PointsRepository {
    fn list_points(&self) -> Result<Vec<PointsSnapshot>> {
        let file_path = self.connection.points_file_path();
        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let mut csv_reader = Reader::from_path(&file_path)?;
        let mut snapshots = Vec::new();
        for result in csv_reader.deserialize::<PointsRow>() {
            snapshots.push(PointsSnapshot::try_from(result?)?);
        }
        Ok(snapshots)
    }

    fn replace_points(&self, snapshots: &[PointsSnapshot]) -> Result<()> {
        self.write_rows(snapshots)?;
        info!("Replaced points with {} snapshots", snapshots.len());
        Ok(())
    }

    fn delete_points_for_person(&self, person_id: &str) -> Result<u32> {
        let mut snapshots = self.list_points()?;
        let before = snapshots.len();
        snapshots.retain(|s| s.person_id != person_id);
        let removed = (before - snapshots.len()) as u32;

        if removed > 0 {
            self.write_rows(&snapshots)?;
        }
        debug!("Removed {} point snapshots for {}", removed, person_id);
        Ok(removed)
    }
}
