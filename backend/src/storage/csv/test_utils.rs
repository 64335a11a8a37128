/// Test utilities for automatic cleanup and consistent test infrastructure
///
/// Each environment owns a temporary data directory that is removed when it is
/// dropped, even if the test panics.

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use shared::{Assignment, Chore, Person, WeekKey};
use std::collections::BTreeMap;
use std::sync::Arc;
use tempfile::TempDir;

use super::connection::CsvConnection;
use super::{
    AssignmentRepository, ChoreRepository, GlobalConfigRepository, PersonRepository,
    PointsRepository, RatingLedgerRepository,
};

pub struct TestEnvironment {
    pub connection: CsvConnection,
    pub base_path: std::path::PathBuf,
    _temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let connection = CsvConnection::new(temp_dir.path())?;
        Ok(Self {
            connection,
            base_path: temp_dir.path().to_path_buf(),
            _temp_dir: temp_dir,
        })
    }

    pub fn shared_connection(&self) -> Arc<CsvConnection> {
        Arc::new(self.connection.clone())
    }
}

/// A test environment plus one instance of every repository
pub struct TestHelper {
    pub env: TestEnvironment,
    pub chore_repo: ChoreRepository,
    pub person_repo: PersonRepository,
    pub assignment_repo: AssignmentRepository,
    pub points_repo: PointsRepository,
    pub rating_ledger_repo: RatingLedgerRepository,
    pub global_config_repo: GlobalConfigRepository,
}

impl TestHelper {
    pub fn new() -> Result<Self> {
        let env = TestEnvironment::new()?;
        let connection = env.connection.clone();
        Ok(Self {
            chore_repo: ChoreRepository::new(connection.clone()),
            person_repo: PersonRepository::new(connection.clone()),
            assignment_repo: AssignmentRepository::new(connection.clone()),
            points_repo: PointsRepository::new(connection.clone()),
            rating_ledger_repo: RatingLedgerRepository::new(connection.clone()),
            global_config_repo: GlobalConfigRepository::new(connection),
            env,
        })
    }
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

pub fn sample_chore(id: &str, name: &str, times_per_week: u32, points: Option<u32>) -> Chore {
    Chore {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        times_per_week,
        points,
        floor: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn sample_person(id: &str, name: &str, floor: Option<&str>) -> Person {
    Person {
        id: id.to_string(),
        name: name.to_string(),
        floor: floor.map(str::to_string),
        day_preferences: BTreeMap::new(),
        is_admin: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn sample_assignment(id: &str, chore_id: &str, person_id: &str, week: WeekKey) -> Assignment {
    Assignment {
        id: id.to_string(),
        chore_id: chore_id.to_string(),
        person_id: person_id.to_string(),
        week_number: week.week_number,
        year: week.year,
        day_of_week: Some(1),
        points: 10,
        completed: false,
        completed_at: None,
        assigned_at: at(2024, 1, 29, 8, 0),
        ratings: Vec::new(),
    }
}
