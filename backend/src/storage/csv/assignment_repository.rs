//! # Assignment Repository
//!
//! Every assignment from every week lives in one `assignments.csv` file:
//!
//! ```csv
//! id,chore_id,person_id,week_number,year,day_of_week,points,completed,completed_at,assigned_at,ratings
//! assignment::chore::1::person::2::5::1706515200000_9f3a1c2b,chore::1,person::2,5,2024,1,10,true,2024-01-29T18:02:11,2024-01-29T08:00:00,4;5
//! ```
//!
//! Timestamps are local wall-clock times without an offset. Ratings are `;`-joined
//! so the row keeps a fixed column count.

use anyhow::{Context, Result};
use ::csv::{Reader, StringRecord, Writer};
use chrono::NaiveDateTime;
use log::{debug, info};
use shared::{Assignment, WeekKey};
use std::collections::HashMap;

use super::connection::CsvConnection;
use crate::storage::traits::AssignmentStorage;

const HEADER: [&str; 11] = [
    "id",
    "chore_id",
    "person_id",
    "week_number",
    "year",
    "day_of_week",
    "points",
    "completed",
    "completed_at",
    "assigned_at",
    "ratings",
];

pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

#[derive(Clone)]
pub struct AssignmentRepository {
    connection: CsvConnection,
}

impl AssignmentRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_assignments(&self) -> Result<Vec<Assignment>> {
        let file_path = self.connection.assignments_file_path();
        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let mut csv_reader = Reader::from_path(&file_path)
            .with_context(|| format!("Failed to open {}", file_path.display()))?;

        let mut assignments = Vec::new();
        for (index, result) in csv_reader.records().enumerate() {
            let record = result?;
            let assignment = parse_record(&record)
                .with_context(|| format!("Invalid assignment on data row {}", index + 1))?;
            assignments.push(assignment);
        }

        debug!("Read {} assignments from {}", assignments.len(), file_path.display());
        Ok(assignments)
    }

    fn write_assignments(&self, assignments: &[Assignment]) -> Result<()> {
        let mut csv_writer = Writer::from_writer(Vec::new());
        csv_writer.write_record(HEADER)?;

        for assignment in assignments {
            let ratings = assignment
                .ratings
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(";");

            csv_writer.write_record([
                assignment.id.clone(),
                assignment.chore_id.clone(),
                assignment.person_id.clone(),
                assignment.week_number.to_string(),
                assignment.year.to_string(),
                assignment.day_of_week.map(|d| d.to_string()).unwrap_or_default(),
                assignment.points.to_string(),
                assignment.completed.to_string(),
                assignment
                    .completed_at
                    .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
                    .unwrap_or_default(),
                assignment.assigned_at.format(TIMESTAMP_FORMAT).to_string(),
                ratings,
            ])?;
        }

        let contents = csv_writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush assignments: {}", e))?;
        self.connection
            .write_atomically(&self.connection.assignments_file_path(), &contents)
    }
}

fn field<'a>(record: &'a StringRecord, index: usize) -> Result<&'a str> {
    record
        .get(index)
        .ok_or_else(|| anyhow::anyhow!("Missing column '{}'", HEADER[index]))
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .with_context(|| format!("Invalid timestamp '{}'", value))
}

fn parse_record(record: &StringRecord) -> Result<Assignment> {
    let day_of_week = match field(record, 5)? {
        "" => None,
        day => Some(day.parse::<u8>()?),
    };
    let completed_at = match field(record, 8)? {
        "" => None,
        at => Some(parse_timestamp(at)?),
    };
    let ratings = field(record, 10)?
        .split(';')
        .filter(|r| !r.is_empty())
        .map(|r| r.parse::<u8>())
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(Assignment {
        id: field(record, 0)?.to_string(),
        chore_id: field(record, 1)?.to_string(),
        person_id: field(record, 2)?.to_string(),
        week_number: field(record, 3)?.parse()?,
        year: field(record, 4)?.parse()?,
        day_of_week,
        points: field(record, 6)?.parse()?,
        completed: field(record, 7)?.parse()?,
        completed_at,
        assigned_at: parse_timestamp(field(record, 9)?)?,
        ratings,
    })
}

impl AssignmentStorage for AssignmentRepository {
    fn list_assignments(&self) -> Result<Vec<Assignment>> {
        self.read_assignments()
    }

    fn get_assignment(&self, assignment_id: &str) -> Result<Option<Assignment>> {
        Ok(self
            .read_assignments()?
            .into_iter()
            .find(|a| a.id == assignment_id))
    }

    fn store_assignments(&self, assignments: &[Assignment]) -> Result<()> {
        if assignments.is_empty() {
            return Ok(());
        }

        let mut existing = self.read_assignments()?;
        let positions: HashMap<String, usize> = existing
            .iter()
            .enumerate()
            .map(|(i, a)| (a.id.clone(), i))
            .collect();

        let mut inserted = 0;
        for assignment in assignments {
            match positions.get(&assignment.id) {
                Some(&i) => existing[i] = assignment.clone(),
                None => {
                    existing.push(assignment.clone());
                    inserted += 1;
                }
            }
        }

        self.write_assignments(&existing)?;
        info!(
            "Stored {} assignments ({} new)",
            assignments.len(),
            inserted
        );
        Ok(())
    }

    fn update_assignment(&self, assignment: &Assignment) -> Result<()> {
        let mut assignments = self.read_assignments()?;
        let existing = assignments
            .iter_mut()
            .find(|a| a.id == assignment.id)
            .ok_or_else(|| anyhow::anyhow!("Assignment not found: {}", assignment.id))?;

        *existing = assignment.clone();
        self.write_assignments(&assignments)
    }

    fn delete_assignments_for_chore(&self, chore_id: &str) -> Result<u32> {
        self.delete_where(|a| a.chore_id == chore_id)
    }

    fn delete_assignments_for_person(&self, person_id: &str) -> Result<u32> {
        self.delete_where(|a| a.person_id == person_id)
    }

    fn replace_week_assignments(&self, week: WeekKey, assignments: &[Assignment]) -> Result<u32> {
        let mut kept = self.read_assignments()?;
        let before = kept.len();
        kept.retain(|a| !a.is_in_week(week));
        let removed = (before - kept.len()) as u32;

        kept.extend(assignments.iter().cloned());
        self.write_assignments(&kept)?;

        info!(
            "Replaced {} assignments with {} for {}",
            removed,
            assignments.len(),
            week
        );
        Ok(removed)
    }
}

impl AssignmentRepository {
    fn delete_where<F>(&self, predicate: F) -> Result<u32>
    where
        F: Fn(&Assignment) -> bool,
    {
        let mut assignments = self.read_assignments()?;
        let before = assignments.len();
        assignments.retain(|a| !predicate(a));
        let removed = (before - assignments.len()) as u32;

        if removed == 0 {
            debug!("No assignments matched for deletion");
            return Ok(0);
        }

        self.write_assignments(&assignments)?;
        Ok(removed)
    }
}
