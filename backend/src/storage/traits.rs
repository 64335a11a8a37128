//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.
//!
//! The engines never see these traits: services read a snapshot through them, hand
//! plain slices to the engines, and write the results back.

use anyhow::Result;
use shared::{Assignment, Chore, Person, PointsSnapshot, WeekKey};

/// Trait defining the interface for chore catalog storage operations
pub trait ChoreStorage: Send + Sync {
    /// Store a new chore
    fn store_chore(&self, chore: &Chore) -> Result<()>;

    /// Retrieve a specific chore by ID
    fn get_chore(&self, chore_id: &str) -> Result<Option<Chore>>;

    /// List all chores ordered by name
    fn list_chores(&self) -> Result<Vec<Chore>>;

    /// Update an existing chore
    fn update_chore(&self, chore: &Chore) -> Result<()>;

    /// Delete a chore by ID
    /// Returns true if the chore was found and deleted
    fn delete_chore(&self, chore_id: &str) -> Result<bool>;
}

/// Trait defining the interface for roster storage operations
pub trait PersonStorage: Send + Sync {
    fn store_person(&self, person: &Person) -> Result<()>;

    fn get_person(&self, person_id: &str) -> Result<Option<Person>>;

    /// List all people ordered by name
    fn list_people(&self) -> Result<Vec<Person>>;

    fn update_person(&self, person: &Person) -> Result<()>;

    /// Returns true if the person was found and deleted
    fn delete_person(&self, person_id: &str) -> Result<bool>;
}

/// Trait defining the interface for assignment storage operations
pub trait AssignmentStorage: Send + Sync {
    /// All assignments across every week, in stored order
    fn list_assignments(&self) -> Result<Vec<Assignment>>;

    fn get_assignment(&self, assignment_id: &str) -> Result<Option<Assignment>>;

    /// Insert or replace assignments by ID in a single write
    fn store_assignments(&self, assignments: &[Assignment]) -> Result<()>;

    /// Update an existing assignment; fails if it does not exist
    fn update_assignment(&self, assignment: &Assignment) -> Result<()>;

    /// Returns the number of assignments removed
    fn delete_assignments_for_chore(&self, chore_id: &str) -> Result<u32>;

    /// Returns the number of assignments removed
    fn delete_assignments_for_person(&self, person_id: &str) -> Result<u32>;

    /// Swap a week's assignments for a new set in a single write.
    /// Returns the number of assignments removed from that week.
    fn replace_week_assignments(&self, week: WeekKey, assignments: &[Assignment]) -> Result<u32>;
}

/// Trait defining the interface for derived point snapshot storage
pub trait PointsStorage: Send + Sync {
    fn list_points(&self) -> Result<Vec<PointsSnapshot>>;

    /// Replace all stored snapshots with a freshly computed set
    fn replace_points(&self, snapshots: &[PointsSnapshot]) -> Result<()>;

    fn delete_points_for_person(&self, person_id: &str) -> Result<u32>;
}

/// Device-local record of which assignments this device has already rated
pub trait RatingLedgerStorage: Send + Sync {
    fn has_rated(&self, assignment_id: &str) -> Result<bool>;

    fn record_rating(&self, assignment_id: &str) -> Result<()>;
}
