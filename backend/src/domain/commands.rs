//! Domain-level command and query types used by the services.
//! A front end maps its own input into these before calling a service.

pub mod chore {
    use shared::Chore;

    /// Input for creating a new chore.
    #[derive(Debug, Clone)]
    pub struct CreateChoreCommand {
        pub name: String,
        pub description: Option<String>,
        pub times_per_week: u32,
        pub points: Option<u32>,
        pub floor: Option<String>,
    }

    /// Partial update; `None` leaves a field untouched. The nested options clear a
    /// value when set to `Some(None)`.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateChoreCommand {
        pub chore_id: String,
        pub name: Option<String>,
        pub description: Option<Option<String>>,
        pub times_per_week: Option<u32>,
        pub points: Option<Option<u32>>,
        pub floor: Option<Option<String>>,
    }

    #[derive(Debug, Clone)]
    pub struct CreateChoreResult {
        pub chore: Chore,
    }

    #[derive(Debug, Clone)]
    pub struct UpdateChoreResult {
        pub chore: Chore,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteChoreResult {
        pub removed_assignments: u32,
        pub success_message: String,
    }
}

pub mod person {
    use shared::{DayPreference, Person};
    use std::collections::BTreeMap;

    #[derive(Debug, Clone)]
    pub struct CreatePersonCommand {
        pub name: String,
        pub floor: Option<String>,
        pub day_preferences: BTreeMap<u8, DayPreference>,
        pub is_admin: bool,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdatePersonCommand {
        pub person_id: String,
        pub name: Option<String>,
        pub floor: Option<Option<String>>,
        pub is_admin: Option<bool>,
    }

    /// Set or clear (`preference: None`) the preference for one day.
    #[derive(Debug, Clone)]
    pub struct SetDayPreferenceCommand {
        pub person_id: String,
        pub day_of_week: u8,
        pub preference: Option<DayPreference>,
    }

    #[derive(Debug, Clone)]
    pub struct CreatePersonResult {
        pub person: Person,
    }

    #[derive(Debug, Clone)]
    pub struct UpdatePersonResult {
        pub person: Person,
    }

    #[derive(Debug, Clone)]
    pub struct DeletePersonResult {
        pub removed_assignments: u32,
        pub removed_points: u32,
        pub success_message: String,
    }
}

pub mod assignment {
    use shared::{Assignment, WeekKey};

    /// Outcome of making sure the current week has assignments.
    #[derive(Debug, Clone)]
    pub struct EnsureWeekResult {
        pub week: WeekKey,
        pub assignments: Vec<Assignment>,
        /// False when an existing set for the week was reused
        pub generated: bool,
    }

    #[derive(Debug, Clone)]
    pub struct RateAssignmentCommand {
        pub assignment_id: String,
        pub rating: u8,
    }

    /// `recorded` is false when the rating was out of range or this device had
    /// already rated the assignment; the assignment is then unchanged.
    #[derive(Debug, Clone)]
    pub struct RateAssignmentResult {
        pub assignment: Assignment,
        pub recorded: bool,
        pub average_rating: Option<f64>,
    }
}

pub mod points {
    use shared::{Assignment, PersonPoints};

    /// One of a person's assignments with the chore name resolved.
    #[derive(Debug, Clone, PartialEq)]
    pub struct AssignmentSummary {
        pub assignment: Assignment,
        pub chore_name: String,
    }

    /// Admin statistics for one person in the current week.
    #[derive(Debug, Clone, PartialEq)]
    pub struct PersonStats {
        pub person_id: String,
        pub name: String,
        pub points: PersonPoints,
        pub assigned: u32,
        pub completed: u32,
        /// Whole percent, 0 when nothing was assigned
        pub completion_rate: u32,
        pub assignments: Vec<AssignmentSummary>,
    }
}
