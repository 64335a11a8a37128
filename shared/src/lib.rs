use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Points awarded for a chore that has no explicit point value
pub const DEFAULT_CHORE_POINTS: u32 = 10;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// A recurring household task definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chore {
    /// Chore ID in format: "chore::epoch_millis_nonce"
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// How many occurrences to schedule per week (at least 1)
    pub times_per_week: u32,
    /// Points per completed occurrence, `DEFAULT_CHORE_POINTS` when unset
    #[serde(default)]
    pub points: Option<u32>,
    /// If set, only people living on this floor are eligible
    #[serde(default)]
    pub floor: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// How a person feels about doing chores on a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPreference {
    Preferred,
    Available,
    Unavailable,
}

/// A household member who can be assigned chores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Person ID in format: "person::epoch_millis_nonce"
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub floor: Option<String>,
    /// Day of week (0 = Sunday, 6 = Saturday) to preference; missing days are neutral
    #[serde(default)]
    pub day_preferences: BTreeMap<u8, DayPreference>,
    #[serde(default)]
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One scheduled occurrence of a chore for a person in a specific week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub chore_id: String,
    pub person_id: String,
    pub week_number: u32,
    pub year: i32,
    /// Intended day for this occurrence (0 = Sunday, 6 = Saturday)
    pub day_of_week: Option<u8>,
    /// Chore points captured when the assignment was created
    pub points: u32,
    pub completed: bool,
    pub completed_at: Option<NaiveDateTime>,
    pub assigned_at: NaiveDateTime,
    /// Anonymous peer ratings, 1 to 5, in the order they were given
    #[serde(default)]
    pub ratings: Vec<u8>,
}

/// Derived per-person point totals for a week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointsSnapshot {
    pub person_id: String,
    pub week_number: u32,
    pub year: i32,
    pub weekly_points: u32,
    pub yearly_points: u32,
    pub last_updated: NaiveDateTime,
}

/// Weekly and yearly totals for a single person
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonPoints {
    pub weekly_points: u32,
    pub yearly_points: u32,
}

/// Which total the leaderboard is ranked by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointsPeriod {
    Weekly,
    Yearly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub person_id: String,
    pub name: String,
    pub weekly_points: u32,
    pub yearly_points: u32,
}

impl LeaderboardEntry {
    pub fn points_for(&self, period: PointsPeriod) -> u32 {
        match period {
            PointsPeriod::Weekly => self.weekly_points,
            PointsPeriod::Yearly => self.yearly_points,
        }
    }
}

/// The (week, year) bucket every assignment belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WeekKey {
    pub week_number: u32,
    pub year: i32,
}

impl WeekKey {
    pub fn new(week_number: u32, year: i32) -> Self {
        Self { week_number, year }
    }

    pub fn from_datetime(at: &NaiveDateTime) -> Self {
        Self {
            week_number: week_number(at),
            year: week_year(at),
        }
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "week {} of {}", self.week_number, self.year)
    }
}

/// Week of the year used to bucket assignments.
///
/// Computes `ceil((days_since_jan_1 + jan_1_weekday + 1) / 7)` where the day count
/// includes the elapsed fraction of the current day and weekdays count from Sunday = 0.
/// Because of the fractional part, the last day of a week rolls into the next week
/// number as soon as it is past midnight; callers and engines must all go through this
/// function so they agree on the boundary.
pub fn week_number(at: &NaiveDateTime) -> u32 {
    let days_into_year = at.ordinal0();
    let jan_first_weekday = (day_of_week(at) as u32 + 7 - days_into_year % 7) % 7;

    let millis_into_day = at.num_seconds_from_midnight() as f64 * 1000.0
        + (at.nanosecond() % 1_000_000_000 / 1_000_000) as f64;
    let past_days = days_into_year as f64 + millis_into_day / MILLIS_PER_DAY;

    ((past_days + jan_first_weekday as f64 + 1.0) / 7.0).ceil() as u32
}

/// Calendar year used alongside `week_number`
pub fn week_year(at: &NaiveDateTime) -> i32 {
    at.year()
}

/// Day of week with Sunday = 0 through Saturday = 6
pub fn day_of_week(at: &NaiveDateTime) -> u8 {
    at.weekday().num_days_from_sunday() as u8
}

/// Validate day of week value
pub fn is_valid_day_of_week(day: u8) -> bool {
    day <= 6
}

pub fn day_name(day: u8) -> &'static str {
    match day {
        0 => "Sunday",
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        _ => "Invalid",
    }
}

fn short_nonce() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

impl Chore {
    /// Generate a chore ID based on timestamp
    pub fn generate_id(epoch_millis: u64) -> String {
        format!("chore::{}_{}", epoch_millis, short_nonce())
    }

    /// Point value with the default applied; an explicit zero stays zero
    pub fn points_or_default(&self) -> u32 {
        self.points.unwrap_or(DEFAULT_CHORE_POINTS)
    }

    /// Whether `person` may be assigned this chore
    pub fn is_eligible(&self, person: &Person) -> bool {
        match &self.floor {
            Some(floor) => person.floor.as_deref() == Some(floor.as_str()),
            None => true,
        }
    }
}

impl Person {
    /// Generate a person ID based on timestamp
    pub fn generate_id(epoch_millis: u64) -> String {
        format!("person::{}_{}", epoch_millis, short_nonce())
    }

    pub fn preference_for(&self, day: u8) -> Option<DayPreference> {
        self.day_preferences.get(&day).copied()
    }
}

impl Assignment {
    /// Generate an assignment ID from its chore, person, week and creation time.
    /// A random suffix keeps IDs apart when several are created in the same millisecond.
    pub fn generate_id(chore_id: &str, person_id: &str, week_number: u32, epoch_millis: u64) -> String {
        format!(
            "assignment::{}::{}::{}::{}_{}",
            chore_id,
            person_id,
            week_number,
            epoch_millis,
            short_nonce()
        )
    }

    pub fn week_key(&self) -> WeekKey {
        WeekKey::new(self.week_number, self.year)
    }

    pub fn is_in_week(&self, key: WeekKey) -> bool {
        self.week_key() == key
    }

    /// Mean of all ratings, `None` when nobody rated yet
    pub fn average_rating(&self) -> Option<f64> {
        if self.ratings.is_empty() {
            return None;
        }
        let total: u32 = self.ratings.iter().map(|&r| r as u32).sum();
        Some(total as f64 / self.ratings.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn literal_week(year: i32, month: u32, day: u32) -> u32 {
        // Midnight only, so the day count is a whole number
        let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        let jan_first = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
        let days = (date - jan_first).num_days() as f64;
        let weekday = jan_first.weekday().num_days_from_sunday() as f64;
        ((days + weekday + 1.0) / 7.0).ceil() as u32
    }

    #[test]
    fn test_week_number_new_year_2024() {
        // Jan 1 2024 is a Monday: ceil((0 + 1 + 1) / 7) = 1
        assert_eq!(week_number(&at(2024, 1, 1, 0, 0)), 1);
        assert_eq!(week_year(&at(2024, 1, 1, 0, 0)), 2024);
    }

    #[test]
    fn test_week_number_matches_literal_formula() {
        for (year, month, day) in [
            (2023, 1, 1),
            (2023, 1, 8),
            (2024, 1, 6),
            (2024, 1, 7),
            (2024, 2, 29),
            (2024, 6, 15),
            (2024, 12, 31),
            (2025, 3, 10),
        ] {
            assert_eq!(
                week_number(&at(year, month, day, 0, 0)),
                literal_week(year, month, day),
                "mismatch for {}-{}-{}",
                year,
                month,
                day
            );
        }
    }

    #[test]
    fn test_week_number_saturday_rolls_over_after_midnight() {
        // Jan 6 2024 is a Saturday; (5 + 1 + 1) / 7 = 1 exactly at midnight
        assert_eq!(week_number(&at(2024, 1, 6, 0, 0)), 1);
        // Any elapsed time pushes the ceiling into week 2
        assert_eq!(week_number(&at(2024, 1, 6, 12, 0)), 2);
        // Sunday Jan 7 starts week 2
        assert_eq!(week_number(&at(2024, 1, 7, 0, 0)), 2);
    }

    #[test]
    fn test_week_key_display() {
        let key = WeekKey::from_datetime(&at(2024, 1, 1, 9, 30));
        assert_eq!(key, WeekKey::new(1, 2024));
        assert_eq!(key.to_string(), "week 1 of 2024");
    }

    #[test]
    fn test_day_of_week_starts_sunday() {
        assert_eq!(day_of_week(&at(2024, 1, 7, 10, 0)), 0);
        assert_eq!(day_of_week(&at(2024, 1, 1, 10, 0)), 1);
        assert_eq!(day_of_week(&at(2024, 1, 6, 10, 0)), 6);
        assert_eq!(day_name(1), "Monday");
        assert_eq!(day_name(7), "Invalid");
        assert!(is_valid_day_of_week(6));
        assert!(!is_valid_day_of_week(7));
    }

    #[test]
    fn test_chore_points_default_and_explicit_zero() {
        let mut chore = Chore {
            id: Chore::generate_id(1702516122000),
            name: "Dishes".to_string(),
            description: None,
            times_per_week: 3,
            points: None,
            floor: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(chore.points_or_default(), 10);
        chore.points = Some(0);
        assert_eq!(chore.points_or_default(), 0);
        assert!(chore.id.starts_with("chore::1702516122000_"));
    }

    #[test]
    fn test_floor_eligibility() {
        let chore = Chore {
            id: "chore::1".to_string(),
            name: "Hallway".to_string(),
            description: None,
            times_per_week: 1,
            points: Some(5),
            floor: Some("upstairs".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let mut person = Person {
            id: "person::1".to_string(),
            name: "Sam".to_string(),
            floor: None,
            day_preferences: BTreeMap::new(),
            is_admin: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(!chore.is_eligible(&person));
        person.floor = Some("downstairs".to_string());
        assert!(!chore.is_eligible(&person));
        person.floor = Some("upstairs".to_string());
        assert!(chore.is_eligible(&person));
    }

    #[test]
    fn test_assignment_ids_do_not_collide() {
        let first = Assignment::generate_id("chore::1", "person::1", 5, 1702516122000);
        let second = Assignment::generate_id("chore::1", "person::1", 5, 1702516122000);
        assert_ne!(first, second);
        assert!(first.starts_with("assignment::chore::1::person::1::5::1702516122000_"));
    }

    #[test]
    fn test_average_rating() {
        let mut assignment = Assignment {
            id: "assignment::x".to_string(),
            chore_id: "chore::1".to_string(),
            person_id: "person::1".to_string(),
            week_number: 1,
            year: 2024,
            day_of_week: Some(1),
            points: 10,
            completed: true,
            completed_at: None,
            assigned_at: at(2024, 1, 1, 8, 0),
            ratings: vec![],
        };
        assert_eq!(assignment.average_rating(), None);
        assignment.ratings = vec![2, 3];
        assert_eq!(assignment.average_rating(), Some(2.5));
    }

    #[test]
    fn test_assignment_week_membership() {
        let assignment = Assignment {
            id: "assignment::x".to_string(),
            chore_id: "chore::1".to_string(),
            person_id: "person::1".to_string(),
            week_number: 5,
            year: 2024,
            day_of_week: None,
            points: 10,
            completed: false,
            completed_at: None,
            assigned_at: at(2024, 1, 29, 8, 0),
            ratings: vec![],
        };
        assert_eq!(assignment.week_key(), WeekKey::new(5, 2024));
        assert!(assignment.is_in_week(WeekKey::from_datetime(&at(2024, 1, 29, 8, 0))));
        // Same week number, different year
        assert!(!assignment.is_in_week(WeekKey::new(5, 2023)));
        assert!(!assignment.is_in_week(WeekKey::new(6, 2024)));
    }

    #[test]
    fn test_day_preference_serializes_lowercase() {
        let json = serde_json::to_string(&DayPreference::Unavailable).unwrap();
        assert_eq!(json, "\"unavailable\"");
        let parsed: PointsPeriod = serde_json::from_str("\"yearly\"").unwrap();
        assert_eq!(parsed, PointsPeriod::Yearly);
    }
}
