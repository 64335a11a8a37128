//! # Assignment Engine
//!
//! Produces the authoritative set of chore assignments for the current week.
//!
//! The engine is a pure function of its inputs (plus the clock and random source it is
//! handed). It never touches storage; callers persist whatever it returns.
//!
//! ## Algorithm
//!
//! 1. Work out how many days are left in the week (Sunday = 0) and scale each chore's
//!    `times_per_week` down to that window, rounding to the nearest whole occurrence.
//! 2. Spread a chore's occurrences evenly over the remaining days; a single occurrence
//!    lands on a random remaining day.
//! 3. Shuffle every occurrence of every chore into one list so catalog order never
//!    decides who gets the leftovers.
//! 4. For each occurrence, score every eligible person and give it to the lowest score.
//!    Task count dominates the score, so counts stay level; accumulated points and day
//!    preferences only break ties between people with the same count.
//!
//! Within a week the engine is idempotent: if the existing history already holds the
//! current week, that subset is returned untouched. Passing an empty history forces a
//! fresh distribution.

use chrono::NaiveDateTime;
use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use shared::{day_of_week, Assignment, Chore, DayPreference, Person, WeekKey};
use std::collections::HashMap;

use crate::domain::models::validation::MAX_TIMES_PER_WEEK;
use crate::domain::models::AssignmentWeights;

const DAYS_PER_WEEK: u8 = 7;
const LAST_DAY_OF_WEEK: u8 = 6;

/// One scheduled instance of a chore before a person has been chosen
#[derive(Debug, Clone)]
struct Occurrence<'a> {
    chore: &'a Chore,
    day_of_week: u8,
    points: u32,
}

/// Running load of a person within a single generation run
#[derive(Debug, Default, Clone, Copy)]
struct PersonLoad {
    task_count: u32,
    points_count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentEngine {
    weights: AssignmentWeights,
}

impl AssignmentEngine {
    pub fn new(weights: AssignmentWeights) -> Self {
        Self { weights }
    }

    /// Return the assignments for the week containing `now`.
    ///
    /// Reuses the current-week subset of `existing` when there is one; otherwise
    /// generates a new set. Pass an empty `existing` to force a full redistribution.
    pub fn assign<R: Rng>(
        &self,
        chores: &[Chore],
        people: &[Person],
        existing: &[Assignment],
        now: NaiveDateTime,
        rng: &mut R,
    ) -> Vec<Assignment> {
        if people.is_empty() {
            info!("No people to assign chores to");
            return Vec::new();
        }

        let week = WeekKey::from_datetime(&now);

        if !existing.is_empty() {
            let current_week: Vec<Assignment> = existing
                .iter()
                .filter(|a| a.is_in_week(week))
                .cloned()
                .collect();

            if !current_week.is_empty() {
                info!(
                    "Using {} existing assignments for {}",
                    current_week.len(),
                    week
                );
                return current_week;
            }
        }

        self.generate(chores, people, week, now, rng)
    }

    fn generate<R: Rng>(
        &self,
        chores: &[Chore],
        people: &[Person],
        week: WeekKey,
        now: NaiveDateTime,
        rng: &mut R,
    ) -> Vec<Assignment> {
        let today = day_of_week(&now);
        let remaining_days = DAYS_PER_WEEK - today;

        let mut occurrences = Vec::new();
        for chore in chores {
            // Hand-edited catalogs can carry frequencies the services would reject
            let times_per_week = if chore.times_per_week > MAX_TIMES_PER_WEEK {
                warn!(
                    "Chore '{}' asks for {} times per week, capping at {}",
                    chore.name, chore.times_per_week, MAX_TIMES_PER_WEEK
                );
                MAX_TIMES_PER_WEEK
            } else {
                chore.times_per_week
            };

            let count = occurrences_remaining(times_per_week, remaining_days);
            if count == 0 {
                debug!(
                    "Chore '{}' has no occurrences left in the {} remaining day(s)",
                    chore.name, remaining_days
                );
                continue;
            }

            for index in 0..count {
                occurrences.push(Occurrence {
                    chore,
                    day_of_week: target_day(today, remaining_days, index, count, rng),
                    points: chore.points_or_default(),
                });
            }
        }

        occurrences.shuffle(rng);

        let epoch_millis = now.and_utc().timestamp_millis().max(0) as u64;
        let mut loads: HashMap<&str, PersonLoad> = HashMap::new();
        let mut assignments = Vec::with_capacity(occurrences.len());

        for occurrence in &occurrences {
            let eligible: Vec<&Person> = people
                .iter()
                .filter(|person| occurrence.chore.is_eligible(person))
                .collect();

            let Some(person) = self.pick_person(&eligible, &loads, occurrence) else {
                warn!(
                    "No eligible people for chore '{}' (floor {:?}); skipping occurrence on {}",
                    occurrence.chore.name,
                    occurrence.chore.floor,
                    shared::day_name(occurrence.day_of_week)
                );
                continue;
            };

            let load = loads.entry(person.id.as_str()).or_default();
            load.task_count += 1;
            load.points_count += occurrence.points;

            assignments.push(Assignment {
                id: Assignment::generate_id(
                    &occurrence.chore.id,
                    &person.id,
                    week.week_number,
                    epoch_millis,
                ),
                chore_id: occurrence.chore.id.clone(),
                person_id: person.id.clone(),
                week_number: week.week_number,
                year: week.year,
                day_of_week: Some(occurrence.day_of_week),
                points: occurrence.points,
                completed: false,
                completed_at: None,
                assigned_at: now,
                ratings: Vec::new(),
            });
        }

        info!(
            "Created {} new assignments for {} ({} occurrence(s) scheduled)",
            assignments.len(),
            week,
            occurrences.len()
        );
        assignments
    }

    /// Lowest score wins; the first person reaching the minimum keeps it on ties
    fn pick_person<'p>(
        &self,
        eligible: &[&'p Person],
        loads: &HashMap<&str, PersonLoad>,
        occurrence: &Occurrence<'_>,
    ) -> Option<&'p Person> {
        let mut best: Option<(&'p Person, f64)> = None;

        for &person in eligible {
            let load = loads.get(person.id.as_str()).copied().unwrap_or_default();
            let score = self.score(load, person, occurrence);

            match best {
                Some((_, best_score)) if score >= best_score => {}
                _ => best = Some((person, score)),
            }
        }

        best.map(|(person, _)| person)
    }

    fn score(&self, load: PersonLoad, person: &Person, occurrence: &Occurrence<'_>) -> f64 {
        let points = occurrence.points as f64;
        let preference_adjustment = match person.preference_for(occurrence.day_of_week) {
            Some(DayPreference::Unavailable) => self.weights.unavailable_factor * points,
            Some(DayPreference::Preferred) => -self.weights.preferred_factor * points,
            Some(DayPreference::Available) => -self.weights.available_factor * points,
            None => 0.0,
        };

        load.task_count as f64 * self.weights.task_weight
            + load.points_count as f64
            + preference_adjustment
    }
}

/// `round(times_per_week / 7 * remaining_days)`
fn occurrences_remaining(times_per_week: u32, remaining_days: u8) -> u32 {
    let scaled = (times_per_week as f64 / DAYS_PER_WEEK as f64 * remaining_days as f64).round();
    if scaled <= 0.0 {
        0
    } else {
        scaled as u32
    }
}

fn target_day<R: Rng>(
    today: u8,
    remaining_days: u8,
    index: u32,
    count: u32,
    rng: &mut R,
) -> u8 {
    if count == 1 {
        return today + rng.gen_range(0..remaining_days);
    }

    let offset = index * (remaining_days as u32 - 1) / (count - 1);
    (today as u32 + offset).min(LAST_DAY_OF_WEEK as u32) as u8
}
