use anyhow::Result;
use chrono::NaiveDateTime;
use log::{debug, info};
use shared::{LeaderboardEntry, PersonPoints, PointsPeriod, PointsSnapshot, WeekKey};
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::commands::points::{AssignmentSummary, PersonStats};
use crate::domain::scoring_engine::ScoringEngine;
use crate::storage::csv::{
    AssignmentRepository, ChoreRepository, CsvConnection, GlobalConfigRepository,
    GlobalConfigStorage, PersonRepository, PointsRepository,
};
use crate::storage::traits::{AssignmentStorage, ChoreStorage, PersonStorage, PointsStorage};

const UNKNOWN_CHORE: &str = "Unknown";

/// Service for point totals, the leaderboard and per-person statistics
#[derive(Clone)]
pub struct PointsService {
    chore_repository: ChoreRepository,
    person_repository: PersonRepository,
    assignment_repository: AssignmentRepository,
    points_repository: PointsRepository,
    global_config_repository: GlobalConfigRepository,
}

impl PointsService {
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self {
            chore_repository: ChoreRepository::new((*csv_conn).clone()),
            person_repository: PersonRepository::new((*csv_conn).clone()),
            assignment_repository: AssignmentRepository::new((*csv_conn).clone()),
            points_repository: PointsRepository::new((*csv_conn).clone()),
            global_config_repository: GlobalConfigRepository::new((*csv_conn).clone()),
        }
    }

    fn compute(&self, now: NaiveDateTime) -> Result<Vec<PointsSnapshot>> {
        let config = self.global_config_repository.get_global_config()?;
        let engine = ScoringEngine::new(config.engine.scoring);

        // Totals always come from the whole history, never from stored snapshots
        let people = self.person_repository.list_people()?;
        let chores = self.chore_repository.list_chores()?;
        let assignments = self.assignment_repository.list_assignments()?;

        Ok(engine.compute_points(&people, &chores, &assignments, now))
    }

    /// Rebuild every person's totals from the full assignment history and store them
    pub fn refresh_points(&self, now: NaiveDateTime) -> Result<Vec<PointsSnapshot>> {
        let snapshots = self.compute(now)?;

        // Store in database
        self.points_repository.replace_points(&snapshots)?;
        info!("Refreshed points for {} people", snapshots.len());
        Ok(snapshots)
    }

    /// Stored totals for the current week, zero when nothing has been stored yet
    pub fn get_person_points(&self, person_id: &str, now: NaiveDateTime) -> Result<PersonPoints> {
        let week = WeekKey::from_datetime(&now);
        let points = self
            .points_repository
            .list_points()?
            .into_iter()
            .find(|s| s.person_id == person_id && s.week_number == week.week_number && s.year == week.year)
            .map(|s| PersonPoints {
                weekly_points: s.weekly_points,
                yearly_points: s.yearly_points,
            });

        if points.is_none() {
            debug!("No stored points for {} in {}", person_id, week);
        }
        Ok(points.unwrap_or_default())
    }

    /// Everyone's totals, highest first for the chosen period; ties are ordered by name
    pub fn leaderboard(&self, period: PointsPeriod, now: NaiveDateTime) -> Result<Vec<LeaderboardEntry>> {
        let names: HashMap<String, String> = self
            .person_repository
            .list_people()?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();

        let mut entries: Vec<LeaderboardEntry> = self
            .compute(now)?
            .into_iter()
            .map(|s| LeaderboardEntry {
                name: names.get(&s.person_id).cloned().unwrap_or_default(),
                person_id: s.person_id,
                weekly_points: s.weekly_points,
                yearly_points: s.yearly_points,
            })
            .collect();

        // Highest first, then alphabetical
        entries.sort_by(|a, b| {
            b.points_for(period)
                .cmp(&a.points_for(period))
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(entries)
    }

    /// Admin overview of the current week for every person
    pub fn person_stats(&self, now: NaiveDateTime) -> Result<Vec<PersonStats>> {
        let week = WeekKey::from_datetime(&now);
        let people = self.person_repository.list_people()?;
        let chore_names: HashMap<String, String> = self
            .chore_repository
            .list_chores()?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();
        let points: HashMap<String, PersonPoints> = self
            .compute(now)?
            .into_iter()
            .map(|s| {
                (
                    s.person_id,
                    PersonPoints {
                        weekly_points: s.weekly_points,
                        yearly_points: s.yearly_points,
                    },
                )
            })
            .collect();
        // Only this week's assignments feed the per-person breakdown
        let week_assignments: Vec<_> = self
            .assignment_repository
            .list_assignments()?
            .into_iter()
            .filter(|a| a.is_in_week(week))
            .collect();

        let stats = people
            .into_iter()
            .map(|person| {
                let assignments: Vec<AssignmentSummary> = week_assignments
                    .iter()
                    .filter(|a| a.person_id == person.id)
                    .map(|a| AssignmentSummary {
                        chore_name: chore_names
                            .get(&a.chore_id)
                            .cloned()
                            .unwrap_or_else(|| UNKNOWN_CHORE.to_string()),
                        assignment: a.clone(),
                    })
                    .collect();

                let assigned = assignments.len() as u32;
                let completed = assignments.iter().filter(|s| s.assignment.completed).count() as u32;

                PersonStats {
                    points: points.get(&person.id).copied().unwrap_or_default(),
                    person_id: person.id,
                    name: person.name,
                    assigned,
                    completed,
                    completion_rate: completion_rate(completed, assigned),
                    assignments,
                }
            })
            .collect();

        Ok(stats)
    }
}

fn completion_rate(completed: u32, assigned: u32) -> u32 {
    if assigned == 0 {
        return 0;
    }
    (completed as f64 / assigned as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::{at, sample_assignment, sample_chore, sample_person, TestHelper};
    use shared::Assignment;

    // Tuesday 2024-01-30, week 5
    fn now() -> NaiveDateTime {
        at(2024, 1, 30, 12, 0)
    }

    fn completed(id: &str, chore_id: &str, person_id: &str, week: u32, ratings: Vec<u8>) -> Assignment {
        let mut assignment = sample_assignment(id, chore_id, person_id, WeekKey::new(week, 2024));
        assignment.completed = true;
        assignment.completed_at = Some(at(2024, 1, 29, 18, 0));
        assignment.ratings = ratings;
        assignment
    }

    fn household() -> (TestHelper, PointsService) {
        let helper = TestHelper::new().unwrap();
        helper
            .chore_repo
            .store_chore(&sample_chore("chore::dishes", "Dishes", 7, Some(20)))
            .unwrap();
        helper
            .chore_repo
            .store_chore(&sample_chore("chore::bins", "Bins", 1, None))
            .unwrap();
        for (id, name) in [("person::1", "Ana"), ("person::2", "Ben"), ("person::3", "Cy")] {
            helper
                .person_repo
                .store_person(&sample_person(id, name, None))
                .unwrap();
        }
        let service = PointsService::new(helper.env.shared_connection());
        (helper, service)
    }

    #[test]
    fn test_refresh_and_lookup() {
        let (helper, service) = household();
        helper
            .assignment_repo
            .store_assignments(&[
                completed("a1", "chore::dishes", "person::1", 5, vec![]),
                completed("a2", "chore::bins", "person::1", 3, vec![]),
                completed("a3", "chore::dishes", "person::2", 5, vec![1, 1]),
            ])
            .unwrap();

        let snapshots = service.refresh_points(now()).unwrap();
        assert_eq!(snapshots.len(), 3);
        assert_eq!(helper.points_repo.list_points().unwrap(), snapshots);

        assert_eq!(
            service.get_person_points("person::1", now()).unwrap(),
            PersonPoints { weekly_points: 20, yearly_points: 30 }
        );
        assert_eq!(
            service.get_person_points("person::2", now()).unwrap(),
            PersonPoints::default()
        );
        assert_eq!(
            service.get_person_points("person::unknown", now()).unwrap(),
            PersonPoints::default()
        );
    }

    #[test]
    fn test_stored_points_are_scoped_to_current_week() {
        let (helper, service) = household();
        helper
            .assignment_repo
            .store_assignments(&[completed("a1", "chore::dishes", "person::1", 5, vec![])])
            .unwrap();
        service.refresh_points(now()).unwrap();

        let next_week = at(2024, 2, 6, 12, 0);
        assert_eq!(
            service.get_person_points("person::1", next_week).unwrap(),
            PersonPoints::default()
        );
    }

    #[test]
    fn test_leaderboard_ordering() {
        let (helper, service) = household();
        helper
            .assignment_repo
            .store_assignments(&[
                completed("a1", "chore::bins", "person::3", 5, vec![]),
                completed("a2", "chore::dishes", "person::2", 2, vec![]),
                completed("a3", "chore::bins", "person::1", 5, vec![]),
            ])
            .unwrap();

        let weekly = service.leaderboard(PointsPeriod::Weekly, now()).unwrap();
        let weekly_names: Vec<&str> = weekly.iter().map(|e| e.name.as_str()).collect();
        // Ana and Cy tie on 10; Ben has nothing this week
        assert_eq!(weekly_names, vec!["Ana", "Cy", "Ben"]);

        let yearly = service.leaderboard(PointsPeriod::Yearly, now()).unwrap();
        assert_eq!(yearly[0].name, "Ben");
        assert_eq!(yearly[0].yearly_points, 20);
    }

    #[test]
    fn test_person_stats() {
        let (helper, service) = household();
        let mut open = sample_assignment("a2", "chore::dishes", "person::1", WeekKey::new(5, 2024));
        open.completed = false;
        helper
            .assignment_repo
            .store_assignments(&[
                completed("a1", "chore::gone", "person::1", 5, vec![]),
                open,
                completed("a3", "chore::bins", "person::1", 5, vec![]),
                completed("a4", "chore::bins", "person::1", 4, vec![]),
            ])
            .unwrap();

        let stats = service.person_stats(now()).unwrap();
        assert_eq!(stats.len(), 3);

        let ana = stats.iter().find(|s| s.name == "Ana").unwrap();
        assert_eq!(ana.assigned, 3);
        assert_eq!(ana.completed, 2);
        assert_eq!(ana.completion_rate, 67);
        // Deleted chore scores the fallback 10, bins defaults to 10
        assert_eq!(ana.points, PersonPoints { weekly_points: 20, yearly_points: 30 });
        assert_eq!(ana.assignments[0].chore_name, "Unknown");

        let ben = stats.iter().find(|s| s.name == "Ben").unwrap();
        assert_eq!(ben.assigned, 0);
        assert_eq!(ben.completion_rate, 0);
        assert!(ben.assignments.is_empty());
    }

    #[test]
    fn test_completion_rate_rounding() {
        assert_eq!(completion_rate(0, 0), 0);
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(3, 3), 100);
    }
}
