//! # Weekly Reset
//!
//! The rollover check an external scheduler (cron, a launch hook, the `rollover` command)
//! runs periodically. A new week starts at Monday midnight local time; when the last
//! recorded reset is older than the most recent Monday midnight, the current week is
//! redistributed from scratch and points are recomputed.
//!
//! The reset boundary is Monday while the assignment week number rolls over on Sunday,
//! so a Sunday between the two is still scheduled with the previous Monday's draw.

use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime};
use log::{debug, info};
use rand::Rng;
use std::sync::Arc;

use crate::domain::assignment_service::AssignmentService;
use crate::domain::points_service::PointsService;
use crate::storage::csv::{CsvConnection, GlobalConfigRepository, GlobalConfigStorage};

/// Midnight at the start of the Monday on or before `now`
pub fn most_recent_monday_midnight(now: NaiveDateTime) -> NaiveDateTime {
    let days_since_monday = now.weekday().num_days_from_monday() as i64;
    (now.date() - Duration::days(days_since_monday)).and_time(NaiveTime::default())
}

/// Due when no reset has ever run or the last one happened before this week's boundary
pub fn is_reset_due(last_run: Option<NaiveDateTime>, now: NaiveDateTime) -> bool {
    match last_run {
        Some(last_run) => last_run < most_recent_monday_midnight(now),
        None => true,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResetOutcome {
    NotDue { last_run: NaiveDateTime },
    Reset { assignments: usize },
}

#[derive(Clone)]
pub struct WeeklyResetService {
    global_config_repository: GlobalConfigRepository,
    assignment_service: AssignmentService,
    points_service: PointsService,
}

impl WeeklyResetService {
    pub fn new(
        csv_conn: Arc<CsvConnection>,
        assignment_service: AssignmentService,
        points_service: PointsService,
    ) -> Self {
        Self {
            global_config_repository: GlobalConfigRepository::new((*csv_conn).clone()),
            assignment_service,
            points_service,
        }
    }

    /// Force-reassign the current week and refresh points if the weekly boundary passed
    pub fn run_if_due<R: Rng>(&self, now: NaiveDateTime, rng: &mut R) -> Result<ResetOutcome> {
        let config = self.global_config_repository.get_global_config()?;

        // Check whether this week's boundary has already been handled
        match config.last_weekly_reset {
            Some(last_run) if !is_reset_due(Some(last_run), now) => {
                debug!("Weekly reset not due; last ran at {}", last_run);
                return Ok(ResetOutcome::NotDue { last_run });
            }
            _ => {}
        }

        info!(
            "Weekly reset due (boundary {}), redistributing chores",
            most_recent_monday_midnight(now)
        );

        let result = self.assignment_service.reassign_current_week(now, rng)?;
        self.points_service.refresh_points(now)?;

        // Record the run last so a failed reset is retried next time
        self.global_config_repository.set_last_weekly_reset(now)?;

        Ok(ResetOutcome::Reset {
            assignments: result.assignments.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::{at, sample_chore, sample_person, TestHelper};
    use crate::storage::traits::{AssignmentStorage, ChoreStorage, PersonStorage, PointsStorage};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_most_recent_monday_midnight() {
        // Wednesday 2024-01-31 -> Monday 2024-01-29
        assert_eq!(most_recent_monday_midnight(at(2024, 1, 31, 15, 45)), at(2024, 1, 29, 0, 0));
        // Monday itself
        assert_eq!(most_recent_monday_midnight(at(2024, 1, 29, 0, 0)), at(2024, 1, 29, 0, 0));
        // Sunday belongs to the Monday before it
        assert_eq!(most_recent_monday_midnight(at(2024, 2, 4, 9, 0)), at(2024, 1, 29, 0, 0));
        // Across a year boundary: Wednesday 2025-01-01 -> Monday 2024-12-30
        assert_eq!(most_recent_monday_midnight(at(2025, 1, 1, 9, 0)), at(2024, 12, 30, 0, 0));
    }

    #[test]
    fn test_is_reset_due() {
        let now = at(2024, 1, 31, 12, 0);
        assert!(is_reset_due(None, now));
        assert!(is_reset_due(Some(at(2024, 1, 28, 23, 59)), now));
        assert!(!is_reset_due(Some(at(2024, 1, 29, 0, 0)), now));
        assert!(!is_reset_due(Some(at(2024, 1, 30, 7, 0)), now));
    }

    fn reset_service(helper: &TestHelper) -> WeeklyResetService {
        let conn = helper.env.shared_connection();
        WeeklyResetService::new(
            conn.clone(),
            AssignmentService::new(conn.clone()),
            PointsService::new(conn),
        )
    }

    #[test]
    fn test_run_if_due_only_once_per_week() {
        let helper = TestHelper::new().unwrap();
        helper
            .chore_repo
            .store_chore(&sample_chore("chore::dishes", "Dishes", 7, Some(10)))
            .unwrap();
        helper
            .person_repo
            .store_person(&sample_person("person::1", "Ana", None))
            .unwrap();
        let service = reset_service(&helper);
        let mut rng = StdRng::seed_from_u64(2);

        let monday = at(2024, 1, 29, 6, 0);
        let first = service.run_if_due(monday, &mut rng).unwrap();
        assert_eq!(first, ResetOutcome::Reset { assignments: 6 });
        assert_eq!(
            helper.global_config_repo.get_global_config().unwrap().last_weekly_reset,
            Some(monday)
        );
        assert_eq!(helper.points_repo.list_points().unwrap().len(), 1);

        let later = service.run_if_due(at(2024, 2, 1, 9, 0), &mut rng).unwrap();
        assert_eq!(later, ResetOutcome::NotDue { last_run: monday });
        assert_eq!(helper.assignment_repo.list_assignments().unwrap().len(), 6);

        let next_monday = at(2024, 2, 5, 6, 0);
        let next = service.run_if_due(next_monday, &mut rng).unwrap();
        assert_eq!(next, ResetOutcome::Reset { assignments: 6 });
        assert_eq!(helper.assignment_repo.list_assignments().unwrap().len(), 12);
    }
}
