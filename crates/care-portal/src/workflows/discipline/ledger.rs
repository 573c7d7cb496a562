use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tracing::debug;

use super::domain::{DisciplineLevel, EmployeeId, EmployeePointState};
use super::policy::{EscalationThresholds, DEFAULT_WINDOW_DAYS};
use super::repository::{CorrectiveActionRepository, RepositoryError};

/// Rolling-window point totals, recomputed from the record store on every call.
pub struct PointLedger<R: ?Sized> {
    repository: Arc<R>,
    window_days: i64,
}

impl<R> PointLedger<R>
where
    R: CorrectiveActionRepository + ?Sized,
{
    pub fn new(repository: Arc<R>, window_days: i64) -> Self {
        let window_days = if window_days > 0 {
            window_days
        } else {
            DEFAULT_WINDOW_DAYS
        };
        Self {
            repository,
            window_days,
        }
    }

    pub fn window_days(&self) -> i64 {
        self.window_days
    }

    /// First day counted toward the total as of `as_of` (inclusive).
    pub fn window_start(&self, as_of: NaiveDate) -> NaiveDate {
        as_of - Duration::days(self.window_days)
    }

    pub fn current_points(
        &self,
        employee_id: &EmployeeId,
        as_of: NaiveDate,
    ) -> Result<i32, RepositoryError> {
        let (points, _) = self.sum(employee_id, as_of)?;
        Ok(points)
    }

    pub fn point_state(
        &self,
        employee_id: &EmployeeId,
        as_of: NaiveDate,
        thresholds: &EscalationThresholds,
    ) -> Result<EmployeePointState, RepositoryError> {
        let (current_points, active_actions) = self.sum(employee_id, as_of)?;
        Ok(EmployeePointState {
            employee_id: employee_id.clone(),
            as_of,
            window_start: self.window_start(as_of),
            current_points,
            active_actions,
            standing: DisciplineLevel::for_total(current_points, thresholds),
        })
    }

    fn sum(
        &self,
        employee_id: &EmployeeId,
        as_of: NaiveDate,
    ) -> Result<(i32, usize), RepositoryError> {
        let window_start = self.window_start(as_of);
        let actions = self.repository.active_since(employee_id, window_start)?;

        // Store filters are re-applied here.
        let (points, count) = actions
            .iter()
            .filter(|action| !action.is_voided() && action.violation_date >= window_start)
            .fold((0_i32, 0_usize), |(points, count), action| {
                (points.saturating_add(action.ledger_points()), count + 1)
            });

        debug!(
            employee = %employee_id.0,
            %as_of,
            %window_start,
            points,
            actions = count,
            "computed rolling point total"
        );

        Ok((points, count))
    }
}
