use chrono::NaiveDate;

use super::domain::{
    CorrectiveAction, CorrectiveActionId, CorrectiveActionStatus, EmployeeId, EmployeeSummary,
    ViolationCategory,
};

/// Storage abstraction for corrective actions so the service can be exercised in isolation.
///
/// `insert` commits the record together with its supervisor signature; implementations must
/// either store the whole record or nothing.
pub trait CorrectiveActionRepository: Send + Sync {
    fn insert(&self, record: CorrectiveAction) -> Result<CorrectiveAction, RepositoryError>;
    /// Replace a stored record only while its stored status still equals `expected`;
    /// otherwise fail with `Conflict` so concurrent status changes cannot overwrite each other.
    fn update(
        &self,
        record: CorrectiveAction,
        expected: CorrectiveActionStatus,
    ) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &CorrectiveActionId) -> Result<Option<CorrectiveAction>, RepositoryError>;
    /// Non-voided actions for `employee_id` dated on or after `since`.
    ///
    /// Implementations should serve this from a read-committed (or stronger) snapshot.
    fn active_since(
        &self,
        employee_id: &EmployeeId,
        since: NaiveDate,
    ) -> Result<Vec<CorrectiveAction>, RepositoryError>;
    /// Every action for `employee_id`, voided ones included.
    fn for_employee(&self, employee_id: &EmployeeId)
        -> Result<Vec<CorrectiveAction>, RepositoryError>;
}

/// Read access to seeded violation categories.
pub trait ViolationCategoryRepository: Send + Sync {
    fn active_categories(&self) -> Result<Vec<ViolationCategory>, RepositoryError>;
}

/// Lookup for the staff directory owned by the surrounding application.
pub trait EmployeeDirectory: Send + Sync {
    fn fetch(&self, id: &EmployeeId) -> Result<Option<EmployeeSummary>, RepositoryError>;
}

/// Error enumeration for collaborator failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}
