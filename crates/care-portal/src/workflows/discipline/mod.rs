//! Progressive-discipline point engine: violation catalog, rolling point ledger, and the
//! corrective action workflow that turns an accumulated total into a discipline level.

pub mod catalog;
pub mod domain;
pub mod draft;
pub mod ledger;
pub mod policy;
pub mod repository;
pub mod service;
pub(crate) mod validation;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogError, ViolationCatalog};
pub use domain::{
    CorrectiveAction, CorrectiveActionId, CorrectiveActionInput, CorrectiveActionStatus,
    CorrectiveActionView, DisciplineLevel, EmployeeId, EmployeePointState, EmployeeResponse,
    EmployeeSummary, HouseId, Severity, SignatureArtifact, ViolationCategory, ViolationCategoryId,
    ViolationSelection, VoidRecord,
};
pub use draft::{CorrectiveActionDraft, WorkflowStage};
pub use ledger::PointLedger;
pub use policy::{
    DisciplinePolicy, DisciplinePreview, EscalationThresholds, EscalationWarning,
    DEFAULT_CONSEQUENCES_TEXT,
};
pub use repository::{
    CorrectiveActionRepository, EmployeeDirectory, RepositoryError, ViolationCategoryRepository,
};
pub use service::{CorrectiveActionService, DisciplineError};
pub use validation::ValidationError;
