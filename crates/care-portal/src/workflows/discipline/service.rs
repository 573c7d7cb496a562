use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use super::catalog::{CatalogError, ViolationCatalog};
use super::domain::{
    effective_points, CorrectiveAction, CorrectiveActionId, CorrectiveActionInput,
    CorrectiveActionStatus, EmployeeId, EmployeePointState, EmployeeResponse, Severity,
    SignatureArtifact, ViolationCategory, ViolationSelection, VoidRecord,
};
use super::ledger::PointLedger;
use super::policy::{DisciplinePolicy, DisciplinePreview, DEFAULT_CONSEQUENCES_TEXT};
use super::repository::{CorrectiveActionRepository, EmployeeDirectory, RepositoryError};
use super::validation::{
    check_adjustment_range, check_adjustment_reason, check_description, check_pip,
    check_signature, is_blank, require_text, ValidationError,
};

/// Service composing the catalog, the point ledger, and the record store.
pub struct CorrectiveActionService<R, E> {
    catalog: Arc<ViolationCatalog>,
    ledger: PointLedger<R>,
    repository: Arc<R>,
    directory: Arc<E>,
    policy: DisciplinePolicy,
}

/// Ids must stay unique across restarts and across services sharing one store.
fn next_corrective_action_id() -> CorrectiveActionId {
    CorrectiveActionId(format!("ca-{}", Uuid::new_v4().simple()))
}

impl<R, E> CorrectiveActionService<R, E>
where
    R: CorrectiveActionRepository + 'static,
    E: EmployeeDirectory + 'static,
{
    pub fn new(
        repository: Arc<R>,
        directory: Arc<E>,
        catalog: Arc<ViolationCatalog>,
        policy: DisciplinePolicy,
    ) -> Self {
        let ledger = PointLedger::new(repository.clone(), policy.window_days);
        Self {
            catalog,
            ledger,
            repository,
            directory,
            policy,
        }
    }

    pub fn policy(&self) -> &DisciplinePolicy {
        &self.policy
    }

    pub fn catalog(&self) -> &ViolationCatalog {
        &self.catalog
    }

    pub fn list_active_grouped_by_severity(&self) -> BTreeMap<Severity, Vec<ViolationCategory>> {
        self.catalog.list_active_grouped_by_severity()
    }

    pub fn current_points(
        &self,
        employee_id: &EmployeeId,
        as_of: NaiveDate,
    ) -> Result<i32, DisciplineError> {
        Ok(self.ledger.current_points(employee_id, as_of)?)
    }

    /// Rolling-window standing for an employee known to the directory.
    pub fn point_state(
        &self,
        employee_id: &EmployeeId,
        as_of: NaiveDate,
    ) -> Result<EmployeePointState, DisciplineError> {
        self.ensure_employee(employee_id)?;
        Ok(self
            .ledger
            .point_state(employee_id, as_of, &self.policy.thresholds)?)
    }

    /// Compute the outcome the supervisor reviews before signing. Nothing is written.
    pub fn preview(
        &self,
        selection: &ViolationSelection,
        as_of: NaiveDate,
    ) -> Result<DisciplinePreview, DisciplineError> {
        require_text(&selection.employee_id.0, "employee_id")?;
        require_text(&selection.violation_category_id.0, "violation_category_id")?;
        self.ensure_employee(&selection.employee_id)?;
        let category = self.catalog.resolve(&selection.violation_category_id)?;
        self.decide(selection, category, as_of)
    }

    /// Validate, decide, and persist a corrective action with its supervisor signature.
    pub fn create_corrective_action(
        &self,
        input: CorrectiveActionInput,
        issued_by: EmployeeId,
    ) -> Result<CorrectiveAction, DisciplineError> {
        self.create_corrective_action_at(input, issued_by, Utc::now())
    }

    pub fn create_corrective_action_at(
        &self,
        input: CorrectiveActionInput,
        issued_by: EmployeeId,
        now: DateTime<Utc>,
    ) -> Result<CorrectiveAction, DisciplineError> {
        require_text(&input.employee_id.0, "employee_id")?;
        require_text(&input.violation_category_id.0, "violation_category_id")?;
        check_description(&input.incident_description, self.policy.min_incident_chars)?;
        check_adjustment_reason(
            input.has_mitigating,
            input.points_adjusted,
            input.adjustment_reason.as_deref(),
        )?;
        check_signature(input.supervisor_signature.as_ref())?;
        check_pip(input.pip_scheduled, input.pip_date)?;

        self.ensure_employee(&input.employee_id)?;
        let category = self.catalog.resolve(&input.violation_category_id)?;
        let preview = self.decide(&input.selection(), category, now.date_naive())?;

        if input.pip_scheduled && !preview.pip_offered {
            return Err(ValidationError::PipNotOffered {
                level: preview.discipline_level,
            }
            .into());
        }

        let supervisor_signature = input
            .supervisor_signature
            .ok_or(ValidationError::MissingSignature)?;
        let points_adjusted = if input.has_mitigating {
            input.points_adjusted
        } else {
            None
        };
        let consequences_text = input
            .consequences_text
            .filter(|text| !is_blank(text))
            .unwrap_or_else(|| DEFAULT_CONSEQUENCES_TEXT.to_string());

        let record = CorrectiveAction {
            id: next_corrective_action_id(),
            employee_id: input.employee_id,
            house_id: input.house_id,
            violation_category_id: input.violation_category_id,
            violation_date: input.violation_date,
            violation_time: input.violation_time,
            incident_description: input.incident_description.trim().to_string(),
            has_mitigating: input.has_mitigating,
            mitigating_circumstances: input.mitigating_circumstances,
            points_assigned: category.default_points,
            points_adjusted,
            adjustment_reason: points_adjusted.and(input.adjustment_reason),
            discipline_level: preview.recorded_level(input.pip_scheduled),
            status: CorrectiveActionStatus::PendingSignature,
            corrective_expectations: input
                .corrective_expectations
                .into_iter()
                .filter(|expectation| !is_blank(expectation))
                .collect(),
            consequences_text,
            pip_scheduled: input.pip_scheduled,
            pip_date: if input.pip_scheduled {
                input.pip_date
            } else {
                None
            },
            supervisor_signature,
            issued_by_id: issued_by,
            created_at: now,
            employee_response: None,
            void_record: None,
        };

        let stored = self.repository.insert(record)?;
        info!(
            id = %stored.id.0,
            employee = %stored.employee_id.0,
            level = stored.discipline_level.label(),
            new_total = preview.new_total,
            "corrective action recorded"
        );
        Ok(stored)
    }

    pub fn get(&self, id: &CorrectiveActionId) -> Result<CorrectiveAction, DisciplineError> {
        self.repository
            .fetch(id)?
            .ok_or_else(|| DisciplineError::not_found("corrective action", &id.0))
    }

    /// All actions on file for an employee, newest violation first.
    pub fn history(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<CorrectiveAction>, DisciplineError> {
        self.ensure_employee(employee_id)?;
        let mut actions = self.repository.for_employee(employee_id)?;
        actions.sort_by(|left, right| {
            right
                .violation_date
                .cmp(&left.violation_date)
                .then_with(|| right.created_at.cmp(&left.created_at))
        });
        Ok(actions)
    }

    /// Employee signs off on a pending action.
    pub fn acknowledge(
        &self,
        id: &CorrectiveActionId,
        employee_signature: SignatureArtifact,
        at: DateTime<Utc>,
    ) -> Result<CorrectiveAction, DisciplineError> {
        check_signature(Some(&employee_signature))?;
        self.transition(id, CorrectiveActionStatus::Acknowledged, |record| {
            record.employee_response = Some(EmployeeResponse {
                signature: Some(employee_signature),
                comment: None,
                responded_at: at,
            });
        })
    }

    /// Employee contests a pending or acknowledged action.
    pub fn dispute(
        &self,
        id: &CorrectiveActionId,
        comment: String,
        at: DateTime<Utc>,
    ) -> Result<CorrectiveAction, DisciplineError> {
        require_text(&comment, "comment")?;
        self.transition(id, CorrectiveActionStatus::Disputed, |record| {
            let signature = record
                .employee_response
                .take()
                .and_then(|response| response.signature);
            record.employee_response = Some(EmployeeResponse {
                signature,
                comment: Some(comment),
                responded_at: at,
            });
        })
    }

    /// Cancel an action. Voided actions stop counting toward ledger totals; the stored
    /// discipline level of other actions is left untouched.
    pub fn void(
        &self,
        id: &CorrectiveActionId,
        reason: String,
        voided_by: EmployeeId,
        at: DateTime<Utc>,
    ) -> Result<CorrectiveAction, DisciplineError> {
        require_text(&reason, "reason")?;
        self.transition(id, CorrectiveActionStatus::Voided, |record| {
            record.void_record = Some(VoidRecord {
                reason,
                voided_by_id: voided_by,
                voided_at: at,
            });
        })
    }

    fn transition(
        &self,
        id: &CorrectiveActionId,
        to: CorrectiveActionStatus,
        apply: impl FnOnce(&mut CorrectiveAction),
    ) -> Result<CorrectiveAction, DisciplineError> {
        let mut record = self.get(id)?;
        let from = record.status;
        if !transition_allowed(from, to) {
            return Err(ValidationError::InvalidTransition { from, to }.into());
        }

        record.status = to;
        apply(&mut record);
        self.repository.update(record.clone(), from)?;

        info!(
            id = %record.id.0,
            from = from.label(),
            to = to.label(),
            "corrective action status changed"
        );
        Ok(record)
    }

    fn decide(
        &self,
        selection: &ViolationSelection,
        category: &ViolationCategory,
        as_of: NaiveDate,
    ) -> Result<DisciplinePreview, DisciplineError> {
        check_adjustment_range(
            selection.has_mitigating,
            selection.points_adjusted,
            category.default_points,
        )?;
        let effective = effective_points(
            selection.has_mitigating,
            selection.points_adjusted,
            category.default_points,
        );
        let current = self.ledger.current_points(&selection.employee_id, as_of)?;
        Ok(self.policy.decide(current, effective, category.severity))
    }

    fn ensure_employee(&self, employee_id: &EmployeeId) -> Result<(), DisciplineError> {
        match self.directory.fetch(employee_id)? {
            Some(_) => Ok(()),
            None => Err(DisciplineError::not_found("employee", &employee_id.0)),
        }
    }
}

fn transition_allowed(from: CorrectiveActionStatus, to: CorrectiveActionStatus) -> bool {
    use CorrectiveActionStatus::*;

    matches!(
        (from, to),
        (PendingSignature, Acknowledged)
            | (PendingSignature, Disputed)
            | (Acknowledged, Disputed)
            | (PendingSignature, Voided)
            | (Acknowledged, Voided)
            | (Disputed, Voided)
    )
}

/// Error raised by the corrective action service.
#[derive(Debug, thiserror::Error)]
pub enum DisciplineError {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl DisciplineError {
    fn not_found(entity: &'static str, id: &str) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Only an unavailable store is worth retrying, and that decision belongs to the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Repository(RepositoryError::Unavailable(_)))
    }
}

impl From<CatalogError> for DisciplineError {
    fn from(value: CatalogError) -> Self {
        match value {
            CatalogError::NotFound(id) => Self::not_found("violation category", &id.0),
        }
    }
}
