use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::workflows::discipline::domain::{
    CorrectiveAction, CorrectiveActionId, CorrectiveActionInput, CorrectiveActionStatus,
    DisciplineLevel, EmployeeId, EmployeeSummary, SignatureArtifact, ViolationCategoryId,
};
use crate::workflows::discipline::repository::{
    CorrectiveActionRepository, EmployeeDirectory, RepositoryError,
};
use crate::workflows::discipline::{CorrectiveActionService, DisciplinePolicy, ViolationCatalog};

pub(super) const INCIDENT: &str = "Staff member was observed using a personal phone while \
assisting a resident with evening medications in the dining room.";

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid date")
}

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 30, 15, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn days_ago(days: i64) -> NaiveDate {
    today() - Duration::days(days)
}

pub(super) fn employee() -> EmployeeId {
    EmployeeId("emp-100".to_string())
}

pub(super) fn supervisor() -> EmployeeId {
    EmployeeId("emp-001".to_string())
}

pub(super) fn category(id: &str) -> ViolationCategoryId {
    ViolationCategoryId(id.to_string())
}

pub(super) fn signature() -> SignatureArtifact {
    SignatureArtifact("data:image/png;base64,iVBORw0KGgo=".to_string())
}

pub(super) fn input(category_id: &str) -> CorrectiveActionInput {
    CorrectiveActionInput {
        employee_id: employee(),
        house_id: None,
        violation_category_id: category(category_id),
        violation_date: days_ago(1),
        violation_time: None,
        incident_description: INCIDENT.to_string(),
        has_mitigating: false,
        mitigating_circumstances: None,
        points_adjusted: None,
        adjustment_reason: None,
        corrective_expectations: vec!["Keep personal phones in the staff locker".to_string()],
        consequences_text: None,
        pip_scheduled: false,
        pip_date: None,
        supervisor_signature: Some(signature()),
    }
}

/// Stored action used to pre-load an employee's history.
pub(super) fn prior_action(id: &str, points: i32, violation_date: NaiveDate) -> CorrectiveAction {
    CorrectiveAction {
        id: CorrectiveActionId(id.to_string()),
        employee_id: employee(),
        house_id: None,
        violation_category_id: category("insubordination"),
        violation_date,
        violation_time: None,
        incident_description: INCIDENT.to_string(),
        has_mitigating: false,
        mitigating_circumstances: None,
        points_assigned: points,
        points_adjusted: None,
        adjustment_reason: None,
        discipline_level: DisciplineLevel::Coaching,
        status: CorrectiveActionStatus::PendingSignature,
        corrective_expectations: Vec::new(),
        consequences_text: String::new(),
        pip_scheduled: false,
        pip_date: None,
        supervisor_signature: signature(),
        issued_by_id: supervisor(),
        created_at: now() - Duration::days(30),
        employee_response: None,
        void_record: None,
    }
}

pub(super) fn build_service() -> (
    CorrectiveActionService<MemoryRepository, MemoryDirectory>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let directory = Arc::new(MemoryDirectory::with(&[employee(), supervisor()]));
    let service = CorrectiveActionService::new(
        repository.clone(),
        directory,
        Arc::new(ViolationCatalog::seeded()),
        DisciplinePolicy::default(),
    );
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    records: Arc<Mutex<HashMap<CorrectiveActionId, CorrectiveAction>>>,
}

impl MemoryRepository {
    pub(super) fn seed(&self, record: CorrectiveAction) {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .insert(record.id.clone(), record);
    }

    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

impl CorrectiveActionRepository for MemoryRepository {
    fn insert(&self, record: CorrectiveAction) -> Result<CorrectiveAction, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(
        &self,
        record: CorrectiveAction,
        expected: CorrectiveActionStatus,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        match guard.get(&record.id) {
            None => Err(RepositoryError::NotFound),
            Some(stored) if stored.status != expected => Err(RepositoryError::Conflict),
            Some(_) => {
                guard.insert(record.id.clone(), record);
                Ok(())
            }
        }
    }

    fn fetch(&self, id: &CorrectiveActionId) -> Result<Option<CorrectiveAction>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn active_since(
        &self,
        employee_id: &EmployeeId,
        since: NaiveDate,
    ) -> Result<Vec<CorrectiveAction>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| &record.employee_id == employee_id)
            .filter(|record| record.violation_date >= since && !record.is_voided())
            .cloned()
            .collect())
    }

    fn for_employee(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<CorrectiveAction>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| &record.employee_id == employee_id)
            .cloned()
            .collect())
    }
}

/// Store that ignores the void and date filters, to check the ledger re-applies them.
pub(super) struct LooseRepository(pub(super) Vec<CorrectiveAction>);

impl CorrectiveActionRepository for LooseRepository {
    fn insert(&self, _record: CorrectiveAction) -> Result<CorrectiveAction, RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn update(
        &self,
        _record: CorrectiveAction,
        _expected: CorrectiveActionStatus,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &CorrectiveActionId) -> Result<Option<CorrectiveAction>, RepositoryError> {
        Ok(None)
    }

    fn active_since(
        &self,
        _employee_id: &EmployeeId,
        _since: NaiveDate,
    ) -> Result<Vec<CorrectiveAction>, RepositoryError> {
        Ok(self.0.clone())
    }

    fn for_employee(
        &self,
        _employee_id: &EmployeeId,
    ) -> Result<Vec<CorrectiveAction>, RepositoryError> {
        Ok(self.0.clone())
    }
}

pub(super) struct UnavailableRepository;

impl CorrectiveActionRepository for UnavailableRepository {
    fn insert(&self, _record: CorrectiveAction) -> Result<CorrectiveAction, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(
        &self,
        _record: CorrectiveAction,
        _expected: CorrectiveActionStatus,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &CorrectiveActionId) -> Result<Option<CorrectiveAction>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn active_since(
        &self,
        _employee_id: &EmployeeId,
        _since: NaiveDate,
    ) -> Result<Vec<CorrectiveAction>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn for_employee(
        &self,
        _employee_id: &EmployeeId,
    ) -> Result<Vec<CorrectiveAction>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryDirectory {
    known: HashSet<EmployeeId>,
}

impl MemoryDirectory {
    pub(super) fn with(ids: &[EmployeeId]) -> Self {
        Self {
            known: ids.iter().cloned().collect(),
        }
    }
}

impl EmployeeDirectory for MemoryDirectory {
    fn fetch(&self, id: &EmployeeId) -> Result<Option<EmployeeSummary>, RepositoryError> {
        Ok(self.known.get(id).map(|id| EmployeeSummary {
            id: id.clone(),
            display_name: format!("Employee {}", id.0),
        }))
    }
}

/// Serves one fixed snapshot from `fetch`, like a reader that lost a race with a writer.
pub(super) struct StaleFetchRepository {
    pub(super) inner: Arc<MemoryRepository>,
    pub(super) snapshot: CorrectiveAction,
}

impl CorrectiveActionRepository for StaleFetchRepository {
    fn insert(&self, record: CorrectiveAction) -> Result<CorrectiveAction, RepositoryError> {
        self.inner.insert(record)
    }

    fn update(
        &self,
        record: CorrectiveAction,
        expected: CorrectiveActionStatus,
    ) -> Result<(), RepositoryError> {
        self.inner.update(record, expected)
    }

    fn fetch(&self, _id: &CorrectiveActionId) -> Result<Option<CorrectiveAction>, RepositoryError> {
        Ok(Some(self.snapshot.clone()))
    }

    fn active_since(
        &self,
        employee_id: &EmployeeId,
        since: NaiveDate,
    ) -> Result<Vec<CorrectiveAction>, RepositoryError> {
        self.inner.active_since(employee_id, since)
    }

    fn for_employee(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<CorrectiveAction>, RepositoryError> {
        self.inner.for_employee(employee_id)
    }
}
