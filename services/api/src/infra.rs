use care_portal::workflows::discipline::{
    CorrectiveAction, CorrectiveActionId, CorrectiveActionRepository, CorrectiveActionStatus,
    EmployeeDirectory, EmployeeId, EmployeeSummary, RepositoryError,
};
use chrono::{NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

type Records = HashMap<CorrectiveActionId, CorrectiveAction>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local record store. Insert and update each take the lock once, so a record and
/// its signature are always written together.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCorrectiveActionRepository {
    records: Arc<Mutex<Records>>,
}

impl InMemoryCorrectiveActionRepository {
    fn lock(&self) -> Result<MutexGuard<'_, Records>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("record store lock poisoned".to_string()))
    }
}

impl CorrectiveActionRepository for InMemoryCorrectiveActionRepository {
    fn insert(&self, record: CorrectiveAction) -> Result<CorrectiveAction, RepositoryError> {
        let mut guard = self.lock()?;
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
        let mut guard = self.lock()?;
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
        let guard = self.lock()?;
        Ok(guard.get(id).cloned())
    }

    fn active_since(
        &self,
        employee_id: &EmployeeId,
        since: NaiveDate,
    ) -> Result<Vec<CorrectiveAction>, RepositoryError> {
        let guard = self.lock()?;
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
        let guard = self.lock()?;
        Ok(guard
            .values()
            .filter(|record| &record.employee_id == employee_id)
            .cloned()
            .collect())
    }
}

/// Staff directory stand-in for the portal's employee records.
#[derive(Default, Clone)]
pub(crate) struct InMemoryEmployeeDirectory {
    employees: Arc<HashMap<EmployeeId, EmployeeSummary>>,
}

impl InMemoryEmployeeDirectory {
    pub(crate) fn with_employees(employees: impl IntoIterator<Item = EmployeeSummary>) -> Self {
        let employees = employees
            .into_iter()
            .map(|employee| (employee.id.clone(), employee))
            .collect();
        Self {
            employees: Arc::new(employees),
        }
    }

    pub(crate) fn demo_staff() -> Self {
        Self::with_employees(
            [
                ("hm-001", "House Manager, Maple House"),
                ("dsp-101", "Direct Support Professional, Maple House"),
                ("dsp-102", "Direct Support Professional, Cedar House"),
                ("dsp-103", "Direct Support Professional, Birch House"),
            ]
            .into_iter()
            .map(|(id, name)| EmployeeSummary {
                id: EmployeeId(id.to_string()),
                display_name: name.to_string(),
            }),
        )
    }
}

impl EmployeeDirectory for InMemoryEmployeeDirectory {
    fn fetch(&self, id: &EmployeeId) -> Result<Option<EmployeeSummary>, RepositoryError> {
        Ok(self.employees.get(id).cloned())
    }
}

/// Every "today" in the host is the UTC calendar date, matching the service's clock.
pub(crate) fn as_of_or_today(as_of: Option<NaiveDate>) -> NaiveDate {
    as_of.unwrap_or_else(|| Utc::now().date_naive())
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_as_of_wins_and_default_is_the_utc_date() {
        let pinned = NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date");
        assert_eq!(as_of_or_today(Some(pinned)), pinned);

        let before = Utc::now().date_naive();
        let defaulted = as_of_or_today(None);
        let after = Utc::now().date_naive();
        assert!(defaulted == before || defaulted == after);
    }

    #[test]
    fn parse_date_rejects_other_formats() {
        assert!(parse_date("2025-03-14").is_ok());
        assert!(parse_date("03/14/2025").is_err());
    }

    #[test]
    fn fetch_of_unknown_id_is_none() {
        let repository = InMemoryCorrectiveActionRepository::default();
        let missing = repository.fetch(&CorrectiveActionId("ca-x".to_string()));
        assert!(matches!(missing, Ok(None)));
    }

    #[test]
    fn demo_directory_knows_house_manager() {
        let directory = InMemoryEmployeeDirectory::demo_staff();
        let manager = directory
            .fetch(&EmployeeId("hm-001".to_string()))
            .expect("lookup")
            .expect("present");
        assert!(manager.display_name.contains("House Manager"));
    }
}
