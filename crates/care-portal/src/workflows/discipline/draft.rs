use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::domain::{
    CorrectiveActionInput, EmployeeId, HouseId, SignatureArtifact, ViolationCategory,
    ViolationCategoryId,
};
use super::policy::{DisciplinePolicy, DEFAULT_CONSEQUENCES_TEXT};
use super::validation::{
    check_adjustment_range, check_adjustment_reason, check_description, check_pip,
    check_signature, is_blank, is_blank_opt, ValidationError,
};

/// The four linear stages of issuing a corrective action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    SelectingViolation,
    DescribingIncident,
    Reviewing,
    Signing,
}

impl WorkflowStage {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::SelectingViolation,
            Self::DescribingIncident,
            Self::Reviewing,
            Self::Signing,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::SelectingViolation => "Select Violation",
            Self::DescribingIncident => "Describe Incident",
            Self::Reviewing => "Review",
            Self::Signing => "Sign",
        }
    }

    pub const fn next(self) -> Option<Self> {
        match self {
            Self::SelectingViolation => Some(Self::DescribingIncident),
            Self::DescribingIncident => Some(Self::Reviewing),
            Self::Reviewing => Some(Self::Signing),
            Self::Signing => None,
        }
    }

    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::SelectingViolation => None,
            Self::DescribingIncident => Some(Self::SelectingViolation),
            Self::Reviewing => Some(Self::DescribingIncident),
            Self::Signing => Some(Self::Reviewing),
        }
    }
}

/// In-progress corrective action. Each stage's fields are checked once, here, before the
/// draft may move on; stepping back never discards data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectiveActionDraft {
    stage: WorkflowStage,
    pub employee_id: Option<EmployeeId>,
    pub house_id: Option<HouseId>,
    pub violation_category_id: Option<ViolationCategoryId>,
    pub points_assigned: Option<i32>,
    pub violation_date: Option<NaiveDate>,
    pub violation_time: Option<NaiveTime>,
    pub incident_description: String,
    pub has_mitigating: bool,
    pub mitigating_circumstances: Option<String>,
    pub points_adjusted: Option<i32>,
    pub adjustment_reason: Option<String>,
    pub corrective_expectations: Vec<String>,
    pub consequences_text: String,
    pub pip_scheduled: bool,
    pub pip_date: Option<NaiveDate>,
    pub supervisor_signature: Option<SignatureArtifact>,
}

impl Default for CorrectiveActionDraft {
    fn default() -> Self {
        Self {
            stage: WorkflowStage::SelectingViolation,
            employee_id: None,
            house_id: None,
            violation_category_id: None,
            points_assigned: None,
            violation_date: None,
            violation_time: None,
            incident_description: String::new(),
            has_mitigating: false,
            mitigating_circumstances: None,
            points_adjusted: None,
            adjustment_reason: None,
            corrective_expectations: Vec::new(),
            consequences_text: DEFAULT_CONSEQUENCES_TEXT.to_string(),
            pip_scheduled: false,
            pip_date: None,
            supervisor_signature: None,
        }
    }
}

impl CorrectiveActionDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> WorkflowStage {
        self.stage
    }

    /// Pick the violation; copies the category's default points as the assigned value.
    pub fn select_violation(&mut self, category: &ViolationCategory) {
        self.violation_category_id = Some(category.id.clone());
        self.points_assigned = Some(category.default_points);
    }

    /// Required fields still absent for `stage`.
    pub fn missing_for(&self, stage: WorkflowStage) -> Vec<&'static str> {
        let mut missing = Vec::new();
        match stage {
            WorkflowStage::SelectingViolation => {
                if self.employee_id.as_ref().map_or(true, |id| is_blank(&id.0)) {
                    missing.push("employee_id");
                }
                if self
                    .violation_category_id
                    .as_ref()
                    .map_or(true, |id| is_blank(&id.0))
                {
                    missing.push("violation_category_id");
                }
                if self.violation_date.is_none() {
                    missing.push("violation_date");
                }
            }
            WorkflowStage::DescribingIncident => {
                if is_blank(&self.incident_description) {
                    missing.push("incident_description");
                }
                if self.has_mitigating
                    && self.points_adjusted.is_some()
                    && is_blank_opt(self.adjustment_reason.as_deref())
                {
                    missing.push("adjustment_reason");
                }
            }
            WorkflowStage::Reviewing => {
                if self.pip_scheduled && self.pip_date.is_none() {
                    missing.push("pip_date");
                }
            }
            WorkflowStage::Signing => {
                if self
                    .supervisor_signature
                    .as_ref()
                    .map_or(true, SignatureArtifact::is_blank)
                {
                    missing.push("supervisor_signature");
                }
            }
        }
        missing
    }

    /// Move to the next stage when the current one is complete.
    pub fn advance(&mut self, policy: &DisciplinePolicy) -> Result<WorkflowStage, ValidationError> {
        let next = self.stage.next().ok_or(ValidationError::NoFurtherStage)?;
        self.check_stage(self.stage, policy)?;
        self.stage = next;
        Ok(next)
    }

    /// Step back one stage. A no-op on the first stage.
    pub fn back(&mut self) -> WorkflowStage {
        if let Some(previous) = self.stage.previous() {
            self.stage = previous;
        }
        self.stage
    }

    /// Finish the signing stage and hand back the input to persist.
    pub fn into_input(
        self,
        policy: &DisciplinePolicy,
    ) -> Result<CorrectiveActionInput, ValidationError> {
        if self.stage != WorkflowStage::Signing {
            return Err(ValidationError::IncompleteStage {
                stage: self.stage,
                missing: self.missing_for(self.stage),
            });
        }
        for stage in WorkflowStage::ordered() {
            self.check_stage(stage, policy)?;
        }

        let consequences_text = if is_blank(&self.consequences_text) {
            None
        } else {
            Some(self.consequences_text)
        };

        // check_stage(SelectingViolation) guarantees these are present.
        let (Some(employee_id), Some(violation_category_id), Some(violation_date)) = (
            self.employee_id,
            self.violation_category_id,
            self.violation_date,
        ) else {
            return Err(ValidationError::MissingField {
                field: "employee_id",
            });
        };

        Ok(CorrectiveActionInput {
            employee_id,
            house_id: self.house_id,
            violation_category_id,
            violation_date,
            violation_time: self.violation_time,
            incident_description: self.incident_description,
            has_mitigating: self.has_mitigating,
            mitigating_circumstances: self.mitigating_circumstances,
            points_adjusted: if self.has_mitigating {
                self.points_adjusted
            } else {
                None
            },
            adjustment_reason: self.adjustment_reason,
            corrective_expectations: self.corrective_expectations,
            consequences_text,
            pip_scheduled: self.pip_scheduled,
            pip_date: self.pip_date,
            supervisor_signature: self.supervisor_signature,
        })
    }

    fn check_stage(
        &self,
        stage: WorkflowStage,
        policy: &DisciplinePolicy,
    ) -> Result<(), ValidationError> {
        let missing = self.missing_for(stage);
        if !missing.is_empty() {
            return Err(ValidationError::IncompleteStage { stage, missing });
        }

        match stage {
            WorkflowStage::SelectingViolation => Ok(()),
            WorkflowStage::DescribingIncident => {
                check_description(&self.incident_description, policy.min_incident_chars)?;
                check_adjustment_reason(
                    self.has_mitigating,
                    self.points_adjusted,
                    self.adjustment_reason.as_deref(),
                )?;
                if let Some(assigned) = self.points_assigned {
                    check_adjustment_range(self.has_mitigating, self.points_adjusted, assigned)?;
                }
                Ok(())
            }
            WorkflowStage::Reviewing => check_pip(self.pip_scheduled, self.pip_date),
            WorkflowStage::Signing => check_signature(self.supervisor_signature.as_ref()),
        }
    }
}
