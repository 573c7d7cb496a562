use std::ops::RangeInclusive;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for staff members (subjects and issuers of corrective actions).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

/// Identifier wrapper for a residential house; only used as a location tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HouseId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ViolationCategoryId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CorrectiveActionId(pub String);

/// Severity tier a violation category belongs to, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Minor,
    Moderate,
    Serious,
    Critical,
    ImmediateTermination,
}

impl Severity {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Minor,
            Self::Moderate,
            Self::Serious,
            Self::Critical,
            Self::ImmediateTermination,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Minor => "Minor",
            Self::Moderate => "Moderate",
            Self::Serious => "Serious",
            Self::Critical => "Critical",
            Self::ImmediateTermination => "Immediate Termination",
        }
    }

    /// Customary default-point range for categories in this tier. Advisory only.
    pub fn conventional_points(self) -> Option<RangeInclusive<i32>> {
        match self {
            Self::Minor => Some(1..=2),
            Self::Moderate => Some(3..=4),
            Self::Serious => Some(5..=6),
            Self::Critical => Some(8..=10),
            Self::ImmediateTermination => None,
        }
    }

    /// Terminal tiers end employment regardless of the accumulated total.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::ImmediateTermination)
    }
}

/// Seeded reference record describing one kind of policy violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationCategory {
    pub id: ViolationCategoryId,
    pub category_name: String,
    pub severity: Severity,
    pub default_points: i32,
    pub display_order: u32,
    pub is_active: bool,
}

/// Escalation tier recorded on a corrective action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisciplineLevel {
    Coaching,
    VerbalWarning,
    WrittenWarning,
    FinalWarning,
    Pip,
    Termination,
}

impl DisciplineLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Coaching => "Coaching",
            Self::VerbalWarning => "Verbal Warning",
            Self::WrittenWarning => "Written Warning",
            Self::FinalWarning => "Final Warning",
            Self::Pip => "Performance Improvement Plan",
            Self::Termination => "Termination",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectiveActionStatus {
    PendingSignature,
    Acknowledged,
    Disputed,
    Voided,
}

impl CorrectiveActionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::PendingSignature => "pending_signature",
            Self::Acknowledged => "acknowledged",
            Self::Disputed => "disputed",
            Self::Voided => "voided",
        }
    }
}

/// Captured signature (typically an encoded image). Contents are never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignatureArtifact(pub String);

impl SignatureArtifact {
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Employee-side response to a corrective action (acknowledgement or dispute).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<SignatureArtifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub responded_at: DateTime<Utc>,
}

/// Audit trail for a voided action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoidRecord {
    pub reason: String,
    pub voided_by_id: EmployeeId,
    pub voided_at: DateTime<Utc>,
}

/// Persisted corrective action, committed together with the supervisor signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectiveAction {
    pub id: CorrectiveActionId,
    pub employee_id: EmployeeId,
    pub house_id: Option<HouseId>,
    pub violation_category_id: ViolationCategoryId,
    pub violation_date: NaiveDate,
    pub violation_time: Option<NaiveTime>,
    pub incident_description: String,
    pub has_mitigating: bool,
    pub mitigating_circumstances: Option<String>,
    pub points_assigned: i32,
    pub points_adjusted: Option<i32>,
    pub adjustment_reason: Option<String>,
    pub discipline_level: DisciplineLevel,
    pub status: CorrectiveActionStatus,
    pub corrective_expectations: Vec<String>,
    pub consequences_text: String,
    pub pip_scheduled: bool,
    pub pip_date: Option<NaiveDate>,
    pub supervisor_signature: SignatureArtifact,
    pub issued_by_id: EmployeeId,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_response: Option<EmployeeResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub void_record: Option<VoidRecord>,
}

impl CorrectiveAction {
    /// Points this action carries: the mitigated value when one was chosen.
    pub fn effective_points(&self) -> i32 {
        effective_points(
            self.has_mitigating,
            self.points_adjusted,
            self.points_assigned,
        )
    }

    /// Contribution to a ledger sum. Voided actions contribute nothing.
    pub fn ledger_points(&self) -> i32 {
        if self.status == CorrectiveActionStatus::Voided {
            0
        } else {
            self.effective_points()
        }
    }

    pub fn is_voided(&self) -> bool {
        self.status == CorrectiveActionStatus::Voided
    }

    pub fn summary_view(&self) -> CorrectiveActionView {
        CorrectiveActionView {
            id: self.id.clone(),
            employee_id: self.employee_id.clone(),
            violation_category_id: self.violation_category_id.clone(),
            violation_date: self.violation_date,
            status: self.status.label(),
            discipline_level: self.discipline_level.label(),
            effective_points: self.effective_points(),
            pip_scheduled: self.pip_scheduled,
        }
    }
}

pub(crate) fn effective_points(
    has_mitigating: bool,
    points_adjusted: Option<i32>,
    points_assigned: i32,
) -> i32 {
    match points_adjusted {
        Some(adjusted) if has_mitigating => adjusted,
        _ => points_assigned,
    }
}

/// Compact representation of a corrective action for listings and API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorrectiveActionView {
    pub id: CorrectiveActionId,
    pub employee_id: EmployeeId,
    pub violation_category_id: ViolationCategoryId,
    pub violation_date: NaiveDate,
    pub status: &'static str,
    pub discipline_level: &'static str,
    pub effective_points: i32,
    pub pip_scheduled: bool,
}

/// Derived, never-persisted snapshot of an employee's rolling-window standing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeePointState {
    pub employee_id: EmployeeId,
    pub as_of: NaiveDate,
    pub window_start: NaiveDate,
    pub current_points: i32,
    pub active_actions: usize,
    pub standing: DisciplineLevel,
}

/// Minimal employee directory entry; used to confirm the subject exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSummary {
    pub id: EmployeeId,
    pub display_name: String,
}

/// Everything the four workflow stages collect, as submitted for persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectiveActionInput {
    pub employee_id: EmployeeId,
    #[serde(default)]
    pub house_id: Option<HouseId>,
    pub violation_category_id: ViolationCategoryId,
    pub violation_date: NaiveDate,
    #[serde(default)]
    pub violation_time: Option<NaiveTime>,
    pub incident_description: String,
    #[serde(default)]
    pub has_mitigating: bool,
    #[serde(default)]
    pub mitigating_circumstances: Option<String>,
    #[serde(default)]
    pub points_adjusted: Option<i32>,
    #[serde(default)]
    pub adjustment_reason: Option<String>,
    #[serde(default)]
    pub corrective_expectations: Vec<String>,
    #[serde(default)]
    pub consequences_text: Option<String>,
    #[serde(default)]
    pub pip_scheduled: bool,
    #[serde(default)]
    pub pip_date: Option<NaiveDate>,
    #[serde(default)]
    pub supervisor_signature: Option<SignatureArtifact>,
}

impl CorrectiveActionInput {
    pub fn selection(&self) -> ViolationSelection {
        ViolationSelection {
            employee_id: self.employee_id.clone(),
            violation_category_id: self.violation_category_id.clone(),
            has_mitigating: self.has_mitigating,
            points_adjusted: self.points_adjusted,
        }
    }
}

/// The subset of an input needed to preview the discipline outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationSelection {
    pub employee_id: EmployeeId,
    pub violation_category_id: ViolationCategoryId,
    #[serde(default)]
    pub has_mitigating: bool,
    #[serde(default)]
    pub points_adjusted: Option<i32>,
}
