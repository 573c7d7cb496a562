use chrono::NaiveDate;

use super::domain::{CorrectiveActionStatus, DisciplineLevel, SignatureArtifact};
use super::draft::WorkflowStage;

/// Caller-correctable problems with a corrective action request. Nothing is written when
/// one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },
    #[error("incident description must be at least {minimum} characters (found {found})")]
    IncidentDescriptionTooShort { minimum: usize, found: usize },
    #[error("adjusted points {adjusted} must be between 0 and the assigned {assigned}")]
    AdjustmentOutOfRange { adjusted: i32, assigned: i32 },
    #[error("a point adjustment requires an adjustment reason")]
    MissingAdjustmentReason,
    #[error("supervisor signature is required")]
    MissingSignature,
    #[error("a PIP date is required when a PIP is scheduled")]
    MissingPipDate,
    #[error("a PIP can only be scheduled on a final warning outcome (derived {})", .level.label())]
    PipNotOffered { level: DisciplineLevel },
    #[error("cannot leave {} stage, missing: {}", .stage.label(), .missing.join(", "))]
    IncompleteStage {
        stage: WorkflowStage,
        missing: Vec<&'static str>,
    },
    #[error("workflow is already at the signing stage")]
    NoFurtherStage,
    #[error("cannot move corrective action from {} to {}", .from.label(), .to.label())]
    InvalidTransition {
        from: CorrectiveActionStatus,
        to: CorrectiveActionStatus,
    },
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub(crate) fn is_blank_opt(value: Option<&str>) -> bool {
    value.map(is_blank).unwrap_or(true)
}

pub(crate) fn require_text(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if is_blank(value) {
        Err(ValidationError::MissingField { field })
    } else {
        Ok(())
    }
}

pub(crate) fn description_length(description: &str) -> usize {
    description.trim().chars().count()
}

pub(crate) fn check_description(description: &str, minimum: usize) -> Result<(), ValidationError> {
    let found = description_length(description);
    if found < minimum {
        return Err(ValidationError::IncidentDescriptionTooShort { minimum, found });
    }
    Ok(())
}

/// Reason presence only; the range check needs the category's assigned points.
pub(crate) fn check_adjustment_reason(
    has_mitigating: bool,
    points_adjusted: Option<i32>,
    adjustment_reason: Option<&str>,
) -> Result<(), ValidationError> {
    if has_mitigating && points_adjusted.is_some() && is_blank_opt(adjustment_reason) {
        return Err(ValidationError::MissingAdjustmentReason);
    }
    Ok(())
}

pub(crate) fn check_adjustment_range(
    has_mitigating: bool,
    points_adjusted: Option<i32>,
    points_assigned: i32,
) -> Result<(), ValidationError> {
    match points_adjusted {
        Some(adjusted) if has_mitigating && !(0..=points_assigned).contains(&adjusted) => {
            Err(ValidationError::AdjustmentOutOfRange {
                adjusted,
                assigned: points_assigned,
            })
        }
        _ => Ok(()),
    }
}

pub(crate) fn check_signature(
    signature: Option<&SignatureArtifact>,
) -> Result<(), ValidationError> {
    match signature {
        Some(signature) if !signature.is_blank() => Ok(()),
        _ => Err(ValidationError::MissingSignature),
    }
}

pub(crate) fn check_pip(
    pip_scheduled: bool,
    pip_date: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    if pip_scheduled && pip_date.is_none() {
        return Err(ValidationError::MissingPipDate);
    }
    Ok(())
}
