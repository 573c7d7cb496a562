use serde::{Deserialize, Serialize};

use super::domain::{DisciplineLevel, Severity};

pub const DEFAULT_WINDOW_DAYS: i64 = 90;
pub const DEFAULT_MIN_INCIDENT_CHARS: usize = 50;
pub const DEFAULT_CONSEQUENCES_TEXT: &str = "Failure to meet the expectations outlined above \
may result in further disciplinary action, up to and including termination of employment.";

/// Accumulated-point boundaries for each escalation tier (inclusive lower bounds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationThresholds {
    pub verbal_warning: i32,
    pub written_warning: i32,
    pub final_warning: i32,
    pub termination: i32,
}

impl Default for EscalationThresholds {
    fn default() -> Self {
        Self {
            verbal_warning: 5,
            written_warning: 10,
            final_warning: 14,
            termination: 18,
        }
    }
}

impl DisciplineLevel {
    /// Step function from an accumulated total to its tier. Never yields `Pip`; a PIP is
    /// only recorded when a supervisor schedules one on a final-warning outcome.
    pub fn for_total(total: i32, thresholds: &EscalationThresholds) -> Self {
        if total >= thresholds.termination {
            Self::Termination
        } else if total >= thresholds.final_warning {
            Self::FinalWarning
        } else if total >= thresholds.written_warning {
            Self::WrittenWarning
        } else if total >= thresholds.verbal_warning {
            Self::VerbalWarning
        } else {
            Self::Coaching
        }
    }
}

/// Policy dial backing the workflow: rolling window, description rule, thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisciplinePolicy {
    pub window_days: i64,
    pub min_incident_chars: usize,
    pub thresholds: EscalationThresholds,
}

impl DisciplinePolicy {
    pub fn new(window_days: i64, min_incident_chars: usize) -> Self {
        let window_days = if window_days > 0 {
            window_days
        } else {
            DEFAULT_WINDOW_DAYS
        };

        Self {
            window_days,
            min_incident_chars,
            thresholds: EscalationThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: EscalationThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Derive the outcome of adding `effective_points` to `current_points`.
    pub fn decide(
        &self,
        current_points: i32,
        effective_points: i32,
        severity: Severity,
    ) -> DisciplinePreview {
        let new_total = current_points.saturating_add(effective_points);
        let discipline_level = if severity.is_terminal() {
            DisciplineLevel::Termination
        } else {
            DisciplineLevel::for_total(new_total, &self.thresholds)
        };

        let mut warnings = Vec::new();
        if discipline_level == DisciplineLevel::Termination {
            warnings.push(EscalationWarning::TerminationLevel { new_total });
        } else if new_total >= self.thresholds.final_warning {
            warnings.push(EscalationWarning::ApproachingTermination {
                new_total,
                termination_at: self.thresholds.termination,
            });
        }

        DisciplinePreview {
            current_points,
            effective_points,
            new_total,
            discipline_level,
            pip_offered: discipline_level == DisciplineLevel::FinalWarning,
            warnings,
        }
    }
}

impl Default for DisciplinePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_DAYS, DEFAULT_MIN_INCIDENT_CHARS)
    }
}

/// What the supervisor sees before signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisciplinePreview {
    pub current_points: i32,
    pub effective_points: i32,
    pub new_total: i32,
    pub discipline_level: DisciplineLevel,
    pub pip_offered: bool,
    pub warnings: Vec<EscalationWarning>,
}

impl DisciplinePreview {
    /// Level stored on the record once the supervisor's PIP choice is known.
    pub fn recorded_level(&self, pip_scheduled: bool) -> DisciplineLevel {
        if pip_scheduled && self.pip_offered {
            DisciplineLevel::Pip
        } else {
            self.discipline_level
        }
    }
}

/// Pre-commit warnings for outcomes at or near termination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EscalationWarning {
    ApproachingTermination { new_total: i32, termination_at: i32 },
    TerminationLevel { new_total: i32 },
}

impl EscalationWarning {
    pub fn message(&self) -> String {
        match self {
            EscalationWarning::ApproachingTermination {
                new_total,
                termination_at,
            } => format!(
                "new total of {new_total} points is within {} of termination ({termination_at})",
                termination_at - new_total
            ),
            EscalationWarning::TerminationLevel { new_total } => {
                format!("this action results in termination (new total {new_total} points)")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_map_boundaries() {
        let thresholds = EscalationThresholds::default();
        let cases = [
            (0, DisciplineLevel::Coaching),
            (4, DisciplineLevel::Coaching),
            (5, DisciplineLevel::VerbalWarning),
            (9, DisciplineLevel::VerbalWarning),
            (10, DisciplineLevel::WrittenWarning),
            (13, DisciplineLevel::WrittenWarning),
            (14, DisciplineLevel::FinalWarning),
            (17, DisciplineLevel::FinalWarning),
            (18, DisciplineLevel::Termination),
            (40, DisciplineLevel::Termination),
        ];

        for (total, expected) in cases {
            assert_eq!(
                DisciplineLevel::for_total(total, &thresholds),
                expected,
                "total {total}"
            );
        }
    }

    #[test]
    fn terminal_category_overrides_points() {
        let preview = DisciplinePolicy::default().decide(0, 0, Severity::ImmediateTermination);
        assert_eq!(preview.discipline_level, DisciplineLevel::Termination);
        assert!(!preview.pip_offered);
        assert_eq!(
            preview.warnings,
            vec![EscalationWarning::TerminationLevel { new_total: 0 }]
        );
    }

    #[test]
    fn final_warning_offers_pip_and_warns() {
        let preview = DisciplinePolicy::default().decide(12, 3, Severity::Critical);
        assert_eq!(preview.new_total, 15);
        assert_eq!(preview.discipline_level, DisciplineLevel::FinalWarning);
        assert!(preview.pip_offered);
        assert_eq!(preview.recorded_level(true), DisciplineLevel::Pip);
        assert_eq!(preview.recorded_level(false), DisciplineLevel::FinalWarning);
        assert!(preview.warnings[0].message().contains("within 3"));
    }

    #[test]
    fn new_total_saturates_at_the_integer_ceiling() {
        let preview = DisciplinePolicy::default().decide(i32::MAX, 5, Severity::Serious);
        assert_eq!(preview.new_total, i32::MAX);
        assert_eq!(preview.discipline_level, DisciplineLevel::Termination);
    }

    #[test]
    fn non_positive_window_falls_back_to_default() {
        let policy = DisciplinePolicy::new(0, 50);
        assert_eq!(policy.window_days, DEFAULT_WINDOW_DAYS);
    }
}
