use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "userrole", rename_all = "lowercase")]
pub(crate) enum UserRole {
    Student,
    Teacher,
}

/// Persisted state of an attempt. `InProgress` is the only non-terminal
/// state; every other variant is reached exactly once, at final submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "attemptstatus", rename_all = "snake_case")]
pub(crate) enum AttemptStatus {
    InProgress,
    Correct,
    Incorrect,
    PartiallyCorrect,
    TimedOut,
}

impl AttemptStatus {
    pub(crate) fn is_terminal(self) -> bool {
        !matches!(self, AttemptStatus::InProgress)
    }

    pub(crate) fn can_transition_to(self, next: AttemptStatus) -> bool {
        matches!(self, AttemptStatus::InProgress) && next.is_terminal()
    }
}

/// Verdict of a graded evaluation. Convertible into a terminal
/// [`AttemptStatus`], never into `InProgress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum GradingOutcome {
    Correct,
    Incorrect,
    PartiallyCorrect,
    TimedOut,
}

impl GradingOutcome {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            GradingOutcome::Correct => "correct",
            GradingOutcome::Incorrect => "incorrect",
            GradingOutcome::PartiallyCorrect => "partially_correct",
            GradingOutcome::TimedOut => "timed_out",
        }
    }
}

impl From<GradingOutcome> for AttemptStatus {
    fn from(outcome: GradingOutcome) -> Self {
        match outcome {
            GradingOutcome::Correct => AttemptStatus::Correct,
            GradingOutcome::Incorrect => AttemptStatus::Incorrect,
            GradingOutcome::PartiallyCorrect => AttemptStatus::PartiallyCorrect,
            GradingOutcome::TimedOut => AttemptStatus::TimedOut,
        }
    }
}
