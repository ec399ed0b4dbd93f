use thiserror::Error;

use crate::services::attempt_timing::WindowViolation;
use crate::services::judge::JudgeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCategory {
    Validation,
    Authorization,
    StateConflict,
    NotFound,
    Dependency,
    Storage,
}

#[derive(Debug, Error)]
pub(crate) enum GradingError {
    #[error("{0}")]
    Validation(String),
    #[error("user is not a student")]
    NotAStudent,
    #[error("only teachers can access this resource")]
    NotATeacher,
    #[error("student is not enrolled in the batch containing this question")]
    NotEnrolled,
    #[error("you don't have permission to access this batch")]
    NotOwner,
    #[error("{0}")]
    OutOfWindow(WindowViolation),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("no test cases found for this question")]
    NoTestCases,
    #[error("no attempt record found, please open the question first")]
    NoAttemptRecord,
    #[error("this attempt has already been submitted")]
    AlreadySubmitted,
    #[error("final submission has already been made for this question")]
    AlreadyFinalized,
    #[error("this attempt has already been submitted for grading")]
    AlreadyGraded,
    #[error("code judge unavailable: {0}")]
    Judge(#[from] JudgeError),
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl GradingError {
    pub(crate) fn category(&self) -> ErrorCategory {
        match self {
            GradingError::Validation(_) | GradingError::NotAStudent => ErrorCategory::Validation,
            GradingError::NotATeacher
            | GradingError::NotEnrolled
            | GradingError::NotOwner
            | GradingError::OutOfWindow(_) => ErrorCategory::Authorization,
            GradingError::NoAttemptRecord
            | GradingError::AlreadySubmitted
            | GradingError::AlreadyFinalized
            | GradingError::AlreadyGraded => ErrorCategory::StateConflict,
            GradingError::NotFound(_) | GradingError::NoTestCases => ErrorCategory::NotFound,
            GradingError::Judge(_) => ErrorCategory::Dependency,
            GradingError::Storage(_) => ErrorCategory::Storage,
        }
    }
}
