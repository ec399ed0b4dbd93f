use serde::Serialize;

use crate::core::time::format_primitive;
use crate::db::models::{Attempt, User};
use crate::db::types::AttemptStatus;

/// Attempt state as seen by a teacher; students who never opened the
/// question report `not_attempted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ProgressStatus {
    NotAttempted,
    InProgress,
    Correct,
    Incorrect,
    PartiallyCorrect,
    TimedOut,
}

impl From<AttemptStatus> for ProgressStatus {
    fn from(status: AttemptStatus) -> Self {
        match status {
            AttemptStatus::InProgress => ProgressStatus::InProgress,
            AttemptStatus::Correct => ProgressStatus::Correct,
            AttemptStatus::Incorrect => ProgressStatus::Incorrect,
            AttemptStatus::PartiallyCorrect => ProgressStatus::PartiallyCorrect,
            AttemptStatus::TimedOut => ProgressStatus::TimedOut,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct StudentAttemptStatus {
    pub(crate) student_id: String,
    pub(crate) username: String,
    pub(crate) full_name: String,
    pub(crate) student_code: Option<String>,
    pub(crate) attempt_id: Option<String>,
    pub(crate) status: ProgressStatus,
    pub(crate) score: i32,
    pub(crate) attempted: bool,
    pub(crate) start_time: Option<String>,
    pub(crate) end_time: Option<String>,
    pub(crate) time_taken_seconds: Option<i32>,
    pub(crate) submitted_code: Option<String>,
}

impl StudentAttemptStatus {
    pub(crate) fn new(student: &User, attempt: Option<&Attempt>) -> Self {
        let mut row = Self {
            student_id: student.id.clone(),
            username: student.username.clone(),
            full_name: student.full_name.clone(),
            student_code: student.student_code.clone(),
            attempt_id: None,
            status: ProgressStatus::NotAttempted,
            score: 0,
            attempted: false,
            start_time: None,
            end_time: None,
            time_taken_seconds: None,
            submitted_code: None,
        };

        if let Some(attempt) = attempt {
            row.attempt_id = Some(attempt.id.clone());
            row.status = attempt.status.into();
            row.score = attempt.score;
            row.attempted = attempt.attempted;
            row.start_time = Some(format_primitive(attempt.start_time));
            row.end_time = attempt.end_time.map(format_primitive);
            row.time_taken_seconds = attempt.time_taken_seconds;
            row.submitted_code = attempt.submitted_code.clone();
        }

        row
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct QuestionStatusResponse {
    pub(crate) question_id: String,
    pub(crate) question_title: String,
    pub(crate) batch_id: String,
    pub(crate) batch_name: String,
    pub(crate) students: Vec<StudentAttemptStatus>,
}
