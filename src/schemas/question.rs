use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Attempt, Question, TestCase};
use crate::db::types::AttemptStatus;
use crate::services::attempt_timing;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CodeSubmissionRequest {
    #[validate(length(min = 1, message = "code must not be empty"))]
    pub(crate) code: String,
    #[validate(range(min = 1, message = "language_id must be positive"))]
    pub(crate) language_id: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: String,
    pub(crate) batch_id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) time_limit_minutes: i32,
    pub(crate) start_time: Option<String>,
    pub(crate) end_time: Option<String>,
}

impl From<&Question> for QuestionResponse {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id.clone(),
            batch_id: question.batch_id.clone(),
            title: question.title.clone(),
            description: question.description.clone(),
            time_limit_minutes: question.time_limit_minutes,
            start_time: question.start_time.map(format_primitive),
            end_time: question.end_time.map(format_primitive),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TestCaseResponse {
    pub(crate) id: String,
    pub(crate) input: String,
    pub(crate) expected_output: String,
}

impl From<&TestCase> for TestCaseResponse {
    fn from(case: &TestCase) -> Self {
        Self {
            id: case.id.clone(),
            input: case.input_text.clone(),
            expected_output: case.expected_output.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptResponse {
    pub(crate) id: String,
    pub(crate) status: AttemptStatus,
    pub(crate) score: i32,
    pub(crate) attempted: bool,
    pub(crate) start_time: String,
    pub(crate) end_time: Option<String>,
    pub(crate) deadline: String,
    pub(crate) time_remaining_seconds: i64,
    pub(crate) time_taken_seconds: Option<i32>,
    pub(crate) submitted_code: Option<String>,
}

impl AttemptResponse {
    pub(crate) fn project(
        attempt: &Attempt,
        time_limit_minutes: i32,
        now: time::PrimitiveDateTime,
    ) -> Self {
        let time_remaining_seconds = if attempt.end_time.is_some() {
            0
        } else {
            attempt_timing::remaining_seconds(attempt.start_time, time_limit_minutes, now)
        };

        Self {
            id: attempt.id.clone(),
            status: attempt.status,
            score: attempt.score,
            attempted: attempt.attempted,
            start_time: format_primitive(attempt.start_time),
            end_time: attempt.end_time.map(format_primitive),
            deadline: format_primitive(attempt_timing::deadline(
                attempt.start_time,
                time_limit_minutes,
            )),
            time_remaining_seconds,
            time_taken_seconds: attempt.time_taken_seconds,
            submitted_code: attempt.submitted_code.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenQuestionResponse {
    pub(crate) question: QuestionResponse,
    pub(crate) test_cases: Vec<TestCaseResponse>,
    pub(crate) attempt: AttemptResponse,
}
