use serde::Serialize;

use crate::db::models::TestCase;
use crate::db::types::GradingOutcome;

pub(crate) const NOT_EVALUATED_MESSAGE: &str = "Not evaluated due to error in first test case";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum TestResultStatus {
    Pass,
    Fail,
    NotEvaluated,
}

/// Per-case result. Input and expected output are never populated for a
/// hidden case, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct TestResult {
    pub(crate) status: TestResultStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) expected_output: Option<String>,
    pub(crate) actual_output: String,
    pub(crate) is_hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
}

impl TestResult {
    pub(crate) fn evaluated(
        case: &TestCase,
        passed: bool,
        actual_output: String,
        error: Option<String>,
    ) -> Self {
        let status = if passed { TestResultStatus::Pass } else { TestResultStatus::Fail };
        Self::redacted(case, status, actual_output, error)
    }

    pub(crate) fn not_evaluated(case: &TestCase) -> Self {
        Self::redacted(
            case,
            TestResultStatus::NotEvaluated,
            String::new(),
            Some(NOT_EVALUATED_MESSAGE.to_string()),
        )
    }

    fn redacted(
        case: &TestCase,
        status: TestResultStatus,
        actual_output: String,
        error: Option<String>,
    ) -> Self {
        let (input, expected_output) = if case.is_hidden {
            (None, None)
        } else {
            (Some(case.input_text.clone()), Some(case.expected_output.clone()))
        };
        Self { status, input, expected_output, actual_output, is_hidden: case.is_hidden, error }
    }

    pub(crate) fn passed(&self) -> bool {
        self.status == TestResultStatus::Pass
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct EvaluationResult {
    pub(crate) total_tests: usize,
    pub(crate) passed_tests: usize,
    pub(crate) test_results: Vec<TestResult>,
    pub(crate) status: GradingOutcome,
    /// Present only for final submissions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) time_taken_seconds: Option<i64>,
}
