use std::sync::Arc;

use time::PrimitiveDateTime;

use crate::core::config::Settings;
use crate::db::models::TestCase;
use crate::db::types::{GradingOutcome, UserRole};
use crate::repositories::contracts::CourseDirectory;
use crate::schemas::evaluation::{EvaluationResult, TestResult};
use crate::services::attempt_timing;
use crate::services::attempts::{AttemptManager, FinalSubmission};
use crate::services::errors::GradingError;
use crate::services::judge::JudgeClient;
use crate::services::test_cases::TestCaseStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EvaluationMode {
    TryRun,
    Final,
}

impl EvaluationMode {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            EvaluationMode::TryRun => "try_run",
            EvaluationMode::Final => "final",
        }
    }

    fn is_final(self) -> bool {
        matches!(self, EvaluationMode::Final)
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct GradingPolicy {
    pub(crate) grace_period_seconds: i64,
    pub(crate) zero_score_on_timeout: bool,
}

impl GradingPolicy {
    pub(crate) fn from_settings(settings: &Settings) -> Self {
        let grading = settings.grading();
        Self {
            grace_period_seconds: grading.grace_period_seconds,
            zero_score_on_timeout: grading.zero_score_on_timeout,
        }
    }
}

impl Default for GradingPolicy {
    fn default() -> Self {
        Self { grace_period_seconds: 10, zero_score_on_timeout: false }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CodeSubmission<'a> {
    pub(crate) student_id: &'a str,
    pub(crate) question_id: &'a str,
    pub(crate) code: &'a str,
    pub(crate) language_id: i32,
}

pub(crate) fn aggregate_status(passed: usize, total: usize) -> GradingOutcome {
    if total > 0 && passed == total {
        GradingOutcome::Correct
    } else if passed > 0 {
        GradingOutcome::PartiallyCorrect
    } else {
        GradingOutcome::Incorrect
    }
}

/// `floor(100 * passed / total)`.
pub(crate) fn compute_score(passed: usize, total: usize) -> i32 {
    if total == 0 {
        return 0;
    }
    let score = passed.min(total) * 100 / total;
    i32::try_from(score).unwrap_or(100)
}

#[derive(Clone)]
pub(crate) struct GradingOrchestrator {
    attempts: AttemptManager,
    test_cases: TestCaseStore,
    directory: Arc<dyn CourseDirectory>,
    judge: Arc<dyn JudgeClient>,
    policy: GradingPolicy,
}

impl GradingOrchestrator {
    pub(crate) fn new(
        attempts: AttemptManager,
        test_cases: TestCaseStore,
        directory: Arc<dyn CourseDirectory>,
        judge: Arc<dyn JudgeClient>,
        policy: GradingPolicy,
    ) -> Self {
        Self { attempts, test_cases, directory, judge, policy }
    }

    /// Runs `submission` against every test case of the question. A try-run
    /// leaves the attempt untouched; a final evaluation finalizes it. Judge
    /// failures abort before anything is written.
    pub(crate) async fn evaluate(
        &self,
        submission: CodeSubmission<'_>,
        mode: EvaluationMode,
        now: PrimitiveDateTime,
    ) -> Result<EvaluationResult, GradingError> {
        let CodeSubmission { student_id, question_id, code, language_id } = submission;

        let student = self
            .directory
            .find_user(student_id)
            .await?
            .ok_or(GradingError::NotFound("User not found"))?;
        if student.role != UserRole::Student {
            return Err(GradingError::NotAStudent);
        }

        let question = self
            .directory
            .find_question(question_id)
            .await?
            .ok_or(GradingError::NotFound("Question not found"))?;

        if !self.directory.is_enrolled(&question.batch_id, student_id).await? {
            return Err(GradingError::NotEnrolled);
        }

        let attempt = self
            .attempts
            .find_for_pair(student_id, question_id)
            .await?
            .ok_or(GradingError::NoAttemptRecord)?;

        if mode.is_final() {
            if attempt.end_time.is_some() {
                return Err(GradingError::AlreadyFinalized);
            }
            if attempt.attempted {
                return Err(GradingError::AlreadyGraded);
            }
        }

        let cases = self.test_cases.list(question_id).await?;
        if cases.is_empty() {
            return Err(GradingError::NoTestCases);
        }

        tracing::info!(
            attempt_id = %attempt.id,
            student_id,
            question_id,
            language_id,
            mode = mode.as_str(),
            test_cases = cases.len(),
            "Evaluation started"
        );

        let test_results = self.run_cases(code, language_id, &cases).await.map_err(|err| {
            tracing::error!(
                attempt_id = %attempt.id,
                mode = mode.as_str(),
                error = %err,
                "Evaluation aborted by judge failure"
            );
            err
        })?;

        let total_tests = test_results.len();
        let passed_tests = test_results.iter().filter(|result| result.passed()).count();
        let mut status = aggregate_status(passed_tests, total_tests);

        let mut result = EvaluationResult {
            total_tests,
            passed_tests,
            test_results,
            status,
            score: None,
            time_taken_seconds: None,
        };

        if mode.is_final() {
            let elapsed = attempt_timing::elapsed_seconds(attempt.start_time, now);
            let mut score = compute_score(passed_tests, total_tests);

            if attempt_timing::exceeds_time_limit(
                elapsed,
                question.time_limit_minutes,
                self.policy.grace_period_seconds,
            ) {
                status = GradingOutcome::TimedOut;
                if self.policy.zero_score_on_timeout {
                    score = 0;
                }
            }

            let finalized = self
                .attempts
                .finalize(
                    &attempt.id,
                    FinalSubmission {
                        code,
                        outcome: status,
                        score,
                        time_taken_seconds: elapsed,
                    },
                    now,
                )
                .await?;

            result.status = status;
            result.score = Some(finalized.score);
            result.time_taken_seconds = Some(elapsed);
        }

        metrics::counter!(
            "evaluations_total",
            "mode" => mode.as_str(),
            "status" => result.status.as_str()
        )
        .increment(1);

        tracing::info!(
            attempt_id = %attempt.id,
            mode = mode.as_str(),
            status = result.status.as_str(),
            passed_tests,
            total_tests,
            score = result.score,
            "Evaluation completed"
        );

        Ok(result)
    }

    /// The first case gates the rest: if it does not execute cleanly the
    /// remaining cases are reported without calling the judge.
    async fn run_cases(
        &self,
        code: &str,
        language_id: i32,
        cases: &[TestCase],
    ) -> Result<Vec<TestResult>, GradingError> {
        let mut results = Vec::with_capacity(cases.len());

        for (index, case) in cases.iter().enumerate() {
            let outcome = self.judge.execute(code, language_id, &case.input_text).await?;
            let passed = outcome.accepted
                && outcome.actual_output.trim() == case.expected_output.trim();
            let errored = !outcome.accepted;

            results.push(TestResult::evaluated(
                case,
                passed,
                outcome.actual_output,
                outcome.error_output,
            ));

            if index == 0 && errored {
                results.extend(cases[1..].iter().map(TestResult::not_evaluated));
                break;
            }
        }

        Ok(results)
    }
}
