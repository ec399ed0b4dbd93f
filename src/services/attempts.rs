use std::sync::Arc;

use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::models::{Attempt, Question};
use crate::db::types::{AttemptStatus, GradingOutcome, UserRole};
use crate::repositories::attempts::{CreateAttempt, FinalizeAttempt};
use crate::repositories::contracts::{AttemptRepository, CourseDirectory};
use crate::services::attempt_timing;
use crate::services::errors::GradingError;

#[derive(Debug, Clone)]
pub(crate) struct OpenedQuestion {
    pub(crate) question: Question,
    pub(crate) attempt: Attempt,
    pub(crate) created: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct FinalSubmission<'a> {
    pub(crate) code: &'a str,
    pub(crate) outcome: GradingOutcome,
    pub(crate) score: i32,
    pub(crate) time_taken_seconds: i64,
}

/// Owns the single attempt a student has at a question.
#[derive(Clone)]
pub(crate) struct AttemptManager {
    attempts: Arc<dyn AttemptRepository>,
    directory: Arc<dyn CourseDirectory>,
}

impl AttemptManager {
    pub(crate) fn new(
        attempts: Arc<dyn AttemptRepository>,
        directory: Arc<dyn CourseDirectory>,
    ) -> Self {
        Self { attempts, directory }
    }

    /// Returns the pair's attempt, creating it with `start_time = now` on
    /// first access. Every precondition is checked before anything is written.
    pub(crate) async fn open_or_create(
        &self,
        student_id: &str,
        question_id: &str,
        now: PrimitiveDateTime,
    ) -> Result<OpenedQuestion, GradingError> {
        let question = self
            .directory
            .find_question(question_id)
            .await?
            .ok_or(GradingError::NotFound("Question not found"))?;

        let student = self
            .directory
            .find_user(student_id)
            .await?
            .ok_or(GradingError::NotFound("User not found"))?;
        if student.role != UserRole::Student {
            return Err(GradingError::NotAStudent);
        }

        if !self.directory.is_enrolled(&question.batch_id, student_id).await? {
            return Err(GradingError::NotEnrolled);
        }

        attempt_timing::check_window(&question, now).map_err(GradingError::OutOfWindow)?;

        let attempt_id = Uuid::new_v4().to_string();
        let opened = self
            .attempts
            .open_for_pair(CreateAttempt {
                id: &attempt_id,
                student_id,
                question_id,
                start_time: now,
                created_at: now,
            })
            .await?;

        if opened.created {
            tracing::info!(
                attempt_id = %opened.attempt.id,
                student_id,
                question_id,
                time_limit_minutes = question.time_limit_minutes,
                "Attempt opened"
            );
        }

        Ok(OpenedQuestion { question, attempt: opened.attempt, created: opened.created })
    }

    pub(crate) async fn find_for_pair(
        &self,
        student_id: &str,
        question_id: &str,
    ) -> Result<Option<Attempt>, GradingError> {
        Ok(self.attempts.find_for_pair(student_id, question_id).await?)
    }

    /// The one terminal transition of an attempt. Losing a concurrent race
    /// surfaces as `AlreadySubmitted` with the stored row left as it was.
    pub(crate) async fn finalize(
        &self,
        attempt_id: &str,
        submission: FinalSubmission<'_>,
        now: PrimitiveDateTime,
    ) -> Result<Attempt, GradingError> {
        let attempt = self
            .attempts
            .find_by_id(attempt_id)
            .await?
            .ok_or(GradingError::NoAttemptRecord)?;

        let next = AttemptStatus::from(submission.outcome);
        if attempt.end_time.is_some() || attempt.attempted || !attempt.status.can_transition_to(next)
        {
            return Err(GradingError::AlreadySubmitted);
        }

        let time_taken_seconds = i32::try_from(submission.time_taken_seconds).unwrap_or(i32::MAX);
        let applied = self
            .attempts
            .finalize(
                attempt_id,
                FinalizeAttempt {
                    submitted_code: submission.code,
                    status: next,
                    score: submission.score.clamp(0, 100),
                    end_time: now,
                    time_taken_seconds,
                },
            )
            .await?;

        if !applied {
            tracing::warn!(attempt_id, "Concurrent final submission lost the race");
            return Err(GradingError::AlreadySubmitted);
        }

        let stored = self
            .attempts
            .find_by_id(attempt_id)
            .await?
            .ok_or(GradingError::NoAttemptRecord)?;

        tracing::info!(
            attempt_id,
            student_id = %stored.student_id,
            question_id = %stored.question_id,
            status = submission.outcome.as_str(),
            score = stored.score,
            time_taken_seconds,
            "Attempt finalized"
        );

        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::InMemoryStore;
    use time::macros::datetime;
    use time::Duration;

    fn manager(store: &InMemoryStore) -> AttemptManager {
        AttemptManager::new(Arc::new(store.clone()), Arc::new(store.clone()))
    }

    fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.seed_teacher("t1", "teacher");
        store.seed_student("s1", "alice");
        store.seed_batch("b1", "t1", "Morning batch");
        store.enroll("b1", "s1");
        store.seed_question("q1", "b1", "t1", 10, None, None);
        store
    }

    fn submission(outcome: GradingOutcome, score: i32) -> FinalSubmission<'static> {
        FinalSubmission { code: "print(1)", outcome, score, time_taken_seconds: 60 }
    }

    #[tokio::test]
    async fn reopening_returns_the_same_attempt() {
        let store = seeded();
        let manager = manager(&store);
        let t0 = datetime!(2025-03-01 09:00);

        let first = manager.open_or_create("s1", "q1", t0).await.expect("first open");
        assert!(first.created);
        assert_eq!(first.attempt.status, AttemptStatus::InProgress);
        assert_eq!(first.attempt.start_time, t0);

        let second = manager
            .open_or_create("s1", "q1", t0 + Duration::minutes(5))
            .await
            .expect("second open");
        assert!(!second.created);
        assert_eq!(second.attempt.id, first.attempt.id);
        assert_eq!(second.attempt.start_time, t0);
        assert_eq!(store.attempt_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_opens_create_one_attempt() {
        let store = seeded();
        let manager = manager(&store);
        let now = datetime!(2025-03-01 09:00);

        let (a, b) = tokio::join!(
            manager.open_or_create("s1", "q1", now),
            manager.open_or_create("s1", "q1", now)
        );
        let (a, b) = (a.expect("a"), b.expect("b"));

        assert_eq!(a.attempt.id, b.attempt.id);
        assert_eq!(usize::from(a.created) + usize::from(b.created), 1);
        assert_eq!(store.attempt_count(), 1);
    }

    #[tokio::test]
    async fn open_rejects_missing_question_and_unenrolled_student() {
        let store = seeded();
        store.seed_student("s2", "bob");
        let manager = manager(&store);
        let now = datetime!(2025-03-01 09:00);

        let missing = manager.open_or_create("s1", "nope", now).await.expect_err("missing");
        assert!(matches!(missing, GradingError::NotFound(_)));

        let unenrolled = manager.open_or_create("s2", "q1", now).await.expect_err("unenrolled");
        assert!(matches!(unenrolled, GradingError::NotEnrolled));

        let teacher = manager.open_or_create("t1", "q1", now).await.expect_err("teacher");
        assert!(matches!(teacher, GradingError::NotAStudent));

        assert_eq!(store.attempt_count(), 0);
    }

    #[tokio::test]
    async fn out_of_window_open_creates_nothing() {
        let store = seeded();
        store.seed_question(
            "q-window",
            "b1",
            "t1",
            10,
            Some(datetime!(2025-03-01 09:00)),
            Some(datetime!(2025-03-01 10:00)),
        );
        let manager = manager(&store);

        let early = manager
            .open_or_create("s1", "q-window", datetime!(2025-03-01 08:00))
            .await
            .expect_err("too early");
        assert!(matches!(early, GradingError::OutOfWindow(_)));

        let late = manager
            .open_or_create("s1", "q-window", datetime!(2025-03-01 10:30))
            .await
            .expect_err("too late");
        assert!(matches!(late, GradingError::OutOfWindow(_)));

        assert!(store.attempt_for("s1", "q-window").is_none());
    }

    #[tokio::test]
    async fn finalize_is_one_shot() {
        let store = seeded();
        let manager = manager(&store);
        let t0 = datetime!(2025-03-01 09:00);
        let opened = manager.open_or_create("s1", "q1", t0).await.expect("open");
        let t1 = t0 + Duration::minutes(1);

        let finalized = manager
            .finalize(&opened.attempt.id, submission(GradingOutcome::Correct, 100), t1)
            .await
            .expect("finalize");
        assert_eq!(finalized.status, AttemptStatus::Correct);
        assert_eq!(finalized.score, 100);
        assert_eq!(finalized.end_time, Some(t1));
        assert_eq!(finalized.time_taken_seconds, Some(60));
        assert_eq!(finalized.submitted_code.as_deref(), Some("print(1)"));
        assert!(finalized.attempted);

        let again = manager
            .finalize(
                &opened.attempt.id,
                submission(GradingOutcome::Incorrect, 0),
                t1 + Duration::minutes(1),
            )
            .await
            .expect_err("second finalize");
        assert!(matches!(again, GradingError::AlreadySubmitted));

        let stored = store.attempt_for("s1", "q1").expect("stored");
        assert_eq!(stored.status, AttemptStatus::Correct);
        assert_eq!(stored.end_time, Some(t1));
    }

    #[tokio::test]
    async fn concurrent_finalize_has_one_winner() {
        let store = seeded();
        let manager = manager(&store);
        let t0 = datetime!(2025-03-01 09:00);
        let opened = manager.open_or_create("s1", "q1", t0).await.expect("open");

        let (a, b) = tokio::join!(
            manager.finalize(&opened.attempt.id, submission(GradingOutcome::Correct, 100), t0),
            manager.finalize(&opened.attempt.id, submission(GradingOutcome::Incorrect, 0), t0)
        );

        assert_eq!(usize::from(a.is_ok()) + usize::from(b.is_ok()), 1);
        let loser = a.err().or(b.err()).expect("one loser");
        assert!(matches!(loser, GradingError::AlreadySubmitted));
    }

    #[tokio::test]
    async fn finalize_unknown_attempt() {
        let store = seeded();
        let manager = manager(&store);
        let err = manager
            .finalize("missing", submission(GradingOutcome::Correct, 100), datetime!(2025-03-01 09:00))
            .await
            .expect_err("missing attempt");
        assert!(matches!(err, GradingError::NoAttemptRecord));
    }
}
