//! Storage seams consumed by the grading services. The Postgres
//! implementation lives in [`super::postgres`]; tests swap in an in-memory
//! store.

use async_trait::async_trait;

use crate::db::models::{Attempt, Batch, Question, TestCase, User};
use crate::repositories::attempts::{CreateAttempt, FinalizeAttempt};

#[derive(Debug, Clone)]
pub(crate) struct OpenedAttempt {
    pub(crate) attempt: Attempt,
    pub(crate) created: bool,
}

#[async_trait]
pub(crate) trait AttemptRepository: Send + Sync {
    async fn find_by_id(&self, attempt_id: &str) -> Result<Option<Attempt>, sqlx::Error>;

    async fn find_for_pair(
        &self,
        student_id: &str,
        question_id: &str,
    ) -> Result<Option<Attempt>, sqlx::Error>;

    /// Returns the pair's attempt, creating it from `attempt` only when none
    /// exists. Must be atomic with respect to concurrent callers.
    async fn open_for_pair(&self, attempt: CreateAttempt<'_>)
        -> Result<OpenedAttempt, sqlx::Error>;

    /// Applies the terminal update only if `end_time` is still unset.
    async fn finalize(
        &self,
        attempt_id: &str,
        update: FinalizeAttempt<'_>,
    ) -> Result<bool, sqlx::Error>;

    async fn list_latest_for_students(
        &self,
        question_id: &str,
        student_ids: &[String],
    ) -> Result<Vec<Attempt>, sqlx::Error>;
}

#[async_trait]
pub(crate) trait TestCaseRepository: Send + Sync {
    async fn list_by_question(&self, question_id: &str) -> Result<Vec<TestCase>, sqlx::Error>;
}

/// Read access to users, batches, enrollment and questions, which are owned
/// by other parts of the platform.
#[async_trait]
pub(crate) trait CourseDirectory: Send + Sync {
    async fn find_user(&self, user_id: &str) -> Result<Option<User>, sqlx::Error>;

    async fn find_question(&self, question_id: &str) -> Result<Option<Question>, sqlx::Error>;

    async fn find_batch(&self, batch_id: &str) -> Result<Option<Batch>, sqlx::Error>;

    async fn is_enrolled(&self, batch_id: &str, student_id: &str) -> Result<bool, sqlx::Error>;

    /// Enrolled students ordered by username.
    async fn list_enrolled_students(&self, batch_id: &str) -> Result<Vec<User>, sqlx::Error>;
}
