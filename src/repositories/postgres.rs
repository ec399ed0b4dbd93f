use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::models::{Attempt, Batch, Question, TestCase, User};
use crate::repositories::attempts::{self, CreateAttempt, FinalizeAttempt};
use crate::repositories::contracts::{
    AttemptRepository, CourseDirectory, OpenedAttempt, TestCaseRepository,
};
use crate::repositories::{batches, questions, test_cases, users};

#[derive(Clone)]
pub(crate) struct PgRepositories {
    pool: PgPool,
}

impl PgRepositories {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttemptRepository for PgRepositories {
    async fn find_by_id(&self, attempt_id: &str) -> Result<Option<Attempt>, sqlx::Error> {
        attempts::find_by_id(&self.pool, attempt_id).await
    }

    async fn find_for_pair(
        &self,
        student_id: &str,
        question_id: &str,
    ) -> Result<Option<Attempt>, sqlx::Error> {
        attempts::find_for_pair(&self.pool, student_id, question_id).await
    }

    async fn open_for_pair(
        &self,
        attempt: CreateAttempt<'_>,
    ) -> Result<OpenedAttempt, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        attempts::acquire_pair_lock(&mut *tx, attempt.student_id, attempt.question_id).await?;

        let existing =
            attempts::find_for_pair(&mut *tx, attempt.student_id, attempt.question_id).await?;
        if let Some(existing) = existing {
            tx.commit().await?;
            return Ok(OpenedAttempt { attempt: existing, created: false });
        }

        let student_id = attempt.student_id;
        let question_id = attempt.question_id;
        let created = attempts::create(&mut *tx, attempt).await?;

        let stored = attempts::find_for_pair(&mut *tx, student_id, question_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        tx.commit().await?;

        Ok(OpenedAttempt { attempt: stored, created })
    }

    async fn finalize(
        &self,
        attempt_id: &str,
        update: FinalizeAttempt<'_>,
    ) -> Result<bool, sqlx::Error> {
        attempts::finalize(&self.pool, attempt_id, update).await
    }

    async fn list_latest_for_students(
        &self,
        question_id: &str,
        student_ids: &[String],
    ) -> Result<Vec<Attempt>, sqlx::Error> {
        attempts::list_latest_for_students(&self.pool, question_id, student_ids).await
    }
}

#[async_trait]
impl TestCaseRepository for PgRepositories {
    async fn list_by_question(&self, question_id: &str) -> Result<Vec<TestCase>, sqlx::Error> {
        test_cases::list_by_question(&self.pool, question_id).await
    }
}

#[async_trait]
impl CourseDirectory for PgRepositories {
    async fn find_user(&self, user_id: &str) -> Result<Option<User>, sqlx::Error> {
        users::find_by_id(&self.pool, user_id).await
    }

    async fn find_question(&self, question_id: &str) -> Result<Option<Question>, sqlx::Error> {
        questions::find_by_id(&self.pool, question_id).await
    }

    async fn find_batch(&self, batch_id: &str) -> Result<Option<Batch>, sqlx::Error> {
        batches::find_by_id(&self.pool, batch_id).await
    }

    async fn is_enrolled(&self, batch_id: &str, student_id: &str) -> Result<bool, sqlx::Error> {
        batches::is_student_enrolled(&self.pool, batch_id, student_id).await
    }

    async fn list_enrolled_students(&self, batch_id: &str) -> Result<Vec<User>, sqlx::Error> {
        users::list_students_in_batch(&self.pool, batch_id).await
    }
}
