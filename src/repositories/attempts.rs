use sqlx::PgPool;

use crate::db::models::Attempt;
use crate::db::types::AttemptStatus;

pub(crate) const COLUMNS: &str = "\
    id, student_id, question_id, submitted_code, status, score, start_time, \
    end_time, time_taken_seconds, attempted, created_at, updated_at";

pub(crate) struct CreateAttempt<'a> {
    pub(crate) id: &'a str,
    pub(crate) student_id: &'a str,
    pub(crate) question_id: &'a str,
    pub(crate) start_time: time::PrimitiveDateTime,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) struct FinalizeAttempt<'a> {
    pub(crate) submitted_code: &'a str,
    pub(crate) status: AttemptStatus,
    pub(crate) score: i32,
    pub(crate) end_time: time::PrimitiveDateTime,
    pub(crate) time_taken_seconds: i32,
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!("SELECT {COLUMNS} FROM attempts WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_for_pair(
    executor: impl sqlx::PgExecutor<'_>,
    student_id: &str,
    question_id: &str,
) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "SELECT {COLUMNS} FROM attempts \
         WHERE student_id = $1 AND question_id = $2 \
         ORDER BY created_at DESC LIMIT 1"
    ))
    .bind(student_id)
    .bind(question_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn list_latest_for_students(
    pool: &PgPool,
    question_id: &str,
    student_ids: &[String],
) -> Result<Vec<Attempt>, sqlx::Error> {
    if student_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, Attempt>(&format!(
        "SELECT DISTINCT ON (student_id) {COLUMNS} FROM attempts \
         WHERE question_id = $1 AND student_id = ANY($2) \
         ORDER BY student_id, created_at DESC"
    ))
    .bind(question_id)
    .bind(student_ids)
    .fetch_all(pool)
    .await
}

/// Serializes first access for one (student, question) pair until the
/// surrounding transaction ends.
pub(crate) async fn acquire_pair_lock(
    executor: impl sqlx::PgExecutor<'_>,
    student_id: &str,
    question_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(format!("attempt:{student_id}:{question_id}"))
        .execute(executor)
        .await?;
    Ok(())
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    attempt: CreateAttempt<'_>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO attempts (
            id, student_id, question_id, status, score, start_time,
            attempted, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,0,$5,FALSE,$6,$6)
        ON CONFLICT (student_id, question_id) DO NOTHING",
    )
    .bind(attempt.id)
    .bind(attempt.student_id)
    .bind(attempt.question_id)
    .bind(AttemptStatus::InProgress)
    .bind(attempt.start_time)
    .bind(attempt.created_at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Compare-and-swap terminal update. Returns `false` when the attempt was
/// already finalized (or does not exist) and nothing was written.
pub(crate) async fn finalize(
    pool: &PgPool,
    id: &str,
    update: FinalizeAttempt<'_>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE attempts
         SET submitted_code = $1, status = $2, score = $3, end_time = $4,
             time_taken_seconds = $5, attempted = TRUE, updated_at = $4
         WHERE id = $6 AND end_time IS NULL AND attempted = FALSE",
    )
    .bind(update.submitted_code)
    .bind(update.status)
    .bind(update.score)
    .bind(update.end_time)
    .bind(update.time_taken_seconds)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
