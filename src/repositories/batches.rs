use sqlx::PgPool;

use crate::db::models::Batch;

const COLUMNS: &str = "id, teacher_id, name, created_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Batch>, sqlx::Error> {
    sqlx::query_as::<_, Batch>(&format!("SELECT {COLUMNS} FROM batches WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn is_student_enrolled(
    pool: &PgPool,
    batch_id: &str,
    student_id: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM batch_students WHERE batch_id = $1 AND student_id = $2)",
    )
    .bind(batch_id)
    .bind(student_id)
    .fetch_one(pool)
    .await
}
