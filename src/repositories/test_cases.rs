use sqlx::PgPool;

use crate::db::models::TestCase;

const COLUMNS: &str = "id, question_id, input_text, expected_output, is_hidden, created_at";

/// Creation order, ties broken by id so the first case is always the same one.
pub(crate) async fn list_by_question(
    pool: &PgPool,
    question_id: &str,
) -> Result<Vec<TestCase>, sqlx::Error> {
    sqlx::query_as::<_, TestCase>(&format!(
        "SELECT {COLUMNS} FROM test_cases WHERE question_id = $1 ORDER BY created_at, id"
    ))
    .bind(question_id)
    .fetch_all(pool)
    .await
}
