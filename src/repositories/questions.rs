use sqlx::PgPool;

use crate::db::models::Question;

const COLUMNS: &str = "\
    id, teacher_id, batch_id, title, description, time_limit_minutes, \
    start_time, end_time, created_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}
