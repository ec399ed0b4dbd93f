use sqlx::PgPool;

use crate::db::models::User;

const COLUMNS: &str = "id, username, full_name, role, student_code, is_active, created_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_students_in_batch(
    pool: &PgPool,
    batch_id: &str,
) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT u.id, u.username, u.full_name, u.role, u.student_code, u.is_active, u.created_at \
         FROM batch_students bs \
         JOIN users u ON u.id = bs.student_id \
         WHERE bs.batch_id = $1 AND u.role = 'student' \
         ORDER BY u.username",
    )
    .bind(batch_id)
    .fetch_all(pool)
    .await
}
