mod helpers;
mod student;
mod teacher;

use axum::{routing::get, routing::post, Router};

use crate::core::state::AppState;

/// Mounted under `/batches`.
pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:batch_id/questions/:question_id", get(student::open_question))
        .route("/:batch_id/questions/:question_id/run", post(student::run_code))
        .route("/:batch_id/questions/:question_id/submit", post(student::submit_code))
        .route("/:batch_id/questions/:question_id/status", get(teacher::question_status))
}
