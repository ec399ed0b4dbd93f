use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentTeacher;
use crate::core::state::AppState;
use crate::schemas::status::QuestionStatusResponse;

pub(in crate::api::questions) async fn question_status(
    Path((batch_id, question_id)): Path<(String, String)>,
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<QuestionStatusResponse>, ApiError> {
    let report = state.status().question_status(&teacher.id, &batch_id, &question_id).await?;
    Ok(Json(report))
}
