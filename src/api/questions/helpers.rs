use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::db::models::Question;

/// Loads the question and checks it belongs to the batch named in the path.
pub(super) async fn fetch_question_in_batch(
    state: &AppState,
    batch_id: &str,
    question_id: &str,
) -> Result<Question, ApiError> {
    let question = state
        .directory()
        .find_question(question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch question"))?;

    match question {
        Some(question) if question.batch_id == batch_id => Ok(question),
        _ => Err(ApiError::NotFound("Question not found in this batch".to_string())),
    }
}
