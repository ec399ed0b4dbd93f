use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentStudent;
use crate::api::questions::helpers::fetch_question_in_batch;
use crate::api::validation::validate_code_submission;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::schemas::evaluation::EvaluationResult;
use crate::schemas::question::{
    AttemptResponse, CodeSubmissionRequest, OpenQuestionResponse, QuestionResponse,
    TestCaseResponse,
};
use crate::services::grading::{CodeSubmission, EvaluationMode};

pub(in crate::api::questions) async fn open_question(
    Path((batch_id, question_id)): Path<(String, String)>,
    CurrentStudent(user): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<OpenQuestionResponse>, ApiError> {
    fetch_question_in_batch(&state, &batch_id, &question_id).await?;

    let now = primitive_now_utc();
    let opened = state.attempts().open_or_create(&user.id, &question_id, now).await?;

    let test_cases = state
        .test_cases()
        .list_visible(&question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch test cases"))?;

    Ok(Json(OpenQuestionResponse {
        question: QuestionResponse::from(&opened.question),
        test_cases: test_cases.iter().map(TestCaseResponse::from).collect(),
        attempt: AttemptResponse::project(
            &opened.attempt,
            opened.question.time_limit_minutes,
            now,
        ),
    }))
}

pub(in crate::api::questions) async fn run_code(
    Path((batch_id, question_id)): Path<(String, String)>,
    CurrentStudent(user): CurrentStudent,
    State(state): State<AppState>,
    Json(payload): Json<CodeSubmissionRequest>,
) -> Result<Json<EvaluationResult>, ApiError> {
    evaluate(&state, &user.id, &batch_id, &question_id, payload, EvaluationMode::TryRun).await
}

pub(in crate::api::questions) async fn submit_code(
    Path((batch_id, question_id)): Path<(String, String)>,
    CurrentStudent(user): CurrentStudent,
    State(state): State<AppState>,
    Json(payload): Json<CodeSubmissionRequest>,
) -> Result<Json<EvaluationResult>, ApiError> {
    evaluate(&state, &user.id, &batch_id, &question_id, payload, EvaluationMode::Final).await
}

async fn evaluate(
    state: &AppState,
    student_id: &str,
    batch_id: &str,
    question_id: &str,
    payload: CodeSubmissionRequest,
    mode: EvaluationMode,
) -> Result<Json<EvaluationResult>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    validate_code_submission(&payload, state.settings())?;

    fetch_question_in_batch(state, batch_id, question_id).await?;

    let result = state
        .grading()
        .evaluate(
            CodeSubmission {
                student_id,
                question_id,
                code: &payload.code,
                language_id: payload.language_id,
            },
            mode,
            primitive_now_utc(),
        )
        .await?;

    Ok(Json(result))
}
