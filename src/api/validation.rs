use crate::core::config::Settings;
use crate::schemas::question::CodeSubmissionRequest;
use crate::services::errors::GradingError;

pub(crate) fn validate_code_submission(
    payload: &CodeSubmissionRequest,
    settings: &Settings,
) -> Result<(), GradingError> {
    if payload.code.trim().is_empty() {
        return Err(GradingError::Validation("code must not be empty".to_string()));
    }

    let max_bytes = settings.grading().max_code_bytes;
    if payload.code.len() > max_bytes {
        return Err(GradingError::Validation(format!(
            "code must be at most {max_bytes} bytes, got {}",
            payload.code.len()
        )));
    }

    if !settings.judge().is_language_allowed(payload.language_id) {
        return Err(GradingError::Validation(format!(
            "language_id {} is not supported",
            payload.language_id
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    fn request(code: &str, language_id: i32) -> CodeSubmissionRequest {
        CodeSubmissionRequest { code: code.to_string(), language_id }
    }

    #[tokio::test]
    async fn accepts_allowed_language_within_limit() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        let settings = Settings::load().expect("settings");

        assert!(validate_code_submission(&request("print(1)", 71), &settings).is_ok());
    }

    #[tokio::test]
    async fn rejects_blank_oversized_and_unknown_language() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("GRADING_MAX_CODE_BYTES", "16");
        let settings = Settings::load().expect("settings");
        std::env::remove_var("GRADING_MAX_CODE_BYTES");

        assert!(matches!(
            validate_code_submission(&request("   \n", 71), &settings),
            Err(GradingError::Validation(_))
        ));
        assert!(matches!(
            validate_code_submission(&request(&"x".repeat(17), 71), &settings),
            Err(GradingError::Validation(_))
        ));
        assert!(matches!(
            validate_code_submission(&request("print(1)", 9999), &settings),
            Err(GradingError::Validation(message)) if message.contains("9999")
        ));
    }
}
