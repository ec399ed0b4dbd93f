use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::Settings;

/// Judge0 status id for "Accepted".
const STATUS_ACCEPTED: i32 = 3;

#[derive(Debug, Error)]
pub(crate) enum JudgeError {
    #[error("judge request timed out after {0:?}")]
    Timeout(Duration),
    #[error("judge request failed: {0}")]
    Transport(String),
    #[error("judge returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("judge response could not be decoded: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExecutionOutcome {
    /// Trimmed stdout.
    pub(crate) actual_output: String,
    pub(crate) error_output: Option<String>,
    pub(crate) accepted: bool,
}

#[async_trait]
pub(crate) trait JudgeClient: Send + Sync {
    async fn execute(
        &self,
        source_code: &str,
        language_id: i32,
        stdin: &str,
    ) -> Result<ExecutionOutcome, JudgeError>;
}

#[derive(Debug, Serialize)]
struct SubmissionPayload<'a> {
    source_code: &'a str,
    language_id: i32,
    stdin: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Judge0Response {
    #[serde(default)]
    pub(crate) stdout: Option<String>,
    #[serde(default)]
    pub(crate) stderr: Option<String>,
    #[serde(default)]
    pub(crate) compile_output: Option<String>,
    #[serde(default)]
    pub(crate) message: Option<String>,
    pub(crate) status: Judge0Status,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Judge0Status {
    pub(crate) id: i32,
    #[serde(default)]
    pub(crate) description: String,
}

/// Maps a raw Judge0 result to an outcome. Error text is taken from the first
/// non-empty of compile output, stderr and message, falling back to the
/// status description. Whitespace-only output still counts as present.
pub(crate) fn normalize_response(response: Judge0Response) -> ExecutionOutcome {
    let actual_output = response.stdout.as_deref().unwrap_or_default().trim().to_string();

    if response.status.id == STATUS_ACCEPTED {
        return ExecutionOutcome { actual_output, error_output: None, accepted: true };
    }

    let error_output = [response.compile_output, response.stderr, response.message]
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| format!("Execution error: {}", response.status.description));

    ExecutionOutcome { actual_output, error_output: Some(error_output), accepted: false }
}

#[derive(Debug, Clone)]
pub(crate) struct Judge0Client {
    client: Client,
    base_url: String,
    api_key: String,
    rapidapi_host: Option<String>,
    timeout: Duration,
}

impl Judge0Client {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self, JudgeError> {
        let judge = settings.judge();
        let rapidapi_host = judge.uses_rapidapi().then(|| judge.rapidapi_host.clone());
        Self::new(
            &judge.base_url,
            &judge.api_key,
            rapidapi_host,
            Duration::from_secs(judge.request_timeout_seconds),
        )
    }

    pub(crate) fn new(
        base_url: &str,
        api_key: &str,
        rapidapi_host: Option<String>,
        timeout: Duration,
    ) -> Result<Self, JudgeError> {
        let client = Client::builder()
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .timeout(timeout)
            .build()
            .map_err(|err| JudgeError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            rapidapi_host,
            timeout,
        })
    }

    async fn send(
        &self,
        payload: &SubmissionPayload<'_>,
    ) -> Result<Judge0Response, JudgeError> {
        let url = format!("{}/submissions", self.base_url);
        let mut request = self
            .client
            .post(&url)
            .query(&[("base64_encoded", "false"), ("wait", "true")])
            .json(payload);

        if !self.api_key.is_empty() {
            request = match &self.rapidapi_host {
                Some(host) => {
                    request.header("X-RapidAPI-Key", &self.api_key).header("X-RapidAPI-Host", host)
                }
                None => request.header("X-Auth-Token", &self.api_key),
            };
        }

        let response = request.send().await.map_err(|err| self.map_reqwest_error(err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(JudgeError::Status { status: status.as_u16(), body });
        }

        let body = response.bytes().await.map_err(|err| self.map_reqwest_error(err))?;
        serde_json::from_slice::<Judge0Response>(&body)
            .map_err(|err| JudgeError::Decode(err.to_string()))
    }

    fn map_reqwest_error(&self, err: reqwest::Error) -> JudgeError {
        if err.is_timeout() {
            JudgeError::Timeout(self.timeout)
        } else {
            JudgeError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl JudgeClient for Judge0Client {
    async fn execute(
        &self,
        source_code: &str,
        language_id: i32,
        stdin: &str,
    ) -> Result<ExecutionOutcome, JudgeError> {
        let payload = SubmissionPayload { source_code, language_id, stdin };
        let timer = Instant::now();

        let result = self.send(&payload).await;
        let elapsed = timer.elapsed().as_secs_f64();
        metrics::histogram!("judge_request_duration_seconds").record(elapsed);

        match result {
            Ok(response) => {
                let judge_status = response.status.id;
                let outcome = normalize_response(response);
                let label = if outcome.accepted { "accepted" } else { "rejected" };
                metrics::counter!("judge_requests_total", "outcome" => label).increment(1);
                tracing::debug!(
                    language_id,
                    judge_status,
                    accepted = outcome.accepted,
                    duration_seconds = elapsed,
                    "Judge execution completed"
                );
                Ok(outcome)
            }
            Err(err) => {
                metrics::counter!("judge_requests_total", "outcome" => "error").increment(1);
                tracing::warn!(
                    language_id,
                    error = %err,
                    duration_seconds = elapsed,
                    "Judge execution failed"
                );
                Err(err)
            }
        }
    }
}
