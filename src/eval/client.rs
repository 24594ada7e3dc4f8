//! Core `PronunciationEvaluator` trait and `ApiEvaluationClient` implementation.
//!
//! `ApiEvaluationClient` performs the two-stage remote evaluation against any
//! OpenAI-compatible endpoint: Stage A uploads the clip to
//! `/v1/audio/transcriptions`, Stage B sends the transcript and target word
//! to `/v1/chat/completions` under a strict JSON output schema.  All
//! connection details come from [`EvaluationConfig`]; nothing is hardcoded.
//!
//! Failures are classified into [`EvalError`] before they leave this module;
//! callers never see a raw transport error.  Transient conditions are retried
//! with the whole two-stage sequence as one unit of work (see
//! [`retry_with_backoff`]).

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::StatusCode;
use thiserror::Error;

use crate::audio::AudioClip;
use crate::config::EvaluationConfig;

use super::prompt;
use super::result::EvaluationResult;
use super::retry::{retry_with_backoff, RetryPolicy};

// ---------------------------------------------------------------------------
// EvalError
// ---------------------------------------------------------------------------

/// Classified evaluation failure.
///
/// Display strings are user-facing: short, actionable and free of internal
/// status codes.  The carried detail is for logs.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Missing or invalid credentials, or a malformed request.  Permanent;
    /// reported immediately without consuming retry budget.
    #[error("API configuration error. Please check your API key: {0}")]
    Configuration(String),

    /// Overload, rate limiting, 5xx, timeout or generic network failure.
    /// Retried; surfaced only once the retry budget is exhausted.
    #[error("The service is currently busy. Please try again in a few moments.")]
    Transient(String),

    /// Billing / quota condition.  Permanent once detected, even though it
    /// shares HTTP status codes with transient rate limits.
    #[error("API quota exceeded. Please check your account credits.")]
    QuotaExceeded(String),

    /// The judgment response was not valid JSON or is missing required
    /// fields.  Retrying will not fix a malformed integration.
    #[error("The evaluation service returned an unexpected response: {0}")]
    Schema(String),
}

impl EvalError {
    /// `true` for conditions that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, EvalError::Transient(_))
    }

    /// Internal detail for logging (the Display string is user-facing).
    pub fn detail(&self) -> &str {
        match self {
            EvalError::Configuration(d)
            | EvalError::Transient(d)
            | EvalError::QuotaExceeded(d)
            | EvalError::Schema(d) => d,
        }
    }
}

impl From<reqwest::Error> for EvalError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            // A request we could not even construct will not improve on retry.
            EvalError::Configuration(e.to_string())
        } else if e.is_timeout() {
            EvalError::Transient(format!("request timed out: {e}"))
        } else {
            EvalError::Transient(e.to_string())
        }
    }
}

/// Classify a remote-service failure by HTTP status and message content.
///
/// Quota-specific phrasing takes precedence over generic rate-limit
/// phrasing: both often arrive with a 429, but quota exhaustion will not
/// clear on retry.  Anything unrecognized defaults to transient.
fn classify_service_failure(status: Option<StatusCode>, detail: &str) -> EvalError {
    let lower = detail.to_lowercase();

    if ["quota", "insufficient_quota", "billing"]
        .iter()
        .any(|m| lower.contains(m))
    {
        return EvalError::QuotaExceeded(detail.to_string());
    }

    let auth_status = matches!(
        status,
        Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN) | Some(StatusCode::BAD_REQUEST)
    );
    if auth_status
        || ["api key", "authentication", "invalid_api_key", "unauthorized"]
            .iter()
            .any(|m| lower.contains(m))
    {
        return EvalError::Configuration(detail.to_string());
    }

    EvalError::Transient(detail.to_string())
}

// ---------------------------------------------------------------------------
// PronunciationEvaluator trait
// ---------------------------------------------------------------------------

/// Async trait for pronunciation evaluation backends.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// (e.g. wrapped in `Arc<dyn PronunciationEvaluator>`).
///
/// # Arguments
/// * `clip`        – Finalized audio of the attempt.  An empty or silent
///                   clip is a normal (likely low-score) input.
/// * `target_word` – The word the speaker was asked to pronounce.
#[async_trait]
pub trait PronunciationEvaluator: Send + Sync {
    async fn evaluate(
        &self,
        clip: &AudioClip,
        target_word: &str,
    ) -> Result<EvaluationResult, EvalError>;
}

// ---------------------------------------------------------------------------
// ApiEvaluationClient
// ---------------------------------------------------------------------------

/// Two-stage remote evaluator over an OpenAI-compatible API.
///
/// Stage A (transcription) and Stage B (judgment) run strictly in sequence,
/// never concurrently; Stage A fully resolves before Stage B begins.
pub struct ApiEvaluationClient {
    client: reqwest::Client,
    config: EvaluationConfig,
    policy: RetryPolicy,
}

impl ApiEvaluationClient {
    /// Build a client from application config.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs`.  A default (no-timeout) client is the
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn from_config(config: &EvaluationConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let policy = RetryPolicy {
            max_retries: config.max_retries,
            initial_delay: std::time::Duration::from_millis(config.initial_backoff_ms),
        };

        Self {
            client,
            config: config.clone(),
            policy,
        }
    }

    /// One full two-stage attempt: transcribe, then judge.
    async fn attempt(
        &self,
        clip: &AudioClip,
        target_word: &str,
        api_key: &str,
    ) -> Result<EvaluationResult, EvalError> {
        let transcript = self.transcribe(clip, api_key).await?;
        log::debug!("transcript for {target_word:?}: {transcript:?}");
        self.judge(target_word, &transcript, api_key).await
    }

    /// Stage A: upload the clip and obtain a best-effort transcript.
    ///
    /// An absent or empty transcript is a normal outcome (total silence),
    /// not an error.
    async fn transcribe(&self, clip: &AudioClip, api_key: &str) -> Result<String, EvalError> {
        let part = multipart::Part::bytes(clip.bytes().to_vec())
            .file_name("clip.wav")
            .mime_str(clip.media_type())
            .map_err(|e| EvalError::Configuration(format!("invalid clip media type: {e}")))?;

        let form = multipart::Form::new()
            .part("file", part)
            .text("model", self.config.transcription_model.clone())
            .text("language", self.config.language.clone());

        let response = self
            .client
            .post(format!("{}/v1/audio/transcriptions", self.config.base_url))
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = error_detail(response).await;
            return Err(classify_service_failure(Some(status), &detail));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| EvalError::Transient(format!("unreadable transcription response: {e}")))?;

        Ok(body["text"].as_str().unwrap_or_default().trim().to_string())
    }

    /// Stage B: submit the transcript for judgment under the strict schema.
    async fn judge(
        &self,
        target_word: &str,
        transcript: &str,
        api_key: &str,
    ) -> Result<EvaluationResult, EvalError> {
        let body = serde_json::json!({
            "model": self.config.judgment_model,
            "messages": [
                { "role": "system", "content": prompt::SYSTEM_MESSAGE },
                { "role": "user",   "content": prompt::judgment_request(target_word, transcript) }
            ],
            "response_format": { "type": "json_object" },
            "temperature": self.config.temperature,
        });

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.config.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = error_detail(response).await;
            return Err(classify_service_failure(Some(status), &detail));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| EvalError::Transient(format!("unreadable judgment response: {e}")))?;

        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| EvalError::Schema("judgment response carried no content".into()))?;

        parse_judgment(content)
    }
}

#[async_trait]
impl PronunciationEvaluator for ApiEvaluationClient {
    /// Evaluate one clip against `target_word`.
    ///
    /// A missing API key fails immediately with a configuration error.
    /// Transient failures in either stage retry the whole two-stage
    /// sequence with exponential backoff.
    async fn evaluate(
        &self,
        clip: &AudioClip,
        target_word: &str,
    ) -> Result<EvaluationResult, EvalError> {
        let api_key = self.config.resolved_api_key().ok_or_else(|| {
            EvalError::Configuration(
                "API key is not configured; set it in settings.toml or the \
                 OPENAI_API_KEY environment variable"
                    .into(),
            )
        })?;

        retry_with_backoff(&self.policy, || self.attempt(clip, target_word, &api_key)).await
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Pull the service's error message out of a non-success response body,
/// falling back to the bare status line.
async fn error_detail(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<serde_json::Value>().await {
        Ok(body) => body["error"]["message"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {status}")),
        Err(_) => format!("HTTP {status}"),
    }
}

/// Parse the judgment content under the strict schema contract.
fn parse_judgment(content: &str) -> Result<EvaluationResult, EvalError> {
    serde_json::from_str(content).map_err(|e| EvalError::Schema(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
