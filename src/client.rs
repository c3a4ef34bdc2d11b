use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::settings::Settings;

const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_MS: u64 = 2000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Failure modes of one model call, each mapped to a single user-facing message.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Gemini API key not valid. Please check configuration.")]
    Auth,
    #[error("API quota exceeded. Please try again later.")]
    Quota,
    #[error("The AI's response was blocked ({0}). Try rephrasing the idea or adjusting the fun meter.")]
    Blocked(String),
    #[error("Model request failed with HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("Unexpected model response: {0}")]
    Api(String),
    #[error("The model returned no text.")]
    Empty,
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl GenerateError {
    fn is_retryable(&self) -> bool {
        match self {
            GenerateError::Http { status, .. } => *status >= 500,
            GenerateError::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

// ── Wire shapes ──

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

const BLOCKING_FINISH_REASONS: &[&str] = &["SAFETY", "BLOCKLIST", "PROHIBITED_CONTENT", "SPII"];

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_api_key()?.to_string();
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(GeminiClient {
            http,
            endpoint: format!(
                "{}/models/{}:generateContent",
                settings.api_base.trim_end_matches('/'),
                settings.model
            ),
            api_key,
        })
    }

    /// Send one prompt, retrying server errors with exponential backoff.
    pub async fn generate(&self, label: &str, prompt: &str) -> Result<String, GenerateError> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(label.to_string());
        spinner.enable_steady_tick(Duration::from_millis(120));

        let t0 = Instant::now();
        let result = self.generate_with_retry(label, prompt).await;
        spinner.finish_and_clear();

        match &result {
            Ok(text) => info!(
                "{}: {} chars in {:.1}s",
                label,
                text.len(),
                t0.elapsed().as_secs_f64()
            ),
            Err(e) => warn!("{} failed: {}", label, e),
        }
        result
    }

    async fn generate_with_retry(&self, label: &str, prompt: &str) -> Result<String, GenerateError> {
        let mut attempt = 0;
        loop {
            match self.generate_once(prompt).await {
                Err(e) if e.is_retryable() && attempt < MAX_RETRIES => {
                    let backoff = Duration::from_millis(BASE_BACKOFF_MS * 2u64.pow(attempt));
                    warn!(
                        "{} failed: {} (attempt {}/{}), backing off {:.1}s",
                        label,
                        e,
                        attempt + 1,
                        MAX_RETRIES,
                        backoff.as_secs_f64()
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn generate_once(&self, prompt: &str) -> Result<String, GenerateError> {
        info!("Sending prompt ({} chars) to {}", prompt.len(), self.endpoint);
        let body = GenerateRequest {
            contents: [Content {
                parts: [RequestPart { text: prompt }],
            }],
        };
        let resp = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let raw = resp.text().await?;
        if !(200..300).contains(&status) {
            return Err(classify_failure(status, &error_message(&raw)));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&raw).map_err(|e| GenerateError::Api(e.to_string()))?;
        extract_text(parsed)
    }
}

/// The `error.message` of a Gemini error envelope, or the raw body.
fn error_message(raw: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(raw)
        .map(|env| env.error.message)
        .unwrap_or_else(|_| raw.trim().to_string())
}

pub fn classify_failure(status: u16, message: &str) -> GenerateError {
    let lower = message.to_lowercase();
    if status == 401 || status == 403 || message.contains("API key not valid") {
        GenerateError::Auth
    } else if status == 429 || lower.contains("quota") {
        GenerateError::Quota
    } else if lower.contains("candidate was blocked") {
        GenerateError::Blocked(message.to_string())
    } else {
        GenerateError::Http {
            status,
            message: message.to_string(),
        }
    }
}

fn extract_text(resp: GenerateResponse) -> Result<String, GenerateError> {
    if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(GenerateError::Blocked(reason));
    }
    let Some(candidate) = resp.candidates.into_iter().next() else {
        return Err(GenerateError::Empty);
    };
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return match candidate.finish_reason {
            Some(reason) if BLOCKING_FINISH_REASONS.contains(&reason.as_str()) => {
                Err(GenerateError::Blocked(reason))
            }
            _ => Err(GenerateError::Empty),
        };
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<String, GenerateError> {
        extract_text(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn failure_taxonomy() {
        assert!(matches!(classify_failure(400, "API key not valid. Please pass a valid API key."), GenerateError::Auth));
        assert!(matches!(classify_failure(403, "forbidden"), GenerateError::Auth));
        assert!(matches!(classify_failure(400, "Quota exceeded for metric"), GenerateError::Quota));
        assert!(matches!(classify_failure(429, "slow down"), GenerateError::Quota));
        assert!(matches!(classify_failure(400, "Candidate was blocked due to SAFETY"), GenerateError::Blocked(_)));
        assert!(matches!(
            classify_failure(503, "overloaded"),
            GenerateError::Http { status: 503, .. }
        ));
    }

    #[test]
    fn only_server_errors_retry() {
        assert!(classify_failure(500, "boom").is_retryable());
        assert!(!classify_failure(404, "missing").is_retryable());
        assert!(!GenerateError::Quota.is_retryable());
    }

    #[test]
    fn text_parts_are_joined() {
        let json = r###"{"candidates":[{"content":{"parts":[{"text":"## Pros:\n"},{"text":"- **A** - b"}]},"finishReason":"STOP"}]}"###;
        assert_eq!(parse(json).unwrap(), "## Pros:\n- **A** - b");
    }

    #[test]
    fn prompt_block_is_reported() {
        let json = r#"{"candidates":[],"promptFeedback":{"blockReason":"SAFETY"}}"#;
        assert!(matches!(parse(json), Err(GenerateError::Blocked(r)) if r == "SAFETY"));
    }

    #[test]
    fn safety_stop_without_text_is_blocked() {
        let json = r#"{"candidates":[{"finishReason":"SAFETY"}]}"#;
        assert!(matches!(parse(json), Err(GenerateError::Blocked(_))));
    }

    #[test]
    fn no_candidates_is_empty() {
        assert!(matches!(parse("{}"), Err(GenerateError::Empty)));
    }

    #[test]
    fn error_envelope_message() {
        let raw = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(error_message(raw), "API key not valid.");
        assert_eq!(error_message("plain failure\n"), "plain failure");
    }
}
