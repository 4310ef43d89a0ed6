//! LLM client: the single point of entry for all generative-model calls.
//!
//! ARCHITECTURAL RULE: No other module may call the Gemini API directly.
//! All model interactions MUST go through this module, and callers depend on the
//! `GenerativeModel` trait rather than on `LlmClient` itself.
//!
//! Every `generate` is exactly one HTTP request. Assessment runs are not retried;
//! a failed run is re-triggered by the caller.

use async_trait::async_trait;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,

    /// Generation stopped before the model finished, e.g. on MAX_TOKENS or SAFETY.
    #[error("LLM stopped early (finish reason {0})")]
    Incomplete(String),
}

/// Binary media attached to a prompt (interview recordings).
#[derive(Debug, Clone, Copy)]
pub struct MediaPart<'a> {
    pub data: &'a [u8],
    pub mime_type: &'a str,
    /// Frames-per-second sampling hint for video.
    pub fps: Option<f64>,
}

/// The seam every model-consuming service depends on.
/// `AppState` carries `Arc<dyn GenerativeModel>`; tests substitute canned replies.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Sends one prompt (plus optional media) and returns the model's raw text reply.
    async fn generate(&self, prompt: &str, media: Option<MediaPart<'_>>)
        -> Result<String, LlmError>;

    /// Model identifier, recorded alongside results.
    fn model_name(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestPart<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    video_metadata: Option<VideoMetadata>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Serialize)]
struct VideoMetadata {
    fps: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u32>,
    pub candidates_token_count: Option<u32>,
}

impl GenerateContentResponse {
    /// The first candidate's finish reason, unless it is a normal stop.
    pub fn early_finish_reason(&self) -> Option<&str> {
        self.candidates
            .first()?
            .finish_reason
            .as_deref()
            .filter(|reason| !matches!(*reason, "STOP" | "FINISH_REASON_UNSPECIFIED"))
    }

    /// The reply text, or why there is none usable. A truncated reply is an error
    /// even when it carries text.
    pub fn into_text(self) -> Result<String, LlmError> {
        if let Some(reason) = self.early_finish_reason() {
            return Err(LlmError::Incomplete(reason.to_string()));
        }
        self.text().ok_or(LlmError::EmptyContent)
    }

    /// Concatenates the text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Gemini `generateContent` client. Cheap to clone; the underlying
/// `reqwest::Client` shares its connection pool.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            model,
        }
    }

    /// Same credentials and connection pool, different model.
    pub fn with_model(&self, model: impl Into<String>) -> Self {
        Self {
            client: self.client.clone(),
            api_key: self.api_key.clone(),
            model: model.into(),
        }
    }

    /// Makes a raw call to `generateContent`, returning the full response object.
    pub async fn call(
        &self,
        prompt: &str,
        media: Option<MediaPart<'_>>,
    ) -> Result<GenerateContentResponse, LlmError> {
        let request_body = build_request(prompt, media);
        let url = format!("{GEMINI_API_BASE}/{}:generateContent", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "Gemini call succeeded: model={}, prompt_tokens={:?}, output_tokens={:?}",
                self.model, usage.prompt_token_count, usage.candidates_token_count
            );
        }

        Ok(parsed)
    }
}

#[async_trait]
impl GenerativeModel for LlmClient {
    async fn generate(
        &self,
        prompt: &str,
        media: Option<MediaPart<'_>>,
    ) -> Result<String, LlmError> {
        self.call(prompt, media).await?.into_text()
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Media goes first, then the instruction text.
fn build_request<'a>(prompt: &'a str, media: Option<MediaPart<'a>>) -> GenerateContentRequest<'a> {
    let mut parts = Vec::with_capacity(2);
    if let Some(media) = media {
        parts.push(RequestPart {
            inline_data: Some(InlineData {
                mime_type: media.mime_type,
                data: base64::engine::general_purpose::STANDARD.encode(media.data),
            }),
            video_metadata: media.fps.map(|fps| VideoMetadata { fps }),
            ..Default::default()
        });
    }
    parts.push(RequestPart {
        text: Some(prompt),
        ..Default::default()
    });

    GenerateContentRequest {
        contents: vec![RequestContent {
            role: "user",
            parts,
        }],
    }
}

/// Strips a markdown code fence from LLM output. The fence may carry any info
/// string (```json, ```JSON, ```javascript) or none.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };

    let body = match rest.split_once('\n') {
        Some((info, remainder)) if is_fence_info(info) => remainder,
        Some(_) => rest,
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    let body = body.trim();
    body.strip_suffix("```").map(str::trim).unwrap_or(body)
}

/// A fence info string is a single language word, e.g. `json` or `c++`.
fn is_fence_info(line: &str) -> bool {
    line.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.'))
}
