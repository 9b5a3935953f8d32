//! Gemini client: the single point of entry for all Gemini API calls.
//!
//! No other module may call the Gemini REST API directly. Everything else
//! talks to the `TextGenerator` / `ImageGenerator` traits.
//!
//! Models are hardcoded; do not make them configurable.

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// Model used for verse + application text.
pub const TEXT_MODEL: &str = "gemini-2.5-flash";
/// Model used for the optional illustration.
pub const IMAGE_MODEL: &str = "imagen-3.0-generate-002";

const JSON_MIME_TYPE: &str = "application/json";
pub const IMAGE_MIME_TYPE: &str = "image/jpeg";
const TEMPERATURE: f32 = 0.75;
const TOP_P: f32 = 0.95;
const TOP_K: u32 = 40;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx answer. `code` is the service's canonical status
    /// (e.g. `RESOURCE_EXHAUSTED`), `reasons` come from `error.details[].reason`.
    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        reasons: Vec<String>,
        message: String,
    },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("API key is not configured")]
    MissingApiKey,
}

// ────────────────────────────────────────────────────────────────────────────
// Seams used by the suggestion requester
// ────────────────────────────────────────────────────────────────────────────

/// Text generation constrained to a JSON object answer.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the raw model text. It may still be wrapped in a code fence.
    async fn generate_json_text(&self, prompt: &str) -> Result<String, LlmError>;
}

/// A single generated image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub base64_bytes: String,
}

impl GeneratedImage {
    pub fn to_data_url(&self) -> String {
        format!("data:{IMAGE_MIME_TYPE};base64,{}", self.base64_bytes)
    }
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// `Ok(None)` when the service answered but produced no image.
    async fn generate_image(&self, prompt: &str) -> Result<Option<GeneratedImage>, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
    top_p: f32,
    top_k: u32,
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
    /// Concatenated text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    instances: Vec<PredictInstance<'a>>,
    parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
struct PredictInstance<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: u32,
    output_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub bytes_base64_encoded: Option<String>,
}

impl PredictResponse {
    fn first_image(self) -> Option<GeneratedImage> {
        self.predictions
            .into_iter()
            .find_map(|p| p.bytes_base64_encoded.filter(|b| !b.is_empty()))
            .map(|base64_bytes| GeneratedImage { base64_bytes })
    }
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    message: String,
    status: Option<String>,
    #[serde(default)]
    details: Vec<GoogleErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    reason: Option<String>,
}

/// Builds `LlmError::Api` from a non-2xx body, keeping the raw body as the
/// message when it is not the usual `{ "error": { ... } }` shape.
fn api_error(status: u16, body: String) -> LlmError {
    match serde_json::from_str::<GoogleError>(&body) {
        Ok(parsed) => LlmError::Api {
            status,
            code: parsed.error.status,
            reasons: parsed
                .error
                .details
                .into_iter()
                .filter_map(|d| d.reason)
                .collect(),
            message: parsed.error.message,
        },
        Err(_) => LlmError::Api {
            status,
            code: None,
            reasons: Vec::new(),
            message: body,
        },
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The Gemini client. A missing key is not an error until a call is made.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .user_agent(concat!("verse-finder/", env!("CARGO_PKG_VERSION")))
                .build()?,
            api_key,
        })
    }

    /// POSTs `body` to `{model}:{method}` and decodes the JSON answer.
    /// Single attempt; no retry.
    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        model: &str,
        method: &str,
        body: &B,
    ) -> Result<T, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;
        let url = format!("{GEMINI_API_BASE}/{model}:{method}");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Gemini API returned {status} for {model}:{method}");
            return Err(api_error(status.as_u16(), body));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_json_text(&self, prompt: &str) -> Result<String, LlmError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: JSON_MIME_TYPE,
                temperature: TEMPERATURE,
                top_p: TOP_P,
                top_k: TOP_K,
            },
        };

        let response: GenerateContentResponse =
            self.post(TEXT_MODEL, "generateContent", &request).await?;

        if let Some(usage) = &response.usage_metadata {
            debug!(
                "Gemini call succeeded: prompt_tokens={:?}, candidate_tokens={:?}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        response.text().ok_or_else(|| {
            let finish_reason = response
                .candidates
                .first()
                .and_then(|c| c.finish_reason.as_deref());
            warn!(?finish_reason, "Gemini returned no text");
            LlmError::EmptyContent
        })
    }
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    async fn generate_image(&self, prompt: &str) -> Result<Option<GeneratedImage>, LlmError> {
        let request = PredictRequest {
            instances: vec![PredictInstance { prompt }],
            parameters: PredictParameters {
                sample_count: 1,
                output_mime_type: IMAGE_MIME_TYPE,
            },
        };

        let response: PredictResponse = self.post(IMAGE_MODEL, "predict", &request).await?;
        Ok(response.first_image())
    }
}

/// Strips fences and deserializes a model answer that should be a JSON object.
pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    serde_json::from_str(strip_json_fences(text)).map_err(LlmError::Parse)
}

/// Removes a surrounding code fence (optionally tagged `json`). An opening
/// fence without a closing one is still dropped.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(body) = text.strip_prefix("```") else {
        return text;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}
