/// Text oracle: the single point of entry for all generative-model calls in CareerLift.
///
/// ARCHITECTURAL RULE: No other module may call the Generative Language API directly.
/// All model interactions go through the `TextOracle` trait defined here.
///
/// The oracle is untrusted: callers must pass its output through `normalize`
/// and validate the result before persisting anything.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod normalize;
pub mod prompts;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Model returned empty content")]
    EmptyContent,
}

/// Opaque prompt-in, text-out completion service.
///
/// Carried in `AppState` as `Arc<dyn TextOracle>` so tests can script responses.
#[async_trait]
pub trait TextOracle: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, OracleError>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
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

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
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
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
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

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Client for the hosted Gemini `generateContent` endpoint.
///
/// Makes exactly one attempt per call; retry policy belongs to callers.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{GEMINI_API_BASE}/{}:generateContent", self.model)
    }
}

#[async_trait]
impl TextOracle for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, OracleError> {
        let request_body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
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
            warn!("Gemini API returned {status}: {message}");
            return Err(OracleError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response.json().await?;

        if let Some(usage) = &body.usage_metadata {
            debug!(
                "Oracle call succeeded: prompt_tokens={}, output_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        body.text().ok_or(OracleError::EmptyContent)
    }
}
