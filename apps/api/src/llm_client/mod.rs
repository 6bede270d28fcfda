/// LLM Client — the single point of entry for all Claude API calls in InternSpark.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// Flows reach the model through the `ModelProvider` trait, implemented here.
///
/// Model: claude-sonnet-4-5 (hardcoded — do not make configurable to prevent drift)
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::flows::template::{Prompt, PromptPart};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls in InternSpark.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Cannot attach media: {0}")]
    Media(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Provider contract
// ────────────────────────────────────────────────────────────────────────────

/// One structured-output request: a rendered prompt plus the JSON Schema the
/// answer must follow.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub tool_name: &'static str,
    pub prompt: Prompt,
    pub output_schema: Value,
}

/// The external model as seen by the flow invoker. Returns the raw structured
/// result; validating it against the flow's output type is the caller's job.
///
/// Carried in `FlowInvoker` as `Arc<dyn ModelProvider>`.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn generate(&self, request: &ModelRequest) -> Result<Value, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolDefinition<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: Vec<RequestBlock>,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RequestBlock {
    Text { text: String },
    Image { source: MediaSource },
    Document { source: MediaSource },
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum MediaSource {
    Base64 { media_type: String, data: String },
    Text { media_type: String, data: String },
}

#[derive(Debug, Serialize)]
struct ToolDefinition<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: &'a Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
    pub name: Option<String>,
    pub input: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }

    /// Extracts the input of the `tool_use` block for `tool_name`.
    pub fn tool_input(&self, tool_name: &str) -> Option<&Value> {
        self.content
            .iter()
            .find(|b| b.block_type == "tool_use" && b.name.as_deref() == Some(tool_name))
            .and_then(|b| b.input.as_ref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The single LLM client used by every flow in InternSpark.
/// Wraps the Anthropic Messages API with retry logic and structured output helpers.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()?,
            api_key,
        })
    }

    /// Makes a raw call to the Claude API, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    async fn call(&self, request_body: &AnthropicRequest<'_>) -> Result<LlmResponse, LlmError> {
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let llm_response: LlmResponse = response.json().await?;

            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                llm_response.usage.input_tokens, llm_response.usage.output_tokens
            );

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Calls the LLM with a single forced tool whose input schema is the
    /// requested output schema, and returns the tool input.
    pub async fn call_structured(&self, request: &ModelRequest) -> Result<Value, LlmError> {
        let body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system: request.prompt.system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: content_blocks(&request.prompt)?,
            }],
            tools: vec![ToolDefinition {
                name: request.tool_name,
                description: prompts::STRUCTURED_TOOL_DESCRIPTION,
                input_schema: &request.output_schema,
            }],
            tool_choice: Some(ToolChoice {
                kind: "tool",
                name: request.tool_name,
            }),
        };

        let response = self.call(&body).await?;
        extract_structured(&response, request.tool_name)
    }
}

#[async_trait]
impl ModelProvider for LlmClient {
    async fn generate(&self, request: &ModelRequest) -> Result<Value, LlmError> {
        self.call_structured(request).await
    }
}

/// Pulls the structured result out of a response. Prefers the forced tool
/// call; falls back to JSON in the first text block.
fn extract_structured(response: &LlmResponse, tool_name: &str) -> Result<Value, LlmError> {
    if let Some(input) = response.tool_input(tool_name) {
        return Ok(input.clone());
    }
    let text = response.text().ok_or(LlmError::EmptyContent)?;
    parse_json_text(text)
}

/// Deserializes model text as JSON, tolerating markdown code fences.
pub fn parse_json_text<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    serde_json::from_str(strip_json_fences(text)).map_err(LlmError::Parse)
}

/// Maps prompt parts onto Anthropic content blocks.
fn content_blocks(prompt: &Prompt) -> Result<Vec<RequestBlock>, LlmError> {
    prompt
        .parts
        .iter()
        .map(|part| match part {
            PromptPart::Text(text) => Ok(RequestBlock::Text { text: text.clone() }),
            PromptPart::Media(uri) if uri.is_image() => Ok(RequestBlock::Image {
                source: MediaSource::Base64 {
                    media_type: uri.mime().to_string(),
                    data: uri.base64(),
                },
            }),
            PromptPart::Media(uri) if uri.is_text() => {
                let text = std::str::from_utf8(uri.data())
                    .map_err(|e| LlmError::Media(format!("{} is not UTF-8: {e}", uri.mime())))?;
                Ok(RequestBlock::Document {
                    source: MediaSource::Text {
                        media_type: "text/plain".to_string(),
                        data: text.to_string(),
                    },
                })
            }
            PromptPart::Media(uri) if uri.mime() == "application/pdf" => {
                Ok(RequestBlock::Document {
                    source: MediaSource::Base64 {
                        media_type: uri.mime().to_string(),
                        data: uri.base64(),
                    },
                })
            }
            PromptPart::Media(uri) => Err(LlmError::Media(format!(
                "unsupported media type {}",
                uri.mime()
            ))),
        })
        .collect()
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
