//! LLM-backed plausibility check for laptop specifications.
//!
//! The check is an external capability, not an algorithm: the heuristics
//! live in the prompt and the hosted model weighs them. Callers depend on
//! the [`SpecValidationPort`] trait so tests can swap in canned verdicts.

pub mod prompts;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::PriceLensError;
use crate::spec::LaptopSpec;

use self::prompts::{build_validation_prompt, verdict_json_schema};

const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const KIMI_URL: &str = "https://api.moonshot.cn/v1/chat/completions";
const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

const SYSTEM_PROMPT: &str = "You are a laptop hardware plausibility checker. \
    Always respond with valid JSON only, no markdown formatting or code blocks.";

/// Verdict returned by the validation service.
///
/// `is_valid = false` is a normal outcome, not an error; `reason` is
/// populated only for invalid specs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationVerdict {
    #[serde(rename = "isValid")]
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// The seam between the pipeline and the completion service.
/// Production uses [`LlmSpecValidator`]; tests use stubs.
#[async_trait]
pub trait SpecValidationPort: Send + Sync {
    async fn validate(&self, spec: &LaptopSpec) -> Result<ValidationVerdict, PriceLensError>;
}

/// Provider-dispatched validator backed by a hosted completion service.
///
/// Supported providers: "claude", "openai", "kimi", "openrouter". Each
/// validation is a single POST with a 60-second timeout; there is no retry.
pub struct LlmSpecValidator {
    provider: String,
    model: String,
    api_key: String,
    base_url: Option<String>,
}

impl LlmSpecValidator {
    pub fn new(
        provider: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            api_key: api_key.into(),
            base_url: None,
        }
    }

    /// Override the provider endpoint. Tests point this at a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    fn endpoint(&self, default_url: &str, path: &str) -> String {
        match &self.base_url {
            Some(base) => format!("{}{}", base.trim_end_matches('/'), path),
            None => default_url.to_string(),
        }
    }
}

#[async_trait]
impl SpecValidationPort for LlmSpecValidator {
    async fn validate(&self, spec: &LaptopSpec) -> Result<ValidationVerdict, PriceLensError> {
        let prompt = build_validation_prompt(spec);
        let schema = verdict_json_schema();

        info!(
            "Validating spec for '{} {}' using provider '{}' model '{}'",
            spec.company, spec.type_name, self.provider, self.model
        );

        let response_text = match self.provider.as_str() {
            "claude" => {
                call_claude(
                    &self.endpoint(ANTHROPIC_URL, "/v1/messages"),
                    &self.api_key,
                    &self.model,
                    &prompt,
                )
                .await
            }
            "openai" => {
                call_openai(
                    &self.endpoint(OPENAI_URL, "/v1/chat/completions"),
                    &self.api_key,
                    &self.model,
                    &prompt,
                    &schema,
                )
                .await
            }
            "kimi" => {
                call_kimi(
                    &self.endpoint(KIMI_URL, "/v1/chat/completions"),
                    &self.api_key,
                    &self.model,
                    &prompt,
                )
                .await
            }
            "openrouter" => {
                call_openrouter(
                    &self.endpoint(OPENROUTER_URL, "/v1/chat/completions"),
                    &self.api_key,
                    &self.model,
                    &prompt,
                )
                .await
            }
            other => {
                let msg = format!(
                    "Unsupported AI provider: '{}'. Supported: claude, openai, kimi, openrouter",
                    other
                );
                error!("{}", msg);
                Err(msg)
            }
        }
        .map_err(PriceLensError::Validation)?;

        let verdict = parse_verdict(&response_text).map_err(|e| {
            error!("{}", e);
            PriceLensError::Validation(e)
        })?;

        info!(
            "Validation verdict for '{} {}': is_valid={}",
            spec.company, spec.type_name, verdict.is_valid
        );
        Ok(verdict)
    }
}

/// Parse the model's response text into a verdict.
/// A missing or non-boolean `isValid` is a hard error: there is no safe
/// default for "is this laptop plausible".
fn parse_verdict(response_text: &str) -> Result<ValidationVerdict, String> {
    let cleaned = strip_markdown_json(response_text);
    let json: serde_json::Value = serde_json::from_str(&cleaned).map_err(|e| {
        format!(
            "Failed to parse validation response as JSON: {}. Raw response (first 500 chars): {}",
            e,
            truncate_for_log(&cleaned, 500)
        )
    })?;

    let is_valid = json["isValid"].as_bool().ok_or_else(|| {
        format!(
            "Validation response missing boolean 'isValid' field. Raw response (first 500 chars): {}",
            truncate_for_log(&cleaned, 500)
        )
    })?;

    let reason = json["reason"]
        .as_str()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    Ok(ValidationVerdict { is_valid, reason })
}

/// Strip a surrounding markdown code fence if present. Providers without a
/// strict JSON mode occasionally wrap their output in ```json ... ```.
fn strip_markdown_json(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let body = match trimmed.find('\n') {
        Some(pos) => &trimmed[pos + 1..],
        None => trimmed,
    };
    let body = body.trim_end();
    match body.strip_suffix("```") {
        Some(inner) => inner.trim().to_string(),
        None => body.to_string(),
    }
}

fn truncate_for_log(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }
    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

/// Build a reqwest client with a 60-second timeout for LLM API calls.
fn build_api_client() -> Result<reqwest::Client, String> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {}", e))
}

/// Check status and extract the body text of a provider response.
async fn handle_api_response(
    response: reqwest::Response,
    provider: &str,
) -> Result<String, String> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read body>".to_string());
        let msg = format!(
            "Validation API error: {} from {} - {}",
            status,
            provider,
            truncate_for_log(&body, 1024)
        );
        error!("{}", msg);
        return Err(msg);
    }
    response
        .text()
        .await
        .map_err(|e| format!("Failed to read API response body from {}: {}", provider, e))
}

fn send_error(provider: &str, e: reqwest::Error) -> String {
    let msg = if e.is_timeout() {
        format!("Validation API timeout after 60s for provider '{}'", provider)
    } else {
        format!("Validation API request failed for {}: {}", provider, e)
    };
    error!("{}", msg);
    msg
}

/// Call the Anthropic Claude API.
/// The verdict schema is small enough to enforce through the prompt alone,
/// so this uses plain messages with a JSON-only system prompt.
async fn call_claude(url: &str, api_key: &str, model: &str, prompt: &str) -> Result<String, String> {
    let client = build_api_client()?;

    let body = serde_json::json!({
        "model": model,
        "max_tokens": 1024,
        "system": SYSTEM_PROMPT,
        "messages": [
            {"role": "user", "content": prompt}
        ]
    });

    let response = client
        .post(url)
        .header("x-api-key", api_key)
        .header("anthropic-version", "2023-06-01")
        .header("content-type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| send_error("claude", e))?;

    let body_text = handle_api_response(response, "claude").await?;

    // Anthropic response format: { "content": [{"type": "text", "text": "..."}] }
    let resp_json: serde_json::Value = serde_json::from_str(&body_text).map_err(|e| {
        let msg = format!("Failed to parse Claude API response wrapper: {}", e);
        error!("{}", msg);
        msg
    })?;

    resp_json["content"][0]["text"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| {
            let msg = "No text content in Claude API response".to_string();
            error!("{}", msg);
            msg
        })
}

/// Call the OpenAI API with structured output (json_schema response_format).
async fn call_openai(
    url: &str,
    api_key: &str,
    model: &str,
    prompt: &str,
    schema: &serde_json::Value,
) -> Result<String, String> {
    let client = build_api_client()?;

    let body = serde_json::json!({
        "model": model,
        "max_tokens": 1024,
        "messages": [
            {"role": "user", "content": prompt}
        ],
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": "validation_verdict",
                "strict": true,
                "schema": schema
            }
        }
    });

    let response = client
        .post(url)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("content-type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| send_error("openai", e))?;

    let body_text = handle_api_response(response, "openai").await?;

    // OpenAI response format: { "choices": [{"message": {"content": "..."}}] }
    let resp_json: serde_json::Value = serde_json::from_str(&body_text).map_err(|e| {
        let msg = format!("Failed to parse OpenAI API response wrapper: {}", e);
        error!("{}", msg);
        msg
    })?;

    resp_json["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| {
            let msg = "No content in OpenAI API response".to_string();
            error!("{}", msg);
            msg
        })
}

/// Call the Kimi (Moonshot) API in plain JSON mode.
async fn call_kimi(url: &str, api_key: &str, model: &str, prompt: &str) -> Result<String, String> {
    let client = build_api_client()?;

    let body = serde_json::json!({
        "model": model,
        "max_tokens": 1024,
        "messages": [
            {"role": "user", "content": prompt}
        ],
        "response_format": {
            "type": "json_object"
        }
    });

    let response = client
        .post(url)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("content-type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| send_error("kimi", e))?;

    let body_text = handle_api_response(response, "kimi").await?;

    // Kimi response format matches OpenAI
    let resp_json: serde_json::Value = serde_json::from_str(&body_text).map_err(|e| {
        let msg = format!("Failed to parse Kimi API response wrapper: {}", e);
        error!("{}", msg);
        msg
    })?;

    resp_json["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| {
            let msg = "No content in Kimi API response".to_string();
            error!("{}", msg);
            msg
        })
}

/// Call the OpenRouter API in json_object mode with a JSON-only system
/// message, so Anthropic-routed models behave the same as native ones.
async fn call_openrouter(
    url: &str,
    api_key: &str,
    model: &str,
    prompt: &str,
) -> Result<String, String> {
    let client = build_api_client()?;

    let body = serde_json::json!({
        "model": model,
        "max_tokens": 1024,
        "messages": [
            {"role": "system", "content": SYSTEM_PROMPT},
            {"role": "user", "content": prompt}
        ],
        "response_format": {
            "type": "json_object"
        }
    });

    let response = client
        .post(url)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("content-type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| send_error("openrouter", e))?;

    let body_text = handle_api_response(response, "openrouter").await?;

    let resp_json: serde_json::Value = serde_json::from_str(&body_text).map_err(|e| {
        let msg = format!("Failed to parse OpenRouter API response wrapper: {}", e);
        error!("{}", msg);
        msg
    })?;

    resp_json["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| {
            let msg = "No content in OpenRouter API response".to_string();
            error!("{}", msg);
            msg
        })
}
