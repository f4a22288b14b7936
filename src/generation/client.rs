//! Gemini `generateContent` client
//!
//! One request per call, no retries. The outcome is either the generated
//! text or a [`GenerationError`] naming what went wrong.

use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::prompts::PromptKind;
use super::transport::{HttpResponse, HttpTransport};
use crate::models::settings::Settings;

pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Why a generation request produced no text
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    /// No API key configured; no request was sent
    #[error("Please set your Gemini API Key in the extension settings (click the LevelUp icon in your browser toolbar)")]
    MissingCredential,

    /// The API rejected the credential or the request made with it
    #[error("{}", auth_message(*status))]
    AuthError { status: u16 },

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("API request failed with status {0}")]
    HttpStatus(u16),

    /// 2xx response without `candidates[0].content.parts[0].text`
    #[error("Unexpected response format from the API ({0}). Please try again.")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    Transport(String),
}

fn auth_message(status: u16) -> &'static str {
    match status {
        400 => "Invalid request. Please verify your API key is correct and try again.",
        401 => "API key is invalid or expired. Please check your settings and try again.",
        _ => "Access denied. Your API key may not have permission for this model.",
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// One generation to run
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub kind: PromptKind,
    pub original_text: String,
    pub context: Option<String>,
    pub temperature: f64,
}

impl GenerationRequest {
    /// Build a request using the configured temperature
    pub fn new(kind: PromptKind, original_text: &str, context: Option<&str>, settings: &Settings) -> Self {
        Self {
            kind,
            original_text: original_text.to_string(),
            context: context.map(str::to_string),
            temperature: kind.temperature(settings.temperature),
        }
    }

    pub fn prompt(&self) -> String {
        self.kind.build(&self.original_text, self.context.as_deref())
    }

    /// Wire payload for `generateContent`
    pub fn body(&self) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: self.prompt() }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        }
    }
}

/// Gemini client over any [`HttpTransport`]
pub struct GenerationClient<T> {
    transport: T,
    base_url: String,
}

impl<T: HttpTransport> GenerationClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_base_url(transport, GEMINI_API_URL)
    }

    pub fn with_base_url(transport: T, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run one generation.
    ///
    /// A missing API key fails before anything is sent.
    pub async fn generate(&self, settings: &Settings, request: &GenerationRequest) -> Result<String, GenerationError> {
        if !settings.has_credential() {
            error!("API key is not set");
            return Err(GenerationError::MissingCredential);
        }

        let url = format!(
            "{}/{}:generateContent?key={}",
            self.base_url,
            settings.model,
            settings.api_key.trim()
        );
        info!(
            "Gemini request: model={}, kind={:?}, temperature={}, key={}",
            settings.model,
            request.kind,
            request.temperature,
            settings.credential_summary()
        );

        let body = serde_json::to_string(&request.body())
            .map_err(|e| GenerationError::Transport(format!("Failed to encode request: {}", e)))?;

        let response = self.transport.post_json(&url, body).await.map_err(|e| {
            error!("Gemini API request failed: {}", e);
            GenerationError::Transport(e.0)
        })?;

        debug!("Gemini API response status: {}", response.status);
        parse_response(&response)
    }
}

/// Map an HTTP response to generated text or an error
pub fn parse_response(response: &HttpResponse) -> Result<String, GenerationError> {
    if !response.is_success() {
        error!("Gemini API error: status={}", response.status);
        return Err(match response.status {
            400 | 401 | 403 => GenerationError::AuthError { status: response.status },
            429 => GenerationError::RateLimited,
            other => GenerationError::HttpStatus(other),
        });
    }

    let parsed: GenerateResponse = serde_json::from_str(&response.body)
        .map_err(|e| GenerationError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    let text = parsed
        .candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content)
        .and_then(|c| c.parts)
        .and_then(|p| p.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| GenerationError::MalformedResponse("no candidate text".to_string()))?;

    let text = text.trim();
    if text.is_empty() {
        return Err(GenerationError::MalformedResponse("empty candidate text".to_string()));
    }

    info!("Generation successful: {} chars", text.chars().count());
    Ok(text.to_string())
}
