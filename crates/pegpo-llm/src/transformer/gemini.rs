//! Gemini `generateContent` schema
//!
//! Responses may carry text directly (`text`) or nested under
//! `candidates[0].content.parts[0]`. [`GenerateContentResponse::shape`]
//! picks the shape by a fixed priority and [`normalize`] turns it into a
//! fragment.

use pegpo_core::ResponseFragment;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ConversionError;
use crate::provider::AuthConfig;
use crate::transformer::SchemaTransformer;

/// `generateContent` / `streamGenerateContent` response body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Flattened text, sent by some proxies and SDK-style gateways
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
    /// Error object, possibly delivered as a stream event
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default)]
    pub role: Option<String>,
}

/// One content part
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Value,
    },
    FunctionCall {
        #[serde(rename = "functionCall")]
        function_call: Value,
    },
    Other(Value),
}

impl Part {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.code, &self.status) {
            (Some(code), Some(status)) => write!(f, "{} {}: {}", code, status, self.message),
            (Some(code), None) => write!(f, "{}: {}", code, self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

/// Where the text of a response lives
#[derive(Debug, Clone, Copy)]
pub enum ResponseShape<'a> {
    /// Non-empty direct text
    Direct(&'a str),
    /// First part of the first candidate
    CandidatePart(&'a Part),
    /// Nothing that could carry text
    Empty,
}

impl GenerateContentResponse {
    /// Resolve the response shape: direct text, else first candidate part
    pub fn shape(&self) -> ResponseShape<'_> {
        if let Some(text) = self.text.as_deref().filter(|t| !t.is_empty()) {
            return ResponseShape::Direct(text);
        }
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .map(ResponseShape::CandidatePart)
            .unwrap_or(ResponseShape::Empty)
    }

    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback.as_ref()?.block_reason.as_deref()
    }
}

/// Normalize a response shape into a fragment
///
/// Parts that are not text yield an empty fragment.
pub fn normalize(shape: ResponseShape<'_>) -> ResponseFragment {
    match shape {
        ResponseShape::Direct(text) => ResponseFragment::new(text),
        ResponseShape::CandidatePart(part) => part.text().map(ResponseFragment::new).unwrap_or_default(),
        ResponseShape::Empty => ResponseFragment::empty(),
    }
}

/// Gemini schema transformer
pub struct GeminiTransformer;

impl GeminiTransformer {
    /// Create a new Gemini transformer
    pub fn new() -> Self {
        Self
    }

    fn decode(&self, response: GenerateContentResponse) -> Result<ResponseFragment, ConversionError> {
        if let Some(error) = response.error {
            return Err(ConversionError::ErrorPayload(error.to_string()));
        }
        if let Some(reason) = response.block_reason() {
            log::warn!("[gemini] prompt blocked: {}", reason);
        }
        Ok(normalize(response.shape()))
    }
}

impl Default for GeminiTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaTransformer for GeminiTransformer {
    fn provider_id(&self) -> &str {
        "gemini"
    }

    fn endpoint(&self, base_url: &str, model: &str, stream: bool) -> String {
        if stream {
            format!("{}/models/{}:streamGenerateContent?alt=sse", base_url, model)
        } else {
            format!("{}/models/{}:generateContent", base_url, model)
        }
    }

    fn auth_header(&self, auth: &AuthConfig) -> Option<(&'static str, String)> {
        match auth {
            AuthConfig::ApiKey { key } => Some(("x-goog-api-key", key.clone())),
            AuthConfig::Bearer { token } => Some(("authorization", format!("Bearer {}", token))),
            AuthConfig::None => None,
        }
    }

    fn transform_request(&self, prompt: &str, _model: &str, _stream: bool) -> Result<Value, ConversionError> {
        Ok(json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }],
            }],
        }))
    }

    fn parse_response(&self, data: &Value) -> Result<ResponseFragment, ConversionError> {
        let response = GenerateContentResponse::deserialize(data)?;
        self.decode(response)
    }

    fn parse_stream_chunk(&self, data: &str) -> Result<ResponseFragment, ConversionError> {
        if data.trim().is_empty() {
            return Ok(ResponseFragment::empty());
        }
        let response: GenerateContentResponse = serde_json::from_str(data)?;
        self.decode(response)
    }
}
