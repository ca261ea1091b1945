use pegpo_core::ResponseFragment;
use serde_json::{json, Value};

use crate::error::ConversionError;
use crate::transformer::utils::{safe_get, safe_get_str};
use crate::transformer::SchemaTransformer;

/// OpenAI-compatible schema transformer
/// Works with OpenAI API, Azure OpenAI, and compatible providers
pub struct OpenAiTransformer;

impl OpenAiTransformer {
    /// Create a new OpenAI transformer
    pub fn new() -> Self {
        Self
    }

    fn check_error(data: &Value) -> Result<(), ConversionError> {
        match safe_get(data, "error") {
            Some(error) if !error.is_null() => {
                let message = safe_get_str(error, "message").unwrap_or("unknown error");
                Err(ConversionError::ErrorPayload(message.to_string()))
            }
            _ => Ok(()),
        }
    }
}

impl Default for OpenAiTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaTransformer for OpenAiTransformer {
    fn provider_id(&self) -> &str {
        "openai"
    }

    fn endpoint(&self, base_url: &str, _model: &str, _stream: bool) -> String {
        format!("{}/chat/completions", base_url)
    }

    fn transform_request(&self, prompt: &str, model: &str, stream: bool) -> Result<Value, ConversionError> {
        Ok(json!({
            "model": model,
            "messages": [{ "role": "user", "content": prompt }],
            "stream": stream,
        }))
    }

    fn parse_response(&self, data: &Value) -> Result<ResponseFragment, ConversionError> {
        Self::check_error(data)?;

        if safe_get(data, "choices").is_none() {
            return Err(ConversionError::MissingField("choices".to_string()));
        }

        Ok(safe_get_str(data, "choices.0.message.content")
            .map(ResponseFragment::new)
            .unwrap_or_default())
    }

    fn parse_stream_chunk(&self, data: &str) -> Result<ResponseFragment, ConversionError> {
        if data.trim().is_empty() {
            return Ok(ResponseFragment::empty());
        }

        let chunk: Value = serde_json::from_str(data)?;
        Self::check_error(&chunk)?;

        // Role-only and usage-only chunks carry no content
        Ok(safe_get_str(&chunk, "choices.0.delta.content")
            .map(ResponseFragment::new)
            .unwrap_or_default())
    }

    fn is_end_marker(&self, data: &str) -> bool {
        data.trim() == "[DONE]"
    }
}
