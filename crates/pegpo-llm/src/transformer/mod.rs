pub mod gemini;
pub mod openai;
pub mod utils;

pub use gemini::GeminiTransformer;
pub use openai::OpenAiTransformer;

use futures::Stream;
use pegpo_core::ResponseFragment;
use serde_json::Value;
use std::pin::Pin;

use crate::error::ConversionError;
use crate::provider::AuthConfig;

/// Type alias for a provider fragment stream
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<ResponseFragment, crate::LLMError>> + Send>>;

/// Schema transformer trait for converting between the relay and provider formats
pub trait SchemaTransformer: Send + Sync {
    /// Get the provider ID
    fn provider_id(&self) -> &str;

    /// Full request URL for a model
    fn endpoint(&self, base_url: &str, model: &str, stream: bool) -> String;

    /// Header carrying the credential
    fn auth_header(&self, auth: &AuthConfig) -> Option<(&'static str, String)> {
        match auth {
            AuthConfig::ApiKey { key } => Some(("authorization", format!("Bearer {}", key))),
            AuthConfig::Bearer { token } => Some(("authorization", format!("Bearer {}", token))),
            AuthConfig::None => None,
        }
    }

    /// Build the provider request body for a prompt
    fn transform_request(&self, prompt: &str, model: &str, stream: bool) -> Result<Value, ConversionError>;

    /// Normalize a complete (non-streaming) response
    fn parse_response(&self, data: &Value) -> Result<ResponseFragment, ConversionError>;

    /// Normalize one stream event payload
    fn parse_stream_chunk(&self, data: &str) -> Result<ResponseFragment, ConversionError>;

    /// Check if a stream event payload marks the end of the stream
    fn is_end_marker(&self, _data: &str) -> bool {
        false
    }
}
