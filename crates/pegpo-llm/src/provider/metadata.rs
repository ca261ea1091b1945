use async_trait::async_trait;
use pegpo_core::{ChatRequest, ResponseFragment};

use crate::error::Result;
use crate::transformer::FragmentStream;

/// LLM Provider trait
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Get the provider ID
    fn provider_id(&self) -> &str;

    /// Get provider metadata
    fn metadata(&self) -> &ProviderMetadata;

    /// Send a request and get the whole reply as one fragment
    async fn chat(&self, request: &ChatRequest) -> Result<ResponseFragment>;

    /// Send a request and stream the reply
    async fn chat_stream(&self, request: &ChatRequest) -> Result<FragmentStream>;
}

/// Provider metadata
#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    /// Provider ID
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Model requests are sent to
    pub model: String,
    /// Provider capabilities
    pub capabilities: ProviderCapabilities,
}

/// Provider capabilities
#[derive(Debug, Clone)]
pub struct ProviderCapabilities {
    /// Supports incremental responses
    pub streaming: bool,
}

impl Default for ProviderCapabilities {
    fn default() -> Self {
        Self { streaming: true }
    }
}
