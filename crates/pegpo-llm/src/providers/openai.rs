use async_trait::async_trait;
use pegpo_core::{ChatRequest, ResponseFragment};

use crate::error::Result;
use crate::provider::{BaseProvider, LLMProvider, ProviderCapabilities, ProviderConfig, ProviderMetadata};
use crate::transformer::{FragmentStream, OpenAiTransformer};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// OpenAI Provider
/// Uses OpenAI API or compatible endpoints
pub struct OpenAiProvider {
    base: BaseProvider<OpenAiTransformer>,
}

impl OpenAiProvider {
    /// Create with custom configuration
    pub fn with_config(config: ProviderConfig) -> Result<Self> {
        let metadata = ProviderMetadata {
            id: config.provider_id.clone(),
            name: "OpenAI".to_string(),
            model: config.model.clone(),
            capabilities: ProviderCapabilities { streaming: true },
        };

        let base = BaseProvider::new(config, OpenAiTransformer::new(), metadata)?;
        Ok(Self { base })
    }

    /// Create a new OpenAI provider with API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create with custom base URL (for Azure or other compatible APIs)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let config = ProviderConfig::new("openai", base_url)
            .with_model(DEFAULT_MODEL)
            .with_api_key(api_key);

        Self::with_config(config)
    }
}

#[async_trait]
impl LLMProvider for OpenAiProvider {
    fn provider_id(&self) -> &str {
        self.base.provider_id()
    }

    fn metadata(&self) -> &ProviderMetadata {
        &self.base.metadata
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ResponseFragment> {
        self.base.chat(request).await
    }

    async fn chat_stream(&self, request: &ChatRequest) -> Result<FragmentStream> {
        self.base.chat_stream(request).await
    }
}
