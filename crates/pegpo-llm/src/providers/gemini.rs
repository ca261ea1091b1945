use async_trait::async_trait;
use pegpo_core::{ChatRequest, ResponseFragment};

use crate::error::Result;
use crate::provider::{BaseProvider, LLMProvider, ProviderCapabilities, ProviderConfig, ProviderMetadata};
use crate::transformer::{FragmentStream, GeminiTransformer};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_CREDENTIAL_ENV: &str = "GEMINI_API_KEY";

/// Google Gemini provider (Generative Language REST API)
pub struct GeminiProvider {
    base: BaseProvider<GeminiTransformer>,
}

impl GeminiProvider {
    /// Create with custom configuration
    pub fn with_config(config: ProviderConfig) -> Result<Self> {
        let metadata = ProviderMetadata {
            id: config.provider_id.clone(),
            name: "Google Gemini".to_string(),
            model: config.model.clone(),
            capabilities: ProviderCapabilities { streaming: true },
        };

        let base = BaseProvider::new(config, GeminiTransformer::new(), metadata)?;
        Ok(Self { base })
    }

    /// Create a Gemini provider with API key and the default model
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let config = ProviderConfig::new("gemini", DEFAULT_BASE_URL)
            .with_model(DEFAULT_MODEL)
            .with_api_key(api_key);

        Self::with_config(config)
    }

    pub fn config(&self) -> &ProviderConfig {
        self.base.config()
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
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
