//! Provider gateway
//!
//! Wraps the configured provider behind precondition checks. A gateway that
//! cannot reach a provider is still constructed; it reports the same error
//! on every call instead of failing start-up.

use futures::stream;
use pegpo_core::{ChatRequest, ResponseFragment};
use std::sync::Arc;

use crate::error::{LLMError, Result};
use crate::provider::{LLMProvider, ProviderConfig};
use crate::transformer::FragmentStream;

/// How a reply is requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationMode {
    /// One complete reply
    #[default]
    Single,
    /// Incremental fragments
    Streaming,
}

impl GenerationMode {
    pub fn from_stream_flag(stream: bool) -> Self {
        if stream {
            Self::Streaming
        } else {
            Self::Single
        }
    }
}

enum Backend {
    Ready(Arc<dyn LLMProvider>),
    Unavailable(String),
    Misconfigured(String),
}

/// Entry point for every provider call
pub struct ProviderGateway {
    backend: Backend,
}

impl ProviderGateway {
    /// Wrap an already constructed provider
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            backend: Backend::Ready(provider),
        }
    }

    /// A gateway whose provider cannot be used
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            backend: Backend::Unavailable(reason.into()),
        }
    }

    /// A gateway whose provider is known but lacks configuration
    pub fn misconfigured(reason: impl Into<String>) -> Self {
        Self {
            backend: Backend::Misconfigured(reason.into()),
        }
    }

    /// Build the gateway for a provider configuration
    ///
    /// The backend must be known and compiled in, then a credential must be
    /// present. Failing either leaves the gateway in an error state.
    pub fn from_config(config: ProviderConfig) -> Self {
        if let Err(reason) = Self::backend_available(&config.provider_id) {
            log::warn!("[gateway] {}", reason);
            return Self::unavailable(reason);
        }

        if !config.auth.is_present() {
            let reason = match &config.credential_env {
                Some(env) => format!("{} not found in environment", env),
                None => format!("No API credential configured for provider '{}'", config.provider_id),
            };
            log::warn!("[gateway] {}", reason);
            return Self::misconfigured(reason);
        }

        match Self::build_provider(config) {
            Ok(provider) => {
                let metadata = provider.metadata();
                log::info!("[gateway] using provider {} (model {})", metadata.name, metadata.model);
                Self::new(provider)
            }
            Err(e) => Self::misconfigured(e.to_string()),
        }
    }

    fn backend_available(provider_id: &str) -> std::result::Result<(), String> {
        match provider_id {
            "gemini" if cfg!(feature = "gemini") => Ok(()),
            "openai" if cfg!(feature = "openai") => Ok(()),
            "gemini" | "openai" => Err(format!(
                "{} provider support not compiled in (rebuild with --features {})",
                provider_id, provider_id
            )),
            other => Err(format!("Unknown provider '{}'", other)),
        }
    }

    fn build_provider(config: ProviderConfig) -> Result<Arc<dyn LLMProvider>> {
        match config.provider_id.as_str() {
            #[cfg(feature = "gemini")]
            "gemini" => Ok(Arc::new(crate::providers::GeminiProvider::with_config(config)?)),
            #[cfg(feature = "openai")]
            "openai" => Ok(Arc::new(crate::providers::OpenAiProvider::with_config(config)?)),
            other => Err(LLMError::ProviderUnavailable(format!("Unknown provider '{}'", other))),
        }
    }

    /// Check the preconditions without calling the provider
    pub fn check(&self) -> Result<()> {
        self.provider().map(|_| ())
    }

    /// The usable provider, or the precondition error
    pub fn provider(&self) -> Result<&Arc<dyn LLMProvider>> {
        match &self.backend {
            Backend::Ready(provider) => Ok(provider),
            Backend::Unavailable(reason) => Err(LLMError::ProviderUnavailable(reason.clone())),
            Backend::Misconfigured(reason) => Err(LLMError::Config(reason.clone())),
        }
    }

    /// Request one complete reply
    pub async fn generate(&self, request: &ChatRequest) -> Result<ResponseFragment> {
        let provider = self.provider()?;
        provider.chat(request).await
    }

    /// Request an incremental reply
    ///
    /// Providers without streaming support are called single-shot and the
    /// reply is delivered as a one-fragment stream.
    pub async fn stream(&self, request: &ChatRequest) -> Result<FragmentStream> {
        let provider = self.provider()?;
        if provider.metadata().capabilities.streaming {
            provider.chat_stream(request).await
        } else {
            let fragment = provider.chat(request).await?;
            Ok(Box::pin(stream::once(async move { Ok(fragment) })))
        }
    }
}
