#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use pegpo_config::Config;
use pegpo_core::{ChatRequest, ResponseFragment};
use pegpo_llm::{FragmentStream, LLMError, LLMProvider, ProviderCapabilities, ProviderGateway, ProviderMetadata};
use pegpo_server::AppState;

/// Scripted provider for server tests
pub struct StubProvider {
    fragments: Vec<String>,
    fail_after: Option<usize>,
    metadata: ProviderMetadata,
    pub calls: AtomicUsize,
}

impl StubProvider {
    pub fn replying(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            fail_after: None,
            metadata: ProviderMetadata {
                id: "stub".to_string(),
                name: "Stub".to_string(),
                model: "stub-model".to_string(),
                capabilities: ProviderCapabilities { streaming: true },
            },
            calls: AtomicUsize::new(0),
        }
    }

    /// Yield the first `count` fragments, then fail
    pub fn failing_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    fn failure() -> LLMError {
        LLMError::Network("upstream reset".to_string())
    }
}

#[async_trait]
impl LLMProvider for StubProvider {
    fn provider_id(&self) -> &str {
        "stub"
    }

    fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    async fn chat(&self, _request: &ChatRequest) -> Result<ResponseFragment, LLMError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_after.is_some() {
            return Err(Self::failure());
        }
        Ok(ResponseFragment::new(self.fragments.concat()))
    }

    async fn chat_stream(&self, _request: &ChatRequest) -> Result<FragmentStream, LLMError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut items: Vec<Result<ResponseFragment, LLMError>> = self
            .fragments
            .iter()
            .take(self.fail_after.unwrap_or(usize::MAX))
            .map(|text| Ok(ResponseFragment::new(text.as_str())))
            .collect();
        if self.fail_after.is_some() {
            items.push(Err(Self::failure()));
        }
        Ok(Box::pin(futures::stream::iter(items)))
    }
}

pub fn state_with(gateway: ProviderGateway, config: Config) -> Arc<AppState> {
    Arc::new(AppState::new(Arc::new(config), Arc::new(gateway)))
}

pub fn stub_state(provider: Arc<StubProvider>) -> Arc<AppState> {
    state_with(ProviderGateway::new(provider), Config::default())
}
