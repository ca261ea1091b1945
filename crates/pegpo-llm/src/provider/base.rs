use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::{future::ready, StreamExt};
use pegpo_core::{ChatRequest, ResponseFragment};
use reqwest::{header, Client, Response};
use std::sync::Arc;

use crate::error::{LLMError, Result};
use crate::provider::{LLMProvider, ProviderConfig, ProviderMetadata};
use crate::transformer::{FragmentStream, SchemaTransformer};

/// Base provider implementation
/// Handles common HTTP functionality and delegates schema transformation
pub struct BaseProvider<T: SchemaTransformer> {
    config: ProviderConfig,
    http_client: Client,
    transformer: Arc<T>,
    pub metadata: ProviderMetadata,
}

impl<T: SchemaTransformer + 'static> BaseProvider<T> {
    /// Create a new base provider
    ///
    /// Only the connect timeout is set on the client; the total timeout is
    /// applied per single-shot request so long streams are not cut off.
    pub fn new(config: ProviderConfig, transformer: T, metadata: ProviderMetadata) -> Result<Self> {
        let http_client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| LLMError::Config(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
            transformer: Arc::new(transformer),
            metadata,
        })
    }

    /// Get the provider ID
    pub fn provider_id(&self) -> &str {
        self.transformer.provider_id()
    }

    /// Get the config
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn endpoint(&self, stream: bool) -> String {
        self.transformer
            .endpoint(self.config.base_url(), &self.config.model, stream)
    }

    /// Build request headers
    fn build_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));

        // Add authentication header
        if let Some((header_name, header_value)) = self.transformer.auth_header(&self.config.auth) {
            let value = header::HeaderValue::from_str(&header_value)
                .map_err(|_| LLMError::Config("Invalid credential value".to_string()))?;
            headers.insert(header::HeaderName::from_static(header_name), value);
        }

        // Add custom headers from config
        for (key, value) in &self.config.headers {
            let header_name = header::HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| LLMError::Config(format!("Invalid header name: {}", e)))?;
            let header_value = header::HeaderValue::from_str(value)
                .map_err(|e| LLMError::Config(format!("Invalid header value: {}", e)))?;
            headers.insert(header_name, header_value);
        }

        Ok(headers)
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        Err(LLMError::Api {
            status: status.as_u16(),
            message: error_text,
        })
    }

    /// Send a non-streaming request
    pub async fn send_request(&self, request: &ChatRequest) -> Result<ResponseFragment> {
        let body = self
            .transformer
            .transform_request(request.prompt(), &self.config.model, false)?;
        let headers = self.build_headers()?;
        let url = self.endpoint(false);

        log::debug!("[{}] POST {} (single-shot)", self.provider_id(), url);

        let response = self
            .http_client
            .post(&url)
            .headers(headers)
            .timeout(self.config.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| LLMError::Network(e.to_string()))?;

        let response = Self::check_status(response).await?;

        let response_data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LLMError::Network(e.to_string()))?;

        self.transformer
            .parse_response(&response_data)
            .map_err(LLMError::Transform)
    }

    /// Send a streaming request
    pub async fn send_stream_request(&self, request: &ChatRequest) -> Result<FragmentStream> {
        let body = self
            .transformer
            .transform_request(request.prompt(), &self.config.model, true)?;
        let headers = self.build_headers()?;
        let url = self.endpoint(true);

        log::debug!("[{}] POST {} (stream)", self.provider_id(), url);

        let response = self
            .http_client
            .post(&url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| LLMError::Network(e.to_string()))?;

        let response = Self::check_status(response).await?;

        let transformer = self.transformer.clone();
        let stream = response
            .bytes_stream()
            .eventsource()
            .map(move |event| match event {
                Ok(event) if transformer.is_end_marker(&event.data) => None,
                Ok(event) => Some(
                    transformer
                        .parse_stream_chunk(&event.data)
                        .map_err(LLMError::Transform),
                ),
                Err(e) => Some(Err(LLMError::Stream(e.to_string()))),
            })
            .take_while(|item| ready(item.is_some()))
            .filter_map(ready);

        Ok(Box::pin(stream))
    }
}

#[async_trait]
impl<T: SchemaTransformer + 'static> LLMProvider for BaseProvider<T> {
    fn provider_id(&self) -> &str {
        self.provider_id()
    }

    fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ResponseFragment> {
        self.send_request(request).await
    }

    async fn chat_stream(&self, request: &ChatRequest) -> Result<FragmentStream> {
        self.send_stream_request(request).await
    }
}
