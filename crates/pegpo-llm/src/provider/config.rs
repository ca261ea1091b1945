use std::collections::HashMap;
use std::time::Duration;

/// Authentication configuration enum
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthConfig {
    /// API Key authentication; the header is chosen by the transformer
    ApiKey {
        /// The API key
        key: String,
    },
    /// Bearer token authentication
    Bearer {
        /// The bearer token
        token: String,
    },
    /// No credential available
    #[default]
    None,
}

impl AuthConfig {
    /// Check if a credential is present
    pub fn is_present(&self) -> bool {
        match self {
            Self::ApiKey { key } => !key.is_empty(),
            Self::Bearer { token } => !token.is_empty(),
            Self::None => false,
        }
    }
}

/// Provider configuration
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider ID (`gemini`, `openai`)
    pub provider_id: String,
    /// Base URL for the API
    pub base_url: String,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Where the credential was expected to come from, for error messages
    pub credential_env: Option<String>,
    /// Model to use
    pub model: String,
    /// Total timeout for single-shot requests
    pub timeout: Duration,
    /// Connect timeout for every request
    pub connect_timeout: Duration,
    /// Additional headers to include
    pub headers: HashMap<String, String>,
}

impl ProviderConfig {
    /// Create a new provider config
    pub fn new(provider_id: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.auth = AuthConfig::ApiKey { key: key.into() };
        self
    }

    /// Set bearer token
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.auth = AuthConfig::Bearer { token: token.into() };
        self
    }

    /// Record the environment variable the credential is read from
    pub fn with_credential_env(mut self, env: impl Into<String>) -> Self {
        self.credential_env = Some(env.into());
        self
    }

    /// Set model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set multiple headers
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_id: "gemini".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            auth: AuthConfig::None,
            credential_env: None,
            model: "gemini-2.5-flash".to_string(),
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            headers: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_config_builder() {
        let config = ProviderConfig::new("openai", "https://api.openai.com/v1/")
            .with_api_key("sk-test")
            .with_model("gpt-4o-mini")
            .with_connect_timeout(Duration::from_secs(3))
            .with_headers(HashMap::from([("x-trace".to_string(), "1".to_string())]));

        assert_eq!(config.base_url(), "https://api.openai.com/v1");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert!(config.auth.is_present());
        assert_eq!(config.headers.get("x-trace").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_bearer_token_is_a_credential() {
        let config = ProviderConfig::new("openai", "https://api.openai.com/v1").with_bearer_token("tok");
        assert_eq!(config.auth, AuthConfig::Bearer { token: "tok".to_string() });
        assert!(config.auth.is_present());
        assert!(!AuthConfig::Bearer { token: String::new() }.is_present());
    }

    #[test]
    fn test_default_is_gemini_without_credential() {
        let config = ProviderConfig::default();
        assert_eq!(config.provider_id, "gemini");
        assert!(!config.auth.is_present());
    }
}
