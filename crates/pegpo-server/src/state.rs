//! 应用状态
//!
//! 启动时构建一次，所有请求共享且只读。

use std::sync::Arc;
use std::time::Duration;

use pegpo_config::{AuthSettings, Config, ProviderSettings};
use pegpo_llm::{ProviderConfig, ProviderGateway};

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gateway: Arc<ProviderGateway>,
}

impl AppState {
    pub fn new(config: Arc<Config>, gateway: Arc<ProviderGateway>) -> Self {
        Self { config, gateway }
    }

    /// 根据配置创建状态
    ///
    /// `api_key` 优先于 provider 配置里指定的环境变量。
    pub fn from_config(config: Arc<Config>, api_key: Option<String>) -> Self {
        let gateway = build_gateway(&config, api_key);
        Self::new(config, Arc::new(gateway))
    }

    pub fn expose_error_detail(&self) -> bool {
        self.config.server.expose_error_detail
    }

    pub fn stream_by_default(&self) -> bool {
        self.config.server.stream_by_default
    }
}

/// 为默认 provider 构建网关
pub fn build_gateway(config: &Config, api_key: Option<String>) -> ProviderGateway {
    let Some((name, settings)) = config.default_provider() else {
        return ProviderGateway::unavailable(format!(
            "Provider '{}' not found in config",
            config.llm.default_provider
        ));
    };

    if !settings.enabled {
        tracing::warn!("Provider '{}' is disabled in config", name);
        return ProviderGateway::unavailable(format!("Provider '{}' is disabled in config", name));
    }

    ProviderGateway::from_config(provider_config(name, settings, api_key))
}

/// 把配置文件中的 provider 设置转换成 LLM 层配置
pub fn provider_config(name: &str, settings: &ProviderSettings, api_key: Option<String>) -> ProviderConfig {
    let mut config = ProviderConfig::new(name, settings.base_url.clone());

    if let Some(model) = &settings.model {
        config = config.with_model(model.clone());
    }
    if let Some(seconds) = settings.timeout_seconds {
        config = config.with_timeout(Duration::from_secs(seconds));
    }
    if let Some(seconds) = settings.connect_timeout_seconds {
        config = config.with_connect_timeout(Duration::from_secs(seconds));
    }
    if let Some(headers) = &settings.headers {
        config = config.with_headers(headers.clone());
    }
    if let Some(env) = settings.auth.env_var() {
        config = config.with_credential_env(env);
    }

    match (&settings.auth, api_key.filter(|key| !key.trim().is_empty())) {
        (AuthSettings::Bearer { .. }, Some(token)) => config.with_bearer_token(token),
        (_, Some(key)) => config.with_api_key(key),
        (AuthSettings::ApiKey { .. }, None) => match settings.auth.get_api_key() {
            Some(key) => config.with_api_key(key),
            None => config,
        },
        (AuthSettings::Bearer { .. }, None) => match settings.auth.get_bearer_token() {
            Some(token) => config.with_bearer_token(token),
            None => config,
        },
        (AuthSettings::None, None) => config,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pegpo_llm::{AuthConfig, LLMError};

    #[test]
    fn test_provider_config_from_settings() {
        std::env::set_var("PEGPO_STATE_TEST_KEY", "from-env");
        let settings = ProviderSettings {
            enabled: true,
            base_url: "http://localhost:9999/v1beta".to_string(),
            model: Some("gemini-2.5-pro".to_string()),
            auth: AuthSettings::ApiKey {
                env: "PEGPO_STATE_TEST_KEY".to_string(),
            },
            headers: None,
            timeout_seconds: Some(5),
            connect_timeout_seconds: Some(2),
        };

        let config = provider_config("gemini", &settings, None);
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.auth, AuthConfig::ApiKey { key: "from-env".to_string() });
        assert_eq!(config.credential_env.as_deref(), Some("PEGPO_STATE_TEST_KEY"));

        // 命令行传入的 key 优先
        let config = provider_config("gemini", &settings, Some("from-cli".to_string()));
        assert_eq!(config.auth, AuthConfig::ApiKey { key: "from-cli".to_string() });
        std::env::remove_var("PEGPO_STATE_TEST_KEY");
    }

    #[test]
    fn test_bearer_provider_config() {
        std::env::set_var("PEGPO_STATE_TEST_TOKEN", "tok-env");
        let mut settings = Config::default().llm.providers["openai"].clone();
        settings.auth = AuthSettings::Bearer {
            env: "PEGPO_STATE_TEST_TOKEN".to_string(),
        };

        let config = provider_config("openai", &settings, None);
        assert_eq!(config.auth, AuthConfig::Bearer { token: "tok-env".to_string() });
        assert_eq!(config.connect_timeout, Duration::from_secs(10));

        let config = provider_config("openai", &settings, Some("tok-cli".to_string()));
        assert_eq!(config.auth, AuthConfig::Bearer { token: "tok-cli".to_string() });
        std::env::remove_var("PEGPO_STATE_TEST_TOKEN");
    }

    #[test]
    fn test_missing_key_leaves_gateway_misconfigured() {
        let mut config = Config::default();
        if let Some(gemini) = config.llm.providers.get_mut("gemini") {
            gemini.auth = AuthSettings::ApiKey {
                env: "PEGPO_STATE_TEST_UNSET".to_string(),
            };
        }

        let gateway = build_gateway(&config, None);
        match gateway.check() {
            Err(LLMError::Config(reason)) => assert_eq!(reason, "PEGPO_STATE_TEST_UNSET not found in environment"),
            other => panic!("Expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_disabled_provider_is_unavailable() {
        let mut config = Config::default();
        config.llm.default_provider = "openai".to_string();

        let gateway = build_gateway(&config, Some("sk-test".to_string()));
        assert!(matches!(gateway.check(), Err(LLMError::ProviderUnavailable(_))));
    }
}
