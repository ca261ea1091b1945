use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 主配置结构体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub version: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            server: ServerConfig::default(),
            llm: LlmConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// 设置配置值（命令行覆盖使用）
    pub fn set_value(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        let parts: Vec<&str> = key.split('.').collect();
        match parts.as_slice() {
            ["server", "port"] => {
                self.server.port = value.parse().map_err(|_| {
                    ConfigError::Validation(format!("Invalid port number: {}", value))
                })?;
            }
            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "cors"] => {
                self.server.cors = parse_bool(value)?;
            }
            ["server", "expose_error_detail"] => {
                self.server.expose_error_detail = parse_bool(value)?;
            }
            ["server", "stream_by_default"] => {
                self.server.stream_by_default = parse_bool(value)?;
            }
            ["llm", "default_provider"] => {
                self.llm.default_provider = value.to_string();
            }
            ["llm", "providers", name, "model"] => {
                self.provider_mut(name)?.model = Some(value.to_string());
            }
            ["llm", "providers", name, "base_url"] => {
                self.provider_mut(name)?.base_url = value.to_string();
            }
            ["logging", "level"] => {
                self.logging.level = value.parse()?;
            }
            ["logging", "json_format"] => {
                self.logging.json_format = parse_bool(value)?;
            }
            _ => return Err(ConfigError::KeyNotFound(key.to_string())),
        }
        Ok(())
    }

    /// 当前默认 provider 的配置
    pub fn default_provider(&self) -> Option<(&str, &ProviderSettings)> {
        let name = self.llm.default_provider.as_str();
        self.llm.providers.get(name).map(|settings| (name, settings))
    }

    fn provider_mut(&mut self, name: &str) -> ConfigResult<&mut ProviderSettings> {
        self.llm
            .providers
            .get_mut(name)
            .ok_or_else(|| ConfigError::KeyNotFound(format!("llm.providers.{}", name)))
    }
}

fn parse_bool(value: &str) -> ConfigResult<bool> {
    value
        .parse()
        .map_err(|_| ConfigError::Validation(format!("Invalid boolean: {}", value)))
}

/// Server 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// 是否启用跨域（permissive），默认关闭
    #[serde(default)]
    pub cors: bool,
    /// 是否把 provider 的原始错误信息返回给客户端
    #[serde(default)]
    pub expose_error_detail: bool,
    /// 请求未指定时是否默认使用流式响应
    #[serde(default)]
    pub stream_by_default: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "127.0.0.1".to_string(),
            cors: false,
            expose_error_detail: false,
            stream_by_default: false,
        }
    }
}

/// LLM 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    pub default_provider: String,
    pub providers: HashMap<String, ProviderSettings>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let mut providers = HashMap::new();

        // Default Gemini provider, key from GEMINI_API_KEY
        providers.insert(
            "gemini".to_string(),
            ProviderSettings {
                enabled: true,
                base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                model: Some("gemini-2.5-flash".to_string()),
                auth: AuthSettings::ApiKey {
                    env: "GEMINI_API_KEY".to_string(),
                },
                headers: None,
                timeout_seconds: Some(60),
                connect_timeout_seconds: Some(10),
            },
        );

        // OpenAI-compatible provider with API key auth
        providers.insert(
            "openai".to_string(),
            ProviderSettings {
                enabled: false,
                base_url: "https://api.openai.com/v1".to_string(),
                model: Some("gpt-4o-mini".to_string()),
                auth: AuthSettings::ApiKey {
                    env: "OPENAI_API_KEY".to_string(),
                },
                headers: None,
                timeout_seconds: Some(60),
                connect_timeout_seconds: Some(10),
            },
        );

        Self {
            default_provider: "gemini".to_string(),
            providers,
        }
    }
}

/// Provider 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderSettings {
    pub enabled: bool,
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(flatten)]
    pub auth: AuthSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    /// 单次请求的总超时（流式请求不受限）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    /// 建立连接的超时
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout_seconds: Option<u64>,
}

/// Authentication settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "auth_type", rename_all = "snake_case")]
pub enum AuthSettings {
    /// API Key authentication - reads from environment variable
    ApiKey { env: String },
    /// Bearer token authentication - reads from environment variable
    Bearer { env: String },
    /// No authentication
    #[default]
    None,
}

impl AuthSettings {
    /// 凭证所在的环境变量
    pub fn env_var(&self) -> Option<&str> {
        match self {
            Self::ApiKey { env } | Self::Bearer { env } => Some(env),
            Self::None => None,
        }
    }

    /// Get API key from environment if applicable
    pub fn get_api_key(&self) -> Option<String> {
        match self {
            Self::ApiKey { env } => read_env(env),
            _ => None,
        }
    }

    /// Get bearer token from environment if applicable
    pub fn get_bearer_token(&self) -> Option<String> {
        match self {
            Self::Bearer { env } => read_env(env),
            _ => None,
        }
    }
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// 日志级别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::Validation(format!("Invalid log level: {}", s))),
        }
    }
}

/// Logging 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    #[serde(default)]
    pub json_format: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert!(!config.server.expose_error_detail);
        assert!(!config.server.cors);
        assert_eq!(config.llm.default_provider, "gemini");

        let (name, gemini) = config.default_provider().unwrap();
        assert_eq!(name, "gemini");
        assert_eq!(gemini.auth.env_var(), Some("GEMINI_API_KEY"));
    }

    #[test]
    fn test_provider_settings_serialization() {
        let settings = ProviderSettings {
            enabled: true,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: Some("gemini-2.5-flash".to_string()),
            auth: AuthSettings::ApiKey {
                env: "GEMINI_API_KEY".to_string(),
            },
            headers: None,
            timeout_seconds: None,
            connect_timeout_seconds: Some(5),
        };

        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["auth_type"], "api_key");
        assert_eq!(json["env"], "GEMINI_API_KEY");
        assert!(json.get("headers").is_none());
        assert!(json.get("timeout_seconds").is_none());
        assert_eq!(json["connect_timeout_seconds"], 5);

        let parsed: ProviderSettings = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_set_value() {
        let mut config = Config::default();
        config.set_value("server.port", "9000").unwrap();
        config.set_value("llm.providers.gemini.model", "gemini-2.5-pro").unwrap();
        config.set_value("logging.level", "debug").unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(
            config.llm.providers["gemini"].model.as_deref(),
            Some("gemini-2.5-pro")
        );
        assert_eq!(config.logging.level, LogLevel::Debug);

        assert!(config.set_value("server.port", "abc").is_err());
        assert!(config.set_value("llm.providers.nope.model", "x").is_err());
        assert!(matches!(
            config.set_value("server.unknown", "x"),
            Err(ConfigError::KeyNotFound(_))
        ));
    }

    #[test]
    fn test_auth_env_lookup() {
        std::env::set_var("PEGPO_CONFIG_TEST_KEY", "abc");
        std::env::set_var("PEGPO_CONFIG_TEST_EMPTY", "");

        let auth = AuthSettings::ApiKey { env: "PEGPO_CONFIG_TEST_KEY".to_string() };
        assert_eq!(auth.get_api_key().as_deref(), Some("abc"));
        assert_eq!(auth.get_bearer_token(), None);

        let auth = AuthSettings::Bearer { env: "PEGPO_CONFIG_TEST_EMPTY".to_string() };
        assert_eq!(auth.get_bearer_token(), None);
        assert_eq!(AuthSettings::None.env_var(), None);

        std::env::remove_var("PEGPO_CONFIG_TEST_KEY");
        std::env::remove_var("PEGPO_CONFIG_TEST_EMPTY");
    }
}
