use crate::config::{Config, ConfigError, ConfigResult};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// 配置管理器
///
/// 启动时加载一次，之后只读。
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
    config: Arc<Config>,
}

impl ConfigManager {
    /// 加载配置文件
    pub async fn load(path: &Path) -> ConfigResult<Self> {
        let config = if path.exists() {
            info!("Loading config from {:?}", path);
            let content = tokio::fs::read_to_string(path).await?;
            let content = Self::expand_env_vars(&content)?;
            serde_json::from_str(&content)?
        } else {
            info!("Config file not found, creating default config at {:?}", path);
            let default_config = Config::default();
            // 确保父目录存在
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let content = serde_json::to_string_pretty(&default_config)?;
            tokio::fs::write(path, &content).await?;
            default_config
        };

        Self::validate(&config)?;
        debug!("Config loaded: default provider {}", config.llm.default_provider);

        Ok(Self {
            path: path.to_path_buf(),
            config: Arc::new(config),
        })
    }

    /// 从默认位置加载配置
    pub async fn load_default() -> ConfigResult<Self> {
        let config_path = Self::default_config_path()?;
        Self::load(&config_path).await
    }

    /// 获取默认配置路径 (~/.pegpo/config.json)
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        crate::default_config_path()
            .ok_or_else(|| ConfigError::InvalidPath("Could not find home directory".to_string()))
    }

    /// 创建一个新的配置管理器（用于测试）
    pub fn new(config: Config, path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(config),
        }
    }

    /// 获取配置
    pub fn get(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// 应用命令行覆盖，返回新的管理器
    pub fn with_overrides<I, K>(&self, overrides: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (K, String)>,
        K: AsRef<str>,
    {
        let mut config = (*self.config).clone();
        for (key, value) in overrides {
            let key = key.as_ref();
            debug!("Config override {} = {}", key, value);
            config.set_value(key, &value)?;
        }
        Self::validate(&config)?;

        Ok(Self {
            path: self.path.clone(),
            config: Arc::new(config),
        })
    }

    /// 验证配置
    pub fn validate(config: &Config) -> ConfigResult<()> {
        // 验证服务器端口
        if config.server.port == 0 {
            return Err(ConfigError::Validation("Server port cannot be 0".to_string()));
        }

        // 验证默认 provider 是否存在
        if !config.llm.providers.contains_key(&config.llm.default_provider) {
            return Err(ConfigError::Validation(format!(
                "Default LLM provider '{}' not found in providers list",
                config.llm.default_provider
            )));
        }

        Ok(())
    }

    /// 展开环境变量 ${VAR} 或 ${VAR:-default}
    fn expand_env_vars(content: &str) -> ConfigResult<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| ConfigError::Validation(format!("Invalid pattern: {}", e)))?;
        let mut result = content.to_string();

        for cap in re.captures_iter(content) {
            let (full_match, [var_expr]) = cap.extract();

            // 处理 ${VAR:-default} 语法
            let (var_name, default_value) = match var_expr.split_once(":-") {
                Some((name, default)) => (name, Some(default)),
                None => (var_expr, None),
            };

            let replacement = match (std::env::var(var_name), default_value) {
                (Ok(val), _) => val,
                (Err(_), Some(default)) => default.to_string(),
                (Err(_), None) => return Err(ConfigError::EnvVarNotFound(var_name.to_string())),
            };

            result = result.replace(full_match, &replacement);
        }

        Ok(result)
    }

    /// 获取配置文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }
}
