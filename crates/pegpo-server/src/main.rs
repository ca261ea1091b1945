use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use pegpo_config::ConfigManager;
use pegpo_server::{logging::init_logging, run_server, AppState};

#[derive(Parser, Debug, Clone)]
#[command(name = "pegpo-server")]
#[command(about = "Pegpo streaming chat relay")]
#[command(version)]
struct Cli {
    /// Enable debug mode
    #[arg(long, env = "DEBUG", default_value = "false")]
    debug: bool,

    /// Bind host (overrides config)
    #[arg(long, env = "PEGPO_HOST")]
    host: Option<String>,

    /// Server port (overrides config)
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// LLM provider (overrides config)
    #[arg(long, env = "LLM_PROVIDER")]
    provider: Option<String>,

    /// LLM model name (overrides config)
    #[arg(long, env = "LLM_MODEL")]
    model: Option<String>,

    /// LLM API key (overrides the provider's credential env var)
    #[arg(long, env = "PEGPO_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Log level (overrides config)
    #[arg(long)]
    log_level: Option<String>,

    /// Config file path (default: ~/.pegpo/config.json)
    #[arg(long, env = "PEGPO_CONFIG")]
    config: Option<String>,
}

impl Cli {
    /// 命令行参数转换成配置覆盖项
    fn overrides(&self, default_provider: &str) -> Vec<(String, String)> {
        let mut overrides = Vec::new();
        if let Some(host) = &self.host {
            overrides.push(("server.host".to_string(), host.clone()));
        }
        if let Some(port) = self.port {
            overrides.push(("server.port".to_string(), port.to_string()));
        }
        if let Some(provider) = &self.provider {
            overrides.push(("llm.default_provider".to_string(), provider.clone()));
        }
        if let Some(model) = &self.model {
            let provider = self.provider.as_deref().unwrap_or(default_provider);
            overrides.push((format!("llm.providers.{}.model", provider), model.clone()));
        }
        if let Some(level) = &self.log_level {
            overrides.push(("logging.level".to_string(), level.clone()));
        } else if self.debug {
            overrides.push(("logging.level".to_string(), "debug".to_string()));
        }
        overrides
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config_manager = match &cli.config {
        Some(path) => {
            let config_path = pegpo_config::expand_tilde(path).unwrap_or_else(|| std::path::PathBuf::from(path));
            ConfigManager::load(&config_path)
                .await
                .with_context(|| format!("Failed to load config from {:?}", config_path))?
        }
        None => ConfigManager::load_default()
            .await
            .context("Failed to load default config")?,
    };

    let default_provider = config_manager.get().llm.default_provider.clone();
    let config_manager = config_manager
        .with_overrides(cli.overrides(&default_provider))
        .context("Invalid command line override")?;
    let config = config_manager.get();

    // 初始化日志
    init_logging(config.logging.level.as_str(), config.logging.json_format);

    tracing::info!("Config loaded from {:?}", config_manager.path());
    tracing::info!("LLM Configuration:");
    tracing::info!("  Provider: {}", config.llm.default_provider);
    if let Some((_, settings)) = config.default_provider() {
        tracing::info!("  Base URL: {}", settings.base_url);
        tracing::info!("  Model: {}", settings.model.as_deref().unwrap_or("(default)"));
    }

    if cli.debug {
        tracing::debug!("Debug mode enabled");
        tracing::debug!("Server configuration:");
        tracing::debug!("  Host: {}", config.server.host);
        tracing::debug!("  Port: {}", config.server.port);
        tracing::debug!("  CORS: {}", config.server.cors);
        tracing::debug!("  Stream by default: {}", config.server.stream_by_default);
        tracing::debug!("  Expose error detail: {}", config.server.expose_error_detail);
    }

    let state = AppState::from_config(Arc::clone(&config), cli.api_key.clone());
    if let Err(e) = state.gateway.check() {
        // 不退出，每个请求都会返回这个错误
        tracing::warn!("Provider not ready: {}", e);
    }

    run_server(state).await
}
