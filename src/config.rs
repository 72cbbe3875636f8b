use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default location of the configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub server: ServerConfig,
    pub approval: ApprovalConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Attach a permissive CORS layer (useful for local frontends).
    pub cors_permissive: bool,
}

/// Review approval quorum.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ApprovalConfig {
    /// Number of approvals a review needs before it counts as approved.
    pub min_count: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            server: ServerConfig::default(),
            approval: ApprovalConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_permissive: false,
        }
    }
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self { min_count: 3 }
    }
}

impl AppConfig {
    /// Load configuration from `CAMPUS_COFFEE_CONFIG` (or `config.toml`),
    /// falling back to defaults when the file is absent, then apply
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let path = env::var("CAMPUS_COFFEE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(port) = env::var("PORT") {
            self.server.port = port.parse().context("PORT must be a valid port number")?;
        }
        if let Ok(min_count) = env::var("APPROVAL_MIN_COUNT") {
            self.approval.min_count = min_count
                .parse()
                .context("APPROVAL_MIN_COUNT must be a non-negative integer")?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.approval.min_count == 0 {
            anyhow::bail!("approval.min_count must be at least 1");
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
