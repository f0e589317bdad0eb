use crate::utils::error::{DatameshError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_PRODUCTION_CATALOG: &str = "datamesh_prod";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub source: ConnectionConfig,
    pub destination: ConnectionConfig,
    #[serde(default)]
    pub migration: MigrationSettings,
}

/// Connection settings of one catalog instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_protocol")]
    pub protocol: String,
    pub user: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationSettings {
    /// Catalog assigned to data products created on the destination.
    #[serde(default = "default_production_catalog")]
    pub production_catalog: String,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            production_catalog: default_production_catalog(),
        }
    }
}

fn default_port() -> u16 {
    443
}

fn default_protocol() -> String {
    "https".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_production_catalog() -> String {
    DEFAULT_PRODUCTION_CATALOG.to_string()
}

impl ConnectionConfig {
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }

    fn validate_section(&self, section: &str) -> Result<()> {
        validate_non_empty_string(&format!("{}.host", section), &self.host)?;
        validate_non_empty_string(&format!("{}.user", section), &self.user)?;

        if !matches!(self.protocol.as_str(), "http" | "https") {
            return Err(DatameshError::InvalidConfigValueError {
                field: format!("{}.protocol", section),
                value: self.protocol.clone(),
                reason: "Protocol must be http or https".to_string(),
            });
        }

        validate_range(&format!("{}.port", section), self.port, 1, u16::MAX)?;
        validate_positive_number(&format!("{}.timeout_seconds", section), self.timeout_seconds, 1)?;
        validate_url(section, &self.base_url())
    }
}

impl SyncConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DatameshError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DatameshError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SRC_PASSWORD})，找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DatameshError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn production_catalog(&self) -> &str {
        &self.migration.production_catalog
    }
}

impl Validate for SyncConfig {
    fn validate(&self) -> Result<()> {
        self.source.validate_section("source")?;
        self.destination.validate_section("destination")?;
        validate_non_empty_string(
            "migration.production_catalog",
            &self.migration.production_catalog,
        )
    }
}
