use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatameshError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned status {status}: {message}")]
    ApiStatusError { status: u16, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },


    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid migration file field '{field}': {message}")]
    SchemaError { field: String, message: String },

    #[error("{entity} '{name}' has no id, it cannot be updated")]
    MissingIdentityError { entity: String, name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DatameshError {
    pub fn schema(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_) | Self::ApiStatusError { .. } => ErrorCategory::Network,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::SerializationError(_)
            | Self::YamlError(_)
            | Self::SchemaError { .. }
            | Self::MissingIdentityError { .. } => ErrorCategory::Data,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 連線逾時或 5xx 通常可以重試
            Self::ApiError(e) if e.is_timeout() || e.is_connect() => ErrorSeverity::Medium,
            Self::ApiStatusError { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            Self::ApiError(_) | Self::ApiStatusError { .. } => ErrorSeverity::High,
            Self::SchemaError { .. } => ErrorSeverity::Low,
            Self::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ApiError(_) => "Check the catalog host, port and network connectivity",
            Self::ApiStatusError { status, .. } => match status {
                401 | 403 => "Check the user and password configured for this instance",
                404 => "Check that the entity still exists on the catalog instance",
                s if *s >= 500 => "The catalog service failed, retry later",
                _ => "Inspect the payload rejected by the catalog service",
            },
            Self::IoError(_) => "Check that the path exists and is readable",
            Self::SerializationError(_) | Self::YamlError(_) => {
                "Make sure the content is valid YAML or JSON"
            }
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => {
                "Fix the configuration file and run the command again"
            }
            Self::SchemaError { .. } => "Fix the migration file according to the documented schema",
            Self::MissingIdentityError { .. } => {
                "Fetch the entity from the destination instance before updating it"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ApiError(e) => format!("Could not reach the catalog service: {}", e),
            Self::ApiStatusError { status, message } => {
                format!("The catalog service rejected the request ({}): {}", status, message)
            }
            Self::IoError(e) => format!("File system error: {}", e),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("'{}' is invalid: {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DatameshError>;
