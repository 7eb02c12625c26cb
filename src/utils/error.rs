use thiserror::Error;

#[derive(Error, Debug)]
pub enum PinError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Package list request to {url} failed with status {status}")]
    DiscoveryFailed { url: String, status: u16 },

    #[error("Unexpected registry response for '{package}': {detail}")]
    ContractViolation { package: String, detail: String },

    #[error("Result channel closed before '{package}' could be queued")]
    ChannelClosed { package: String },

    #[error("Task '{task}' failed: {message}")]
    TaskFailed { task: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code; every failure exits non-zero.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl PinError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PinError::InvalidConfigValueError { .. }
            | PinError::MissingConfigError { .. }
            | PinError::TomlError(_) => ErrorCategory::Configuration,
            PinError::ApiError(_) | PinError::DiscoveryFailed { .. } => ErrorCategory::Network,
            PinError::SerializationError(_) | PinError::ContractViolation { .. } => {
                ErrorCategory::Data
            }
            PinError::IoError(_) | PinError::ChannelClosed { .. } | PinError::TaskFailed { .. } => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            PinError::ApiError(_) => "Check network connectivity and the configured URLs",
            PinError::DiscoveryFailed { .. } => {
                "The package list source is unavailable, try again later or switch --source"
            }
            PinError::ContractViolation { .. } => {
                "The registry changed its response format; rerun with --on-contract-violation skip to tolerate it"
            }
            PinError::TomlError(_) => "Fix the syntax of the broken-modules TOML file",
            PinError::InvalidConfigValueError { .. } | PinError::MissingConfigError { .. } => "Run with --help to review the available options",
            PinError::IoError(_) => "Check that the output path is writable",
            PinError::SerializationError(_) => "The source returned malformed JSON",
            PinError::ChannelClosed { .. } | PinError::TaskFailed { .. } => {
                "Rerun with --verbose and inspect the log for the failing task"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PinError::DiscoveryFailed { status, .. } => {
                format!("Could not load the package list (HTTP {})", status)
            }
            PinError::ContractViolation { package, .. } => {
                format!("Registry returned an unexpected document for '{}'", package)
            }
            PinError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid option {}: {}", field, reason)
            }
            PinError::MissingConfigError { field } => format!("Missing option {}", field),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PinError>;
