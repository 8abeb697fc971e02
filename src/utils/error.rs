use thiserror::Error;

#[derive(Error, Debug)]
pub enum PeriodError {
    #[error("Period store request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Period store error: {message}")]
    Store { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed period record {id}: {reason}")]
    MalformedRecord { id: String, reason: String },

    #[error("No active period is configured")]
    NoActivePeriod,

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

pub type Result<T> = std::result::Result<T, PeriodError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Store,
    Data,
    Domain,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PeriodError {
    pub fn store(message: impl Into<String>) -> Self {
        PeriodError::Store {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            PeriodError::Api(_) => ErrorCategory::Network,
            PeriodError::Store { .. } | PeriodError::Io(_) => ErrorCategory::Store,
            PeriodError::Serialization(_) | PeriodError::MalformedRecord { .. } => {
                ErrorCategory::Data
            }
            PeriodError::NoActivePeriod => ErrorCategory::Domain,
            PeriodError::ConfigError { .. }
            | PeriodError::MissingConfigError { .. }
            | PeriodError::InvalidConfigValueError { .. }
            | PeriodError::ConfigValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Domain => ErrorSeverity::Low,
            // 傳輸錯誤由呼叫端決定是否重試
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Store => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            PeriodError::Api(_) => {
                "Check that the period store endpoint is reachable and the API key is valid, then retry"
            }
            PeriodError::Store { .. } | PeriodError::Io(_) => {
                "Inspect the period store backend and retry the operation"
            }
            PeriodError::Serialization(_) | PeriodError::MalformedRecord { .. } => {
                "Fix the offending period row (semester must be 1 or 2, dates must be YYYY-MM-DD)"
            }
            PeriodError::NoActivePeriod => {
                "Activate a period with `academic-period activate <id>`"
            }
            PeriodError::ConfigError { .. }
            | PeriodError::MissingConfigError { .. }
            | PeriodError::InvalidConfigValueError { .. }
            | PeriodError::ConfigValidationError { .. } => {
                "Review the configuration file and environment variables"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PeriodError::Api(e) if e.is_timeout() => {
                "The period store did not answer in time".to_string()
            }
            PeriodError::Api(e) => match e.status() {
                Some(status) => format!("The period store rejected the request ({})", status),
                None => "Could not reach the period store".to_string(),
            },
            PeriodError::NoActivePeriod => "No academic period is currently active".to_string(),
            other => other.to_string(),
        }
    }
}
