use crate::utils::validation::ValidationErrors;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum BusMapError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("{message}")]
    ValidationError { field: String, message: String },

    #[error("{message}")]
    DuplicateError { message: String },

    #[error("Invalid student: {0}")]
    InvalidStudent(ValidationErrors),

    #[error("Student not found: {id}")]
    NotFound { id: Uuid },

    #[error("Failed to write slot '{key}': {reason}")]
    PersistenceError { key: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Store,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl BusMapError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BusMapError::ValidationError { .. }
            | BusMapError::DuplicateError { .. }
            | BusMapError::InvalidStudent(_) => ErrorCategory::Input,
            BusMapError::NotFound { .. } => ErrorCategory::Store,
            BusMapError::IoError(_)
            | BusMapError::SerializationError(_)
            | BusMapError::CsvError(_)
            | BusMapError::PersistenceError { .. } => ErrorCategory::Storage,
            BusMapError::ConfigError { .. }
            | BusMapError::InvalidConfigValueError { .. }
            | BusMapError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Store | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            BusMapError::ValidationError { message, .. }
            | BusMapError::DuplicateError { message } => message.clone(),
            BusMapError::InvalidStudent(errors) => {
                format!("Please fix all errors in the form before submitting. {}", errors)
            }
            BusMapError::NotFound { id } => format!("No student with id {}", id),
            BusMapError::PersistenceError { .. } => "Failed to save roster".to_string(),
            BusMapError::IoError(_) | BusMapError::SerializationError(_) => {
                "Failed to read or write roster data".to_string()
            }
            BusMapError::CsvError(_) => "Failed to export roster".to_string(),
            BusMapError::ConfigError { .. }
            | BusMapError::InvalidConfigValueError { .. }
            | BusMapError::MissingConfigError { .. } => format!("Configuration problem: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Correct the highlighted fields and try again",
            ErrorCategory::Store => "Run `busmap list` to look up valid student ids",
            ErrorCategory::Storage => "Check that the data directory exists and is writable",
            ErrorCategory::Configuration => "Review the configuration file and command-line overrides",
        }
    }
}

pub type Result<T> = std::result::Result<T, BusMapError>;
