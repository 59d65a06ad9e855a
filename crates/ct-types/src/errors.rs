use thiserror::Error;

/// Main error type for catboost-tune
#[derive(Error, Debug)]
pub enum HtError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Search configuration load-time errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Malformed search configuration: {message}")]
    Parse { message: String },

    #[error("Schema error at `{field}`: {message}")]
    Schema { field: String, message: String },

    #[error("Unsupported value {value:?} for `{field}`, expected one of: {expected}")]
    UnsupportedEnum {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Range error for `{name}`: {message}")]
    Range { name: String, message: String },

    #[error("Duplicate hyperparameter name: {name}")]
    DuplicateName { name: String },
}

impl ConfigError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Schema {
            field: field.into(),
            message: "missing required field".to_string(),
        }
    }

    pub fn wrong_type(field: impl Into<String>, expected: &str) -> Self {
        Self::Schema {
            field: field.into(),
            message: format!("expected {expected}"),
        }
    }

    pub fn range(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Range {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for catboost-tune operations
pub type HtResult<T> = Result<T, HtError>;

/// Macro for creating validation errors
#[macro_export]
macro_rules! validation_error {
    ($($arg:tt)*) => {
        $crate::HtError::Validation(format!($($arg)*))
    };
}
