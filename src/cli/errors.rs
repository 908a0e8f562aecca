use thiserror::Error;

/// Domain-specific errors for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },
}

impl CliError {
    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Message shown to the caller without the error category prefix
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidInput { message } | Self::Validation { message, .. } => message,
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::InvalidInput {
            message: format!("failed to read input: {err}"),
        }
    }
}
