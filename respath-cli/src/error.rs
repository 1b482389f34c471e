//! CLI error types.

use std::fmt;

use respath::{LoggingError, ResourceError};

/// Errors reported by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Resolution, scanning or configuration failed in the library.
    Resource(ResourceError),

    /// The tracing subscriber could not be installed.
    Logging(LoggingError),

    /// JSON output could not be produced.
    Json(serde_json::Error),

    /// Writing to stdout failed.
    Output(std::io::Error),

    /// Invalid command-line input.
    Config(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Resource(e) => write!(f, "{}", e),
            CliError::Logging(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::Json(e) => write!(f, "Failed to encode JSON output: {}", e),
            CliError::Output(e) => write!(f, "Failed to write output: {}", e),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Resource(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::Output(e) => Some(e),
            CliError::Config(_) => None,
        }
    }
}

impl From<ResourceError> for CliError {
    fn from(e: ResourceError) -> Self {
        CliError::Resource(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_resource_error_passes_through() {
        let err = CliError::from(ResourceError::not_found("classpath:x.feature"));
        assert_eq!(err.to_string(), "resource not found: classpath:x.feature");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_config_error_display() {
        let err = CliError::Config("--suffix must not be empty".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: --suffix must not be empty"
        );
        assert!(err.source().is_none());
    }
}
