use std::path::PathBuf;
use thiserror::Error;

use crate::{client::ApiError, exit_codes::CfsExitCode, generator::GeneratorError};

/// Error types that can occur while building or executing a command
#[derive(Debug, Error)]
pub enum CliError {
    /// Error when an unsupported or undefined subcommand is encountered
    #[error("Undefined or unsupported subcommand: {0}")]
    UnsupportedSubcommand(String),
    /// Error when the combination of options given is not allowed
    #[error("{0}")]
    UsageError(String),
    /// Error when an option value cannot be converted to the expected type
    #[error("Invalid value {value:?} for '--{option}': {reason}")]
    InvalidOptionValue {
        option: String,
        value: String,
        reason: String,
    },
    /// Error when user supplied JSON text fails to decode
    #[error("Invalid JSON in {origin}: {cause}")]
    InvalidJson {
        origin: String,
        #[source]
        cause: serde_json::Error,
    },
    /// Error when an input file cannot be read
    #[error("Failed to read '{}': {cause}", path.display())]
    FileReadError {
        path: PathBuf,
        #[source]
        cause: std::io::Error,
    },
    /// Error when a patch expects a generated command that does not exist
    #[error("Generated command '{resource} {command}' not found")]
    MissingCommand { resource: String, command: String },
    /// Error when a command callback consumes a parameter the command does not declare
    #[error("Command '{command}' consumes undeclared parameter '{parameter}'")]
    UndeclaredParameter { command: String, parameter: String },
    /// Error when a local option is declared but no callback reads it
    #[error("Command '{command}' declares local option '{parameter}' that nothing consumes")]
    UnconsumedParameter { command: String, parameter: String },
    /// Error related to configuration loading or management
    #[error("Configuration error: {0}")]
    ConfigurationError(#[from] crate::configuration::ConfigurationError),
    /// Error related to data formatting
    #[error("Formatting error: {0}")]
    FormattingError(#[from] crate::format::FormattingError),
    #[error("{0}")]
    ApiError(#[from] ApiError),
    #[error("Failed to generate commands: {0}")]
    GeneratorError(#[from] GeneratorError),
}

impl CliError {
    /// Get the appropriate exit code for this error
    ///
    /// - `UsageError` for bad command lines
    /// - `DataError` for undecodable input
    /// - `NoInput` for unreadable files
    /// - `ConfigError` for configuration errors
    /// - API and network codes for transport failures
    pub fn exit_code(&self) -> CfsExitCode {
        match self {
            CliError::UnsupportedSubcommand(_) => CfsExitCode::UsageError,
            CliError::UsageError(_) => CfsExitCode::UsageError,
            CliError::InvalidOptionValue { .. } => CfsExitCode::UsageError,
            CliError::InvalidJson { .. } => CfsExitCode::DataError,
            CliError::FileReadError { .. } => CfsExitCode::NoInput,
            CliError::ConfigurationError(_) => CfsExitCode::ConfigError,
            CliError::FormattingError(_) => CfsExitCode::DataError,
            CliError::ApiError(e) => e.exit_code(),
            _ => CfsExitCode::SoftwareError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_errors_map_to_usage_exit_code() {
        let error = CliError::UsageError("bad".to_string());
        assert_eq!(error.exit_code(), CfsExitCode::UsageError);
        assert_eq!(error.exit_code().code(), 64);
    }

    #[test]
    fn test_invalid_json_maps_to_data_error() {
        let cause = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = CliError::InvalidJson {
            origin: "--state".to_string(),
            cause,
        };
        assert_eq!(error.exit_code(), CfsExitCode::DataError);
        assert!(error.to_string().starts_with("Invalid JSON in --state"));
    }

    #[test]
    fn test_internal_errors_map_to_software_error() {
        let error = CliError::MissingCommand {
            resource: "sessions".to_string(),
            command: "create".to_string(),
        };
        assert_eq!(error.exit_code(), CfsExitCode::SoftwareError);
    }
}
