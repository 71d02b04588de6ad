//! CLI error type and exit codes.

use std::fmt;

use dcslm::config::ConfigError;
use dcslm::logging::LoggingError;
use dcslm::manager::ManagerError;
use dcslm::optimizer::OptimizeError;
use dcslm::registry::RegistryError;

/// Errors that end a CLI command.
#[derive(Debug)]
pub enum CliError {
    /// Invalid arguments or settings.
    Config(String),
    ConfigFile(ConfigError),
    Logging(LoggingError),
    Manager(ManagerError),
    Registry(RegistryError),
    Optimize(OptimizeError),
    Serialize(serde_json::Error),
    /// An interactive prompt failed.
    Prompt(String),
    /// Some items of a batch failed; each was already reported.
    Failed { failed: usize, total: usize },
    /// The user interrupted the command.
    Cancelled,
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Cancelled => 130,
            Self::Config(_) => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "{}", msg),
            Self::ConfigFile(e) => write!(f, "configuration: {}", e),
            Self::Logging(e) => write!(f, "logging: {}", e),
            Self::Manager(e) => write!(f, "{}", e),
            Self::Registry(e) => write!(f, "{}", e),
            Self::Optimize(e) => write!(f, "{}", e),
            Self::Serialize(e) => write!(f, "failed to serialize output: {}", e),
            Self::Prompt(msg) => write!(f, "prompt failed: {}", msg),
            Self::Failed { failed, total } => write!(f, "{} of {} item(s) failed", failed, total),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::ConfigFile(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        Self::Logging(e)
    }
}

impl From<ManagerError> for CliError {
    fn from(e: ManagerError) -> Self {
        match e {
            ManagerError::Cancelled => Self::Cancelled,
            other => Self::Manager(other),
        }
    }
}

impl From<RegistryError> for CliError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

impl From<OptimizeError> for CliError {
    fn from(e: OptimizeError) -> Self {
        Self::Optimize(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialize(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Cancelled.exit_code(), 130);
        assert_eq!(CliError::Config("bad".into()).exit_code(), 2);
        assert_eq!(CliError::Failed { failed: 1, total: 2 }.exit_code(), 1);
    }

    #[test]
    fn test_cancelled_manager_error_maps_to_cancelled() {
        let err: CliError = ManagerError::Cancelled.into();
        assert!(matches!(err, CliError::Cancelled));
    }
}
