//! Error type shared by every CLI command. Any `CliError` ends the process with
//! [`exit_code::ERROR`](crate::exit_code::ERROR).

use crate::config::ConfigError;
use kuhn_engine::errors::GameError;
use std::fmt;

#[derive(Debug)]
pub enum CliError {
    /// stdout/stderr writes and hand-record files
    Io(std::io::Error),

    /// Invalid user input or command-line arguments
    InvalidInput(String),

    Config(String),

    /// Rejected by the engine (bad rules, illegal deal)
    Engine(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Engine(msg) => write!(f, "Engine error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        CliError::Io(error)
    }
}

impl From<GameError> for CliError {
    fn from(error: GameError) -> Self {
        CliError::Engine(error.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        CliError::Config(error.to_string())
    }
}
