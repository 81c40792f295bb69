//! Error types for the transfer simulator

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    InvalidAddress(String),
    InvalidAmount(String),
    NetworkUnavailable(String),
    Config(String),
    Io(String),
}

impl SimError {
    /// Process exit status for this error. Every error is fatal for the run,
    /// lookups that fail are absorbed by the simulator before reaching here.
    pub fn exit_code(&self) -> i32 {
        1
    }

    pub fn is_input_error(&self) -> bool {
        matches!(self, SimError::InvalidAddress(_) | SimError::InvalidAmount(_))
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimError::InvalidAddress(msg) => write!(f, "Invalid address: {}", msg),
            SimError::InvalidAmount(msg) => write!(f, "Invalid amount: {}", msg),
            SimError::NetworkUnavailable(msg) => write!(f, "Network unavailable: {}", msg),
            SimError::Config(msg) => write!(f, "Configuration error: {}", msg),
            SimError::Io(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for SimError {}

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self {
        SimError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for SimError {
    fn from(err: toml::de::Error) -> Self {
        SimError::Config(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, SimError>;
