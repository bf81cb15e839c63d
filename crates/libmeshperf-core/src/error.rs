use thiserror::Error;

use crate::machine::MachineError;

/// Main error type for meshperf operations
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Machine(#[from] MachineError),

    #[error("benchmark worker for '{0}' panicked")]
    WorkerPanicked(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl MeshError {
    /// Get the error code for JSON output
    pub fn error_code(&self) -> &'static str {
        match self {
            MeshError::InvalidArgs(_) => "invalid_args",
            MeshError::NotFound(_) => "not_found",
            MeshError::Machine(MachineError::CommandFailed { .. }) => "remote_command_failed",
            MeshError::Machine(_) => "transport_error",
            MeshError::WorkerPanicked(_) => "internal_error",
            MeshError::Io(_) => "io_error",
            MeshError::Json(_) => "internal_error",
            MeshError::TomlParse(_) => "invalid_args",
            MeshError::TomlSerialize(_) => "internal_error",
            MeshError::Internal(_) => "internal_error",
        }
    }

    /// Get the exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            MeshError::InvalidArgs(_) => 2,
            MeshError::TomlParse(_) => 2,
            MeshError::NotFound(_) => 3,
            MeshError::Machine(MachineError::CommandFailed { .. }) => 4,
            MeshError::Machine(_) => 5,
            MeshError::Io(_) => 5,
            _ => 1,
        }
    }

    /// Get actionable suggestions for fixing the error
    pub fn suggestions(&self) -> Vec<&'static str> {
        match self {
            MeshError::NotFound(msg) if msg.contains("inventory") => vec![
                "Pass --inventory <path> pointing at a machines TOML file",
            ],
            MeshError::Machine(MachineError::CommandFailed { .. }) => vec![
                "Run 'meshperf prepare' to install netperf and start netserver",
                "Check that every internal address is reachable from the other machines",
            ],
            MeshError::Machine(MachineError::Transport { .. }) => vec![
                "Verify SSH access with 'ssh <user>@<host> true'",
            ],
            _ => vec![],
        }
    }
}

pub type Result<T> = std::result::Result<T, MeshError>;
