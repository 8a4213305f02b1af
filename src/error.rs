use std::io;
use thiserror::Error;

/// Error type shared by every telemetry adapter
#[derive(Error, Debug)]
pub enum GpuError {
    /// The vendor tool could not be located, could not start or exited non-zero
    #[error("Failed to execute `{command}`: {reason}")]
    Execution { command: String, reason: String },

    /// The tool ran but its output could not be decoded
    #[error("Failed to parse {tool} output: {reason}")]
    Parse { tool: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for the telemetry core
pub type Result<T> = std::result::Result<T, GpuError>;

impl GpuError {
    /// Create an execution error for the given command line
    pub fn execution<C: Into<String>, R: Into<String>>(command: C, reason: R) -> Self {
        GpuError::Execution {
            command: command.into(),
            reason: reason.into(),
        }
    }

    /// Create a parse error for the named tool
    pub fn parse<T: Into<String>, R: Into<String>>(tool: T, reason: R) -> Self {
        GpuError::Parse {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    pub fn is_execution(&self) -> bool {
        matches!(self, GpuError::Execution { .. })
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, GpuError::Parse { .. })
    }
}
