use crate::command::ProcessSignal;
use thiserror::Error;

/// Error types for process lifecycle operations
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Executable not found: {name}")]
    NotFound { name: String },

    #[error("Failed to spawn process {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Process {binary} exited with code {code}")]
    Exited { binary: String, code: i32 },

    #[error("Process {binary} was terminated by {signal}")]
    Signaled {
        binary: String,
        signal: ProcessSignal,
    },

    #[error("Process {binary} has already been started")]
    AlreadyStarted { binary: String },

    #[error(
        "failed to execute: {binary} {args:?}, output {stdout}, stderr, {stderr}, error {reason}"
    )]
    Execute {
        binary: String,
        args: Vec<String>,
        stdout: String,
        stderr: String,
        reason: String,
    },

    #[error("Network interface not found: {name}")]
    InterfaceNotFound { name: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProcessError {
    /// True when the process was taken down by an unconditional kill
    pub fn is_forced_termination(&self) -> bool {
        matches!(
            self,
            ProcessError::Signaled {
                signal: ProcessSignal::Kill,
                ..
            }
        )
    }

    /// True for resolution failures of either an executable or an interface
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ProcessError::NotFound { .. } | ProcessError::InterfaceNotFound { .. }
        )
    }
}
