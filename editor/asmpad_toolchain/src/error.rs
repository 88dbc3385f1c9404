//! Error type for toolchain runs.

use std::fmt;

use crate::runner::Stage;

/// Failure of a toolchain run.
///
/// No variant is fatal to the host: every failure path returns control to
/// the caller with a descriptive result. Launch failures are distinct from
/// stage failures — a tool that never started has no exit code.
#[derive(Debug, Clone)]
pub enum ToolchainError {
    /// The document has never been saved; there is no source file to build.
    /// Raised before any process is spawned.
    NoSourceFile,
    /// A run is already in flight on this runner.
    Busy,
    /// A tool or the produced executable could not be started at all
    /// (not found or not executable).
    Launch {
        stage: Stage,
        program: String,
        message: String,
    },
    /// A stage ran and failed: non-zero exit, or a cancelled execution.
    Failed {
        stage: Stage,
        exit_code: Option<i32>,
        diagnostic: String,
        command: String,
    },
    /// I/O error while shepherding a child process.
    Io { message: String },
}

impl fmt::Display for ToolchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSourceFile => {
                write!(f, "no source file to build; save the document first")
            }
            Self::Busy => write!(f, "a toolchain run is already in flight"),
            Self::Launch {
                stage,
                program,
                message,
            } => {
                write!(f, "cannot launch {stage} tool '{program}': {message}")
            }
            Self::Failed {
                stage,
                exit_code,
                diagnostic,
                command,
            } => {
                write!(f, "{stage} failed")?;
                if let Some(code) = exit_code {
                    write!(f, " (exit code {code})")?;
                }
                if !diagnostic.is_empty() {
                    write!(f, "\n\n{diagnostic}")?;
                }
                write!(f, "\n\nCommand: {command}")
            }
            Self::Io { message } => write!(f, "I/O error during toolchain run: {message}"),
        }
    }
}

impl std::error::Error for ToolchainError {}
