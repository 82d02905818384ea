use std::{path::PathBuf, time::Duration};

use thiserror::Error;

/// Errors raised while building, spawning or collecting a command line.
#[derive(Debug, Error)]
pub enum CommandLineError {
    #[error("executable path is already set to `{current}`; refusing to replace it with `{requested}`")]
    ExePathConflict { current: String, requested: String },
    #[error("command line has no executable path")]
    MissingExePath,
    #[error("{field} contains a NUL byte")]
    NulByte { field: String },
    #[error("invalid value for option `{name}`: {reason}")]
    InvalidOptionValue { name: String, reason: String },
    #[error("failed to spawn process (program={program:?}): {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("process timed out after {timeout:?}")]
    Timeout { timeout: Duration },
    #[error("failed waiting for process: {0}")]
    Wait(#[source] std::io::Error),
    #[error("failed reading stdout: {0}")]
    StdoutRead(#[source] std::io::Error),
    #[error("failed reading stderr: {0}")]
    StderrRead(#[source] std::io::Error),
    #[error("internal error: missing stdout pipe")]
    MissingStdout,
    #[error("internal error: missing stderr pipe")]
    MissingStderr,
    #[error("internal error: join failure: {0}")]
    Join(String),
}

/// Malformed input handed to [`crate::quoting::split`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuoteError {
    #[error("unterminated quoted span starting at byte {offset}")]
    UnterminatedQuote { offset: usize },
}
