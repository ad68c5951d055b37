//! The errors that can occur.

use std::time::Duration;
use thiserror::Error;

/// A type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// The possible errors that can occur.
#[derive(Debug, Error)]
pub enum Error {
    /// An error occurred while running the runtime.
    #[error("An error occurred while running the runtime: {0}")]
    Runtime(#[from] tokio::task::JoinError),
    /// An error occurred while interacting with the file system.
    #[error("An IO error occurred: {0}")]
    IO(#[from] std::io::Error),

    /// A required executable could not be located.
    #[error("Required executable '{0}' was not found, install it or pass its path explicitly")]
    MissingEngine(String),
    /// A command exited with a non-zero status.
    #[error("Process failed with code {code}: {stderr}")]
    Command {
        /// The exit code, `-1` when the process was killed by a signal.
        code: i32,
        /// What the process wrote to stderr.
        stderr: String,
    },
    /// An error occurred while capturing the output of a command.
    #[error("Failed to capture process output: {0}")]
    Output(String),
    /// An error occurred manipulating a path.
    #[error("An invalid path was provided: {0}")]
    Path(String),
    /// An error occurred due to a timeout.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
}
