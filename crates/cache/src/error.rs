//! Error types for the cache crate

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Error type for cache operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// I/O error while probing, creating, removing or persisting cache entries
    #[error("I/O {operation} failed{}", path.as_ref().map_or(String::new(), |p| format!(": {}", p.display())))]
    #[diagnostic(
        code(cacheout::cache::io),
        help("Check file permissions and ensure the path exists")
    )]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error, if available
        path: Option<Box<Path>>,
        /// Operation that failed (e.g., "open", "remove", "persist")
        operation: String,
    },

    /// The cache directory could not be determined
    #[error("Cache configuration error: {message}")]
    #[diagnostic(
        code(cacheout::cache::config),
        help("Set CACHEOUT_CACHE_DIR or pass --cache-dir to choose a cache directory")
    )]
    Configuration {
        /// Error message describing the configuration issue
        message: String,
    },

    /// The wrapped command could not be started
    #[error("Failed to start `{command}`")]
    #[diagnostic(
        code(cacheout::cache::launch),
        help("Arguments are split on single spaces; check the program name and PATH")
    )]
    Launch {
        /// The command string as given by the caller
        command: String,
        /// The underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// Copying output between the command, the terminal and the cache failed
    #[error("Failed to copy output of `{command}`")]
    #[diagnostic(code(cacheout::cache::stream))]
    Stream {
        /// The command string as given by the caller
        command: String,
        /// The underlying read or write error
        #[source]
        source: std::io::Error,
    },

    /// The wrapped command exited unsuccessfully
    #[error("`{command}` exited with {}", code.map_or_else(|| "a signal".to_string(), |c| format!("status {c}")))]
    #[diagnostic(
        code(cacheout::cache::command_failed),
        help("The output was not cached; the next run executes the command again")
    )]
    CommandFailed {
        /// The command string as given by the caller
        command: String,
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
    },
}

impl Error {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
        }
    }

    /// Create an I/O error with path context
    #[must_use]
    pub fn io(
        source: std::io::Error,
        path: impl AsRef<Path>,
        operation: impl Into<String>,
    ) -> Self {
        Self::Io {
            source,
            path: Some(path.as_ref().into()),
            operation: operation.into(),
        }
    }

    /// Create an I/O error without path context
    #[must_use]
    pub fn io_no_path(source: std::io::Error, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: None,
            operation: operation.into(),
        }
    }

    /// Create a launch error
    #[must_use]
    pub fn launch(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::Launch {
            command: command.into(),
            source,
        }
    }

    /// Create a stream copy error
    #[must_use]
    pub fn stream(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::Stream {
            command: command.into(),
            source,
        }
    }

    /// Whether the reader of the output went away before it was complete
    #[must_use]
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, Self::Stream { source, .. } if source.kind() == std::io::ErrorKind::BrokenPipe)
    }

    /// Create a command failure error
    #[must_use]
    pub fn command_failed(command: impl Into<String>, code: Option<i32>) -> Self {
        Self::CommandFailed {
            command: command.into(),
            code,
        }
    }
}

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display_includes_path() {
        let err = Error::io(
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            "/cache/abc",
            "open",
        );
        assert_eq!(err.to_string(), "I/O open failed: /cache/abc");
    }

    #[test]
    fn test_io_error_without_path() {
        let err = Error::io_no_path(std::io::Error::other("boom"), "read_dir");
        assert_eq!(err.to_string(), "I/O read_dir failed");
    }

    #[test]
    fn test_command_failed_display() {
        assert_eq!(
            Error::command_failed("false", Some(1)).to_string(),
            "`false` exited with status 1"
        );
        assert_eq!(
            Error::command_failed("sleep 10", None).to_string(),
            "`sleep 10` exited with a signal"
        );
    }

    #[test]
    fn test_broken_pipe_only_on_stream() {
        let closed = || std::io::Error::from(std::io::ErrorKind::BrokenPipe);
        assert!(Error::stream("seq 1 9", closed()).is_broken_pipe());
        assert!(!Error::stream("seq 1 9", std::io::Error::other("disk")).is_broken_pipe());
        assert!(!Error::io(closed(), "/cache/abc", "persist").is_broken_pipe());
    }
}
