#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for impack
//!
//! This crate provides fine-grained error types organized by domain.
//! All error types implement Clone so they can travel through events and
//! aggregate reports.

use std::borrow::Cow;

use thiserror::Error;

pub mod config;
pub mod hooks;
pub mod network;
pub mod pack;
pub mod source;
pub mod stage;

// Re-export all error types at the root
pub use config::ConfigError;
pub use hooks::HookError;
pub use network::NetworkError;
pub use pack::PackError;
pub use source::SourceError;
pub use stage::{ComponentFailure, StageError};

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("stage error: {0}")]
    Stage(#[from] StageError),

    #[error("hook error: {0}")]
    Hook(#[from] HookError),

    #[error("pack error: {0}")]
    Pack(#[from] PackError),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("operation timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("I/O error: {message}")]
    Io {
        kind: std::io::ErrorKind,
        message: String,
        path: Option<std::path::PathBuf>,
    },
}

impl Error {
    /// Create an internal error with a message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create an Io error with an associated path
    pub fn io_with_path(err: &std::io::Error, path: impl Into<std::path::PathBuf>) -> Self {
        let path = path.into();
        Self::Io {
            kind: err.kind(),
            message: format!("{}: {err}", path.display()),
            path: Some(path),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {err}"))
    }
}

/// Result type alias for impack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering user-facing error information without
/// requiring heavyweight envelopes.
pub trait UserFacingError {
    /// Short message suitable for CLI output.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether retrying the same operation is likely to succeed.
    fn is_retryable(&self) -> bool {
        false
    }

    /// Stable error code for structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Network(err) => err.user_message(),
            Error::Stage(err) => err.user_message(),
            Error::Io { message, .. } => Cow::Owned(message.clone()),
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Config(err) => err.user_hint(),
            Error::Source(err) => err.user_hint(),
            Error::Stage(err) => err.user_hint(),
            Error::Hook(err) => err.user_hint(),
            Error::Pack(err) => err.user_hint(),
            Error::Network(err) => err.user_hint(),
            Error::Timeout { .. } => Some("Raise --timeout or check network connectivity."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Error::Network(err) => err.is_retryable(),
            Error::Stage(err) => err.is_retryable(),
            Error::Timeout { .. } | Error::Io { .. } => true,
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Config(err) => err.user_code(),
            Error::Source(err) => err.user_code(),
            Error::Stage(err) => err.user_code(),
            Error::Hook(err) => err.user_code(),
            Error::Pack(err) => err.user_code(),
            Error::Network(err) => err.user_code(),
            Error::Internal(_) => Some("error.internal"),
            Error::Timeout { .. } => Some("error.timeout"),
            Error::Io { .. } => Some("error.io"),
        }
    }
}
