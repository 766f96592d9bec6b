//! Component staging error types

use std::borrow::Cow;
use std::fmt;

use crate::UserFacingError;
use thiserror::Error;

/// A single component whose transfer failed during collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentFailure {
    pub component: String,
    pub locator: String,
    pub message: String,
}

impl fmt::Display for ComponentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {}",
            self.component, self.locator, self.message
        )
    }
}

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum StageError {
    #[error("error when downloading {locator}: {message}")]
    TransferFailed { locator: String, message: String },

    #[error("unsupported archive format for {url}")]
    UnsupportedArchive { url: String },

    #[error("extraction failed: {message}")]
    ExtractionFailed { message: String },

    #[error("git clone failed for {url}: {message}")]
    CloneFailed { url: String, message: String },

    #[error("{} of {total} components failed to collect: {}", failures.len(), join_failures(failures))]
    CollectionFailed {
        total: usize,
        failures: Vec<ComponentFailure>,
    },

    #[error("concurrency error: {message}")]
    Concurrency { message: String },
}

fn join_failures(failures: &[ComponentFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl UserFacingError for StageError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::TransferFailed { .. } | Self::CollectionFailed { .. } => Some(
                "Components that finished are kept; fix the failing locator and re-run collect.",
            ),
            Self::CloneFailed { .. } => Some("Check git credentials and that the ref exists."),
            Self::UnsupportedArchive { .. } => {
                Some("Archive locators must point at zip, tar or tar.gz files.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::TransferFailed { .. } | Self::CollectionFailed { .. } | Self::CloneFailed { .. }
        )
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::TransferFailed { .. } => "stage.transfer_failed",
            Self::UnsupportedArchive { .. } => "stage.unsupported_archive",
            Self::ExtractionFailed { .. } => "stage.extraction_failed",
            Self::CloneFailed { .. } => "stage.clone_failed",
            Self::CollectionFailed { .. } => "stage.collection_failed",
            Self::Concurrency { .. } => "stage.concurrency",
        };
        Some(code)
    }
}
