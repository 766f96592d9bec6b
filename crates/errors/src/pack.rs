//! Packaging and external tool error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum PackError {
    #[error("missing required pack option: {field}")]
    MissingField { field: String },

    #[error("failed to spawn {program}: {message}")]
    SpawnFailed { program: String, message: String },

    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },
}

impl UserFacingError for PackError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingField { .. } => {
                Some("Set name, version and architecture in the manifest or via pack flags.")
            }
            Self::SpawnFailed { .. } => Some("Make sure the tool is installed and on PATH."),
            Self::CommandFailed { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::MissingField { .. } => "pack.missing_field",
            Self::SpawnFailed { .. } => "pack.spawn_failed",
            Self::CommandFailed { .. } => "pack.command_failed",
        };
        Some(code)
    }
}
