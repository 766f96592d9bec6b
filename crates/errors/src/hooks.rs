//! Hook generation error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum HookError {
    #[error("template {template} failed: {message}")]
    TemplateFailed { template: String, message: String },

    #[error("failed to write hook {path}: {message}")]
    WriteFailed { path: String, message: String },

    #[error("invalid hook declaration in {component}: {message}")]
    InvalidDeclaration { component: String, message: String },
}

impl UserFacingError for HookError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::WriteFailed { .. } => Some("Ensure the hooks directory is writable."),
            Self::InvalidDeclaration { .. } => {
                Some("Hook scripts under `impack` in package.json must be strings.")
            }
            Self::TemplateFailed { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::TemplateFailed { .. } => "hooks.template_failed",
            Self::WriteFailed { .. } => "hooks.write_failed",
            Self::InvalidDeclaration { .. } => "hooks.invalid_declaration",
        };
        Some(code)
    }
}
