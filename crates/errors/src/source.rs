//! Locator parsing error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("invalid locator `{locator}`: {reason}")]
    InvalidLocator { locator: String, reason: String },

    #[error("unknown provider `{provider}` in locator `{locator}`")]
    UnknownProvider { provider: String, locator: String },
}

impl UserFacingError for SourceError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        Some("Locators look like `[provider:][host:]owner/name[#ref]` or a full https:// URL.")
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::InvalidLocator { .. } => "source.invalid_locator",
            Self::UnknownProvider { .. } => "source.unknown_provider",
        };
        Some(code)
    }
}
