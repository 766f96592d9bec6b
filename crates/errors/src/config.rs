//! Configuration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: String },

    #[error("can not find impack file in: {path}")]
    ManifestNotFound { path: String },

    #[error("unsupported config file: {path}")]
    UnsupportedFormat { path: String },

    #[error("parse error in {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("missing required field: {field}")]
    MissingField { field: String },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("invalid component node at {path}: {reason}")]
    InvalidComponent { path: String, reason: String },
}

impl UserFacingError for ConfigError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => Some("Check the --config path or remove the flag."),
            Self::ManifestNotFound { .. } => {
                Some("Create impack.json, impack.yaml or impack.yml in the project directory.")
            }
            Self::UnsupportedFormat { .. } => Some("Use a .json, .yaml or .yml manifest."),
            Self::MissingField { field } => Some(match field.as_str() {
                "components" => {
                    "Declare components under `components`, `comps`, `deps` or `dependencies`."
                }
                "name" | "version" => {
                    "Set the field in the manifest or in a package.json next to it."
                }
                _ => "Add the missing configuration field noted in the error message.",
            }),
            Self::InvalidComponent { .. } => {
                Some(
                    "Component values must be a locator string, null, or a nested mapping, \
                     under unique names without `/`.",
                )
            }
            Self::InvalidValue { .. } | Self::ParseError { .. } => {
                Some("Fix the configuration value and retry the command.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NotFound { .. } => "config.not_found",
            Self::ManifestNotFound { .. } => "config.manifest_not_found",
            Self::UnsupportedFormat { .. } => "config.unsupported_format",
            Self::ParseError { .. } => "config.parse_error",
            Self::MissingField { .. } => "config.missing_field",
            Self::InvalidValue { .. } => "config.invalid_value",
            Self::InvalidComponent { .. } => "config.invalid_component",
        };
        Some(code)
    }
}
