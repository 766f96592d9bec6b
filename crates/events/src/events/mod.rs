use serde::{Deserialize, Serialize};

use crate::EventSource;
use impack_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code, when the error carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod download;
pub mod general;
pub mod hooks;
pub mod pack;
pub mod stage;

pub use download::*;
pub use general::*;
pub use hooks::*;
pub use pack::*;
pub use stage::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, operations)
    General(GeneralEvent),

    /// Component staging events
    Stage(StageEvent),

    /// Archive download events
    Download(DownloadEvent),

    /// Hook file generation events
    Hooks(HookEvent),

    /// npm / fpm command events
    Pack(PackEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Stage(_) => EventSource::STAGE,
            Self::Download(_) => EventSource::DOWNLOAD,
            Self::Hooks(_) => EventSource::HOOKS,
            Self::Pack(_) => EventSource::PACK,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::OperationFailed { .. })
            | Self::Stage(StageEvent::TransferFailed { .. })
            | Self::Download(DownloadEvent::Failed { .. })
            | Self::Pack(PackEvent::CommandFailed { .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. }) => Level::WARN,

            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Download(DownloadEvent::Started { .. })
            | Self::Stage(StageEvent::Skipped { .. } | StageEvent::Created { .. }) => Level::DEBUG,

            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "impack::events::general",
            Self::Stage(_) => "impack::events::stage",
            Self::Download(_) => "impack::events::download",
            Self::Hooks(_) => "impack::events::hooks",
            Self::Pack(_) => "impack::events::pack",
        }
    }
}
