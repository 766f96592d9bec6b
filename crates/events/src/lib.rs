#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in impack
//!
//! Library crates never print. Everything a user or a log file sees goes
//! through `AppEvent`s sent over an unbounded channel; the CLI drains the
//! channel, renders status lines and forwards each event to `tracing`.
//!
//! - **Domain-driven events**: General, Stage, Download, Hooks, Pack
//! - **Unified `EventEmitter` trait**: one API for all emissions
//! - **Tracing integration**: each event knows its level and log target

pub mod meta;
pub use meta::{EventLevel, EventMeta, EventSource};

pub mod events;
pub use events::{
    AppEvent, DownloadEvent, FailureContext, GeneralEvent, HookEvent, PackEvent, StageEvent,
};

use std::path::PathBuf;
use std::time::Duration;

use impack_types::TransferMethod;
use tokio::sync::mpsc::UnboundedSender;

/// Type alias for event sender using the `AppEvent` system
pub type EventSender = UnboundedSender<AppEvent>;

/// Type alias for event receiver using the `AppEvent` system
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<AppEvent>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events throughout impack
///
/// Implemented for a raw `EventSender` and for any struct that holds one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Receiver gone means nobody is listening; keep going
            let _ = sender.send(event);
        }
    }

    /// Emit a debug log event
    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }


    /// Emit a warning event with context
    fn emit_warning_with_context(&self, message: impl Into<String>, context: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning_with_context(
            message, context,
        )));
    }

    /// Emit an operation started event
    fn emit_operation_started(&self, operation: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::OperationStarted {
            operation: operation.into(),
        }));
    }

    /// Emit an operation completed event
    fn emit_operation_completed(&self, operation: impl Into<String>, success: bool) {
        self.emit(AppEvent::General(GeneralEvent::OperationCompleted {
            operation: operation.into(),
            success,
        }));
    }

    /// Emit an operation failed event
    fn emit_operation_failed(&self, operation: impl Into<String>, error: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::OperationFailed {
            operation: operation.into(),
            error: error.into(),
        }));
    }

    /// Emit a download started event
    fn emit_download_started(&self, url: impl Into<String>, total_size: Option<u64>) {
        self.emit(AppEvent::Download(DownloadEvent::Started {
            url: url.into(),
            total_size,
        }));
    }

    /// Emit a download completed event
    fn emit_download_completed(
        &self,
        url: impl Into<String>,
        final_size: u64,
        total_time: Duration,
    ) {
        self.emit(AppEvent::Download(DownloadEvent::Completed {
            url: url.into(),
            final_size,
            total_time,
        }));
    }

    /// Emit a stage transfer started event
    fn emit_transfer_started(
        &self,
        component: impl Into<String>,
        locator: impl Into<String>,
        method: TransferMethod,
        url: impl Into<String>,
    ) {
        self.emit(AppEvent::Stage(StageEvent::TransferStarted {
            component: component.into(),
            locator: locator.into(),
            method,
            url: url.into(),
        }));
    }

    /// Emit a stage transfer completed event
    fn emit_transfer_completed(
        &self,
        component: impl Into<String>,
        method: TransferMethod,
        path: PathBuf,
    ) {
        self.emit(AppEvent::Stage(StageEvent::TransferCompleted {
            component: component.into(),
            method,
            path,
        }));
    }
}

/// Implementation of `EventEmitter` for the raw `EventSender`
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}
