//! Structured logging integration for events
//!
//! Converts domain events into tracing records with structured fields so the
//! JSON debug log carries the same information the terminal shows.

use impack_events::{
    AppEvent, DownloadEvent, EventMeta, GeneralEvent, HookEvent, PackEvent, StageEvent,
};
use tracing::{debug, error, info, warn};

/// Log an `AppEvent` at its own level with structured fields
pub fn log_event_with_tracing(event: &AppEvent, meta: &EventMeta) {
    match event {
        AppEvent::General(general) => log_general(general, meta),
        AppEvent::Stage(stage) => log_stage(stage, meta),
        AppEvent::Download(download) => log_download(download, meta),
        AppEvent::Hooks(hooks) => log_hooks(hooks, meta),
        AppEvent::Pack(pack) => log_pack(pack, meta),
    }
}

fn log_general(event: &GeneralEvent, meta: &EventMeta) {
    match event {
        GeneralEvent::Warning { message, context } => {
            warn!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                context = ?context,
                "{message}"
            );
        }
        GeneralEvent::DebugLog { message, context } => {
            debug!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                context = ?context,
                "{message}"
            );
        }
        GeneralEvent::OperationStarted { operation } => {
            info!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                operation = %operation,
                "Operation started"
            );
        }
        GeneralEvent::OperationCompleted { operation, success } => {
            info!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                operation = %operation,
                success = success,
                "Operation completed"
            );
        }
        GeneralEvent::OperationFailed { operation, error } => {
            error!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                operation = %operation,
                error = %error,
                "Operation failed"
            );
        }
    }
}

fn log_stage(event: &StageEvent, meta: &EventMeta) {
    match event {
        StageEvent::CollectionStarted { components, jobs } => {
            info!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                components = components,
                jobs = jobs,
                "Collection started"
            );
        }
        StageEvent::TransferStarted {
            component,
            locator,
            method,
            url,
        } => {
            info!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                component = %component,
                locator = %locator,
                method = %method,
                url = %url,
                "Transfer started"
            );
        }
        StageEvent::Skipped { component, path } => {
            info!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                component = %component,
                path = %path.display(),
                "Component already collected"
            );
        }
        StageEvent::Created { component, path } => {
            info!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                component = %component,
                path = %path.display(),
                "Empty component directory created"
            );
        }
        StageEvent::TransferCompleted {
            component,
            method,
            path,
        } => {
            info!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                component = %component,
                method = %method,
                path = %path.display(),
                "Transfer completed"
            );
        }
        StageEvent::TransferFailed {
            component,
            locator,
            failure,
        } => {
            error!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                component = %component,
                locator = %locator,
                retryable = failure.retryable,
                code = ?failure.code,
                message = %failure.message,
                hint = ?failure.hint,
                "Transfer failed"
            );
        }
        StageEvent::CollectionCompleted {
            transferred,
            skipped,
            failed,
        } => {
            info!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                transferred = transferred,
                skipped = skipped,
                failed = failed,
                "Collection completed"
            );
        }
    }
}

fn log_download(event: &DownloadEvent, meta: &EventMeta) {
    match event {
        DownloadEvent::Started { url, total_size } => {
            debug!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                url = %url,
                total_size = ?total_size,
                "Download started"
            );
        }
        DownloadEvent::Completed {
            url,
            final_size,
            total_time,
        } => {
            debug!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                url = %url,
                final_size = final_size,
                elapsed_ms = u64::try_from(total_time.as_millis()).unwrap_or(u64::MAX),
                "Download completed"
            );
        }
        DownloadEvent::Failed { url, failure } => {
            error!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                url = %url,
                retryable = failure.retryable,
                code = ?failure.code,
                message = %failure.message,
                hint = ?failure.hint,
                "Download failed"
            );
        }
    }
}

fn log_hooks(event: &HookEvent, meta: &EventMeta) {
    match event {
        HookEvent::Written {
            event: lifecycle,
            path,
            entries,
        } => {
            info!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                lifecycle = %lifecycle,
                path = %path.display(),
                entries = entries,
                "Hook file written"
            );
        }
        HookEvent::Cleaned { path } => {
            info!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                path = %path.display(),
                "Hooks directory cleaned"
            );
        }
    }
}

fn log_pack(event: &PackEvent, meta: &EventMeta) {
    match event {
        PackEvent::CommandStarted { program, args, cwd } => {
            info!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                program = %program,
                args = ?args,
                cwd = %cwd.display(),
                "Command started"
            );
        }
        PackEvent::CommandCompleted {
            program,
            cwd,
            duration,
        } => {
            info!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                program = %program,
                cwd = %cwd.display(),
                elapsed_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
                "Command completed"
            );
        }
        PackEvent::CommandFailed {
            program,
            cwd,
            failure,
        } => {
            error!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                program = %program,
                cwd = %cwd.display(),
                code = ?failure.code,
                message = %failure.message,
                hint = ?failure.hint,
                "Command failed"
            );
        }
        PackEvent::PackageCreated { path } => {
            info!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                path = %path.display(),
                "Package created"
            );
        }
    }
}
