//! Event handling and status display

use crate::logging::log_event_with_tracing;
use console::{style, Term};
use impack_events::{
    AppEvent, DownloadEvent, EventMeta, FailureContext, GeneralEvent, HookEvent, PackEvent,
    StageEvent,
};

/// Renders events as status lines on stderr and forwards them to tracing
pub struct EventHandler {
    term: Term,
    /// Print status lines at all (off in JSON mode)
    show_status: bool,
    /// Also print download and debug events
    debug_enabled: bool,
    /// Command name attached to every logged event
    correlation_id: String,
}

impl EventHandler {
    pub fn new(show_status: bool, debug_enabled: bool, correlation_id: impl Into<String>) -> Self {
        Self {
            term: Term::stderr(),
            show_status,
            debug_enabled,
            correlation_id: correlation_id.into(),
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, event: AppEvent) {
        let meta = EventMeta::for_event(&event).with_correlation_id(self.correlation_id.clone());
        log_event_with_tracing(&event, &meta);

        if !self.show_status {
            return;
        }

        match event {
            AppEvent::General(general) => self.handle_general(general),
            AppEvent::Stage(stage) => self.handle_stage(stage),
            AppEvent::Download(download) => self.handle_download(download),
            AppEvent::Hooks(hooks) => self.handle_hooks(hooks),
            AppEvent::Pack(pack) => self.handle_pack(pack),
        }
    }

    fn handle_general(&self, event: GeneralEvent) {
        match event {
            GeneralEvent::OperationStarted { operation } => {
                self.header(operation_title(&operation));
            }
            GeneralEvent::OperationCompleted { .. } => {}
            GeneralEvent::OperationFailed { operation, .. } => {
                self.line(&format!("{} {operation} failed", style("✗").red().bold()));
            }
            GeneralEvent::Warning { message, context } => {
                let mut line = format!("{} {message}", style("warning:").yellow().bold());
                if let Some(context) = context {
                    line.push_str(&format!(" ({context})"));
                }
                self.line(&line);
            }
            GeneralEvent::DebugLog { message, .. } => {
                if self.debug_enabled {
                    self.line(&style(message).dim().to_string());
                }
            }
        }
    }

    fn handle_stage(&self, event: StageEvent) {
        match event {
            StageEvent::CollectionStarted { components, jobs } => {
                self.line(
                    &style(format!("   {components} components, up to {jobs} at a time"))
                        .dim()
                        .to_string(),
                );
            }
            StageEvent::TransferStarted {
                component,
                method,
                url,
                ..
            } => {
                self.line(&format!(
                    "   {} {component} {}",
                    style("↓").cyan(),
                    style(format!("({method} {url})")).dim()
                ));
            }
            StageEvent::Skipped { component, .. } => {
                self.line(&format!(
                    "   {} {component} {}",
                    style("•").dim(),
                    style("already collected").dim()
                ));
            }
            StageEvent::Created { component, .. } => {
                self.line(&format!(
                    "   {} {component} {}",
                    style("•").dim(),
                    style("empty directory").dim()
                ));
            }
            StageEvent::TransferCompleted { component, .. } => {
                self.line(&format!("   {} {component}", style("✓").green()));
            }
            StageEvent::TransferFailed {
                component,
                locator,
                failure,
            } => {
                self.line(&format!(
                    "   {} {component} ({locator}): {}",
                    style("✗").red().bold(),
                    failure.message
                ));
                self.hint(&failure);
            }
            StageEvent::CollectionCompleted {
                transferred,
                skipped,
                failed,
            } => {
                let summary = format!(
                    "   {transferred} transferred, {skipped} already collected, {failed} failed"
                );
                if failed > 0 {
                    self.line(&style(summary).red().to_string());
                } else {
                    self.line(&style(summary).dim().to_string());
                }
            }
        }
    }

    fn handle_download(&self, event: DownloadEvent) {
        match event {
            DownloadEvent::Failed { url, failure } => {
                self.line(&format!("   {} {url}: {}", style("✗").red(), failure.message));
            }
            DownloadEvent::Started { url, .. } if self.debug_enabled => {
                self.line(&style(format!("   GET {url}")).dim().to_string());
            }
            DownloadEvent::Completed {
                url, final_size, ..
            } if self.debug_enabled => {
                self.line(&style(format!("   {url} ({final_size} bytes)")).dim().to_string());
            }
            DownloadEvent::Started { .. } | DownloadEvent::Completed { .. } => {}
        }
    }

    fn handle_hooks(&self, event: HookEvent) {
        match event {
            HookEvent::Written {
                event,
                path,
                entries,
            } => {
                self.line(&format!(
                    "   {} {event} {}",
                    style("✓").green(),
                    style(format!("({entries} component scripts, {})", path.display())).dim()
                ));
            }
            HookEvent::Cleaned { path } => {
                self.line(&style(format!("   cleaned {}", path.display())).dim().to_string());
            }
        }
    }

    fn handle_pack(&self, event: PackEvent) {
        match event {
            PackEvent::CommandStarted { program, args, cwd } => {
                self.line(&format!(
                    "   {} {program} {} {}",
                    style("$").dim(),
                    args.join(" "),
                    style(format!("(in {})", cwd.display())).dim()
                ));
            }
            PackEvent::CommandCompleted { .. } => {}
            PackEvent::CommandFailed {
                program, failure, ..
            } => {
                self.line(&format!(
                    "   {} {program}: {}",
                    style("✗").red().bold(),
                    failure.message
                ));
                self.hint(&failure);
            }
            PackEvent::PackageCreated { path } => {
                self.line(&format!(
                    "   {} {}",
                    style("✓").green(),
                    style(path.display()).bold()
                ));
            }
        }
    }

    fn header(&self, title: &str) {
        self.line(&format!("{} {}", style("==>").blue().bold(), style(title).bold()));
    }

    fn hint(&self, failure: &FailureContext) {
        if let Some(hint) = &failure.hint {
            self.line(&style(format!("     hint: {hint}")).dim().to_string());
        }
    }

    fn line(&self, line: &str) {
        // Status output is best effort
        let _ = self.term.write_line(line);
    }
}

fn operation_title(operation: &str) -> &str {
    match operation {
        "collect" => "Collecting components ...",
        "hooks" => "Generating hooks ...",
        "npm" => "Running npm ...",
        "pack" => "Packing ...",
        other => other,
    }
}
