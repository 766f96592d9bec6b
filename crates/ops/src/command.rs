//! Running external tools (npm, fpm)

use impack_errors::{Error, PackError};
use impack_events::{AppEvent, EventEmitter, EventSender, FailureContext, PackEvent};
use std::path::PathBuf;
use std::time::Instant;
use tokio::process::Command;

/// A fully prepared external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl CommandSpec {
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            cwd: cwd.into(),
        }
    }
}

/// Captured output of a successful command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Spawn a command, wait for it and report through events
///
/// # Errors
///
/// Returns `PackError::SpawnFailed` if the program cannot be started and
/// `PackError::CommandFailed` if it exits unsuccessfully.
pub async fn run_command(spec: &CommandSpec, tx: &EventSender) -> Result<CommandOutput, Error> {
    let start = Instant::now();
    tx.emit(AppEvent::Pack(PackEvent::CommandStarted {
        program: spec.program.clone(),
        args: spec.args.clone(),
        cwd: spec.cwd.clone(),
    }));

    let result: Result<CommandOutput, PackError> = async {
        let output = Command::new(&spec.program)
            .args(&spec.args)
            .current_dir(&spec.cwd)
            .output()
            .await
            .map_err(|e| PackError::SpawnFailed {
                program: spec.program.clone(),
                message: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(PackError::CommandFailed {
                program: spec.program.clone(),
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
    .await;

    match &result {
        Ok(output) => {
            tracing::debug!(
                program = %spec.program,
                stdout_bytes = output.stdout.len(),
                "command finished"
            );
            tx.emit(AppEvent::Pack(PackEvent::CommandCompleted {
                program: spec.program.clone(),
                cwd: spec.cwd.clone(),
                duration: start.elapsed(),
            }));
        }
        Err(err) => {
            tx.emit(AppEvent::Pack(PackEvent::CommandFailed {
                program: spec.program.clone(),
                cwd: spec.cwd.clone(),
                failure: FailureContext::from_error(err),
            }));
        }
    }

    result.map_err(Error::from)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use impack_events::channel;

    #[tokio::test]
    async fn successful_command_emits_start_and_completion() {
        let (tx, mut rx) = channel();
        let spec = CommandSpec::new("sh", vec!["-c".into(), "echo packed".into()], "/");

        let output = run_command(&spec, &tx).await.unwrap();
        assert_eq!(output.stdout.trim(), "packed");

        assert!(matches!(
            rx.try_recv().unwrap(),
            AppEvent::Pack(PackEvent::CommandStarted { .. })
        ));
        assert!(matches!(
            rx.try_recv().unwrap(),
            AppEvent::Pack(PackEvent::CommandCompleted { .. })
        ));
    }

    #[tokio::test]
    async fn failing_command_reports_stderr() {
        let (tx, _rx) = channel();
        let spec = CommandSpec::new(
            "sh",
            vec!["-c".into(), "echo broken >&2; exit 3".into()],
            "/",
        );

        let err = run_command(&spec, &tx).await.unwrap_err();
        match err {
            Error::Pack(PackError::CommandFailed { stderr, .. }) => assert_eq!(stderr, "broken"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_failure() {
        let (tx, _rx) = channel();
        let spec = CommandSpec::new("impack-definitely-not-installed", Vec::new(), "/");

        let err = run_command(&spec, &tx).await.unwrap_err();
        assert!(matches!(err, Error::Pack(PackError::SpawnFailed { .. })));
    }
}
