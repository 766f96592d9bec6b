use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::FailureContext;

/// External command events for the npm and fpm steps
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PackEvent {
    /// About to spawn an external program
    CommandStarted {
        program: String,
        args: Vec<String>,
        cwd: PathBuf,
    },

    /// External program exited successfully
    CommandCompleted {
        program: String,
        cwd: PathBuf,
        duration: Duration,
    },

    /// External program could not be spawned or exited non-zero
    CommandFailed {
        program: String,
        cwd: PathBuf,
        failure: FailureContext,
    },

    /// The package file was produced
    PackageCreated { path: PathBuf },
}
