use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use impack_types::TransferMethod;

use super::FailureContext;

/// Per-component events emitted while materializing the staging tree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StageEvent {
    /// Collection of the whole component list started
    CollectionStarted { components: usize, jobs: usize },

    /// A transfer for one component was scheduled
    TransferStarted {
        component: String,
        locator: String,
        method: TransferMethod,
        url: String,
    },

    /// The staging directory already had content
    Skipped { component: String, path: PathBuf },

    /// No locator; an empty directory was created
    Created { component: String, path: PathBuf },

    /// Content landed in the staging directory
    TransferCompleted {
        component: String,
        method: TransferMethod,
        path: PathBuf,
    },

    /// A transfer failed; no further transfers will be scheduled
    TransferFailed {
        component: String,
        locator: String,
        failure: FailureContext,
    },

    /// Collection finished (successfully or not)
    CollectionCompleted {
        transferred: usize,
        skipped: usize,
        failed: usize,
    },
}
