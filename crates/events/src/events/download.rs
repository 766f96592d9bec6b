use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::FailureContext;

/// Archive download events emitted by the network client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DownloadEvent {
    /// Response headers received, body streaming is about to begin
    Started {
        url: String,
        total_size: Option<u64>,
    },

    /// Body fully written to disk
    Completed {
        url: String,
        final_size: u64,
        total_time: Duration,
    },

    /// Download aborted
    Failed {
        url: String,
        failure: FailureContext,
    },
}
