use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use impack_types::LifecycleEvent;

/// Hook generation events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HookEvent {
    /// Content appended to one hook file
    Written {
        event: LifecycleEvent,
        path: PathBuf,
        entries: usize,
    },

    /// Hooks directory cleared before generation
    Cleaned { path: PathBuf },
}
