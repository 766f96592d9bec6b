//! Reports returned by pack operations

use crate::{LifecycleEvent, TransferMethod};
use serde::Serialize;
use std::path::PathBuf;

/// What happened to one component during collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StageOutcome {
    /// Content was fetched into the staging directory
    Transferred { method: TransferMethod, url: String },
    /// The staging directory already had content
    AlreadyCollected,
    /// No locator; only the directory was created
    Created,
}

/// Per-component collection result
#[derive(Debug, Clone, Serialize)]
pub struct StagedComponent {
    pub relative_path: String,
    pub locator: Option<String>,
    pub stage_path: PathBuf,
    #[serde(flatten)]
    pub outcome: StageOutcome,
}

/// Result of a hook generation pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct HookReport {
    pub files: Vec<HookFileReport>,
}

/// One hook file touched by a generation pass
#[derive(Debug, Clone, Serialize)]
pub struct HookFileReport {
    pub event: LifecycleEvent,
    pub path: PathBuf,
    /// Number of component hook entries appended
    pub entries: usize,
    /// Names of the fixed blocks appended (rebuild, startup, teardown)
    pub blocks: Vec<String>,
}

/// Result of `collect`
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectReport {
    pub components: Vec<StagedComponent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hooks: Option<HookReport>,
}

impl CollectReport {
    /// Count of components whose content was transferred in this run
    #[must_use]
    pub fn transferred(&self) -> usize {
        self.components
            .iter()
            .filter(|c| matches!(c.outcome, StageOutcome::Transferred { .. }))
            .count()
    }
}

/// Result of handing the staged tree to the packager
#[derive(Debug, Clone, Serialize)]
pub struct PackReport {
    pub package: PathBuf,
    pub program: String,
    pub args: Vec<String>,
}
