//! Per-operation options

use crate::args::Options;
use std::path::PathBuf;
use std::time::Duration;

/// Options for `collect`
///
/// `None` fields fall back to the tool settings.
#[derive(Debug, Clone, Default)]
pub struct CollectOptions {
    pub clone: Option<bool>,
    pub jobs: Option<usize>,
    /// Limit for the whole collection call
    pub timeout: Option<Duration>,
    /// Generate hooks afterwards; `None` skips hook generation
    pub hooks: Option<HookOptions>,
}

/// Options for hook generation
#[derive(Debug, Clone, Copy, Default)]
pub struct HookOptions {
    /// Append an `npm rebuild` block to `after-install`
    pub rebuild: bool,
    /// Remove existing hook files first
    pub clean: bool,
}

/// Options for running npm in every staged component
#[derive(Debug, Clone, Default)]
pub struct NpmOptions {
    /// npm subcommand, `install` when unset
    pub command: Option<String>,
    pub ignore_scripts: bool,
    /// Passed through after the generated flags
    pub extra: Vec<String>,
}

/// Options for the packager
#[derive(Debug, Clone, Default)]
pub struct PackOptions {
    pub architecture: Option<String>,
    /// Output package file
    pub package: Option<PathBuf>,
    /// Additional packager options; these override generated ones
    pub extra: Options,
}
