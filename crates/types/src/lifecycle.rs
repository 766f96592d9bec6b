//! Lifecycle events a target package manager runs hooks for

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of hook events; each one maps to its own script file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleEvent {
    BeforeInstall,
    AfterInstall,
    BeforeRemove,
    AfterRemove,
    BeforeUpgrade,
    AfterUpgrade,
}

impl LifecycleEvent {
    /// All events in file-emission order
    pub const ALL: [Self; 6] = [
        Self::BeforeInstall,
        Self::AfterInstall,
        Self::BeforeRemove,
        Self::AfterRemove,
        Self::BeforeUpgrade,
        Self::AfterUpgrade,
    ];

    /// Event name, also used as the hook file name and packager option
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BeforeInstall => "before-install",
            Self::AfterInstall => "after-install",
            Self::BeforeRemove => "before-remove",
            Self::AfterRemove => "after-remove",
            Self::BeforeUpgrade => "before-upgrade",
            Self::AfterUpgrade => "after-upgrade",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| format!("unknown lifecycle event: {s}"))
    }
}
