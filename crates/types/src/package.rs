//! Package descriptors found inside staged components

use crate::LifecycleEvent;
use serde::{Deserialize, Serialize};

/// File name of the package descriptor inside a component
pub const PACKAGE_DESCRIPTOR: &str = "package.json";

/// Conventional service descriptor names, checked in order
pub const SERVICE_DESCRIPTORS: [&str; 2] = ["process.yml", "process.json"];

/// The subset of `package.json` impack cares about
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub maintainer: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    /// Hook declarations: event name -> script
    #[serde(default)]
    pub impack: Option<serde_json::Map<String, serde_json::Value>>,
    /// Legacy key for hook declarations
    #[serde(default)]
    pub oodopack: Option<serde_json::Map<String, serde_json::Value>>,
}

impl PackageDescriptor {
    /// Hook declaration block, preferring `impack` over the legacy key
    #[must_use]
    pub fn hooks(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        self.impack.as_ref().or(self.oodopack.as_ref())
    }

    /// Raw declaration for one event
    #[must_use]
    pub fn hook_declaration(&self, event: LifecycleEvent) -> Option<&serde_json::Value> {
        self.hooks().and_then(|hooks| hooks.get(event.as_str()))
    }
}
