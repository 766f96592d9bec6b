//! Hook declarations grouped by lifecycle event

use impack_errors::{Error, HookError};
use impack_types::{Component, LifecycleEvent};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One component's script for one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookEntry {
    pub script: String,
    /// Component (package) name
    pub component: String,
    pub relative_path: String,
    /// Where the component lives once installed
    pub pack_path: PathBuf,
}

/// Ordered mapping from lifecycle event to the scripts declared for it
///
/// Entries keep component list order within each event.
#[derive(Debug, Clone, Default)]
pub struct HookSet {
    groups: BTreeMap<LifecycleEvent, Vec<HookEntry>>,
}

impl HookSet {
    /// Scan the package descriptors of staged components
    ///
    /// `null`, `false` and blank declarations are ignored.
    ///
    /// # Errors
    ///
    /// Returns `HookError::InvalidDeclaration` if a declaration is not a
    /// string, and an internal error if a component has no install path.
    pub fn collect(components: &[Component]) -> Result<Self, Error> {
        let mut groups: BTreeMap<LifecycleEvent, Vec<HookEntry>> = BTreeMap::new();

        for component in components {
            for event in LifecycleEvent::ALL {
                let script = match component.hook_declaration(event) {
                    None | Some(Value::Null | Value::Bool(false)) => continue,
                    Some(Value::String(script)) if script.trim().is_empty() => continue,
                    Some(Value::String(script)) => script.clone(),
                    Some(other) => {
                        return Err(HookError::InvalidDeclaration {
                            component: component.relative_path.clone(),
                            message: format!("`{event}` must be a script string, found {other}"),
                        }
                        .into())
                    }
                };

                let pack_path = component.pack_path().ok_or_else(|| {
                    Error::internal(format!(
                        "component {} has no install path",
                        component.relative_path
                    ))
                })?;

                groups.entry(event).or_default().push(HookEntry {
                    script,
                    component: component.name.clone(),
                    relative_path: component.relative_path.clone(),
                    pack_path: pack_path.to_path_buf(),
                });
            }
        }

        Ok(Self { groups })
    }

    /// Entries declared for one event
    #[must_use]
    pub fn entries(&self, event: LifecycleEvent) -> &[HookEntry] {
        self.groups.get(&event).map_or(&[], Vec::as_slice)
    }

    /// Non-empty groups in event order
    pub fn groups(&self) -> impl Iterator<Item = (LifecycleEvent, &[HookEntry])> {
        self.groups
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(event, entries)| (*event, entries.as_slice()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.values().all(Vec::is_empty)
    }

    /// Total number of entries across all events
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}
