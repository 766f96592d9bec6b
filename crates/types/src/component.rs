//! Component tree nodes and flattened component records

use crate::package::PackageDescriptor;
use crate::LifecycleEvent;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A node of the declarative component tree
///
/// Leaves carry a locator (or nothing, meaning "empty directory"); trees map
/// names to child nodes in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentNode {
    Leaf(Option<String>),
    Tree(Vec<(String, ComponentNode)>),
}

impl ComponentNode {
    /// Convenience constructor for a leaf with a locator
    #[must_use]
    pub fn leaf(locator: impl Into<String>) -> Self {
        Self::Leaf(Some(locator.into()))
    }

    /// Convenience constructor for a subtree
    #[must_use]
    pub fn tree<I, K>(children: I) -> Self
    where
        I: IntoIterator<Item = (K, ComponentNode)>,
        K: Into<String>,
    {
        Self::Tree(
            children
                .into_iter()
                .map(|(name, node)| (name.into(), node))
                .collect(),
        )
    }
}

/// One unit to fetch, stage and install
#[derive(Debug, Clone, Serialize)]
pub struct Component {
    /// Configuration key, replaced by the staged package name once known
    pub name: String,
    /// Slash-joined chain of keys from the root of the tree
    pub relative_path: String,
    /// Raw source string; `None` means no transfer
    pub locator: Option<String>,
    stage_path: Option<PathBuf>,
    pack_path: Option<PathBuf>,
    /// Whether `stage_path` existed at the last resolution
    pub staged: bool,
    /// Package descriptor loaded from the staged tree
    #[serde(skip)]
    pub package: Option<PackageDescriptor>,
    /// Process/service descriptor found in the staged tree
    pub service: Option<PathBuf>,
}

impl Component {
    /// Create a component record; empty locators are normalized to `None`
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        relative_path: impl Into<String>,
        locator: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            relative_path: relative_path.into(),
            locator: locator.filter(|l| !l.trim().is_empty()),
            stage_path: None,
            pack_path: None,
            staged: false,
            package: None,
            service: None,
        }
    }

    /// Locator to transfer from, if any
    #[must_use]
    pub fn locator(&self) -> Option<&str> {
        self.locator.as_deref()
    }

    /// Assign staging and install paths relative to the given roots.
    ///
    /// Paths already set are left untouched.
    pub fn assign_paths(&mut self, stage_root: &Path, pack_root: &Path) {
        if self.stage_path.is_none() {
            self.stage_path = Some(join_relative(stage_root, &self.relative_path));
        }
        if self.pack_path.is_none() {
            self.pack_path = Some(join_relative(pack_root, &self.relative_path));
        }
    }

    /// Staging directory, once assigned
    #[must_use]
    pub fn stage_path(&self) -> Option<&Path> {
        self.stage_path.as_deref()
    }

    /// Install destination on the target system, once assigned
    #[must_use]
    pub fn pack_path(&self) -> Option<&Path> {
        self.pack_path.as_deref()
    }

    /// Whether a service descriptor was found in the staged tree
    #[must_use]
    pub fn has_service(&self) -> bool {
        self.service.is_some()
    }

    /// Script declared for a lifecycle event in the staged package descriptor
    #[must_use]
    pub fn hook_declaration(&self, event: LifecycleEvent) -> Option<&serde_json::Value> {
        self.package
            .as_ref()
            .and_then(|pkg| pkg.hook_declaration(event))
    }
}

fn join_relative(root: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(root.to_path_buf(), |path, segment| path.join(segment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_locator_is_none() {
        let component = Component::new("a", "a", Some("  ".to_string()));
        assert!(component.locator().is_none());
    }

    #[test]
    fn assign_paths_is_idempotent() {
        let mut component = Component::new("e", "b/c/d/e", Some("acme/e".to_string()));
        component.assign_paths(Path::new("/tmp/stage"), Path::new("/opt/app"));
        assert_eq!(
            component.stage_path(),
            Some(Path::new("/tmp/stage/b/c/d/e"))
        );
        assert_eq!(component.pack_path(), Some(Path::new("/opt/app/b/c/d/e")));

        component.assign_paths(Path::new("/elsewhere"), Path::new("/other"));
        assert_eq!(
            component.stage_path(),
            Some(Path::new("/tmp/stage/b/c/d/e"))
        );
        assert_eq!(component.pack_path(), Some(Path::new("/opt/app/b/c/d/e")));
    }
}
