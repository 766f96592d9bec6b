#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Lifecycle hook generation for impack
//!
//! Scans the package descriptors of staged components for declared lifecycle
//! scripts, renders them per event and appends them to one script file per
//! event in a caller-owned hooks directory. The directory is append-only:
//! running generation twice appends twice, so callers clear it first when
//! they want a fresh set (see [`clean`]).

mod script;
mod set;
mod template;

pub use script::{append_script, SHEBANG};
pub use set::{HookEntry, HookSet};
pub use template::{Renderer, Template};

use impack_errors::{Error, HookError};
use impack_events::{AppEvent, EventEmitter, EventSender, HookEvent};
use impack_types::{Component, HookFileReport, HookReport, LifecycleEvent};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Serialize)]
struct GroupContext<'a> {
    event: &'a str,
    entries: &'a [HookEntry],
}

#[derive(Serialize)]
struct ComponentsContext {
    components: Vec<ComponentContext>,
}

#[derive(Serialize)]
struct ComponentContext {
    name: String,
    relative_path: String,
    pack_path: PathBuf,
    /// Whether a package descriptor was found
    package: bool,
    /// Service descriptor path on the installed system
    service: Option<PathBuf>,
}

impl ComponentContext {
    fn from_component(component: &Component) -> Option<Self> {
        let pack_path = component.pack_path()?.to_path_buf();
        let service = component
            .service
            .as_deref()
            .and_then(Path::file_name)
            .map(|file| pack_path.join(file));
        Some(Self {
            name: component.name.clone(),
            relative_path: component.relative_path.clone(),
            package: component.package.is_some(),
            service,
            pack_path,
        })
    }
}

/// Tracks what a generation pass appended to each file
struct HookWriter<'a> {
    dir: &'a Path,
    files: BTreeMap<LifecycleEvent, HookFileReport>,
}

impl<'a> HookWriter<'a> {
    fn new(dir: &'a Path) -> Self {
        Self {
            dir,
            files: BTreeMap::new(),
        }
    }

    async fn append(
        &mut self,
        event: LifecycleEvent,
        content: &str,
        entries: usize,
        block: Option<&str>,
    ) -> Result<(), Error> {
        let path = self.dir.join(event.as_str());
        append_script(&path, content).await?;

        let report = self.files.entry(event).or_insert_with(|| HookFileReport {
            event,
            path,
            entries: 0,
            blocks: Vec::new(),
        });
        report.entries += entries;
        if let Some(block) = block {
            report.blocks.push(block.to_string());
        }
        Ok(())
    }

    fn finish(self) -> HookReport {
        HookReport {
            files: self.files.into_values().collect(),
        }
    }
}

/// Generate hook files for a resolved component list
///
/// Order of appends: the rebuild block (if requested) to `after-install`,
/// then each non-empty event group, then, when at least one component
/// carries a service descriptor, the startup block to `after-install` and
/// the teardown block to `before-remove`. Declarations are validated before
/// anything is written.
///
/// # Errors
///
/// Returns a `HookError` for invalid declarations, template failures or
/// write failures.
pub async fn generate(
    components: &[Component],
    hooks_dir: &Path,
    rebuild: bool,
    tx: &EventSender,
) -> Result<HookReport, Error> {
    let set = HookSet::collect(components)?;
    let renderer = Renderer::new()?;
    let context = ComponentsContext {
        components: components
            .iter()
            .filter_map(ComponentContext::from_component)
            .collect(),
    };

    fs::create_dir_all(hooks_dir)
        .await
        .map_err(|e| HookError::WriteFailed {
            path: hooks_dir.display().to_string(),
            message: e.to_string(),
        })?;

    let mut writer = HookWriter::new(hooks_dir);

    if rebuild {
        let content = renderer.render(Template::Rebuild, &context)?;
        writer
            .append(LifecycleEvent::AfterInstall, &content, 0, Some(Template::Rebuild.name()))
            .await?;
    }

    for (event, entries) in set.groups() {
        let content = renderer.render(
            Template::Hook,
            &GroupContext {
                event: event.as_str(),
                entries,
            },
        )?;
        writer.append(event, &content, entries.len(), None).await?;
    }

    if context.components.iter().any(|c| c.service.is_some()) {
        let startup = renderer.render(Template::Startup, &context)?;
        writer
            .append(LifecycleEvent::AfterInstall, &startup, 0, Some(Template::Startup.name()))
            .await?;

        let teardown = renderer.render(Template::Teardown, &context)?;
        writer
            .append(LifecycleEvent::BeforeRemove, &teardown, 0, Some(Template::Teardown.name()))
            .await?;
    }

    let report = writer.finish();
    for file in &report.files {
        tx.emit(AppEvent::Hooks(HookEvent::Written {
            event: file.event,
            path: file.path.clone(),
            entries: file.entries,
        }));
    }

    tracing::debug!(
        files = report.files.len(),
        entries = set.len(),
        "hook generation finished"
    );

    Ok(report)
}

/// Remove a hooks directory so the next generation starts fresh
///
/// A missing directory is not an error.
///
/// # Errors
///
/// Returns `HookError::WriteFailed` if the directory cannot be removed.
pub async fn clean(hooks_dir: &Path, tx: &EventSender) -> Result<(), Error> {
    match fs::remove_dir_all(hooks_dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(HookError::WriteFailed {
                path: hooks_dir.display().to_string(),
                message: e.to_string(),
            }
            .into())
        }
    }

    tx.emit(AppEvent::Hooks(HookEvent::Cleaned {
        path: hooks_dir.to_path_buf(),
    }));
    Ok(())
}
