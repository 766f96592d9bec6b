use impack_errors::{ConfigError, Error};
use impack_types::{Component, PackageDescriptor, PACKAGE_DESCRIPTOR, SERVICE_DESCRIPTORS};
use std::path::Path;
use tokio::fs;

/// Resolve components against the staging and install roots
///
/// Assigns paths (once), marks which components are staged, and for staged
/// ones loads the package descriptor (adopting its `name`) and locates the
/// service descriptor. Safe to call repeatedly as staging progresses.
///
/// # Errors
///
/// Returns an error if a staged `package.json` cannot be parsed.
pub async fn resolve(
    components: &mut [Component],
    stage_root: &Path,
    pack_root: &Path,
) -> Result<(), Error> {
    for component in components.iter_mut() {
        component.assign_paths(stage_root, pack_root);
        let Some(stage_path) = component.stage_path().map(Path::to_path_buf) else {
            continue;
        };

        component.staged = fs::try_exists(&stage_path).await.unwrap_or(false);
        if !component.staged {
            component.package = None;
            component.service = None;
            continue;
        }

        let descriptor = stage_path.join(PACKAGE_DESCRIPTOR);
        component.package = match fs::read_to_string(&descriptor).await {
            Ok(raw) => Some(
                serde_json::from_str::<PackageDescriptor>(&raw).map_err(|e| {
                    ConfigError::ParseError {
                        path: descriptor.display().to_string(),
                        message: e.to_string(),
                    }
                })?,
            ),
            Err(_) => None,
        };
        if let Some(name) = component.package.as_ref().and_then(|p| p.name.clone()) {
            component.name = name;
        }

        component.service = None;
        for candidate in SERVICE_DESCRIPTORS {
            let path = stage_path.join(candidate);
            if fs::try_exists(&path).await.unwrap_or(false) {
                component.service = Some(path);
                break;
            }
        }

        tracing::trace!(
            component = %component.relative_path,
            package = component.package.is_some(),
            service = component.service.is_some(),
            "resolved staged component"
        );
    }
    Ok(())
}
