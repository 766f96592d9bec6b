//! Project manifest loading

use crate::constants::{COMPONENT_KEYS, MANIFEST_FILES};
use impack_errors::{ConfigError, Error};
use impack_types::PACKAGE_DESCRIPTOR;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;

/// A loaded `impack.json` / `impack.yaml` / `impack.yml`
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub maintainer: Option<String>,
    pub url: Option<String>,
    pub architecture: Option<String>,
    /// Raw component tree, in declaration order
    pub components: Value,
}

impl Manifest {
    /// Resolve a manifest path from a file or a project directory
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ManifestNotFound` if `target` does not exist or
    /// is a directory without any known manifest file.
    pub async fn locate(target: &Path) -> Result<PathBuf, Error> {
        let not_found = || ConfigError::ManifestNotFound {
            path: target.display().to_string(),
        };

        let metadata = fs::metadata(target).await.map_err(|_| not_found())?;
        if !metadata.is_dir() {
            return Ok(target.to_path_buf());
        }

        for name in MANIFEST_FILES {
            let candidate = target.join(name);
            if fs::try_exists(&candidate).await.unwrap_or(false) {
                return Ok(candidate);
            }
        }

        Err(not_found().into())
    }

    /// Locate and load a manifest
    ///
    /// Missing `name` / `version` are inherited from a `package.json` next to
    /// the manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be found, read or parsed, or
    /// declares no component tree.
    pub async fn load(target: &Path) -> Result<Self, Error> {
        let path = Self::locate(target).await?;
        let contents = fs::read_to_string(&path)
            .await
            .map_err(|e| Error::io_with_path(&e, &path))?;
        let document = parse_document(&path, &contents)?;

        let sibling = path
            .parent()
            .map_or_else(|| PathBuf::from(PACKAGE_DESCRIPTOR), |dir| {
                dir.join(PACKAGE_DESCRIPTOR)
            });
        let package = match fs::read_to_string(&sibling).await {
            Ok(raw) => Some(serde_json::from_str::<Value>(&raw).map_err(|e| {
                ConfigError::ParseError {
                    path: sibling.display().to_string(),
                    message: e.to_string(),
                }
            })?),
            Err(_) => None,
        };

        let manifest = Self::from_value(path, document, package.as_ref())?;
        tracing::debug!(
            path = %manifest.path.display(),
            name = manifest.name.as_deref().unwrap_or_default(),
            "loaded manifest"
        );
        Ok(manifest)
    }

    /// Build a manifest from an already parsed document
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a mapping or has no component
    /// tree under any of the accepted keys.
    pub fn from_value(
        path: impl Into<PathBuf>,
        document: Value,
        package: Option<&Value>,
    ) -> Result<Self, Error> {
        let path = path.into();
        let Value::Object(mut map) = document else {
            return Err(ConfigError::ParseError {
                path: path.display().to_string(),
                message: "manifest must be a mapping".to_string(),
            }
            .into());
        };

        let components = COMPONENT_KEYS
            .iter()
            .find_map(|key| map.remove(*key).filter(is_present))
            .ok_or_else(|| ConfigError::MissingField {
                field: "components".to_string(),
            })?;

        let inherited = package.and_then(Value::as_object);
        let inherit = |key: &str| inherited.and_then(|pkg| scalar(pkg, key));

        Ok(Self {
            name: scalar(&map, "name").or_else(|| inherit("name")),
            version: scalar(&map, "version").or_else(|| inherit("version")),
            description: scalar(&map, "description"),
            maintainer: scalar(&map, "maintainer"),
            url: scalar(&map, "url"),
            architecture: scalar(&map, "architecture"),
            components,
            path,
        })
    }

    /// Path of the manifest file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing the manifest
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

fn parse_document(path: &Path, contents: &str) -> Result<Value, Error> {
    let parse_error = |message: String| ConfigError::ParseError {
        path: path.display().to_string(),
        message,
    };

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => {
            serde_json::from_str(contents).map_err(|e| parse_error(e.to_string()).into())
        }
        Some("yaml" | "yml") => {
            serde_yml::from_str(contents).map_err(|e| parse_error(e.to_string()).into())
        }
        _ => Err(ConfigError::UnsupportedFormat {
            path: path.display().to_string(),
        }
        .into()),
    }
}

fn is_present(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

fn scalar(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_present_component_key_wins() {
        let manifest = Manifest::from_value(
            "/p/impack.json",
            json!({"name": "app", "version": "1.0.0", "comps": null, "deps": {"a": "acme/a"}, "dependencies": {"b": "acme/b"}}),
            None,
        )
        .unwrap();
        assert_eq!(manifest.components, json!({"a": "acme/a"}));
    }

    #[test]
    fn package_json_fills_missing_fields() {
        let manifest = Manifest::from_value(
            "/p/impack.yml",
            json!({"version": 2, "components": {}}),
            Some(&json!({"name": "from-pkg", "version": "9.9.9"})),
        )
        .unwrap();
        assert_eq!(manifest.name.as_deref(), Some("from-pkg"));
        assert_eq!(manifest.version.as_deref(), Some("2"));
        assert_eq!(manifest.dir(), Path::new("/p"));
    }

    #[test]
    fn missing_components_is_an_error() {
        let err = Manifest::from_value("/p/impack.json", json!({"name": "app"}), None).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingField { ref field }) if field == "components"
        ));
    }
}
