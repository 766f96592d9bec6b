#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for impack
//!
//! Two layers live here:
//! - the project [`Manifest`] (`impack.json` / `impack.yaml` / `impack.yml`)
//! - tool [`Settings`], merged from defaults, `~/.config/impack/config.toml`,
//!   environment variables and finally CLI flags

pub mod constants;
pub mod manifest;
pub mod resources_semaphore;

pub use manifest::Manifest;

use impack_errors::{ConfigError, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Tool settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub stage: StageConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub pack: PackConfig,

    #[serde(default)]
    pub npm: NpmConfig,
}

/// Component collection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    /// Maximum concurrent transfers; 1 collects strictly in order
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// Prefer cloning over archive downloads where the provider allows it
    #[serde(default)]
    pub clone: bool,
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64, // seconds
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Packager settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackConfig {
    #[serde(default = "default_architecture")]
    pub architecture: String,
    #[serde(default = "default_packer")]
    pub packer: String,
    /// Install prefix on the target; defaults to `/opt/<name>`
    #[serde(default)]
    pub pack_home: Option<PathBuf>,
}

/// npm step settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpmConfig {
    #[serde(default = "default_npm")]
    pub command: String,
    #[serde(default = "default_true")]
    pub unsafe_perm: bool,
    #[serde(default = "default_true")]
    pub production: bool,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            clone: false,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            architecture: default_architecture(),
            packer: default_packer(),
            pack_home: None,
        }
    }
}

impl Default for NpmConfig {
    fn default() -> Self {
        Self {
            command: default_npm(),
            unsafe_perm: true,
            production: true,
        }
    }
}

// Default value functions for serde
fn default_jobs() -> usize {
    constants::DEFAULT_JOBS
}

fn default_timeout() -> u64 {
    300 // 5 minutes
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("impack/{}", env!("CARGO_PKG_VERSION"))
}

fn default_architecture() -> String {
    constants::DEFAULT_ARCHITECTURE.to_string()
}

fn default_packer() -> String {
    constants::DEFAULT_PACKER.to_string()
}

fn default_npm() -> String {
    constants::DEFAULT_NPM.to_string()
}

fn default_true() -> bool {
    true
}

impl Settings {
    /// Get the default settings file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("impack").join("config.toml"))
    }

    /// Load settings from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load settings from the default location, falling back to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load() -> Result<Self, Error> {
        let path = Self::default_path()?;

        if path.exists() {
            Self::load_from_file(&path).await
        } else {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load settings from an explicit path, or the default location
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be read or parsed.
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(path) => Self::load_from_file(path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable holds a value that cannot
    /// be parsed into the expected type.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // IMPACK_JOBS
        if let Ok(jobs) = std::env::var("IMPACK_JOBS") {
            self.stage.jobs = match jobs.parse::<usize>() {
                Ok(value) if value > 0 => value,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "IMPACK_JOBS".to_string(),
                        value: jobs,
                    }
                    .into())
                }
            };
        }

        // IMPACK_CLONE
        if let Ok(clone) = std::env::var("IMPACK_CLONE") {
            self.stage.clone = match clone.as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "IMPACK_CLONE".to_string(),
                        value: clone,
                    }
                    .into())
                }
            };
        }

        // IMPACK_ARCH
        if let Ok(arch) = std::env::var("IMPACK_ARCH") {
            if arch.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "IMPACK_ARCH".to_string(),
                    value: arch,
                }
                .into());
            }
            self.pack.architecture = arch;
        }

        // IMPACK_TIMEOUT
        if let Ok(timeout) = std::env::var("IMPACK_TIMEOUT") {
            self.network.timeout = timeout.parse().map_err(|_| ConfigError::InvalidValue {
                field: "IMPACK_TIMEOUT".to_string(),
                value: timeout,
            })?;
        }

        Ok(())
    }
}
