#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! High-level operations for impack
//!
//! This crate is the orchestration layer between the CLI and the
//! specialized crates: it opens a manifest into a [`Packer`], drives
//! collection, hook generation, npm and the packager, and reports results
//! as plain data.

mod args;
mod command;
mod options;
mod packer;

pub use args::{argumentize, OptionValue, Options};
pub use command::{run_command, CommandOutput, CommandSpec};
pub use options::{CollectOptions, HookOptions, NpmOptions, PackOptions};
pub use packer::{Packer, PackerBuilder};

use impack_errors::Error;
use impack_types::{CollectReport, Component, HookReport, PackReport};
use serde::Serialize;

/// Operation result that can be serialized for CLI output
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OperationResult {
    /// Flattened component list
    Components(Vec<Component>),
    Collect(CollectReport),
    Hooks(HookReport),
    /// Directories npm ran in
    Npm(Vec<std::path::PathBuf>),
    Pack(PackReport),
    /// Collect, npm and pack in one go
    Build {
        collect: CollectReport,
        npm: Vec<std::path::PathBuf>,
        pack: PackReport,
    },
}

impl OperationResult {
    /// Convert to JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(Error::from)
    }
}
