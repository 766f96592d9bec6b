#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for impack
//!
//! This crate provides the data model shared by every stage of a pack run:
//! the component tree and its flattened records, package descriptors read
//! from staged components, lifecycle events and operation reports.

pub mod component;
pub mod lifecycle;
pub mod package;
pub mod reports;

// Re-export commonly used types
pub use component::{Component, ComponentNode};
pub use lifecycle::LifecycleEvent;
pub use package::{PackageDescriptor, PACKAGE_DESCRIPTOR, SERVICE_DESCRIPTORS};
pub use reports::{
    CollectReport, HookFileReport, HookReport, PackReport, StageOutcome, StagedComponent,
};

use serde::{Deserialize, Serialize};

/// How a component's content is acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMethod {
    /// Download and unpack an archive
    Archive,
    /// Clone a version-control repository
    Clone,
}

impl std::fmt::Display for TransferMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Archive => write!(f, "archive"),
            Self::Clone => write!(f, "clone"),
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Always,
    #[default]
    Auto,
    Never,
}

// Implement clap::ValueEnum for ColorChoice
impl clap::ValueEnum for ColorChoice {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Always, Self::Auto, Self::Never]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Always => clap::builder::PossibleValue::new("always"),
            Self::Auto => clap::builder::PossibleValue::new("auto"),
            Self::Never => clap::builder::PossibleValue::new("never"),
        })
    }
}
