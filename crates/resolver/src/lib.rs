#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Component tree resolution for impack
//!
//! The manifest declares components as an arbitrarily nested mapping. This
//! crate validates that mapping into a [`ComponentNode`] tree, flattens it
//! depth-first into an ordered list of [`Component`]s addressed by their
//! `/`-joined key path, and resolves each component against the staging
//! and install roots.
//!
//! [`ComponentNode`]: impack_types::ComponentNode
//! [`Component`]: impack_types::Component

mod resolve;
mod tree;

pub use resolve::resolve;
pub use tree::{flatten, parse_tree};
