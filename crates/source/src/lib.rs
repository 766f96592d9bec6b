#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Source address resolution
//!
//! Turns a compact locator such as `gitlab:acme/api#v2` into a
//! [`SourceDescriptor`]: which provider hosts it, whether it is fetched as an
//! archive or cloned, and the concrete URL and ref to use. Pure functions
//! only; nothing here touches the network or the filesystem.

mod descriptor;
mod provider;

pub use descriptor::{SourceDescriptor, DEFAULT_REF};
pub use provider::Provider;
