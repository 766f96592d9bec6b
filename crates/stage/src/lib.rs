#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Stage materialization for impack
//!
//! Gives every component its own staging directory and fills it: archives
//! are downloaded and unpacked, repositories are cloned, components without
//! a locator just get an empty directory. Directories that already hold
//! content are left alone, so re-running a collection only retries what is
//! missing.

mod archive;
mod fs;
mod materializer;
mod transfer;

pub use archive::{detect_format, extract, ArchiveFormat};
pub use materializer::Materializer;
pub use transfer::{Fetcher, Transfer};
