//! Storage module
//!
//! Sidecar file format, file-system persistence and the background writer.

pub mod sidecar;
pub mod writer;

pub use sidecar::{sidecar_path_for, FsPersistence, SidecarFile, SidecarPersistence};
pub use writer::{SaveFailure, SidecarWriter};
