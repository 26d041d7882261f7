//! Annotations module
//!
//! This module provides the annotation data model and the in-memory store
//! that owns the annotations of the currently open video.

pub mod models;
pub mod store;

pub use models::*;
pub use store::{AnnotationStore, LoadTicket, LoadedSidecar};
