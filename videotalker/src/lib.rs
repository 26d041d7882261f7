//! VideoTalker library
//!
//! Timestamped video annotations: the annotation store and its sidecar
//! files, the active-interval index and the marker render reconciler,
//! exposed for the CLI and for testing.

pub mod annotations;
pub mod app;
pub mod commands;
pub mod config;
pub mod error;
pub mod playback;
pub mod services;
pub mod storage;
