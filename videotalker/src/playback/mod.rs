//! Playback module
//!
//! Turns playhead time into rendered markers: the active-interval index
//! finds the annotations that contain the current time and the reconciler
//! brings a render target in line with that set.

pub mod index;
pub mod reconciler;
pub mod render;

pub use index::{ActiveIntervalIndex, IndexStrategy, StrategyPolicy};
pub use reconciler::{MarkerReconciler, ReconcileReport};
pub use render::{ContentLayout, LogRenderTarget, MarkerView, RenderTarget};
