//! Services module
//!
//! Derived annotation views and the player settings file.

pub mod outline;
pub mod settings;

pub use outline::{
    build_outline, format_time, lane_heights, scrubber_marks, time_label, OutlineEntry,
    ScrubberMark,
};
pub use settings::{
    AnnotationSettings, IndexSettings, PlaybackSettings, PlayerSettings, SettingsService,
};
