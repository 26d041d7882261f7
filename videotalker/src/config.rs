//! Application configuration constants
//!
//! Central location for the constants, limits and defaults used by the
//! annotation store, the active-interval index and the marker layer.

// ===== Active-Interval Index =====

/// Number of eligible intervals at which the index switches from a linear
/// scan to the sorted-endpoint sweep.
pub const SWEEP_THRESHOLD: usize = 500;

// ===== Annotation Store =====

/// Default tolerance in seconds for "is there already an annotation here" checks
pub const FIND_TOLERANCE_SECS: f64 = 0.5;

/// Extension that replaces the video's own extension to form the sidecar path
pub const SIDECAR_EXTENSION: &str = "videotalker.json";

/// Format version written into every sidecar file
pub const SIDECAR_VERSION: &str = "1.0";

/// Label rendered for a marker whose annotation has neither title nor text
pub const BLANK_MARKER_LABEL: &str = "Marker";

// ===== Marker Geometry =====
// All marker values are percent-of-frame, top-left origin.

/// Default marker x offset when a marker is attached without geometry
pub const DEFAULT_MARKER_X: f64 = 25.0;
/// Default marker y offset when a marker is attached without geometry
pub const DEFAULT_MARKER_Y: f64 = 25.0;
/// Default marker width
pub const DEFAULT_MARKER_WIDTH: f64 = 20.0;
/// Default marker height
pub const DEFAULT_MARKER_HEIGHT: f64 = 15.0;

/// Smallest width or height a marker can be resized to
pub const MIN_MARKER_SIZE: f64 = 1.0;

/// Upper bound of the percent-of-frame coordinate space
pub const FRAME_EXTENT: f64 = 100.0;

// ===== Scrubber Layout =====

/// Minimum width in percent for a duration thumbnail on the pan track
pub const MIN_THUMBNAIL_WIDTH_PCT: f64 = 0.1;

/// Height step in percent between stacked level lanes on the scrubber
pub const LANE_HEIGHT_STEP_PCT: u32 = 100;

// ===== Playback =====

/// Default step in seconds between simulated time updates
pub const DEFAULT_TICK_SECS: f64 = 0.25;

/// Upper bound on time updates in one simulated playback run
pub const MAX_PLAYBACK_TICKS: usize = 1_000_000;
