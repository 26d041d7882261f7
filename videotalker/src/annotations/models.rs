//! Annotation models
//!
//! Rust structs representing annotations as they live in memory and in the
//! sidecar file. Field names serialize verbatim in camelCase so files
//! written by older builds load unchanged.

use crate::config::{
    DEFAULT_MARKER_HEIGHT, DEFAULT_MARKER_WIDTH, DEFAULT_MARKER_X, DEFAULT_MARKER_Y,
    FRAME_EXTENT, MIN_MARKER_SIZE,
};
use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ===== Identity =====

/// Opaque, immutable annotation identifier
///
/// New ids are UUID v4 strings. Ids read from older files (millisecond
/// timestamps, sometimes stored as JSON numbers) are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AnnotationId(String);

impl AnnotationId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AnnotationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for AnnotationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for AnnotationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(Self(s)),
            Value::Number(n) => Ok(Self(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "invalid annotation id: {}",
                other
            ))),
        }
    }
}

// ===== Color =====

/// Annotation color palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Orange,
    Yellow,
    Green,
    #[default]
    Blue,
    Purple,
}

impl Color {
    pub const ALL: [Color; 6] = [
        Color::Red,
        Color::Orange,
        Color::Yellow,
        Color::Green,
        Color::Blue,
        Color::Purple,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Orange => "orange",
            Color::Yellow => "yellow",
            Color::Green => "green",
            Color::Blue => "blue",
            Color::Purple => "purple",
        }
    }

    /// Primary display color as a CSS hex string
    pub fn primary_hex(self) -> &'static str {
        match self {
            Color::Red => "#dc3545",
            Color::Orange => "#fd7e14",
            Color::Yellow => "#ffc107",
            Color::Green => "#28a745",
            Color::Blue => "#007bff",
            Color::Purple => "#6f42c1",
        }
    }

    /// Foreground text color readable on top of the primary color
    pub fn text_hex(self) -> &'static str {
        match self {
            Color::Yellow => "#000",
            _ => "white",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Color {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Color::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| AppError::Generic(format!("Unknown color: {}", s)))
    }
}

impl<'de> Deserialize<'de> for Color {
    /// Unknown, legacy or missing colors fall back to the default
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value
            .as_str()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default())
    }
}

// ===== Level =====

/// Display-priority / outline-depth tier
///
/// `High` is the shallowest outline tier. An unset level is represented as
/// `None` and ranks below `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    High = 1,
    Medium = 2,
    Low = 3,
}

/// Tier number used for an unset level in layout and outline computations
pub const UNSET_LEVEL_TIER: u8 = 4;

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::High => "1",
            Level::Medium => "2",
            Level::Low => "3",
        }
    }

    pub fn tier(self) -> u8 {
        self as u8
    }
}

/// Tier of an optional level; unset maps to [`UNSET_LEVEL_TIER`]
pub fn level_tier(level: Option<Level>) -> u8 {
    level.map(Level::tier).unwrap_or(UNSET_LEVEL_TIER)
}

/// Normalize a raw level value
///
/// `None`, `""`, `"default"` and anything outside 1..=3 become the canonical
/// unset value.
pub fn normalize_level(raw: Option<&str>) -> Option<Level> {
    match raw.map(str::trim) {
        Some("1") => Some(Level::High),
        Some("2") => Some(Level::Medium),
        Some("3") => Some(Level::Low),
        _ => None,
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serde adapter: levels are stored as strings ("1".."3") or null and read
/// leniently from strings or numbers.
mod level_field {
    use super::{normalize_level, Level};
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S>(level: &Option<Level>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match level {
            Some(level) => serializer.serialize_str(level.as_str()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Level>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => normalize_level(Some(&s)),
            // 2.0 reads as "2", like an integer
            Value::Number(n) => match n.as_f64() {
                Some(f) if f.fract() == 0.0 => normalize_level(Some(&(f as i64).to_string())),
                _ => normalize_level(Some(&n.to_string())),
            },
            _ => None,
        })
    }
}

fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ===== Marker =====

/// Where the marker's text block sits horizontally relative to the rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HorizontalPlacement {
    LeftOutside,
    #[default]
    Inside,
    RightOutside,
}

/// Where the marker's text block sits vertically relative to the rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerticalPlacement {
    TopOutside,
    #[default]
    Inside,
    BottomOutside,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerticalAlign {
    #[default]
    FlexStart,
    Center,
    FlexEnd,
}

/// Text layout of a marker relative to its rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPosition {
    pub horizontal_position: HorizontalPlacement,
    #[serde(default)]
    pub vertical_position: VerticalPlacement,
    #[serde(default)]
    pub text_align: TextAlign,
    #[serde(default)]
    pub vertical_align: VerticalAlign,
}

/// Older files stored `{ horizontal, vertical }`; that shape falls back to
/// the default layout. In the current shape each field falls back on its
/// own, so one unknown value does not reset the others.
fn content_position_lenient<'de, D>(deserializer: D) -> Result<ContentPosition, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let obj = match value.as_object() {
        Some(obj) if obj.contains_key("horizontalPosition") && !obj.contains_key("horizontal") => {
            obj
        }
        _ => return Ok(ContentPosition::default()),
    };

    Ok(ContentPosition {
        horizontal_position: field_or_default(obj, "horizontalPosition"),
        vertical_position: field_or_default(obj, "verticalPosition"),
        text_align: field_or_default(obj, "textAlign"),
        vertical_align: field_or_default(obj, "verticalAlign"),
    })
}

fn field_or_default<T: DeserializeOwned + Default>(obj: &Map<String, Value>, key: &str) -> T {
    obj.get(key)
        .and_then(|value| T::deserialize(value).ok())
        .unwrap_or_default()
}

/// On-screen rectangle attached to an annotation, in percent of frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, deserialize_with = "content_position_lenient")]
    pub content_position: ContentPosition,
    /// Fields this build does not model, preserved across load/save
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Marker {
    fn default() -> Self {
        Self {
            x: DEFAULT_MARKER_X,
            y: DEFAULT_MARKER_Y,
            width: DEFAULT_MARKER_WIDTH,
            height: DEFAULT_MARKER_HEIGHT,
            content_position: ContentPosition::default(),
            extra: Map::new(),
        }
    }
}

impl Marker {
    /// Create a marker, enforcing the minimum size and keeping it in frame
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Marker::default().resized(x, y, width, height)
    }

    pub fn with_content_position(mut self, content_position: ContentPosition) -> Self {
        self.content_position = content_position;
        self
    }

    /// Move the rectangle, clamping so it stays fully inside the frame
    pub fn moved_to(&self, x: f64, y: f64) -> Self {
        Self {
            x: clamp_offset(x, self.width),
            y: clamp_offset(y, self.height),
            ..self.clone()
        }
    }

    /// Resize the rectangle
    ///
    /// Width and height are raised to the minimum size first, then the
    /// position is clamped against the new size.
    pub fn resized(&self, x: f64, y: f64, width: f64, height: f64) -> Self {
        let width = finite_or(width, MIN_MARKER_SIZE).clamp(MIN_MARKER_SIZE, FRAME_EXTENT);
        let height = finite_or(height, MIN_MARKER_SIZE).clamp(MIN_MARKER_SIZE, FRAME_EXTENT);

        Self {
            x: clamp_offset(x, width),
            y: clamp_offset(y, height),
            width,
            height,
            ..self.clone()
        }
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn clamp_offset(offset: f64, extent: f64) -> f64 {
    finite_or(offset, 0.0).clamp(0.0, (FRAME_EXTENT - extent).max(0.0))
}

// ===== Annotation =====

/// A timestamped note on a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: AnnotationId,
    /// Anchor time in seconds, rounded to hundredths
    pub time: f64,
    #[serde(default, deserialize_with = "string_or_null")]
    pub title: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub text: String,
    #[serde(default)]
    pub color: Color,
    #[serde(default, with = "level_field")]
    pub level: Option<Level>,
    /// Span in seconds; `None` makes the annotation a point
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    /// Fields this build does not model, preserved across load/save
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Annotation {
    /// Whether both title and text are empty
    pub fn is_blank(&self) -> bool {
        self.title.is_empty() && self.text.is_empty()
    }

    /// Positive duration, if any
    pub fn span(&self) -> Option<f64> {
        self.duration.filter(|d| d.is_finite() && *d > 0.0)
    }

    pub fn end_time(&self) -> Option<f64> {
        self.span().map(|d| self.time + d)
    }

    /// Closed `[time, time + duration]` interval for annotations that carry
    /// a marker and a positive duration
    pub fn interval(&self) -> Option<(f64, f64)> {
        if self.marker.is_none() || !self.time.is_finite() {
            return None;
        }
        self.end_time().map(|end| (self.time, end))
    }

    pub fn is_interval(&self) -> bool {
        self.interval().is_some()
    }
}

/// Round seconds to two decimal places
pub fn round_to_hundredths(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}

/// Normalize an anchor time: non-finite becomes 0, negatives clamp to 0
pub fn normalize_time(seconds: f64) -> f64 {
    if !seconds.is_finite() {
        return 0.0;
    }
    round_to_hundredths(seconds.max(0.0))
}

/// Normalize a duration: anything that does not round to a positive,
/// finite span becomes a point annotation
pub fn normalize_duration(duration: Option<f64>) -> Option<f64> {
    duration
        .filter(|d| d.is_finite())
        .map(round_to_hundredths)
        .filter(|d| *d > 0.0)
}

// ===== Requests =====

/// Input for creating an annotation
#[derive(Debug, Clone, Default)]
pub struct NewAnnotation {
    pub time: f64,
    pub title: String,
    pub text: String,
    pub color: Option<Color>,
    pub level: Option<Level>,
    pub duration: Option<f64>,
    pub marker: Option<Marker>,
}

impl NewAnnotation {
    pub fn at(time: f64) -> Self {
        Self {
            time,
            ..Self::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn level(mut self, level: Option<Level>) -> Self {
        self.level = level;
        self
    }

    pub fn duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }
}

/// A single field of an edit: leave it alone or replace it
///
/// For optional fields, `SetTo(None)` clears the value, which is distinct
/// from `Keep`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate<T> {
    Keep,
    SetTo(T),
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        FieldUpdate::Keep
    }
}

impl<T> FieldUpdate<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, FieldUpdate::Keep)
    }

    /// Write the new value into `slot`; returns whether anything was written
    pub fn apply_to(self, slot: &mut T) -> bool {
        match self {
            FieldUpdate::Keep => false,
            FieldUpdate::SetTo(value) => {
                *slot = value;
                true
            }
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FieldUpdate<U> {
        match self {
            FieldUpdate::Keep => FieldUpdate::Keep,
            FieldUpdate::SetTo(value) => FieldUpdate::SetTo(f(value)),
        }
    }
}

/// Changes to apply to an existing annotation
#[derive(Debug, Clone, Default)]
pub struct AnnotationEdit {
    pub title: FieldUpdate<String>,
    pub text: FieldUpdate<String>,
    /// `SetTo(None)` resets to the default color
    pub color: FieldUpdate<Option<Color>>,
    pub level: FieldUpdate<Option<Level>>,
    pub duration: FieldUpdate<Option<f64>>,
    pub marker: FieldUpdate<Option<Marker>>,
}

impl AnnotationEdit {
    /// Edit that replaces title and text and keeps everything else
    pub fn content(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: FieldUpdate::SetTo(title.into()),
            text: FieldUpdate::SetTo(text.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_to_hundredths() {
        assert_eq!(round_to_hundredths(30.456), 30.46);
        assert_eq!(round_to_hundredths(4.321), 4.32);
        assert_eq!(round_to_hundredths(10.0), 10.0);
    }

    #[test]
    fn test_normalize_duration() {
        assert_eq!(normalize_duration(Some(4.321)), Some(4.32));
        assert_eq!(normalize_duration(Some(0.0)), None);
        assert_eq!(normalize_duration(Some(0.001)), None);
        assert_eq!(normalize_duration(Some(-2.0)), None);
        assert_eq!(normalize_duration(Some(f64::NAN)), None);
        assert_eq!(normalize_duration(None), None);
    }

    #[test]
    fn test_normalize_time_clamps() {
        assert_eq!(normalize_time(-3.0), 0.0);
        assert_eq!(normalize_time(f64::INFINITY), 0.0);
        assert_eq!(normalize_time(1.005_1), 1.01);
    }

    #[test]
    fn test_normalize_level_idempotent() {
        let inputs = [None, Some(""), Some("default"), Some("1"), Some("2"), Some("3")];

        for input in inputs {
            let once = normalize_level(input);
            let twice = normalize_level(once.map(Level::as_str));
            assert_eq!(once, twice, "input {:?}", input);
        }

        assert_eq!(normalize_level(None), None);
        assert_eq!(normalize_level(Some("")), None);
        assert_eq!(normalize_level(Some("default")), None);
        assert_eq!(normalize_level(Some("2")), Some(Level::Medium));
    }

    #[test]
    fn test_level_tiers() {
        assert_eq!(level_tier(Some(Level::High)), 1);
        assert_eq!(level_tier(Some(Level::Low)), 3);
        assert_eq!(level_tier(None), UNSET_LEVEL_TIER);
    }

    #[test]
    fn test_lenient_annotation_decoding() {
        let value = json!({
            "id": 1700000000000u64,
            "time": 12.5,
            "title": null,
            "text": "hello",
            "color": "magenta",
            "level": 2,
            "duration": null,
            "createdAt": "2024-01-01T00:00:00.000Z"
        });

        let annotation: Annotation = serde_json::from_value(value).unwrap();

        assert_eq!(annotation.id.as_str(), "1700000000000");
        assert_eq!(annotation.title, "");
        assert_eq!(annotation.color, Color::Blue);
        assert_eq!(annotation.level, Some(Level::Medium));
        assert_eq!(annotation.duration, None);
        assert!(annotation.created_at.is_some());
        assert!(annotation.marker.is_none());
    }

    #[test]
    fn test_level_default_string_normalizes_to_null() {
        let value = json!({ "id": "a", "time": 1.0, "level": "default" });
        let annotation: Annotation = serde_json::from_value(value).unwrap();
        assert_eq!(annotation.level, None);

        let written = serde_json::to_value(&annotation).unwrap();
        assert_eq!(written["level"], Value::Null);
    }

    #[test]
    fn test_legacy_content_position_uses_default() {
        let value = json!({
            "x": 10.0, "y": 10.0, "width": 5.0, "height": 5.0,
            "contentPosition": { "horizontal": "left", "vertical": "top" }
        });
        let marker: Marker = serde_json::from_value(value).unwrap();
        assert_eq!(marker.content_position, ContentPosition::default());

        let value = json!({
            "x": 10.0, "y": 10.0, "width": 5.0, "height": 5.0,
            "contentPosition": {
                "horizontalPosition": "right-outside",
                "verticalPosition": "bottom-outside",
                "textAlign": "center",
                "verticalAlign": "flex-end"
            }
        });
        let marker: Marker = serde_json::from_value(value).unwrap();
        assert_eq!(
            marker.content_position.horizontal_position,
            HorizontalPlacement::RightOutside
        );
        assert_eq!(marker.content_position.vertical_align, VerticalAlign::FlexEnd);
    }

    #[test]
    fn test_content_position_falls_back_per_field() {
        let value = json!({
            "x": 10.0, "y": 10.0, "width": 5.0, "height": 5.0,
            "contentPosition": {
                "horizontalPosition": "left-outside",
                "verticalPosition": "top-outside",
                "textAlign": "justify",
                "verticalAlign": 3
            }
        });
        let marker: Marker = serde_json::from_value(value).unwrap();

        assert_eq!(
            marker.content_position,
            ContentPosition {
                horizontal_position: HorizontalPlacement::LeftOutside,
                vertical_position: VerticalPlacement::TopOutside,
                text_align: TextAlign::Left,
                vertical_align: VerticalAlign::FlexStart,
            }
        );

        let written = serde_json::to_value(&marker).unwrap();
        assert_eq!(written["contentPosition"]["horizontalPosition"], json!("left-outside"));
        assert_eq!(written["contentPosition"]["verticalPosition"], json!("top-outside"));
    }

    #[test]
    fn test_float_level_reads_as_integer() {
        for (raw, expected) in [
            (json!(2.0), Some(Level::Medium)),
            (json!(1), Some(Level::High)),
            (json!(2.5), None),
            (json!(4.0), None),
        ] {
            let value = json!({ "id": "a", "time": 1.0, "level": raw });
            let annotation: Annotation = serde_json::from_value(value).unwrap();
            assert_eq!(annotation.level, expected, "level {}", raw);
        }
    }

    #[test]
    fn test_unknown_fields_preserved() {
        let value = json!({
            "id": "a",
            "time": 1.0,
            "pinned": true,
            "marker": { "id": "m1", "x": 1.0, "y": 2.0, "width": 3.0, "height": 4.0 }
        });
        let annotation: Annotation = serde_json::from_value(value).unwrap();
        assert_eq!(annotation.extra.get("pinned"), Some(&json!(true)));

        let written = serde_json::to_value(&annotation).unwrap();
        assert_eq!(written["pinned"], json!(true));
        assert_eq!(written["marker"]["id"], json!("m1"));
        assert_eq!(written["marker"]["contentPosition"]["horizontalPosition"], json!("inside"));
    }

    #[test]
    fn test_interval_eligibility() {
        let mut annotation: Annotation =
            serde_json::from_value(json!({ "id": "a", "time": 10.0, "duration": 5.0 })).unwrap();
        assert_eq!(annotation.interval(), None);

        annotation.marker = Some(Marker::default());
        assert_eq!(annotation.interval(), Some((10.0, 15.0)));

        annotation.duration = Some(0.0);
        assert_eq!(annotation.interval(), None);

        annotation.duration = Some(-1.0);
        assert!(!annotation.is_interval());
    }

    #[test]
    fn test_marker_move_clamps_to_frame() {
        let marker = Marker::new(10.0, 10.0, 20.0, 30.0);

        let moved = marker.moved_to(95.0, -5.0);
        assert_eq!(moved.x, 80.0);
        assert_eq!(moved.y, 0.0);
        assert_eq!(moved.width, 20.0);
    }

    #[test]
    fn test_marker_resize_enforces_minimum() {
        let marker = Marker::default().resized(99.5, 50.0, 0.2, 500.0);

        assert_eq!(marker.width, MIN_MARKER_SIZE);
        assert_eq!(marker.height, FRAME_EXTENT);
        assert_eq!(marker.x, 99.0);
        assert_eq!(marker.y, 0.0);
    }

    #[test]
    fn test_color_parse() {
        assert_eq!("Purple".parse::<Color>().unwrap(), Color::Purple);
        assert!("teal".parse::<Color>().is_err());
        assert_eq!(Color::Yellow.text_hex(), "#000");
    }

    #[test]
    fn test_field_update_apply() {
        let mut level = Some(Level::High);

        assert!(!FieldUpdate::Keep.apply_to(&mut level));
        assert_eq!(level, Some(Level::High));

        assert!(FieldUpdate::SetTo(None).apply_to(&mut level));
        assert_eq!(level, None);
    }
}
