//! Marker rendering seam
//!
//! The reconciler drives a [`RenderTarget`] through create, update and
//! remove calls keyed by annotation id. Handles are opaque to the core.
//! [`MarkerView`] resolves an annotation into the complete visual state a
//! target needs, so adapters do not re-derive layout rules.

use crate::annotations::{
    Annotation, AnnotationId, Color, ContentPosition, HorizontalPlacement, Marker, TextAlign,
    VerticalAlign, VerticalPlacement,
};
use crate::config::BLANK_MARKER_LABEL;
use crate::services::outline::time_label;

/// Presentation collaborator for on-screen markers
pub trait RenderTarget {
    type Handle;

    /// Create a visual object for `annotation`
    fn create(&mut self, annotation: &Annotation) -> Self::Handle;

    /// Re-apply the full visual state of `annotation` to an existing object
    fn update(&mut self, handle: &mut Self::Handle, annotation: &Annotation);

    /// Destroy a visual object
    fn remove(&mut self, handle: Self::Handle);
}

/// Resolved placement of a marker's text block
///
/// The block is anchored at (`left_pct`, `top_pct`) of the rectangle and
/// then shifted by (`translate_x_pct`, `translate_y_pct`) of its own size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentLayout {
    pub left_pct: f64,
    pub top_pct: f64,
    pub translate_x_pct: f64,
    pub translate_y_pct: f64,
    pub text_align: TextAlign,
    pub vertical_align: VerticalAlign,
}

impl ContentPosition {
    pub fn layout(&self) -> ContentLayout {
        let (left_pct, translate_x_pct) = match self.horizontal_position {
            HorizontalPlacement::LeftOutside => (0.0, -100.0),
            HorizontalPlacement::Inside => (0.0, 0.0),
            HorizontalPlacement::RightOutside => (100.0, 0.0),
        };
        let (top_pct, translate_y_pct) = match self.vertical_position {
            VerticalPlacement::TopOutside => (0.0, -100.0),
            VerticalPlacement::Inside => (0.0, 0.0),
            VerticalPlacement::BottomOutside => (100.0, 0.0),
        };

        ContentLayout {
            left_pct,
            top_pct,
            translate_x_pct,
            translate_y_pct,
            text_align: self.text_align,
            vertical_align: self.vertical_align,
        }
    }
}

/// Everything needed to draw one marker
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerView {
    pub id: AnnotationId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: Color,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Shown only when both title and description are absent
    pub fallback_label: Option<&'static str>,
    pub layout: ContentLayout,
    pub time_label: String,
}

impl MarkerView {
    /// Resolve the view of an annotation; `None` if it has no marker
    pub fn from_annotation(annotation: &Annotation) -> Option<Self> {
        let marker = annotation.marker.as_ref()?;
        Some(Self::with_marker(annotation, marker))
    }

    /// Resolve the view of an annotation drawn with `marker`
    pub fn with_marker(annotation: &Annotation, marker: &Marker) -> Self {
        let title = Some(annotation.title.clone()).filter(|s| !s.is_empty());
        let description = Some(annotation.text.clone()).filter(|s| !s.is_empty());

        Self {
            id: annotation.id.clone(),
            x: marker.x,
            y: marker.y,
            width: marker.width,
            height: marker.height,
            color: annotation.color,
            fallback_label: annotation.is_blank().then_some(BLANK_MARKER_LABEL),
            title,
            description,
            layout: marker.content_position.layout(),
            time_label: time_label(annotation),
        }
    }

    /// Single-line label used by text adapters
    pub fn label(&self) -> String {
        match (&self.title, &self.description) {
            (Some(title), Some(description)) => format!("{} / {}", title, description),
            (Some(title), None) => title.clone(),
            (None, Some(description)) => description.clone(),
            (None, None) => self.fallback_label.unwrap_or_default().to_string(),
        }
    }
}

/// Headless render target that reports marker transitions through tracing
#[derive(Debug, Default)]
pub struct LogRenderTarget {
    pub shown: usize,
    pub refreshed: usize,
    pub hidden: usize,
}

impl LogRenderTarget {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderTarget for LogRenderTarget {
    type Handle = MarkerView;

    fn create(&mut self, annotation: &Annotation) -> MarkerView {
        let view = match annotation.marker.as_ref() {
            Some(marker) => MarkerView::with_marker(annotation, marker),
            None => {
                tracing::warn!("Annotation {} has no marker, using the default", annotation.id);
                MarkerView::with_marker(annotation, &Marker::default())
            }
        };

        self.shown += 1;
        tracing::info!(
            "Show marker {} [{}] at ({:.1}%, {:.1}%) {:.1}%x{:.1}% {}: {}",
            view.id,
            view.time_label,
            view.x,
            view.y,
            view.width,
            view.height,
            view.color,
            view.label()
        );

        view
    }

    fn update(&mut self, handle: &mut MarkerView, annotation: &Annotation) {
        if let Some(view) = MarkerView::from_annotation(annotation) {
            if *handle != view {
                tracing::info!("Marker {} changed: {}", view.id, view.label());
            }
            *handle = view;
        }
        self.refreshed += 1;
    }

    fn remove(&mut self, handle: MarkerView) {
        self.hidden += 1;
        tracing::info!("Hide marker {}", handle.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn annotation_with_marker(title: &str, text: &str) -> Annotation {
        let mut annotation: Annotation = serde_json::from_value(json!({
            "id": "m",
            "time": 10.0,
            "duration": 5.0,
            "title": title,
            "text": text,
            "color": "yellow"
        }))
        .unwrap();
        annotation.marker = Some(Marker::new(5.0, 6.0, 7.0, 8.0));
        annotation
    }

    #[test]
    fn test_layout_resolution() {
        let inside = ContentPosition::default().layout();
        assert_eq!((inside.left_pct, inside.translate_x_pct), (0.0, 0.0));
        assert_eq!(inside.text_align, TextAlign::Left);

        let outside = ContentPosition {
            horizontal_position: HorizontalPlacement::LeftOutside,
            vertical_position: VerticalPlacement::BottomOutside,
            text_align: TextAlign::Right,
            vertical_align: VerticalAlign::FlexEnd,
        }
        .layout();
        assert_eq!((outside.left_pct, outside.translate_x_pct), (0.0, -100.0));
        assert_eq!((outside.top_pct, outside.translate_y_pct), (100.0, 0.0));
        assert_eq!(outside.vertical_align, VerticalAlign::FlexEnd);
    }

    #[test]
    fn test_marker_view_labels() {
        let view = MarkerView::from_annotation(&annotation_with_marker("Title", "Body")).unwrap();
        assert_eq!(view.label(), "Title / Body");
        assert_eq!(view.fallback_label, None);
        assert_eq!(view.color.primary_hex(), "#ffc107");
        assert_eq!(view.time_label, "00:10 ~ 00:15 (00:05)");
        assert_eq!((view.x, view.y, view.width, view.height), (5.0, 6.0, 7.0, 8.0));

        let blank = MarkerView::from_annotation(&annotation_with_marker("", "")).unwrap();
        assert_eq!(blank.label(), BLANK_MARKER_LABEL);
    }

    #[test]
    fn test_no_marker_no_view() {
        let mut annotation = annotation_with_marker("a", "b");
        annotation.marker = None;
        assert!(MarkerView::from_annotation(&annotation).is_none());
    }

    #[test]
    fn test_log_target_defaults_missing_marker() {
        let mut annotation = annotation_with_marker("a", "");
        annotation.marker = None;

        let mut target = LogRenderTarget::new();
        let view = target.create(&annotation);
        let expected = Marker::default();

        assert_eq!(
            (view.x, view.y, view.width, view.height),
            (expected.x, expected.y, expected.width, expected.height)
        );
        assert_eq!(view.label(), "a");
        assert_eq!(target.shown, 1);
    }

    #[test]
    fn test_log_target_counts() {
        let mut target = LogRenderTarget::new();
        let annotation = annotation_with_marker("a", "");

        let mut handle = target.create(&annotation);
        target.update(&mut handle, &annotation);
        target.remove(handle);

        assert_eq!((target.shown, target.refreshed, target.hidden), (1, 1, 1));
    }
}
