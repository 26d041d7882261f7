//! Annotation commands
//!
//! List, create, edit and delete the annotations of one video.

use super::{open_session, parse_color, parse_level, parse_marker};
use crate::annotations::{
    Annotation, AnnotationEdit, AnnotationId, Color, FieldUpdate, Level, Marker, NewAnnotation,
};
use crate::error::{AppError, Result};
use crate::services::outline::{time_label, OutlineEntry};
use crate::services::PlayerSettings;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Video file path
    pub video: PathBuf,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Video file path
    pub video: PathBuf,

    /// Anchor time in seconds
    #[arg(long)]
    pub time: f64,

    #[arg(long, default_value = "")]
    pub title: String,

    #[arg(long, default_value = "")]
    pub text: String,

    /// red, orange, yellow, green, blue or purple
    #[arg(long, value_parser = parse_color)]
    pub color: Option<Color>,

    /// 1 (high), 2 (medium) or 3 (low)
    #[arg(long, value_parser = parse_level)]
    pub level: Option<Level>,

    /// Span in seconds
    #[arg(long)]
    pub duration: Option<f64>,

    /// On-screen rectangle as x,y,width,height in percent
    #[arg(long, value_parser = parse_marker)]
    pub marker: Option<Marker>,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Video file path
    pub video: PathBuf,

    /// Annotation id
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub text: Option<String>,

    #[arg(long, value_parser = parse_color)]
    pub color: Option<Color>,

    #[arg(long, value_parser = parse_level, conflicts_with = "clear_level")]
    pub level: Option<Level>,

    /// Remove the level
    #[arg(long)]
    pub clear_level: bool,

    #[arg(long, conflicts_with = "clear_duration")]
    pub duration: Option<f64>,

    /// Turn the annotation back into a point
    #[arg(long)]
    pub clear_duration: bool,

    #[arg(long, value_parser = parse_marker, conflicts_with = "clear_marker")]
    pub marker: Option<Marker>,

    /// Detach the on-screen marker
    #[arg(long)]
    pub clear_marker: bool,
}

impl EditArgs {
    /// Translate flags into an edit; absent flags keep the current value
    pub fn to_edit(&self) -> AnnotationEdit {
        AnnotationEdit {
            title: optional_update(self.title.clone()),
            text: optional_update(self.text.clone()),
            color: optional_update(self.color.map(Some)),
            level: clearable_update(self.level, self.clear_level),
            duration: clearable_update(self.duration, self.clear_duration),
            marker: clearable_update(self.marker.clone(), self.clear_marker),
        }
    }
}

fn optional_update<T>(value: Option<T>) -> FieldUpdate<T> {
    match value {
        Some(value) => FieldUpdate::SetTo(value),
        None => FieldUpdate::Keep,
    }
}

fn clearable_update<T>(value: Option<T>, clear: bool) -> FieldUpdate<Option<T>> {
    if clear {
        FieldUpdate::SetTo(None)
    } else {
        optional_update(value.map(Some))
    }
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Video file path
    pub video: PathBuf,

    /// Annotation id
    pub id: String,
}

/// One line summary of an annotation
pub fn format_row(annotation: &Annotation) -> String {
    let level = annotation.level.map(|l| l.as_str()).unwrap_or("-");
    let marker = if annotation.marker.is_some() { " [marker]" } else { "" };
    let title = if annotation.is_blank() {
        "(untitled)"
    } else if annotation.title.is_empty() {
        annotation.text.as_str()
    } else {
        annotation.title.as_str()
    };

    format!(
        "{}  {:<24} {:<7} L{}{}  {}",
        annotation.id,
        time_label(annotation),
        annotation.color,
        level,
        marker,
        title
    )
}

// ===== Handlers =====

/// Print every annotation in time order
pub async fn list_annotations(args: ListArgs, settings: &PlayerSettings) -> Result<Vec<Annotation>> {
    let (session, _events) = open_session(&args.video, settings).await?;
    let annotations = session.store().all();

    if annotations.is_empty() {
        println!("No annotations for {}", args.video.display());
    }
    for annotation in &annotations {
        println!("{}", format_row(annotation));
    }

    Ok(annotations)
}

/// Create an annotation and print its id
pub async fn add_annotation(args: AddArgs, settings: &PlayerSettings) -> Result<Annotation> {
    let (mut session, _events) = open_session(&args.video, settings).await?;

    let mut new = NewAnnotation::at(args.time)
        .title(args.title)
        .text(args.text)
        .level(args.level);
    new.color = args.color;
    new.duration = args.duration;
    new.marker = args.marker;

    let created = session.add(new).ok_or(AppError::NoVideo)?;
    session.flush().await?;

    println!("{}", created.id);
    Ok(created)
}

/// Apply an edit to one annotation
pub async fn edit_annotation(args: EditArgs, settings: &PlayerSettings) -> Result<Annotation> {
    let (mut session, _events) = open_session(&args.video, settings).await?;
    let id = AnnotationId::from(args.id.as_str());

    if !session.edit(&id, args.to_edit()) {
        return Err(AppError::AnnotationNotFound(args.id));
    }
    session.flush().await?;

    let edited = session
        .store()
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::AnnotationNotFound(args.id.clone()))?;
    println!("{}", format_row(&edited));

    Ok(edited)
}

/// Delete one annotation
pub async fn delete_annotation(args: DeleteArgs, settings: &PlayerSettings) -> Result<()> {
    let (mut session, _events) = open_session(&args.video, settings).await?;
    let id = AnnotationId::from(args.id.as_str());

    if !session.delete(&id) {
        return Err(AppError::AnnotationNotFound(args.id));
    }
    session.flush().await?;

    println!("Deleted {}", id);
    Ok(())
}

/// Print the derived outline, indented by depth
pub async fn print_outline(args: ListArgs, settings: &PlayerSettings) -> Result<Vec<OutlineEntry>> {
    let (session, _events) = open_session(&args.video, settings).await?;
    let outline = session.outline();

    for entry in &outline {
        if let Some(annotation) = session.store().get(&entry.id) {
            println!("{}{}", "  ".repeat(entry.depth), format_row(annotation));
        }
    }

    Ok(outline)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit_args() -> EditArgs {
        EditArgs {
            video: PathBuf::from("v.mp4"),
            id: "a".to_string(),
            title: None,
            text: None,
            color: None,
            level: None,
            clear_level: false,
            duration: None,
            clear_duration: false,
            marker: None,
            clear_marker: false,
        }
    }

    #[test]
    fn test_absent_flags_keep_fields() {
        let edit = edit_args().to_edit();

        assert!(edit.title.is_keep());
        assert!(edit.text.is_keep());
        assert!(edit.color.is_keep());
        assert!(edit.level.is_keep());
        assert!(edit.duration.is_keep());
        assert!(edit.marker.is_keep());
    }

    #[test]
    fn test_set_and_clear_flags() {
        let args = EditArgs {
            title: Some("New".to_string()),
            level: Some(Level::Low),
            clear_duration: true,
            clear_marker: true,
            ..edit_args()
        };

        let edit = args.to_edit();

        assert_eq!(edit.title, FieldUpdate::SetTo("New".to_string()));
        assert_eq!(edit.level, FieldUpdate::SetTo(Some(Level::Low)));
        assert_eq!(edit.duration, FieldUpdate::SetTo(None));
        assert_eq!(edit.marker, FieldUpdate::SetTo(None));
    }

    #[test]
    fn test_format_row() {
        let annotation: Annotation = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "time": 10.0,
            "duration": 5.0,
            "title": "Intro",
            "color": "red",
            "level": "1"
        }))
        .unwrap();

        let row = format_row(&annotation);
        assert!(row.starts_with("abc"));
        assert!(row.contains("00:10 ~ 00:15 (00:05)"));
        assert!(row.contains("red"));
        assert!(row.contains("L1"));
        assert!(row.ends_with("Intro"));
    }
}
