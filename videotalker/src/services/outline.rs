//! Derived views over the sorted annotation list
//!
//! Nothing here is persisted. The outline hierarchy, the scrubber lanes and
//! the time labels are recomputed from the store's current collection, so
//! edits and deletions reshape them immediately.

use crate::annotations::{level_tier, Annotation, AnnotationId, Color};
use crate::config::{LANE_HEIGHT_STEP_PCT, MIN_THUMBNAIL_WIDTH_PCT};
use std::collections::{BTreeMap, BTreeSet};

// ===== Outline =====

/// One row of the outline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub id: AnnotationId,
    /// 0 for roots
    pub depth: usize,
    /// Nearest preceding entry with a more important level
    pub parent: Option<AnnotationId>,
    /// Level tier, 1 (high) to 4 (unset)
    pub tier: u8,
}

/// Infer the outline from list order and levels
///
/// An entry becomes the child of the closest earlier entry whose tier is
/// strictly lower (more important). Entries with equal tiers are siblings.
pub fn build_outline(annotations: &[Annotation]) -> Vec<OutlineEntry> {
    let mut stack: Vec<(u8, &AnnotationId)> = Vec::new();
    let mut entries = Vec::with_capacity(annotations.len());

    for annotation in annotations {
        let tier = level_tier(annotation.level);

        while stack.last().is_some_and(|(top, _)| *top >= tier) {
            stack.pop();
        }

        entries.push(OutlineEntry {
            id: annotation.id.clone(),
            depth: stack.len(),
            parent: stack.last().map(|(_, id)| (*id).clone()),
            tier,
        });

        stack.push((tier, &annotation.id));
    }

    entries
}

// ===== Scrubber =====

/// Lane height per tier, in percent of the base lane
///
/// Tiers present are ordered from least important (4) to most important (1)
/// and get 100, 200, ... in that order, so the most important tier is always
/// the tallest. Tiers not present are absent from the map, except that an
/// empty collection yields the full default ladder.
pub fn lane_heights(annotations: &[Annotation]) -> BTreeMap<u8, u32> {
    let present: BTreeSet<u8> = annotations.iter().map(|a| level_tier(a.level)).collect();

    if present.is_empty() {
        return (1..=4u8)
            .map(|tier| (tier, u32::from(tier) * LANE_HEIGHT_STEP_PCT))
            .collect();
    }

    present
        .iter()
        .rev()
        .zip(1u32..)
        .map(|(tier, rank)| (*tier, rank * LANE_HEIGHT_STEP_PCT))
        .collect()
}

/// Position of one annotation on the timeline scrubber
#[derive(Debug, Clone, PartialEq)]
pub struct ScrubberMark {
    pub id: AnnotationId,
    pub left_pct: f64,
    /// Present for annotations with a positive duration
    pub width_pct: Option<f64>,
    pub lane_height_pct: u32,
    pub color: Color,
}

/// Place every annotation on a scrubber for a video of `video_duration`
///
/// Returns nothing until the video duration is known and positive.
pub fn scrubber_marks(annotations: &[Annotation], video_duration: f64) -> Vec<ScrubberMark> {
    if !video_duration.is_finite() || video_duration <= 0.0 {
        return Vec::new();
    }

    let lanes = lane_heights(annotations);

    annotations
        .iter()
        .map(|annotation| {
            let tier = level_tier(annotation.level);
            ScrubberMark {
                id: annotation.id.clone(),
                left_pct: annotation.time * 100.0 / video_duration,
                width_pct: annotation
                    .span()
                    .map(|d| (d * 100.0 / video_duration).max(MIN_THUMBNAIL_WIDTH_PCT)),
                lane_height_pct: lanes
                    .get(&tier)
                    .copied()
                    .unwrap_or(LANE_HEIGHT_STEP_PCT),
                color: annotation.color,
            }
        })
        .collect()
}

// ===== Time labels =====

/// `MM:SS`, or `HH:MM:SS` from one hour up
///
/// Negative and non-finite input renders as `00:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00".to_string();
    }

    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

/// `start ~ end (duration)` for intervals, plain start time for points
pub fn time_label(annotation: &Annotation) -> String {
    match annotation.span() {
        Some(duration) => format!(
            "{} ~ {} ({})",
            format_time(annotation.time),
            format_time(annotation.time + duration),
            format_time(duration)
        ),
        None => format_time(annotation.time),
    }
}
