//! Playback commands
//!
//! Simulates a player: time updates are fed through the session event loop
//! at a fixed step and every marker transition is logged by the headless
//! render target.

use super::open_session;
use crate::annotations::{round_to_hundredths, Annotation};
use crate::app::SessionEvent;
use crate::config::MAX_PLAYBACK_TICKS;
use crate::error::{AppError, Result};
use crate::services::outline::format_time;
use crate::services::PlayerSettings;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct PlayArgs {
    /// Video file path
    pub video: PathBuf,

    /// Start time in seconds
    #[arg(long, default_value = "0")]
    pub from: f64,

    /// End time in seconds (defaults to the end of the last annotation)
    #[arg(long)]
    pub to: Option<f64>,

    /// Seconds between time updates (defaults to the playback setting)
    #[arg(long)]
    pub step: Option<f64>,
}

/// Counts collected over one simulated run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSummary {
    pub ticks: usize,
    pub shown: usize,
    pub hidden: usize,
    pub visible_at_end: usize,
}

/// Latest point any annotation reaches
fn playback_end(annotations: &[Annotation]) -> f64 {
    annotations
        .iter()
        .map(|a| a.end_time().unwrap_or(a.time))
        .fold(0.0, f64::max)
}

/// Playhead positions from `from` to `to` inclusive
///
/// Fails for a non-finite end or a run longer than [`MAX_PLAYBACK_TICKS`].
fn tick_times(from: f64, to: f64, step: f64) -> Result<Vec<f64>> {
    if !to.is_finite() {
        return Err(AppError::Generic(format!(
            "End time must be a finite number of seconds, got {}",
            to
        )));
    }
    if to <= from {
        return Ok(vec![from]);
    }

    // Epsilon keeps an exact multiple of `step` from losing its last tick
    let steps = ((to - from) / step + 1e-9).floor();
    if steps >= MAX_PLAYBACK_TICKS as f64 {
        return Err(AppError::Generic(format!(
            "Playing {} to {} in steps of {} needs more than {} ticks",
            from, to, step, MAX_PLAYBACK_TICKS
        )));
    }

    Ok((0..=steps as usize)
        .map(|i| round_to_hundredths(from + i as f64 * step))
        .collect())
}

/// Play the video's annotations and report marker transitions
pub async fn play(args: PlayArgs, settings: &PlayerSettings) -> Result<PlaybackSummary> {
    let step = args.step.unwrap_or(settings.playback.tick_secs);
    if !step.is_finite() || step <= 0.0 {
        return Err(AppError::Generic(format!(
            "Step must be a positive number of seconds, got {}",
            step
        )));
    }

    let (mut session, mut events) = open_session(&args.video, settings).await?;

    let from = if args.from.is_finite() { args.from.max(0.0) } else { 0.0 };
    let to = args
        .to
        .unwrap_or_else(|| playback_end(session.annotations()));
    let times = tick_times(from, to, step)?;

    tracing::info!(
        "Playing {} from {} to {} in {} ticks",
        args.video.display(),
        format_time(from),
        format_time(to),
        times.len()
    );

    let sender = session.events();
    let closed = |_| AppError::Generic("Session event channel closed".to_string());

    if to > 0.0 {
        sender.send(SessionEvent::DurationChanged(to)).map_err(closed)?;
    }
    for time in &times {
        sender.send(SessionEvent::TimeUpdate(*time)).map_err(closed)?;
    }
    sender.send(SessionEvent::Shutdown).map_err(closed)?;

    session.run(&mut events).await?;

    let target = session.target();
    let summary = PlaybackSummary {
        ticks: times.len(),
        shown: target.shown,
        hidden: target.hidden,
        visible_at_end: session.reconciler().rendered_count(),
    };

    println!(
        "{} ticks: {} markers shown, {} hidden, {} visible at {}",
        summary.ticks,
        summary.shown,
        summary.hidden,
        summary.visible_at_end,
        format_time(times.last().copied().unwrap_or(from))
    );

    Ok(summary)
}
