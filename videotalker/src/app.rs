//! Player session and event loop
//!
//! [`PlayerSession`] is the context object that owns the annotation store,
//! the active-interval index and the marker reconciler for one player. It is
//! created by the application root and driven either directly or through
//! [`SessionEvent`]s delivered on a single channel, so mutations and
//! time-update reconciliation never interleave.

use crate::annotations::{
    Annotation, AnnotationEdit, AnnotationId, AnnotationStore, Color, FieldUpdate, LoadTicket,
    LoadedSidecar, Marker, NewAnnotation,
};
use crate::error::Result;
use crate::playback::{ActiveIntervalIndex, MarkerReconciler, ReconcileReport, RenderTarget};
use crate::services::outline::{self, OutlineEntry, ScrubberMark};
use crate::services::PlayerSettings;
use crate::storage::{FsPersistence, SaveFailure, SidecarPersistence, SidecarWriter};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

/// User-initiated annotation changes
#[derive(Debug, Clone)]
pub enum AnnotationCommand {
    Add(NewAnnotation),
    Edit { id: AnnotationId, edit: AnnotationEdit },
    Delete(AnnotationId),
    JumpTo(AnnotationId),
}

/// Everything that can happen to a session
#[derive(Debug, Clone)]
pub enum SessionEvent {
    OpenVideo(PathBuf),
    /// Video length in seconds, once the player knows it
    DurationChanged(f64),
    /// Playhead moved, by playback or by a seek
    TimeUpdate(f64),
    SidecarLoaded(LoadedSidecar),
    Command(AnnotationCommand),
    SaveFailed(SaveFailure),
    Shutdown,
}

/// One player: store, index and rendered markers
pub struct PlayerSession<T: RenderTarget, P: SidecarPersistence = FsPersistence> {
    store: AnnotationStore,
    index: ActiveIntervalIndex,
    reconciler: MarkerReconciler<T>,
    persistence: Arc<P>,
    events: mpsc::UnboundedSender<SessionEvent>,
    playhead: f64,
    video_duration: Option<f64>,
    find_tolerance: f64,
    last_save_failure: Option<SaveFailure>,
}

impl<T: RenderTarget, P: SidecarPersistence> PlayerSession<T, P> {
    /// Create a session and the receiving end of its event channel
    ///
    /// Must be called inside a tokio runtime; the sidecar writer and the
    /// failure forwarder are spawned here.
    pub fn new(
        target: T,
        persistence: Arc<P>,
        settings: &PlayerSettings,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let (writer, mut failures) = SidecarWriter::spawn(persistence.clone());

        let forward = events.clone();
        tokio::spawn(async move {
            while let Some(failure) = failures.recv().await {
                if forward.send(SessionEvent::SaveFailed(failure)).is_err() {
                    break;
                }
            }
        });

        let store =
            AnnotationStore::new(writer).with_default_color(settings.annotations.default_color);
        let index = ActiveIntervalIndex::new().with_threshold(settings.index.sweep_threshold);

        tracing::debug!(
            "Player session created (sweep threshold {}, find tolerance {}s)",
            settings.index.sweep_threshold,
            settings.annotations.find_tolerance_secs
        );

        let session = Self {
            store,
            index,
            reconciler: MarkerReconciler::new(target),
            persistence,
            events,
            playhead: 0.0,
            video_duration: None,
            find_tolerance: settings.annotations.find_tolerance_secs,
            last_save_failure: None,
        };

        (session, rx)
    }

    // ===== Accessors =====

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.store.annotations()
    }

    pub fn reconciler(&self) -> &MarkerReconciler<T> {
        &self.reconciler
    }

    pub fn target(&self) -> &T {
        self.reconciler.target()
    }

    pub fn index(&self) -> &ActiveIntervalIndex {
        &self.index
    }

    pub fn playhead(&self) -> f64 {
        self.playhead
    }

    pub fn video_duration(&self) -> Option<f64> {
        self.video_duration
    }

    pub fn last_save_failure(&self) -> Option<&SaveFailure> {
        self.last_save_failure.as_ref()
    }

    /// Sender for feeding events into [`run`](Self::run) from elsewhere
    pub fn events(&self) -> mpsc::UnboundedSender<SessionEvent> {
        self.events.clone()
    }

    // ===== Video lifecycle =====

    /// Switch videos and start loading the new sidecar in the background
    ///
    /// The load result arrives as [`SessionEvent::SidecarLoaded`].
    pub fn open_video(&mut self, path: impl Into<PathBuf>) {
        let ticket = self.reset_for(path.into());

        if let Some(ticket) = ticket {
            let persistence = self.persistence.clone();
            let events = self.events.clone();
            tokio::spawn(async move {
                let loaded = ticket.run(persistence.as_ref()).await;
                let _ = events.send(SessionEvent::SidecarLoaded(loaded));
            });
        }
    }

    /// Switch videos and wait for the sidecar load
    ///
    /// Returns false if the load was already in flight or was superseded.
    pub async fn open_video_and_load(&mut self, path: impl Into<PathBuf>) -> bool {
        let Some(ticket) = self.reset_for(path.into()) else {
            return false;
        };
        let loaded = ticket.run(self.persistence.as_ref()).await;
        self.apply_loaded(loaded)
    }

    /// Install a finished load if it is still current
    pub fn apply_loaded(&mut self, loaded: LoadedSidecar) -> bool {
        if !self.store.apply_load(loaded) {
            return false;
        }
        self.sync_markers();
        true
    }

    fn reset_for(&mut self, path: PathBuf) -> Option<LoadTicket> {
        let ticket = self.store.set_current_video(path);
        self.index.clear();
        self.reconciler.clear();
        self.playhead = 0.0;
        self.video_duration = None;
        ticket
    }

    pub fn set_video_duration(&mut self, duration: f64) {
        if duration.is_finite() && duration > 0.0 {
            self.video_duration = Some(duration);
        } else {
            tracing::warn!("Ignoring invalid video duration: {}", duration);
        }
    }

    // ===== Playback =====

    /// Move the playhead and reconcile markers
    ///
    /// Non-finite times are ignored and leave the rendered set alone.
    pub fn on_time_update(&mut self, time: f64) -> ReconcileReport {
        if !time.is_finite() {
            tracing::warn!("Ignoring non-finite time update: {}", time);
            return ReconcileReport::default();
        }
        self.playhead = time;
        self.sync_markers()
    }

    /// Seek to an annotation's anchor time; false if the id is unknown
    pub fn jump_to(&mut self, id: &AnnotationId) -> bool {
        let Some(time) = self.store.get(id).map(|a| a.time) else {
            tracing::debug!("Jump to unknown annotation {}", id);
            return false;
        };
        self.on_time_update(time);
        true
    }

    /// Reconcile rendered markers with the annotations active at the playhead
    pub fn sync_markers(&mut self) -> ReconcileReport {
        let active = self.index.active_for(&self.store, self.playhead);
        self.reconciler.reconcile(active)
    }

    /// Destroy and recreate every rendered marker
    pub fn refresh_all_markers(&mut self) -> ReconcileReport {
        let active = self.index.active_for(&self.store, self.playhead);
        self.reconciler.refresh_all(active)
    }

    // ===== Annotation commands =====

    pub fn add(&mut self, new: NewAnnotation) -> Option<Annotation> {
        let created = self.store.add(new)?;
        self.sync_markers();
        Some(created)
    }

    /// Add an annotation anchored at the current playhead
    pub fn add_at_playhead(&mut self, new: NewAnnotation) -> Option<Annotation> {
        self.add(NewAnnotation {
            time: self.playhead,
            ..new
        })
    }

    pub fn edit(&mut self, id: &AnnotationId, edit: AnnotationEdit) -> bool {
        if !self.store.edit(id, edit) {
            return false;
        }
        self.sync_markers();
        true
    }

    pub fn delete(&mut self, id: &AnnotationId) -> bool {
        if !self.store.delete(id) {
            return false;
        }
        self.sync_markers();
        true
    }

    /// Attach, replace or remove an annotation's marker
    pub fn set_marker(&mut self, id: &AnnotationId, marker: Option<Marker>) -> bool {
        self.edit(
            id,
            AnnotationEdit {
                marker: FieldUpdate::SetTo(marker),
                ..AnnotationEdit::default()
            },
        )
    }

    pub fn set_color(&mut self, id: &AnnotationId, color: Color) -> bool {
        self.edit(
            id,
            AnnotationEdit {
                color: FieldUpdate::SetTo(Some(color)),
                ..AnnotationEdit::default()
            },
        )
    }

    /// Annotation anchored within the configured tolerance of the playhead
    pub fn annotation_at_playhead(&self) -> Option<&Annotation> {
        self.store.find_at_time(self.playhead, self.find_tolerance)
    }

    // ===== Derived views =====

    pub fn outline(&self) -> Vec<OutlineEntry> {
        outline::build_outline(self.store.annotations())
    }

    pub fn lane_heights(&self) -> BTreeMap<u8, u32> {
        outline::lane_heights(self.store.annotations())
    }

    /// Scrubber placements; empty until the video duration is known
    pub fn scrubber_marks(&self) -> Vec<ScrubberMark> {
        match self.video_duration {
            Some(duration) => outline::scrubber_marks(self.store.annotations(), duration),
            None => Vec::new(),
        }
    }

    // ===== Event loop =====

    /// Apply one event; returns false once the session should stop
    pub fn handle_event(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::OpenVideo(path) => self.open_video(path),
            SessionEvent::DurationChanged(duration) => self.set_video_duration(duration),
            SessionEvent::TimeUpdate(time) => {
                self.on_time_update(time);
            }
            SessionEvent::SidecarLoaded(loaded) => {
                self.apply_loaded(loaded);
            }
            SessionEvent::Command(command) => self.handle_command(command),
            SessionEvent::SaveFailed(failure) => {
                tracing::warn!(
                    "Annotations for {:?} were not saved: {}",
                    failure.path,
                    failure.message
                );
                self.last_save_failure = Some(failure);
            }
            SessionEvent::Shutdown => return false,
        }
        true
    }

    fn handle_command(&mut self, command: AnnotationCommand) {
        let handled = match command {
            AnnotationCommand::Add(new) => self.add(new).is_some(),
            AnnotationCommand::Edit { id, edit } => self.edit(&id, edit),
            AnnotationCommand::Delete(id) => self.delete(&id),
            AnnotationCommand::JumpTo(id) => self.jump_to(&id),
        };

        if !handled {
            tracing::debug!("Annotation command had no effect");
        }
    }

    /// Process events until [`SessionEvent::Shutdown`], then flush writes
    pub async fn run(&mut self, rx: &mut mpsc::UnboundedReceiver<SessionEvent>) -> Result<()> {
        while let Some(event) = rx.recv().await {
            if !self.handle_event(event) {
                break;
            }
        }

        tracing::debug!("Session event loop finished");
        self.flush().await
    }

    /// Wait for every queued sidecar write to finish
    pub async fn flush(&self) -> Result<()> {
        self.store.writer().flush().await
    }
}
