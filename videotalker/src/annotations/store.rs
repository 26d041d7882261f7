//! Annotation store
//!
//! Owns the annotations of the currently open video. The collection is
//! kept sorted by time (stable, so ties keep insertion order). Every
//! successful mutation re-sorts, bumps the revision and queues a full
//! snapshot to the sidecar writer; the in-memory change is complete before
//! the write is queued and is never rolled back.
//!
//! Loading is asynchronous. [`AnnotationStore::set_current_video`] hands
//! back a [`LoadTicket`]; whoever runs it passes the result to
//! [`AnnotationStore::apply_load`], which ignores results for a video that
//! is no longer current.

use super::models::*;
use crate::config::FIND_TOLERANCE_SECS;
use crate::storage::{sidecar_path_for, SidecarFile, SidecarPersistence, SidecarWriter};
use chrono::Utc;
use std::path::{Path, PathBuf};

/// An outstanding sidecar load, tagged with the video it was issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    video: PathBuf,
    sidecar: PathBuf,
    generation: u64,
}

impl LoadTicket {
    pub fn video(&self) -> &Path {
        &self.video
    }

    pub fn sidecar_path(&self) -> &Path {
        &self.sidecar
    }

    /// Read the sidecar this ticket points at
    pub async fn run<P: SidecarPersistence>(self, persistence: &P) -> LoadedSidecar {
        let file = persistence.read(&self.sidecar).await;
        LoadedSidecar { ticket: self, file }
    }
}

/// Result of running a [`LoadTicket`]
#[derive(Debug, Clone)]
pub struct LoadedSidecar {
    pub ticket: LoadTicket,
    pub file: Option<SidecarFile>,
}

/// In-memory annotation collection for one video
pub struct AnnotationStore {
    video: Option<PathBuf>,
    annotations: Vec<Annotation>,
    writer: SidecarWriter,
    default_color: Color,
    revision: u64,
    generation: u64,
    pending_load: Option<LoadTicket>,
    mutated_during_load: bool,
}

impl AnnotationStore {
    pub fn new(writer: SidecarWriter) -> Self {
        Self {
            video: None,
            annotations: Vec::new(),
            writer,
            default_color: Color::default(),
            revision: 0,
            generation: 0,
            pending_load: None,
            mutated_during_load: false,
        }
    }

    /// Color used when an annotation is created or reset without one
    pub fn with_default_color(mut self, color: Color) -> Self {
        self.default_color = color;
        self
    }

    pub fn writer(&self) -> &SidecarWriter {
        &self.writer
    }

    pub fn current_video(&self) -> Option<&Path> {
        self.video.as_deref()
    }

    /// Counter bumped on every change to the collection
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_loading(&self) -> bool {
        self.pending_load.is_some()
    }

    // ===== Video lifecycle =====

    /// Switch to a new video
    ///
    /// Discards the in-memory collection immediately and returns the load
    /// to run for the new video, unless one is already outstanding for it.
    pub fn set_current_video(&mut self, path: impl Into<PathBuf>) -> Option<LoadTicket> {
        let path = path.into();
        tracing::info!("Opening video: {:?}", path);

        if self.pending_load.as_ref().map(LoadTicket::video) != Some(path.as_path()) {
            self.pending_load = None;
        }

        self.video = Some(path);
        self.annotations.clear();
        self.mutated_during_load = false;
        self.revision += 1;

        self.request_load()
    }

    /// Issue a load for the current video
    ///
    /// Single-flight: returns `None` when no video is open or a load for
    /// the current video is still outstanding.
    pub fn request_load(&mut self) -> Option<LoadTicket> {
        let video = self.video.clone()?;

        if self.pending_load.is_some() {
            tracing::debug!("Load already in flight for {:?}", video);
            return None;
        }

        self.generation += 1;
        let ticket = LoadTicket {
            sidecar: sidecar_path_for(&video),
            video,
            generation: self.generation,
        };
        self.pending_load = Some(ticket.clone());

        Some(ticket)
    }

    /// Apply a finished load; returns false if the result was stale
    ///
    /// Annotations added while the load was in flight are kept after the
    /// loaded ones and the merged collection is written back.
    pub fn apply_load(&mut self, loaded: LoadedSidecar) -> bool {
        if self.pending_load.as_ref() != Some(&loaded.ticket) {
            tracing::warn!(
                "Discarding stale annotation load for {:?}",
                loaded.ticket.video
            );
            return false;
        }
        self.pending_load = None;

        let mut annotations = match loaded.file {
            Some(file) => file.annotations,
            None => {
                tracing::info!(
                    "No annotation file for {:?}, starting empty",
                    loaded.ticket.video
                );
                Vec::new()
            }
        };

        let merged = std::mem::take(&mut self.mutated_during_load);
        if merged {
            for annotation in std::mem::take(&mut self.annotations) {
                if !annotations.iter().any(|a| a.id == annotation.id) {
                    annotations.push(annotation);
                }
            }
        }

        self.annotations = annotations;
        self.sort();
        self.revision += 1;

        tracing::info!(
            "Loaded {} annotations for {:?}",
            self.annotations.len(),
            loaded.ticket.video
        );

        if merged {
            self.persist();
        }

        true
    }

    // ===== Mutations =====

    /// Create an annotation
    ///
    /// Time and duration are rounded to hundredths, title and text are
    /// trimmed. Returns `None` when no video is open.
    pub fn add(&mut self, new: NewAnnotation) -> Option<Annotation> {
        if self.video.is_none() {
            tracing::warn!("Ignoring add: no video is open");
            return None;
        }

        let annotation = Annotation {
            id: AnnotationId::generate(),
            time: normalize_time(new.time),
            title: new.title.trim().to_string(),
            text: new.text.trim().to_string(),
            color: new.color.unwrap_or(self.default_color),
            level: new.level,
            duration: normalize_duration(new.duration),
            created_at: Some(Utc::now()),
            updated_at: None,
            marker: new.marker,
            extra: Default::default(),
        };

        tracing::info!("Created annotation {} at {}s", annotation.id, annotation.time);

        self.annotations.push(annotation.clone());
        self.after_mutation();

        Some(annotation)
    }

    /// Apply an edit; returns whether the id was found
    pub fn edit(&mut self, id: &AnnotationId, edit: AnnotationEdit) -> bool {
        let default_color = self.default_color;

        let Some(annotation) = self.annotations.iter_mut().find(|a| &a.id == id) else {
            tracing::debug!("Edit of unknown annotation {}", id);
            return false;
        };

        edit.title
            .map(|t| t.trim().to_string())
            .apply_to(&mut annotation.title);
        edit.text
            .map(|t| t.trim().to_string())
            .apply_to(&mut annotation.text);
        edit.color
            .map(|c| c.unwrap_or(default_color))
            .apply_to(&mut annotation.color);
        edit.level.apply_to(&mut annotation.level);
        edit.duration
            .map(normalize_duration)
            .apply_to(&mut annotation.duration);
        edit.marker.apply_to(&mut annotation.marker);
        annotation.updated_at = Some(Utc::now());

        tracing::debug!("Updated annotation {}", id);

        self.after_mutation();
        true
    }

    /// Remove an annotation; returns whether the id was found
    ///
    /// Nothing is written when the id is unknown.
    pub fn delete(&mut self, id: &AnnotationId) -> bool {
        let Some(index) = self.annotations.iter().position(|a| &a.id == id) else {
            tracing::debug!("Delete of unknown annotation {}", id);
            return false;
        };

        self.annotations.remove(index);
        tracing::info!("Deleted annotation {}", id);

        self.after_mutation();
        true
    }

    // ===== Queries =====

    /// First annotation whose anchor lies within `tolerance` seconds
    pub fn find_at_time(&self, time: f64, tolerance: f64) -> Option<&Annotation> {
        self.annotations
            .iter()
            .find(|a| (a.time - time).abs() <= tolerance)
    }

    /// [`find_at_time`](Self::find_at_time) with the default tolerance
    pub fn find_near(&self, time: f64) -> Option<&Annotation> {
        self.find_at_time(time, FIND_TOLERANCE_SECS)
    }

    pub fn get(&self, id: &AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| &a.id == id)
    }

    /// Copy of the collection in time order
    pub fn all(&self) -> Vec<Annotation> {
        self.annotations.clone()
    }

    /// Borrowed view of the collection in time order
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    // ===== Internals =====

    fn sort(&mut self) {
        self.annotations.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    fn after_mutation(&mut self) {
        self.sort();
        self.revision += 1;
        if self.pending_load.is_some() {
            self.mutated_during_load = true;
        }
        self.persist();
    }

    fn persist(&self) {
        let Some(video) = self.video.as_deref() else {
            return;
        };

        let file = SidecarFile::new(video, self.annotations.clone());
        self.writer.save(&sidecar_path_for(video), file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FsPersistence;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_store() -> (AnnotationStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let (writer, _failures) = SidecarWriter::spawn(Arc::new(FsPersistence));
        (AnnotationStore::new(writer), temp_dir)
    }

    async fn open_loaded(store: &mut AnnotationStore, video: &Path) {
        let ticket = store.set_current_video(video).unwrap();
        let loaded = ticket.run(&FsPersistence).await;
        assert!(store.apply_load(loaded));
    }

    #[tokio::test]
    async fn test_add_without_video_fails() {
        let (mut store, _temp) = create_test_store();

        assert!(store.add(NewAnnotation::at(1.0)).is_none());
        assert!(!store.delete(&AnnotationId::from("missing")));
        assert!(!store.edit(&AnnotationId::from("missing"), AnnotationEdit::default()));
        assert_eq!(store.revision(), 0);
    }

    #[tokio::test]
    async fn test_add_rounds_and_trims() {
        let (mut store, temp) = create_test_store();
        open_loaded(&mut store, &temp.path().join("v.mp4")).await;

        let annotation = store
            .add(
                NewAnnotation::at(30.456)
                    .duration(4.321)
                    .title("  Intro  ")
                    .text("\tbody\n"),
            )
            .unwrap();

        assert_eq!(annotation.time, 30.46);
        assert_eq!(annotation.duration, Some(4.32));
        assert_eq!(annotation.title, "Intro");
        assert_eq!(annotation.text, "body");
        assert_eq!(annotation.color, Color::Blue);
        assert!(annotation.created_at.is_some());
    }

    #[tokio::test]
    async fn test_sorted_after_every_add() {
        let (mut store, temp) = create_test_store();
        open_loaded(&mut store, &temp.path().join("v.mp4")).await;

        for time in [5.0, 1.0, 9.0, 1.0, 3.5, 0.0, 7.25] {
            store.add(NewAnnotation::at(time)).unwrap();
            let times: Vec<f64> = store.all().iter().map(|a| a.time).collect();
            assert!(times.windows(2).all(|w| w[0] <= w[1]), "{:?}", times);
        }
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let (mut store, temp) = create_test_store();
        open_loaded(&mut store, &temp.path().join("v.mp4")).await;

        let first = store.add(NewAnnotation::at(2.0).title("first")).unwrap();
        store.add(NewAnnotation::at(1.0)).unwrap();
        let second = store.add(NewAnnotation::at(2.0).title("second")).unwrap();

        let ids: Vec<&AnnotationId> = store.annotations().iter().map(|a| &a.id).collect();
        assert_eq!(ids[1], &first.id);
        assert_eq!(ids[2], &second.id);
    }

    #[tokio::test]
    async fn test_edit_keep_versus_clear() {
        let (mut store, temp) = create_test_store();
        open_loaded(&mut store, &temp.path().join("v.mp4")).await;

        let created = store
            .add(
                NewAnnotation::at(4.0)
                    .color(Color::Red)
                    .level(Some(Level::High))
                    .duration(2.0)
                    .marker(Marker::default()),
            )
            .unwrap();

        assert!(store.edit(&created.id, AnnotationEdit::content(" new ", "")));
        let edited = store.get(&created.id).unwrap();
        assert_eq!(edited.title, "new");
        assert_eq!(edited.color, Color::Red);
        assert_eq!(edited.level, Some(Level::High));
        assert_eq!(edited.duration, Some(2.0));
        assert!(edited.marker.is_some());
        assert!(edited.updated_at.is_some());

        let clear = AnnotationEdit {
            color: FieldUpdate::SetTo(None),
            level: FieldUpdate::SetTo(None),
            duration: FieldUpdate::SetTo(None),
            marker: FieldUpdate::SetTo(None),
            ..AnnotationEdit::default()
        };
        assert!(store.edit(&created.id, clear));
        let cleared = store.get(&created.id).unwrap();
        assert_eq!(cleared.title, "new");
        assert_eq!(cleared.color, Color::Blue);
        assert_eq!(cleared.level, None);
        assert_eq!(cleared.duration, None);
        assert!(cleared.marker.is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_id_writes_nothing() {
        let (mut store, temp) = create_test_store();
        let video = temp.path().join("v.mp4");
        open_loaded(&mut store, &video).await;

        let revision = store.revision();
        assert!(!store.delete(&AnnotationId::from("nope")));
        store.writer().flush().await.unwrap();

        assert_eq!(store.revision(), revision);
        assert!(!sidecar_path_for(&video).exists());
    }

    #[tokio::test]
    async fn test_mutations_persist_full_collection() {
        let (mut store, temp) = create_test_store();
        let video = temp.path().join("v.mp4");
        open_loaded(&mut store, &video).await;

        let a = store.add(NewAnnotation::at(1.0)).unwrap();
        store.add(NewAnnotation::at(2.0)).unwrap();
        store.delete(&a.id);
        store.writer().flush().await.unwrap();

        let on_disk = FsPersistence.read(&sidecar_path_for(&video)).await.unwrap();
        assert_eq!(on_disk.annotations, store.all());
    }

    #[tokio::test]
    async fn test_find_at_time() {
        let (mut store, temp) = create_test_store();
        open_loaded(&mut store, &temp.path().join("v.mp4")).await;

        let a = store.add(NewAnnotation::at(10.0)).unwrap();

        assert_eq!(store.find_near(10.4).map(|x| &x.id), Some(&a.id));
        assert_eq!(store.find_at_time(9.5, 0.5).map(|x| &x.id), Some(&a.id));
        assert!(store.find_near(10.6).is_none());
    }

    #[tokio::test]
    async fn test_load_is_single_flight() {
        let (mut store, temp) = create_test_store();
        let video = temp.path().join("v.mp4");

        let ticket = store.set_current_video(&video);
        assert!(ticket.is_some());
        assert!(store.request_load().is_none());
        assert!(store.set_current_video(&video).is_none());
        assert!(store.is_loading());
    }

    #[tokio::test]
    async fn test_stale_load_is_discarded() {
        let (mut store, temp) = create_test_store();
        let first = temp.path().join("first.mp4");
        let second = temp.path().join("second.mp4");

        let mut seed = SidecarFile::new(&first, Vec::new());
        seed.annotations = vec![serde_json::from_value(
            serde_json::json!({ "id": "old", "time": 1.0 }),
        )
        .unwrap()];
        FsPersistence
            .write(&sidecar_path_for(&first), &seed)
            .await
            .unwrap();

        let stale = store.set_current_video(&first).unwrap();
        let fresh = store.set_current_video(&second).unwrap();

        let stale_result = stale.run(&FsPersistence).await;
        assert!(!store.apply_load(stale_result));
        assert!(store.is_empty());

        assert!(store.apply_load(fresh.run(&FsPersistence).await));
        assert!(store.is_empty());
        assert_eq!(store.current_video(), Some(second.as_path()));
    }

    #[tokio::test]
    async fn test_add_during_load_is_merged() {
        let (mut store, temp) = create_test_store();
        let video = temp.path().join("v.mp4");

        let mut seed = SidecarFile::new(&video, Vec::new());
        seed.annotations = vec![serde_json::from_value(
            serde_json::json!({ "id": "disk", "time": 5.0 }),
        )
        .unwrap()];
        FsPersistence
            .write(&sidecar_path_for(&video), &seed)
            .await
            .unwrap();

        let ticket = store.set_current_video(&video).unwrap();
        let added = store.add(NewAnnotation::at(1.0)).unwrap();

        assert!(store.apply_load(ticket.run(&FsPersistence).await));
        let ids: Vec<&str> = store.annotations().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec![added.id.as_str(), "disk"]);

        store.writer().flush().await.unwrap();
        let on_disk = FsPersistence.read(&sidecar_path_for(&video)).await.unwrap();
        assert_eq!(on_disk.annotations.len(), 2);
    }
}
