//! Background sidecar writer
//!
//! Mutations hand a full snapshot to the writer and return immediately.
//! A single task performs the writes in submission order, so the file on
//! disk always ends at the most recent snapshot. Failures are logged and
//! reported on a notice channel; they never touch in-memory state.

use super::sidecar::{SidecarFile, SidecarPersistence};
use crate::error::{AppError, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

enum WriteCommand {
    Save { path: PathBuf, file: SidecarFile },
    Flush(oneshot::Sender<()>),
}

/// A sidecar write that did not reach disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Handle to the background writer task
#[derive(Clone)]
pub struct SidecarWriter {
    tx: mpsc::UnboundedSender<WriteCommand>,
}

impl SidecarWriter {
    /// Start the writer task on the current tokio runtime
    ///
    /// Returns the handle and the receiving end of the failure notices.
    pub fn spawn<P: SidecarPersistence>(
        persistence: Arc<P>,
    ) -> (Self, mpsc::UnboundedReceiver<SaveFailure>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (failures_tx, failures_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_writer(persistence, rx, failures_tx));

        (Self { tx }, failures_rx)
    }

    /// Queue a full snapshot for writing; returns false if the writer is gone
    pub fn save(&self, path: &Path, file: SidecarFile) -> bool {
        let queued = self
            .tx
            .send(WriteCommand::Save {
                path: path.to_path_buf(),
                file,
            })
            .is_ok();

        if !queued {
            tracing::error!("Sidecar writer stopped, dropping write to {:?}", path);
        }

        queued
    }

    /// Wait until every snapshot queued before this call has been handled
    pub async fn flush(&self) -> Result<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(WriteCommand::Flush(ack_tx))
            .map_err(|_| AppError::WriterClosed)?;
        ack_rx.await.map_err(|_| AppError::WriterClosed)
    }
}

async fn run_writer<P: SidecarPersistence>(
    persistence: Arc<P>,
    mut rx: mpsc::UnboundedReceiver<WriteCommand>,
    failures: mpsc::UnboundedSender<SaveFailure>,
) {
    tracing::debug!("Sidecar writer started");

    while let Some(first) = rx.recv().await {
        let mut batch = vec![first];
        while let Ok(next) = rx.try_recv() {
            batch.push(next);
        }

        let superseded = superseded_saves(&batch);

        for (command, skip) in batch.into_iter().zip(superseded) {
            match command {
                WriteCommand::Save { path, file } => {
                    if skip {
                        tracing::debug!("Skipping superseded write to {:?}", path);
                        continue;
                    }

                    let count = file.annotations.len();
                    match persistence.write(&path, &file).await {
                        Ok(()) => {
                            tracing::debug!("Saved {} annotations to {:?}", count, path);
                        }
                        Err(e) => {
                            tracing::error!("Failed to save annotations to {:?}: {}", path, e);
                            let _ = failures.send(SaveFailure {
                                path,
                                message: e.to_string(),
                            });
                        }
                    }
                }
                WriteCommand::Flush(ack) => {
                    let _ = ack.send(());
                }
            }
        }
    }

    tracing::debug!("Sidecar writer stopped");
}

/// Mark saves that a later save to the same path replaces before the next
/// flush point. Every snapshot is a full collection, so only the last one
/// for a path needs to reach disk.
fn superseded_saves(batch: &[WriteCommand]) -> Vec<bool> {
    let mut later: HashSet<&Path> = HashSet::new();
    let mut skip = vec![false; batch.len()];

    for (i, command) in batch.iter().enumerate().rev() {
        match command {
            WriteCommand::Save { path, .. } => {
                skip[i] = !later.insert(path.as_path());
            }
            WriteCommand::Flush(_) => later.clear(),
        }
    }

    skip
}
