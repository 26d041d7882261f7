//! Marker render reconciler
//!
//! Keeps the set of rendered markers equal to the index's active set.
//! Each pass removes markers that left the active set, creates markers that
//! entered it and updates every marker that stayed. Updates always rewrite
//! the full visual state; they are not diffed field by field.

use super::render::RenderTarget;
use crate::annotations::{Annotation, AnnotationId};
use std::collections::{BTreeMap, HashSet};

/// Ids touched by one reconcile pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: Vec<AnnotationId>,
    pub updated: Vec<AnnotationId>,
    pub removed: Vec<AnnotationId>,
}

impl ReconcileReport {
    /// Whether any marker appeared or disappeared
    pub fn membership_changed(&self) -> bool {
        !self.created.is_empty() || !self.removed.is_empty()
    }
}

/// Rendered markers keyed by annotation id
pub struct MarkerReconciler<T: RenderTarget> {
    target: T,
    rendered: BTreeMap<AnnotationId, T::Handle>,
}

impl<T: RenderTarget> MarkerReconciler<T> {
    pub fn new(target: T) -> Self {
        Self {
            target,
            rendered: BTreeMap::new(),
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn into_target(self) -> T {
        self.target
    }

    pub fn handle(&self, id: &AnnotationId) -> Option<&T::Handle> {
        self.rendered.get(id)
    }

    pub fn rendered_ids(&self) -> impl Iterator<Item = &AnnotationId> {
        self.rendered.keys()
    }

    pub fn rendered_count(&self) -> usize {
        self.rendered.len()
    }

    /// Make the rendered set match `active`
    ///
    /// Duplicate ids in `active` are rendered once; the first occurrence
    /// supplies the data.
    pub fn reconcile<'a>(
        &mut self,
        active: impl IntoIterator<Item = &'a Annotation>,
    ) -> ReconcileReport {
        let mut seen: HashSet<&AnnotationId> = HashSet::new();
        let wanted: Vec<&Annotation> = active
            .into_iter()
            .filter(|annotation| seen.insert(&annotation.id))
            .collect();

        let mut report = ReconcileReport::default();

        let stale: Vec<AnnotationId> = self
            .rendered
            .keys()
            .filter(|id| !seen.contains(id))
            .cloned()
            .collect();

        for id in stale {
            if let Some(handle) = self.rendered.remove(&id) {
                self.target.remove(handle);
                report.removed.push(id);
            }
        }

        for annotation in wanted {
            match self.rendered.get_mut(&annotation.id) {
                Some(handle) => {
                    self.target.update(handle, annotation);
                    report.updated.push(annotation.id.clone());
                }
                None => {
                    let handle = self.target.create(annotation);
                    self.rendered.insert(annotation.id.clone(), handle);
                    report.created.push(annotation.id.clone());
                }
            }
        }

        if report.membership_changed() {
            tracing::debug!(
                "Reconciled markers: +{} ~{} -{}",
                report.created.len(),
                report.updated.len(),
                report.removed.len()
            );
        }

        report
    }

    /// Remove every rendered marker; returns the removed ids
    pub fn clear(&mut self) -> Vec<AnnotationId> {
        let rendered = std::mem::take(&mut self.rendered);
        let mut removed = Vec::with_capacity(rendered.len());

        for (id, handle) in rendered {
            self.target.remove(handle);
            removed.push(id);
        }

        removed
    }

    /// Tear everything down and render `active` from scratch
    pub fn refresh_all<'a>(
        &mut self,
        active: impl IntoIterator<Item = &'a Annotation>,
    ) -> ReconcileReport {
        let removed = self.clear();
        let mut report = self.reconcile(active);
        report.removed = removed;
        report
    }
}
