//! Active-interval index
//!
//! Answers "which marker intervals contain time t". Only annotations with a
//! marker and a positive duration take part. Containment is closed on both
//! ends: `time <= t <= time + duration`.
//!
//! Below the sweep threshold every query is a linear scan. At or above it
//! the index keeps two endpoint arrays sorted by time and answers a query
//! by taking every interval whose start is `<= t` and dropping those whose
//! end is `< t`. Queries are pure functions of `t`, so seeks in either
//! direction need no cursor.
//!
//! The index holds a snapshot of the eligible annotations. It is rebuilt
//! whenever the store's revision moves, never patched in place.

use crate::annotations::{Annotation, AnnotationStore};
use crate::config::SWEEP_THRESHOLD;
use std::collections::BTreeSet;

/// Query strategy currently in use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStrategy {
    Linear,
    Sweep,
}

/// How the index picks its strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyPolicy {
    /// Linear below the threshold, sweep at or above it
    #[default]
    Auto,
    ForceLinear,
    ForceSweep,
}

struct IntervalEntry {
    start: f64,
    end: f64,
    annotation: Annotation,
}

/// Endpoint arrays, each sorted ascending by time; values index `intervals`
struct SweepTable {
    starts: Vec<(f64, usize)>,
    ends: Vec<(f64, usize)>,
}

impl SweepTable {
    fn build(intervals: &[IntervalEntry]) -> Self {
        let mut starts: Vec<(f64, usize)> = intervals
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.start, i))
            .collect();
        let mut ends: Vec<(f64, usize)> = intervals
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.end, i))
            .collect();

        starts.sort_by(|a, b| a.0.total_cmp(&b.0));
        ends.sort_by(|a, b| a.0.total_cmp(&b.0));

        Self { starts, ends }
    }

    fn query(&self, t: f64) -> BTreeSet<usize> {
        let mut active = BTreeSet::new();

        for &(start, i) in &self.starts {
            if start > t {
                break;
            }
            active.insert(i);
        }

        for &(end, i) in &self.ends {
            if end >= t {
                break;
            }
            active.remove(&i);
        }

        active
    }
}

/// Index over the marker intervals of one annotation collection
pub struct ActiveIntervalIndex {
    policy: StrategyPolicy,
    sweep_threshold: usize,
    intervals: Vec<IntervalEntry>,
    sweep: Option<SweepTable>,
    built_for: Option<u64>,
}

impl Default for ActiveIntervalIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ActiveIntervalIndex {
    pub fn new() -> Self {
        Self {
            policy: StrategyPolicy::Auto,
            sweep_threshold: SWEEP_THRESHOLD,
            intervals: Vec::new(),
            sweep: None,
            built_for: None,
        }
    }

    pub fn with_threshold(mut self, sweep_threshold: usize) -> Self {
        self.sweep_threshold = sweep_threshold;
        self.built_for = None;
        self
    }

    pub fn with_policy(mut self, policy: StrategyPolicy) -> Self {
        self.policy = policy;
        self.built_for = None;
        self
    }

    pub fn strategy(&self) -> IndexStrategy {
        if self.sweep.is_some() {
            IndexStrategy::Sweep
        } else {
            IndexStrategy::Linear
        }
    }

    /// Number of eligible intervals
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Whether the index was built from the given store revision
    pub fn is_current(&self, revision: u64) -> bool {
        self.built_for == Some(revision)
    }

    /// Drop all intervals and forget the revision they came from
    pub fn clear(&mut self) {
        self.intervals.clear();
        self.sweep = None;
        self.built_for = None;
    }

    /// Rebuild from `annotations`, recording `revision` as the source
    pub fn rebuild(&mut self, annotations: &[Annotation], revision: u64) {
        self.intervals = annotations
            .iter()
            .filter_map(|annotation| {
                annotation.interval().map(|(start, end)| IntervalEntry {
                    start,
                    end,
                    annotation: annotation.clone(),
                })
            })
            .collect();

        let use_sweep = match self.policy {
            StrategyPolicy::Auto => self.intervals.len() >= self.sweep_threshold,
            StrategyPolicy::ForceLinear => false,
            StrategyPolicy::ForceSweep => true,
        };
        self.sweep = use_sweep.then(|| SweepTable::build(&self.intervals));
        self.built_for = Some(revision);

        tracing::debug!(
            "Rebuilt active-interval index: {} intervals, {:?} strategy",
            self.intervals.len(),
            self.strategy()
        );
    }

    /// Rebuild only if `revision` differs from the last build
    ///
    /// Returns whether a rebuild happened.
    pub fn sync(&mut self, annotations: &[Annotation], revision: u64) -> bool {
        if self.is_current(revision) {
            return false;
        }
        self.rebuild(annotations, revision);
        true
    }

    /// Bring the index up to date with `store`, then query it
    pub fn active_for(&mut self, store: &AnnotationStore, t: f64) -> Vec<&Annotation> {
        self.sync(store.annotations(), store.revision());
        self.active_at(t)
    }

    /// Annotations whose interval contains `t`, in collection order
    ///
    /// Both strategies return the same annotations in the same order.
    pub fn active_at(&self, t: f64) -> Vec<&Annotation> {
        match &self.sweep {
            Some(table) => table
                .query(t)
                .into_iter()
                .map(|i| &self.intervals[i].annotation)
                .collect(),
            None => self
                .intervals
                .iter()
                .filter(|entry| entry.start <= t && t <= entry.end)
                .map(|entry| &entry.annotation)
                .collect(),
        }
    }
}
