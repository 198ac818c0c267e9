//! Computation - A re-runnable unit subscribed to what it reads.
//!
//! A [`Computation`] wraps a function and runs it immediately on creation.
//! Every observable read during a run is collected in a per-run read set;
//! when the run ends the set is diffed against the previous run's
//! subscriptions:
//!
//! - dependencies read this time but not last time are subscribed
//! - dependencies read last time but not this time are unsubscribed
//!
//! so a dependency set holds a computation exactly when that computation's
//! most recent run read the property.
//!
//! # Re-entrancy
//!
//! A computation that (directly or indirectly) writes to a property it
//! depends on while running is not re-entered. The trigger is dropped and
//! logged; the in-flight run already observes the new value for anything it
//! reads afterwards.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use tracing::{debug, trace};

use super::dep::{Dep, DepId, DepInner};
use super::tracking::{self, FrameGuard, ReadSet};

/// Identity of a [`Computation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComputationId(u64);

pub(crate) struct ComputationInner {
    id: ComputationId,
    label: String,
    getter: Box<dyn Fn()>,
    /// Subscriptions made at the end of the last run.
    deps: RefCell<IndexMap<DepId, Weak<DepInner>>>,
    running: Cell<bool>,
    disposed: Cell<bool>,
    runs: Cell<u64>,
    this: Weak<ComputationInner>,
}

/// Clears the running flag even if the getter unwinds.
struct RunningGuard<'a>(&'a Cell<bool>);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl ComputationInner {
    pub(crate) fn run(&self) {
        if self.disposed.get() {
            trace!(computation = %self.label, "skipping disposed computation");
            return;
        }
        if self.running.get() {
            debug!(computation = %self.label, "skipping re-entrant trigger");
            return;
        }

        self.running.set(true);
        let running = RunningGuard(&self.running);

        let frame = FrameGuard::enter(true);
        (self.getter)();
        let reads = frame.finish();
        drop(running);

        // Disposed from inside its own run: keep the graph clean.
        if self.disposed.get() {
            return;
        }

        self.flush(reads);
        self.runs.set(self.runs.get() + 1);
    }

    fn flush(&self, reads: ReadSet) {
        let mut deps = self.deps.borrow_mut();

        let mut pruned = 0usize;
        for (id, weak) in deps.iter() {
            if reads.contains_key(id) {
                continue;
            }
            if let Some(dep) = weak.upgrade() {
                dep.unsubscribe(self.id);
            }
            pruned += 1;
        }

        for dep in reads.values() {
            dep.subscribe(self.id, self.this.clone());
        }

        if pruned > 0 {
            debug!(computation = %self.label, pruned, "pruned stale dependencies");
        }
        trace!(computation = %self.label, deps = reads.len(), "run complete");

        *deps = reads
            .into_iter()
            .map(|(id, dep)| (id, Rc::downgrade(&dep)))
            .collect();
    }

    fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        for weak in self.deps.borrow_mut().drain(..).map(|(_, weak)| weak) {
            if let Some(dep) = weak.upgrade() {
                dep.unsubscribe(self.id);
            }
        }
        debug!(computation = %self.label, "disposed");
    }
}

/// A watcher: runs a function now and again whenever something it read
/// changes.
///
/// Cloning a `Computation` creates a new handle to the same watcher. Dependency
/// sets hold watchers weakly, so dropping the last handle stops it as well.
#[derive(Clone)]
pub struct Computation {
    inner: Rc<ComputationInner>,
}

impl Computation {
    /// Create a computation and run it once to discover its dependencies.
    ///
    /// Keep the returned handle for as long as the computation should react:
    /// once the last handle is dropped, writes no longer reach it.
    #[must_use = "dropping the last handle stops the computation"]
    pub fn new(label: impl Into<String>, f: impl Fn() + 'static) -> Self {
        let label = label.into();
        let inner = Rc::new_cyclic(|this| ComputationInner {
            id: ComputationId(tracking::next_id()),
            label,
            getter: Box::new(f),
            deps: RefCell::new(IndexMap::new()),
            running: Cell::new(false),
            disposed: Cell::new(false),
            runs: Cell::new(0),
            this: this.clone(),
        });
        debug!(computation = %inner.label, "created");
        inner.run();
        Self { inner }
    }

    pub fn id(&self) -> ComputationId {
        self.inner.id
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// Re-run the bound function, refreshing dependencies.
    pub fn update(&self) {
        self.inner.run();
    }

    /// Remove this computation from every dependency set. It never runs again.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }

    /// Completed runs, including the initial one.
    pub fn run_count(&self) -> u64 {
        self.inner.runs.get()
    }

    /// Number of dependencies read by the most recent run.
    pub fn dependency_count(&self) -> usize {
        self.inner.deps.borrow().len()
    }

    /// Whether the most recent run read `dep`.
    pub fn depends_on(&self, dep: &Dep) -> bool {
        self.inner.deps.borrow().contains_key(&dep.id())
    }
}

impl fmt::Debug for Computation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Computation")
            .field("id", &self.inner.id)
            .field("label", &self.inner.label)
            .field("runs", &self.inner.runs.get())
            .field("deps", &self.dependency_count())
            .field("disposed", &self.inner.disposed.get())
            .finish()
    }
}
