//! Dependency Set - The computations interested in one observable property.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use tracing::debug;

use super::computation::{Computation, ComputationId, ComputationInner};
use super::tracking;

/// Identity of a [`Dep`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DepId(u64);

pub(crate) struct DepInner {
    pub(crate) id: DepId,
    label: String,
    /// Subscribers in subscription order. Weak so a dropped computation
    /// disappears from the graph without explicit teardown.
    subscribers: RefCell<IndexMap<ComputationId, Weak<ComputationInner>>>,
}

impl DepInner {
    pub(crate) fn subscribe(&self, id: ComputationId, computation: Weak<ComputationInner>) {
        self.subscribers.borrow_mut().entry(id).or_insert(computation);
    }

    pub(crate) fn unsubscribe(&self, id: ComputationId) {
        self.subscribers.borrow_mut().shift_remove(&id);
    }

    fn notify(&self) {
        // Snapshot first: runs below subscribe and unsubscribe on this very set.
        let subscribers: Vec<Rc<ComputationInner>> = {
            let mut subscribers = self.subscribers.borrow_mut();
            subscribers.retain(|_, weak| weak.strong_count() > 0);
            subscribers.values().filter_map(Weak::upgrade).collect()
        };

        debug!(dep = %self.label, subscribers = subscribers.len(), "notify");

        for computation in subscribers {
            computation.run();
        }
    }
}

/// The set of computations to re-run when a property changes.
///
/// Each computation appears at most once. Subscriptions are added by a
/// computation at the end of a run that read the property, and removed when a
/// later run stops reading it or the computation is disposed.
#[derive(Clone)]
pub struct Dep {
    inner: Rc<DepInner>,
}

impl Dep {
    /// Create an empty dependency set. `label` only shows up in logs.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(DepInner {
                id: DepId(tracking::next_id()),
                label: label.into(),
                subscribers: RefCell::new(IndexMap::new()),
            }),
        }
    }

    pub fn id(&self) -> DepId {
        self.inner.id
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// Record a read: the running computation (if any) will subscribe.
    pub fn depend(&self) {
        tracking::record_read(&self.inner);
    }

    /// Synchronously run every subscribed computation once.
    pub fn notify(&self) {
        self.inner.notify();
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .borrow()
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// Whether `computation` is currently subscribed.
    pub fn has_subscriber(&self, computation: &Computation) -> bool {
        self.inner
            .subscribers
            .borrow()
            .contains_key(&computation.id())
    }
}

impl fmt::Debug for Dep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dep")
            .field("id", &self.inner.id)
            .field("label", &self.inner.label)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
