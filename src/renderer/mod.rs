//! Renderer - Turns virtual trees into host-tree mutations.
//!
//! Two entry points:
//!
//! - [`mount`] realizes a virtual tree for the first time and swaps it in for
//!   an anchor node.
//! - [`patch`] reconciles a freshly rendered tree against the previous one,
//!   touching only what changed.
//!
//! # Algorithm
//!
//! 1. Same tag: adopt the old host node, diff attributes, then children
//! 2. Different tag: replace the subtree (or reject, see [`TagChangePolicy`])
//! 3. Children: text vs text, text vs elements, or a positional list diff
//! 4. List diff: patch the common prefix, append extra new children, remove
//!    extra old children
//!
//! The renderer keeps no state between passes; the caller holds the baseline
//! tree. Each pass returns a [`PatchReport`].

mod config;
mod create;
mod diff;

pub use config::{ReconcileConfig, TagChangePolicy};
pub use create::{create_elm, mount};
pub use diff::{patch, patch_with};

use crate::host::HostTree;
use crate::types::{NodeId, PatchFlags};

/// Summary of one reconcile pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatchReport {
    /// Kinds of mutation performed.
    pub flags: PatchFlags,
    /// Host mutations performed. Realizing a node counts as one.
    pub mutations: usize,
}

impl PatchReport {
    /// Whether the pass left the host tree untouched.
    pub fn is_noop(&self) -> bool {
        self.mutations == 0
    }
}

/// One reconcile pass: a host handle plus the running report.
pub(crate) struct Patcher<'h, H: HostTree + ?Sized> {
    host: &'h mut H,
    config: ReconcileConfig,
    report: PatchReport,
}

impl<'h, H: HostTree + ?Sized> Patcher<'h, H> {
    pub(crate) fn new(host: &'h mut H, config: ReconcileConfig) -> Self {
        Self {
            host,
            config,
            report: PatchReport::default(),
        }
    }

    pub(crate) fn finish(self) -> PatchReport {
        self.report
    }

    fn record(&mut self, flag: PatchFlags) {
        self.report.flags |= flag;
        self.report.mutations += 1;
    }

    // =========================================================================
    // Counted host calls
    // =========================================================================

    fn set_attribute(&mut self, el: NodeId, name: &str, value: &str) {
        self.host.set_attribute(el, name, value);
        self.record(PatchFlags::ATTRS);
    }

    fn remove_attribute(&mut self, el: NodeId, name: &str) {
        self.host.remove_attribute(el, name);
        self.record(PatchFlags::ATTRS_REMOVED);
    }

    fn set_text(&mut self, el: NodeId, text: &str) {
        self.host.set_text_content(el, text);
        self.record(PatchFlags::TEXT);
    }

    fn append(&mut self, parent: NodeId, child: NodeId) {
        self.host.append_child(parent, child);
        self.record(PatchFlags::CREATED);
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        self.host.insert_before(parent, child, reference);
        self.record(PatchFlags::CREATED);
    }

    fn remove(&mut self, parent: NodeId, child: NodeId) {
        self.host.remove_child(parent, child);
        self.record(PatchFlags::REMOVED);
    }
}
