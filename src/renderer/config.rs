//! Reconcile configuration.

/// What to do when a node's tag differs between two renders.
///
/// Text ↔ element transitions count as tag changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagChangePolicy {
    /// Realize the new subtree, put it where the old node was, drop the old node.
    #[default]
    Replace,
    /// Refuse with [`Error::UnsupportedReconciliation`](crate::Error::UnsupportedReconciliation).
    Reject,
}

/// Knobs for a reconcile pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileConfig {
    pub tag_change: TagChangePolicy,
}

impl ReconcileConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag_change(mut self, policy: TagChangePolicy) -> Self {
        self.tag_change = policy;
        self
    }
}
