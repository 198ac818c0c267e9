//! Error types for spark-vdom.
//!
//! A single crate-wide [`Error`] covers the three layers: malformed virtual
//! trees produced by a render function, reconciliation the renderer refuses to
//! perform, and mount lifecycle failures.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while building, mounting or reconciling a tree.
#[derive(Debug, Error)]
pub enum Error {
    /// A node mixes text and element children, carries attributes on a text
    /// node, or has an empty tag.
    #[error("malformed virtual node: {0}")]
    MalformedVirtualNode(String),

    /// The renderer was configured to reject in-place reconciliation of nodes
    /// whose tags differ.
    #[error("cannot reconcile <{from}> into <{to}> in place")]
    UnsupportedReconciliation { from: String, to: String },

    /// No host node matched the mount selector.
    #[error("no mount anchor matches selector `{0}`")]
    AnchorNotFound(String),

    /// The mount anchor is not attached to a parent, so it cannot be replaced.
    #[error("mount anchor has no parent node")]
    DetachedAnchor,

    /// A baseline virtual node was never realized into the host tree.
    #[error("virtual node has not been realized into the host tree")]
    Unrealized,

    /// Mount data must be a plain object.
    #[error("mount data must be an object, got {0}")]
    InvalidData(&'static str),

    /// `mount` was called on an application that is already mounted.
    #[error("application is already mounted")]
    AlreadyMounted,

    /// A render function reported its own failure.
    #[error("render failed: {0}")]
    Render(String),
}

impl Error {
    /// Shorthand for [`Error::MalformedVirtualNode`].
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedVirtualNode(reason.into())
    }
}
