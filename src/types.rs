//! Core types for spark-vdom.
//!
//! These are the small plain types shared by the virtual tree, the host tree
//! and the renderer.

use std::fmt;

use indexmap::IndexMap;

// =============================================================================
// Host Node Handle
// =============================================================================

/// Opaque handle to a node owned by a [`HostTree`](crate::host::HostTree).
///
/// Hosts hand these out from `create_element` / `create_text` and accept them
/// back on every other operation. The renderer never interprets the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Raw index of the handle.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Attributes
// =============================================================================

/// Attribute name → value map, iterated in insertion order.
pub type Attrs = IndexMap<String, String>;

/// Build an [`Attrs`] map from `(name, value)` pairs.
///
/// ```
/// let attrs = spark_vdom::attrs([("id", "app"), ("class", "root")]);
/// assert_eq!(attrs.get("id").map(String::as_str), Some("app"));
/// ```
pub fn attrs<K, V, I>(pairs: I) -> Attrs
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

// =============================================================================
// Patch Flags (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Kinds of host mutation a reconcile pass performed.
    ///
    /// Combine with bitwise OR: `PatchFlags::ATTRS | PatchFlags::TEXT`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PatchFlags: u8 {
        const NONE = 0;
        /// An attribute was set.
        const ATTRS = 1 << 0;
        /// An attribute was removed.
        const ATTRS_REMOVED = 1 << 1;
        /// Text content was written.
        const TEXT = 1 << 2;
        /// A new subtree was realized and attached.
        const CREATED = 1 << 3;
        /// A host node was detached.
        const REMOVED = 1 << 4;
        /// A subtree was replaced because its tag changed.
        const REPLACED = 1 << 5;
        /// The initial mount replaced the anchor.
        const MOUNTED = 1 << 6;
    }
}
