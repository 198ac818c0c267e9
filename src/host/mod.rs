//! Host Tree - The rendering target the renderer mutates.
//!
//! The renderer only ever talks to a host through [`HostTree`]. Nodes are
//! addressed by [`NodeId`] handles the host hands out; what a node *is*
//! (a DOM element, a terminal cell region, an in-memory record) is the
//! host's business.
//!
//! [`MemoryHost`] is the in-crate implementation: an arena-backed tree that
//! records every mutation, used by the tests and the demos.

mod memory;

pub use memory::{MemoryHost, Mutation};

use crate::types::NodeId;

/// Host rendering primitives consumed by the renderer.
pub trait HostTree {
    /// Create a detached element node.
    fn create_element(&mut self, tag: &str) -> NodeId;

    /// Create a detached text node.
    fn create_text(&mut self, text: &str) -> NodeId;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    fn remove_attribute(&mut self, node: NodeId, name: &str);

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Replace all children of `node` with `text` (DOM `textContent` setter).
    /// On a text node, replace its text.
    fn set_text_content(&mut self, node: NodeId, text: &str);

    /// Concatenated text of `node` and its descendants.
    fn text_content(&self, node: NodeId) -> String;

    fn append_child(&mut self, parent: NodeId, child: NodeId);

    /// Insert `child` before `reference`; append when `reference` is `None`.
    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>);

    fn remove_child(&mut self, parent: NodeId, child: NodeId);

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;

    /// Locate a node by selector (used to find the mount anchor).
    fn query(&self, selector: &str) -> Option<NodeId>;
}
