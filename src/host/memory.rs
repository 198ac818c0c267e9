//! MemoryHost - Arena-backed host tree with a mutation log.
//!
//! Nodes live in a `Vec` and are addressed by index. Detached nodes are never
//! freed; a host is expected to live as long as one application.
//!
//! Every call made through [`HostTree`] is appended to the mutation log, which
//! tests use to assert exactly what a reconcile pass did.

use std::fmt::Write as _;

use tracing::warn;

use super::HostTree;
use crate::types::{Attrs, NodeId};

/// One recorded host mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateElement { node: NodeId, tag: String },
    CreateText { node: NodeId, text: String },
    SetAttribute { node: NodeId, name: String, value: String },
    RemoveAttribute { node: NodeId, name: String },
    SetTextContent { node: NodeId, text: String },
    AppendChild { parent: NodeId, child: NodeId },
    InsertBefore { parent: NodeId, child: NodeId, reference: Option<NodeId> },
    RemoveChild { parent: NodeId, child: NodeId },
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element { tag: String, attrs: Attrs },
    Text(String),
}

#[derive(Debug, Clone)]
struct HostNode {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// In-memory host tree.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    nodes: Vec<HostNode>,
    root: NodeId,
    log: Vec<Mutation>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    /// A host holding only an empty `<body>` root.
    pub fn new() -> Self {
        Self {
            nodes: vec![HostNode {
                kind: NodeKind::Element {
                    tag: "body".to_string(),
                    attrs: Attrs::new(),
                },
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
            log: Vec::new(),
        }
    }

    /// A host whose body holds one `<div id="{id}">` to mount onto.
    /// The mutation log starts empty.
    pub fn with_mount_point(id: &str) -> Self {
        let mut host = Self::new();
        let div = host.create_element("div");
        host.set_attribute(div, "id", id);
        host.append_child(host.root, div);
        host.clear_mutations();
        host
    }

    /// The `<body>` root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    // =========================================================================
    // Mutation log
    // =========================================================================

    pub fn mutations(&self) -> &[Mutation] {
        &self.log
    }

    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.log)
    }

    pub fn clear_mutations(&mut self) {
        self.log.clear();
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    fn node(&self, id: NodeId) -> Option<&HostNode> {
        self.nodes.get(id.index())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut HostNode> {
        let node = self.nodes.get_mut(id.index());
        if node.is_none() {
            warn!(node = %id, "unknown host node");
        }
        node
    }

    /// Tag of an element node.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.node(id)
            .is_some_and(|node| matches!(node.kind, NodeKind::Text(_)))
    }

    /// Child handles in order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    /// Attributes of an element, in insertion order.
    pub fn attributes(&self, id: NodeId) -> Option<&Attrs> {
        match &self.node(id)?.kind {
            NodeKind::Element { attrs, .. } => Some(attrs),
            NodeKind::Text(_) => None,
        }
    }

    /// Whether `id` is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root {
                return true;
            }
            current = self.node(node).and_then(|n| n.parent);
        }
        false
    }

    /// Total nodes ever created, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Serialize a subtree to HTML.
    pub fn to_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    /// Serialize the children of `id` to HTML.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_html(child, &mut out);
        }
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else { return };
        match &node.kind {
            NodeKind::Text(text) => out.push_str(&escape(text, false)),
            NodeKind::Element { tag, attrs } => {
                let _ = write!(out, "<{tag}");
                for (name, value) in attrs {
                    let _ = write!(out, " {name}=\"{}\"", escape(value, true));
                }
                out.push('>');
                for &child in &node.children {
                    self.write_html(child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }

    // =========================================================================
    // Tree plumbing
    // =========================================================================

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(HostNode {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.node(child).and_then(|node| node.parent) else {
            return;
        };
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.retain(|&c| c != child);
        }
        if let Some(child_node) = self.node_mut(child) {
            child_node.parent = None;
        }
    }

    fn matches(&self, id: NodeId, selector: &str) -> bool {
        let Some(HostNode {
            kind: NodeKind::Element { tag, attrs },
            ..
        }) = self.node(id)
        else {
            return false;
        };
        if let Some(wanted) = selector.strip_prefix('#') {
            attrs.get("id").is_some_and(|id| id == wanted)
        } else if let Some(wanted) = selector.strip_prefix('.') {
            attrs
                .get("class")
                .is_some_and(|class| class.split_whitespace().any(|c| c == wanted))
        } else {
            tag.eq_ignore_ascii_case(selector)
        }
    }
}

impl HostTree for MemoryHost {
    fn create_element(&mut self, tag: &str) -> NodeId {
        let node = self.push_node(NodeKind::Element {
            tag: tag.to_string(),
            attrs: Attrs::new(),
        });
        self.log.push(Mutation::CreateElement {
            node,
            tag: tag.to_string(),
        });
        node
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        let node = self.push_node(NodeKind::Text(text.to_string()));
        self.log.push(Mutation::CreateText {
            node,
            text: text.to_string(),
        });
        node
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(HostNode {
            kind: NodeKind::Element { attrs, .. },
            ..
        }) = self.node_mut(node)
        {
            attrs.insert(name.to_string(), value.to_string());
        }
        self.log.push(Mutation::SetAttribute {
            node,
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(HostNode {
            kind: NodeKind::Element { attrs, .. },
            ..
        }) = self.node_mut(node)
        {
            attrs.shift_remove(name);
        }
        self.log.push(Mutation::RemoveAttribute {
            node,
            name: name.to_string(),
        });
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.attributes(node)?.get(name).cloned()
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) {
        self.log.push(Mutation::SetTextContent {
            node,
            text: text.to_string(),
        });

        if let Some(HostNode {
            kind: NodeKind::Text(current),
            ..
        }) = self.node_mut(node)
        {
            *current = text.to_string();
            return;
        }

        let old_children = self
            .node_mut(node)
            .map(|n| std::mem::take(&mut n.children))
            .unwrap_or_default();
        for child in old_children {
            if let Some(child_node) = self.node_mut(child) {
                child_node.parent = None;
            }
        }
        if !text.is_empty() {
            let text_node = self.push_node(NodeKind::Text(text.to_string()));
            if let Some(n) = self.node_mut(text_node) {
                n.parent = Some(node);
            }
            if let Some(n) = self.node_mut(node) {
                n.children.push(text_node);
            }
        }
    }

    fn text_content(&self, node: NodeId) -> String {
        let Some(host_node) = self.node(node) else {
            return String::new();
        };
        match &host_node.kind {
            NodeKind::Text(text) => text.clone(),
            NodeKind::Element { .. } => host_node
                .children
                .iter()
                .map(|&child| self.text_content(child))
                .collect(),
        }
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        if let Some(p) = self.node_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.node_mut(child) {
            c.parent = Some(parent);
        }
        self.log.push(Mutation::AppendChild { parent, child });
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        self.detach(child);
        if let Some(p) = self.node_mut(parent) {
            let position = reference
                .and_then(|r| p.children.iter().position(|&c| c == r))
                .unwrap_or(p.children.len());
            p.children.insert(position, child);
        }
        if let Some(c) = self.node_mut(child) {
            c.parent = Some(parent);
        }
        self.log.push(Mutation::InsertBefore {
            parent,
            child,
            reference,
        });
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.parent(child) == Some(parent) {
            self.detach(child);
        } else {
            warn!(parent = %parent, child = %child, "remove_child: not a child");
        }
        self.log.push(Mutation::RemoveChild { parent, child });
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let position = siblings.iter().position(|&c| c == node)?;
        siblings.get(position + 1).copied()
    }

    fn query(&self, selector: &str) -> Option<NodeId> {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if self.matches(id, selector) {
                return Some(id);
            }
            stack.extend(self.children(id).iter().rev().copied());
        }
        None
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
