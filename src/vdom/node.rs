//! Virtual nodes and the `create_element` helper handed to render functions.

use std::fmt;

use crate::error::{Error, Result};
use crate::types::{Attrs, NodeId};

/// Children of a virtual node: nothing, one text run, or element nodes.
///
/// Text and element children never mix.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Children {
    #[default]
    Empty,
    Text(String),
    Elements(Vec<VNode>),
}

impl Children {
    pub fn is_text(&self) -> bool {
        matches!(self, Children::Text(_))
    }

    /// Element children, or an empty slice.
    pub fn elements(&self) -> &[VNode] {
        match self {
            Children::Elements(nodes) => nodes,
            _ => &[],
        }
    }
}

/// One argument in a `create_element` children list.
#[derive(Debug, Clone)]
pub enum Child {
    Text(String),
    Node(VNode),
}

impl From<VNode> for Child {
    fn from(node: VNode) -> Self {
        Child::Node(node)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

/// Signature of the element helper passed to render functions.
pub type CreateElement = fn(&str, Attrs, Vec<Child>) -> Result<VNode>;

/// Declarative description of one host node.
///
/// `tag == None` is a plain text node; its text lives in
/// [`Children::Text`]. `el` is the back-reference to the realized host node,
/// filled in by the renderer.
#[derive(Clone, Default)]
pub struct VNode {
    pub(crate) tag: Option<String>,
    pub(crate) attrs: Attrs,
    pub(crate) children: Children,
    pub(crate) el: Option<NodeId>,
}

impl VNode {
    /// An element node. Validates like [`create_element`].
    pub fn element(tag: impl Into<String>, attrs: Attrs, children: Children) -> Result<Self> {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(Error::malformed("element tag is empty"));
        }
        Ok(Self {
            tag: Some(tag),
            attrs,
            children,
            el: None,
        })
    }

    /// A plain text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            tag: None,
            attrs: Attrs::new(),
            children: Children::Text(text.into()),
            el: None,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn is_text(&self) -> bool {
        self.tag.is_none()
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn children(&self) -> &Children {
        &self.children
    }

    /// Host node this virtual node was realized into, if any.
    pub fn el(&self) -> Option<NodeId> {
        self.el
    }

    /// Text of a text node, or the text child of an element.
    pub fn text_content(&self) -> Option<&str> {
        match &self.children {
            Children::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Total nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .elements()
            .iter()
            .map(VNode::node_count)
            .sum::<usize>()
    }

    /// Check the structural invariants of the whole subtree.
    pub fn validate(&self) -> Result<()> {
        self.check_shape()?;
        self.children.elements().iter().try_for_each(VNode::validate)
    }

    /// Check this node alone; children are not visited.
    pub(crate) fn check_shape(&self) -> Result<()> {
        match &self.tag {
            None => {
                if !self.attrs.is_empty() {
                    return Err(Error::malformed("text node carries attributes"));
                }
                if !matches!(self.children, Children::Text(_)) {
                    return Err(Error::malformed("text node without a single text child"));
                }
                Ok(())
            }
            Some(tag) if tag.is_empty() => Err(Error::malformed("element tag is empty")),
            Some(_) => Ok(()),
        }
    }
}

/// Description equality: tag, attributes and children. The host
/// back-reference is not part of the description.
impl PartialEq for VNode {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && self.attrs == other.attrs && self.children == other.children
    }
}

impl fmt::Debug for VNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            None => write!(f, "Text({:?})", self.text_content().unwrap_or_default()),
            Some(tag) => {
                let mut s = f.debug_struct("VNode");
                s.field("tag", tag);
                if !self.attrs.is_empty() {
                    s.field("attrs", &self.attrs);
                }
                match &self.children {
                    Children::Empty => {}
                    Children::Text(text) => {
                        s.field("text", text);
                    }
                    Children::Elements(nodes) => {
                        s.field("children", nodes);
                    }
                }
                if let Some(el) = self.el {
                    s.field("el", &el);
                }
                s.finish()
            }
        }
    }
}

// =============================================================================
// create_element
// =============================================================================

/// Build an element node from a tag, attributes and a children list.
///
/// - no children → [`Children::Empty`]
/// - exactly one text child → [`Children::Text`]
/// - only node children → [`Children::Elements`]
///
/// Anything else (text mixed with nodes, several text runs) is a
/// [`Error::MalformedVirtualNode`], as is an empty tag. Each child is checked
/// on its own; whole trees are validated once when mounted or patched.
pub fn create_element(tag: &str, attrs: Attrs, children: Vec<Child>) -> Result<VNode> {
    let texts = children
        .iter()
        .filter(|child| matches!(child, Child::Text(_)))
        .count();

    let children = match (texts, children.len()) {
        (0, 0) => Children::Empty,
        (1, 1) => match children.into_iter().next() {
            Some(Child::Text(text)) => Children::Text(text),
            _ => Children::Empty,
        },
        (0, _) => {
            let mut nodes = Vec::with_capacity(children.len());
            for child in children {
                if let Child::Node(node) = child {
                    node.check_shape()?;
                    nodes.push(node);
                }
            }
            Children::Elements(nodes)
        }
        (1, n) => {
            return Err(Error::malformed(format!(
                "<{tag}> mixes a text child with {} element children",
                n - 1
            )));
        }
        (t, _) => {
            return Err(Error::malformed(format!(
                "<{tag}> has {t} text children; join them into one"
            )));
        }
    };

    VNode::element(tag, attrs, children)
}
