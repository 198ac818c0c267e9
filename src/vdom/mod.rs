//! Virtual Tree - Declarative descriptions of host trees.
//!
//! A render function returns one root [`VNode`]. Nodes are rebuilt from
//! scratch on every render; the renderer diffs each new tree against the
//! previous one and keeps the new tree as the baseline.
//!
//! ```
//! use spark_vdom::{attrs, create_element, Attrs};
//!
//! let tree = create_element(
//!     "ul",
//!     attrs([("class", "todos")]),
//!     vec![
//!         create_element("li", Attrs::new(), vec!["write tests".into()])?.into(),
//!         create_element("li", Attrs::new(), vec!["ship".into()])?.into(),
//!     ],
//! )?;
//! assert_eq!(tree.node_count(), 3);
//! # Ok::<(), spark_vdom::Error>(())
//! ```

mod node;

pub use node::{Child, Children, CreateElement, VNode, create_element};

/// Short alias for [`create_element`].
pub use node::create_element as h;
