//! Realizing virtual trees and the initial mount.

use tracing::debug;

use super::{PatchReport, Patcher, ReconcileConfig};
use crate::error::{Error, Result};
use crate::host::HostTree;
use crate::types::{NodeId, PatchFlags};
use crate::vdom::{Children, VNode};

impl<H: HostTree + ?Sized> Patcher<'_, H> {
    /// Build a detached host subtree for `vnode`, binding every node's `el`.
    pub(crate) fn create_elm(&mut self, vnode: &mut VNode) -> NodeId {
        let el = match vnode.tag.as_deref() {
            None => {
                let text = vnode.text_content().unwrap_or_default();
                self.host.create_text(text)
            }
            Some(tag) => {
                let el = self.host.create_element(tag);
                for (name, value) in &vnode.attrs {
                    self.host.set_attribute(el, name, value);
                }
                match &mut vnode.children {
                    Children::Empty => {}
                    Children::Text(text) => {
                        if !text.is_empty() {
                            self.host.set_text_content(el, text);
                        }
                    }
                    Children::Elements(children) => {
                        for child in children.iter_mut() {
                            let child_el = self.create_elm(child);
                            self.host.append_child(el, child_el);
                        }
                    }
                }
                el
            }
        };
        self.record(PatchFlags::CREATED);
        vnode.el = Some(el);
        el
    }
}

/// Realize `vnode` as a detached host subtree and return its root.
///
/// Fails only if the tree is malformed.
pub fn create_elm<H: HostTree + ?Sized>(host: &mut H, vnode: &mut VNode) -> Result<NodeId> {
    vnode.validate()?;
    Ok(Patcher::new(host, ReconcileConfig::default()).create_elm(vnode))
}

/// Initial mount: realize `vnode`, insert it where `anchor` is, remove `anchor`.
///
/// After this returns, `vnode` is bound to the host and can serve as the
/// baseline for [`patch`](super::patch).
pub fn mount<H: HostTree + ?Sized>(
    host: &mut H,
    anchor: NodeId,
    vnode: &mut VNode,
) -> Result<PatchReport> {
    vnode.validate()?;
    let parent = host.parent(anchor).ok_or(Error::DetachedAnchor)?;
    let reference = host.next_sibling(anchor);

    let mut patcher = Patcher::new(host, ReconcileConfig::default());
    let el = patcher.create_elm(vnode);
    patcher.insert_before(parent, el, reference);
    patcher.remove(parent, anchor);

    let mut report = patcher.finish();
    report.flags |= PatchFlags::MOUNTED;
    debug!(
        anchor = %anchor,
        el = %el,
        nodes = vnode.node_count(),
        "mounted"
    );
    Ok(report)
}
