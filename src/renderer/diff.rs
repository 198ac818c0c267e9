//! Differential reconciliation of two virtual trees.
//!
//! The old tree is already bound to live host nodes. The new tree adopts
//! those nodes wherever the tags line up and only the differences are
//! written to the host.
//!
//! # Children
//!
//! | old \ next | text                 | elements                      | empty            |
//! |------------|----------------------|-------------------------------|------------------|
//! | text       | write if different   | clear, realize + append all   | clear            |
//! | elements   | overwrite text       | positional list diff          | remove all       |
//! | empty      | write if non-empty   | realize + append all          | nothing          |
//!
//! Children are matched strictly by position; there are no keys, so a
//! reordered list shows up as in-place updates.

use tracing::{debug, warn};

use super::{PatchReport, Patcher, ReconcileConfig, TagChangePolicy};
use crate::error::{Error, Result};
use crate::host::HostTree;
use crate::types::{NodeId, PatchFlags};
use crate::vdom::{Children, VNode};

fn tag_label(vnode: &VNode) -> String {
    vnode.tag().unwrap_or("#text").to_string()
}

/// Walk both trees along the nodes a pass would adopt and fail on anything
/// the pass would fail on, before a single host write.
fn check_reconcilable(old: &VNode, next: &VNode, policy: TagChangePolicy) -> Result<()> {
    if old.el.is_none() {
        return Err(Error::Unrealized);
    }
    if old.tag != next.tag {
        return match policy {
            TagChangePolicy::Replace => Ok(()),
            TagChangePolicy::Reject => {
                let (from, to) = (tag_label(old), tag_label(next));
                warn!(%from, %to, "rejected tag change");
                Err(Error::UnsupportedReconciliation { from, to })
            }
        };
    }
    if let (Children::Elements(old_children), Children::Elements(children)) =
        (&old.children, &next.children)
    {
        for (old_child, child) in old_children.iter().zip(children) {
            check_reconcilable(old_child, child, policy)?;
        }
    }
    Ok(())
}

impl<H: HostTree + ?Sized> Patcher<'_, H> {
    /// Reconcile `next` against `old`, binding `next` to the host as it goes.
    pub(crate) fn patch_vnode(&mut self, old: &VNode, next: &mut VNode) -> Result<()> {
        let el = old.el.ok_or(Error::Unrealized)?;

        if old.tag != next.tag {
            self.replace(el, next);
            return Ok(());
        }
        next.el = Some(el);

        if next.is_text() {
            if old.children != next.children {
                let text = next.text_content().unwrap_or_default().to_string();
                self.set_text(el, &text);
            }
            return Ok(());
        }

        self.patch_attrs(el, old, next);
        self.patch_children(el, old, next)
    }

    fn replace(&mut self, el: NodeId, next: &mut VNode) {
        debug_assert_eq!(self.config.tag_change, TagChangePolicy::Replace);
        let new_el = self.create_elm(next);
        match self.host.parent(el) {
            Some(parent) => {
                self.insert_before(parent, new_el, Some(el));
                self.remove(parent, el);
            }
            None => debug!(old = %el, "replaced node was detached"),
        }
        self.report.flags |= PatchFlags::REPLACED;
    }

    fn patch_attrs(&mut self, el: NodeId, old: &VNode, next: &VNode) {
        for (name, value) in &next.attrs {
            if old.attrs.get(name) != Some(value) {
                self.set_attribute(el, name, value);
            }
        }
        for name in old.attrs.keys() {
            if !next.attrs.contains_key(name) {
                self.remove_attribute(el, name);
            }
        }
    }

    fn patch_children(&mut self, el: NodeId, old: &VNode, next: &mut VNode) -> Result<()> {
        match (&old.children, &mut next.children) {
            (Children::Text(old_text), Children::Text(text)) => {
                if old_text != text {
                    self.set_text(el, text);
                }
            }
            (Children::Empty, Children::Text(text)) => {
                if !text.is_empty() {
                    self.set_text(el, text);
                }
            }
            (Children::Elements(_), Children::Text(text)) => {
                // Old element children are dropped by the text write.
                self.set_text(el, text);
            }
            (Children::Elements(old_children), Children::Elements(children)) => {
                self.update_children(el, old_children, children)?;
            }
            (old_children, Children::Elements(children)) => {
                if matches!(old_children, Children::Text(_)) {
                    self.set_text(el, "");
                }
                for child in children.iter_mut() {
                    let child_el = self.create_elm(child);
                    self.append(el, child_el);
                }
            }
            (Children::Text(_), Children::Empty) => self.set_text(el, ""),
            (Children::Elements(old_children), Children::Empty) => {
                for child in old_children {
                    if let Some(child_el) = child.el {
                        self.remove(el, child_el);
                    }
                }
            }
            (Children::Empty, Children::Empty) => {}
        }
        Ok(())
    }

    /// Positional list diff.
    fn update_children(&mut self, parent: NodeId, old: &[VNode], next: &mut [VNode]) -> Result<()> {
        let common = old.len().min(next.len());

        for (old_child, child) in old.iter().zip(next.iter_mut()) {
            self.patch_vnode(old_child, child)?;
        }

        for child in next[common..].iter_mut() {
            let child_el = self.create_elm(child);
            self.append(parent, child_el);
        }

        for old_child in &old[common..] {
            if let Some(child_el) = old_child.el {
                self.remove(parent, child_el);
            }
        }

        Ok(())
    }
}

/// Reconcile `next` against the bound baseline `old` with the default
/// configuration.
pub fn patch<H: HostTree + ?Sized>(host: &mut H, old: &VNode, next: &mut VNode) -> Result<PatchReport> {
    patch_with(host, old, next, ReconcileConfig::default())
}

/// Reconcile `next` against the bound baseline `old`.
///
/// On success every node of `next` is bound to a live host node and `next`
/// should replace `old` as the baseline. On error the host is untouched and
/// `old` stays valid.
pub fn patch_with<H: HostTree + ?Sized>(
    host: &mut H,
    old: &VNode,
    next: &mut VNode,
    config: ReconcileConfig,
) -> Result<PatchReport> {
    next.validate()?;
    check_reconcilable(old, next, config.tag_change)?;
    let mut patcher = Patcher::new(host, config);
    patcher.patch_vnode(old, next)?;
    let report = patcher.finish();
    debug!(
        mutations = report.mutations,
        flags = ?report.flags,
        "patched"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryHost, Mutation};
    use crate::renderer::mount;
    use crate::types::{Attrs, attrs};
    use crate::vdom::{Child, create_element};

    /// Mount `old` on a fresh host and clear the log.
    fn mounted(mut old: VNode) -> (MemoryHost, VNode) {
        let mut host = MemoryHost::with_mount_point("app");
        let anchor = host.query("#app").unwrap();
        mount(&mut host, anchor, &mut old).unwrap();
        host.clear_mutations();
        (host, old)
    }

    fn el(tag: &str, a: Attrs, text: &str) -> VNode {
        let children = if text.is_empty() { vec![] } else { vec![text.into()] };
        create_element(tag, a, children).unwrap()
    }

    fn list(tag: &str, items: &[&str]) -> VNode {
        let children = items
            .iter()
            .map(|item| Child::from(el("li", Attrs::new(), item)))
            .collect();
        create_element(tag, Attrs::new(), children).unwrap()
    }

    fn html(host: &MemoryHost) -> String {
        host.inner_html(host.root())
    }

    #[test]
    fn test_attribute_diff_is_minimal() {
        let (mut host, old) = mounted(el("div", attrs([("id", "x")]), ""));
        let mut next = el("div", attrs([("id", "y"), ("cls", "z")]), "");

        let report = patch(&mut host, &old, &mut next).unwrap();
        let node = next.el().unwrap();

        assert_eq!(
            host.mutations(),
            &[
                Mutation::SetAttribute { node, name: "id".into(), value: "y".into() },
                Mutation::SetAttribute { node, name: "cls".into(), value: "z".into() },
            ]
        );
        assert_eq!(report.mutations, 2);
        assert_eq!(report.flags, PatchFlags::ATTRS);
    }

    #[test]
    fn test_removed_attribute() {
        let (mut host, old) = mounted(el("div", attrs([("id", "x"), ("title", "t")]), ""));
        let mut next = el("div", attrs([("id", "x")]), "");

        patch(&mut host, &old, &mut next).unwrap();
        let node = next.el().unwrap();
        assert_eq!(
            host.mutations(),
            &[Mutation::RemoveAttribute { node, name: "title".into() }]
        );
        assert_eq!(html(&host), "<div id=\"x\"></div>");
    }

    #[test]
    fn test_text_changes() {
        let (mut host, old) = mounted(el("p", Attrs::new(), "hi"));
        let mut same = el("p", Attrs::new(), "hi");
        assert!(patch(&mut host, &old, &mut same).unwrap().is_noop());

        let mut next = el("p", Attrs::new(), "bye");
        let report = patch(&mut host, &same, &mut next).unwrap();
        assert_eq!(report.flags, PatchFlags::TEXT);
        assert_eq!(html(&host), "<p>bye</p>");
    }

    #[test]
    fn test_text_to_elements_attaches_children() {
        let (mut host, old) = mounted(el("p", Attrs::new(), "hi"));
        let bold = el("b", Attrs::new(), "bold");
        let mut next = create_element("p", Attrs::new(), vec![bold.into()]).unwrap();

        patch(&mut host, &old, &mut next).unwrap();

        let p = next.el().unwrap();
        assert_eq!(
            host.mutations()[0],
            Mutation::SetTextContent { node: p, text: String::new() }
        );
        assert_eq!(html(&host), "<p><b>bold</b></p>");
        let b = next.children().elements()[0].el().unwrap();
        assert_eq!(host.parent(b), Some(p));
    }

    #[test]
    fn test_elements_to_text() {
        let (mut host, old) = mounted(list("ul", &["a", "b"]));
        let mut next = el("ul", Attrs::new(), "empty");
        patch(&mut host, &old, &mut next).unwrap();
        assert_eq!(html(&host), "<ul>empty</ul>");
    }

    #[test]
    fn test_elements_to_empty_removes_children() {
        let (mut host, old) = mounted(list("ul", &["a", "b"]));
        let mut next = list("ul", &[]);
        let report = patch(&mut host, &old, &mut next).unwrap();
        assert_eq!(html(&host), "<ul></ul>");
        assert_eq!(report.mutations, 2);
        assert_eq!(report.flags, PatchFlags::REMOVED);
    }

    #[test]
    fn test_list_growth_appends() {
        let (mut host, old) = mounted(list("ul", &["a", "b"]));
        let kept: Vec<_> = old.children().elements().iter().map(|c| c.el()).collect();
        let mut next = list("ul", &["a", "b", "c", "d"]);

        let report = patch(&mut host, &old, &mut next).unwrap();

        let now: Vec<_> = next.children().elements().iter().map(|c| c.el()).collect();
        assert_eq!(&now[..2], &kept[..]);
        assert_eq!(
            html(&host),
            "<ul><li>a</li><li>b</li><li>c</li><li>d</li></ul>"
        );
        // Two realized <li>, two appends.
        assert_eq!(report.flags, PatchFlags::CREATED);
        assert_eq!(report.mutations, 4);
    }

    #[test]
    fn test_list_shrink_removes_excess_old_nodes() {
        let (mut host, old) = mounted(list("ul", &["a", "b", "c", "d"]));
        let excess: Vec<_> = old.children().elements()[2..]
            .iter()
            .filter_map(|c| c.el())
            .collect();
        let mut next = list("ul", &["a", "x"]);

        patch(&mut host, &old, &mut next).unwrap();

        assert_eq!(html(&host), "<ul><li>a</li><li>x</li></ul>");
        for node in excess {
            assert!(!host.is_attached(node));
        }
        let ul = next.el().unwrap();
        assert_eq!(host.children(ul).len(), 2);
    }

    #[test]
    fn test_identical_tree_applies_nothing() {
        let (mut host, old) = mounted(list("ul", &["a", "b", "c"]));
        let mut next = list("ul", &["a", "b", "c"]);
        assert_eq!(old, next);

        let report = patch(&mut host, &old, &mut next).unwrap();
        assert!(report.is_noop());
        assert!(host.mutations().is_empty());
    }

    #[test]
    fn test_tag_change_replaces_by_default() {
        let (mut host, old) = mounted(el("div", Attrs::new(), "x"));
        let mut next = el("section", Attrs::new(), "x");

        let report = patch(&mut host, &old, &mut next).unwrap();

        assert!(report.flags.contains(PatchFlags::REPLACED));
        assert_ne!(next.el(), old.el());
        assert_eq!(html(&host), "<section>x</section>");
    }

    #[test]
    fn test_nested_tag_change_keeps_position() {
        let a = el("i", Attrs::new(), "1");
        let b = el("b", Attrs::new(), "2");
        let c = el("i", Attrs::new(), "3");
        let old = create_element("p", Attrs::new(), vec![a.into(), b.into(), c.into()]).unwrap();
        let (mut host, old) = mounted(old);

        let a = el("i", Attrs::new(), "1");
        let b = el("u", Attrs::new(), "2");
        let c = el("i", Attrs::new(), "3");
        let mut next = create_element("p", Attrs::new(), vec![a.into(), b.into(), c.into()]).unwrap();

        patch(&mut host, &old, &mut next).unwrap();
        assert_eq!(html(&host), "<p><i>1</i><u>2</u><i>3</i></p>");
    }

    #[test]
    fn test_tag_change_rejected_when_configured() {
        let (mut host, old) = mounted(el("div", Attrs::new(), "x"));
        let mut next = el("span", Attrs::new(), "x");
        let config = ReconcileConfig::new().tag_change(TagChangePolicy::Reject);

        let err = patch_with(&mut host, &old, &mut next, config).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedReconciliation { ref from, ref to } if from == "div" && to == "span"
        ));
        assert!(host.mutations().is_empty());
    }

    #[test]
    fn test_nested_tag_change_rejected_before_any_write() {
        let old = create_element(
            "div",
            attrs([("id", "a")]),
            vec![
                el("p", Attrs::new(), "0").into(),
                el("h1", Attrs::new(), "t").into(),
            ],
        )
        .unwrap();
        let (mut host, old) = mounted(old);
        let before = html(&host);

        let mut next = create_element(
            "div",
            attrs([("id", "b")]),
            vec![
                el("p", Attrs::new(), "1").into(),
                el("h2", Attrs::new(), "t").into(),
            ],
        )
        .unwrap();
        let config = ReconcileConfig::new().tag_change(TagChangePolicy::Reject);

        let err = patch_with(&mut host, &old, &mut next, config).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedReconciliation { ref from, ref to } if from == "h1" && to == "h2"
        ));
        assert!(host.mutations().is_empty());
        assert_eq!(html(&host), before);

        // The untouched baseline still drives a correct later pass.
        let mut back = create_element(
            "div",
            attrs([("id", "a")]),
            vec![
                el("p", Attrs::new(), "0").into(),
                el("h1", Attrs::new(), "t").into(),
            ],
        )
        .unwrap();
        assert!(patch_with(&mut host, &old, &mut back, config).unwrap().is_noop());
    }

    #[test]
    fn test_unrealized_child_fails_before_any_write() {
        let (mut host, mut old) = mounted(list("ul", &["a", "b"]));
        if let Children::Elements(children) = &mut old.children {
            children[1].el = None;
        }
        let mut next = list("ul", &["x", "y"]);

        let err = patch(&mut host, &old, &mut next).unwrap_err();
        assert!(matches!(err, Error::Unrealized));
        assert!(host.mutations().is_empty());
    }

    #[test]
    fn test_text_node_children() {
        let old = create_element("p", Attrs::new(), vec![VNode::text("a").into()]).unwrap();
        let (mut host, old) = mounted(old);
        let mut next = create_element("p", Attrs::new(), vec![VNode::text("b").into()]).unwrap();

        let report = patch(&mut host, &old, &mut next).unwrap();
        assert_eq!(report.mutations, 1);
        assert_eq!(html(&host), "<p>b</p>");
    }

    #[test]
    fn test_unrealized_baseline() {
        let mut host = MemoryHost::new();
        let old = el("div", Attrs::new(), "");
        let mut next = el("div", Attrs::new(), "");
        let err = patch(&mut host, &old, &mut next).unwrap_err();
        assert!(matches!(err, Error::Unrealized));
    }
}
