//! Reconcile - Diff a mounted virtual subtree against its next description.
//!
//! Four cases:
//! - nothing before, nothing now: no-op
//! - nothing before: mount and insert, then run post-mount hooks
//! - nothing now: unmount
//! - both: diff in place when the kinds match, replace otherwise
//!
//! Mount state (native ids, rendered subtrees, instances) moves from the old
//! vnode to the new one, so after a pass only the new tree is live.

use crate::component::{self, instance, receive_props, retire, run_post_mount, Updater};
use crate::error::{Error, Result};
use crate::native::{self, NativeId};
use crate::vnode::{NodeRef, RefTarget, VKind, VNode};

use super::children::reconcile_children;
use super::mount::{attach_ref, mount};
use super::props::sync_props;

/// Bring the native subtree of `old` under `parent` in line with `new`.
///
/// `next` is the native node new content goes in front of when nothing
/// better is known (`None` appends). Updates requested by lifecycle hooks
/// during the pass are applied before returning.
pub fn reconcile(
    old: Option<&mut VNode>,
    new: Option<&mut VNode>,
    parent: NativeId,
    next: Option<NativeId>,
) -> Result<()> {
    component::batch(|| reconcile_in(old, new, parent, next))
}

pub(crate) fn reconcile_in(
    old: Option<&mut VNode>,
    new: Option<&mut VNode>,
    parent: NativeId,
    next: Option<NativeId>,
) -> Result<()> {
    match (old, new) {
        (None, None) => Ok(()),
        (None, Some(new)) => mount_into(new, parent, next),
        (Some(old), None) => unmount(old),
        (Some(old), Some(new)) if old.kind.same_kind(&new.kind) => update(old, new, parent, next),
        (Some(old), Some(new)) => replace(old, new, parent, next),
    }
}

/// Mount `vnode`, insert it before `anchor`, and run post-mount hooks.
pub(crate) fn mount_into(vnode: &mut VNode, parent: NativeId, anchor: Option<NativeId>) -> Result<()> {
    let mut mounted = Vec::new();
    let id = mount(vnode, &mut mounted)?;
    native::insert_before(parent, id, anchor)?;
    run_post_mount(mounted)
}

fn replace(old: &mut VNode, new: &mut VNode, parent: NativeId, next: Option<NativeId>) -> Result<()> {
    tracing::debug!(from = old.kind.label(), to = new.kind.label(), "replace");
    let anchor = old.last_native().and_then(native::next_sibling).or(next);
    unmount(old)?;
    mount_into(new, parent, anchor)
}

fn update(old: &mut VNode, new: &mut VNode, parent: NativeId, next: Option<NativeId>) -> Result<()> {
    match &new.kind {
        VKind::Text(text) => {
            let id = old.native.ok_or(Error::Detached("#text"))?;
            native::set_text(id, text)?;
            new.native = Some(id);
            swap_ref(&old.node_ref, &new.node_ref, RefTarget::Native(id));
        }

        VKind::Element(_) => {
            let id = old.native.ok_or(Error::Detached("element"))?;
            new.native = Some(id);
            sync_props(id, &old.props, &new.props)?;
            reconcile_children(id, &mut old.children, &mut new.children, None)?;
            swap_ref(&old.node_ref, &new.node_ref, RefTarget::Native(id));
        }

        VKind::Fragment => {
            let end = old.last_native().and_then(native::next_sibling).or(next);
            reconcile_children(parent, &mut old.children, &mut new.children, end)?;
        }

        VKind::Function(function) => {
            let mut rendered = (function.render)(&new.props, &new.children);
            reconcile_in(old.rendered.as_deref_mut(), Some(&mut rendered), parent, next)?;
            new.rendered = Some(Box::new(rendered));
        }

        VKind::ForwardRef(forward) => {
            let mut rendered = (forward.render)(&new.props, &new.children, new.node_ref.as_ref());
            reconcile_in(old.rendered.as_deref_mut(), Some(&mut rendered), parent, next)?;
            new.rendered = Some(Box::new(rendered));
        }

        VKind::Class(class) => {
            let id = old.instance.take().ok_or(Error::Detached(class.name))?;
            let cell = instance::get(id).ok_or(Error::Detached(class.name))?;
            new.instance = Some(id);
            swap_ref(&old.node_ref, &new.node_ref, RefTarget::Instance(Updater::new(id)));
            receive_props(&cell, new.props.clone(), new.children.clone())?;
        }
    }
    Ok(())
}

/// Point the new ref at `target`, clearing the old one if it is a different cell.
fn swap_ref(old: &Option<NodeRef>, new: &Option<NodeRef>, target: RefTarget) {
    if let Some(old) = old {
        if new.as_ref() != Some(old) {
            old.set(None);
        }
    }
    attach_ref(new.as_ref(), target);
}

// =============================================================================
// Unmount
// =============================================================================

/// Tear down `vnode` and remove its native nodes.
///
/// Hooks run first, innermost first, while the native nodes are still
/// attached; the native nodes are released afterwards.
pub(crate) fn unmount(vnode: &mut VNode) -> Result<()> {
    tracing::debug!(kind = vnode.kind.label(), "unmount");
    let natives = vnode.native_nodes();
    teardown(vnode);
    for id in natives {
        native::release(id)?;
    }
    Ok(())
}

fn teardown(vnode: &mut VNode) {
    match &vnode.kind {
        VKind::Text(_) => {}
        VKind::Element(_) | VKind::Fragment => {
            for child in &mut vnode.children {
                teardown(child);
            }
        }
        VKind::Function(_) | VKind::ForwardRef(_) => {
            if let Some(rendered) = vnode.rendered.as_deref_mut() {
                teardown(rendered);
            }
        }
        VKind::Class(_) => {
            if let Some(cell) = vnode.instance.take().and_then(instance::get) {
                let rendered = cell.rendered.borrow_mut().take();
                if let Some(mut rendered) = rendered {
                    teardown(&mut rendered);
                }
                retire(&cell);
            }
        }
    }

    if let Some(node_ref) = &vnode.node_ref {
        node_ref.set(None);
    }
    vnode.native = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Props, Style};

    fn setup() -> NativeId {
        native::reset_tree();
        native::create_container()
    }

    fn mounted(vnode: VNode, container: NativeId) -> VNode {
        let mut vnode = vnode;
        reconcile(None, Some(&mut vnode), container, None).unwrap();
        vnode
    }

    #[test]
    fn test_text_mutates_once() {
        let container = setup();
        let mut old = mounted(VNode::text("a"), container);
        let id = old.native().unwrap();

        let mut new = VNode::text("b");
        reconcile(Some(&mut old), Some(&mut new), container, None).unwrap();
        assert_eq!(native::mutation_count(id), 1);
        assert_eq!(native::text(id).as_deref(), Some("b"));

        let mut same = VNode::text("b");
        reconcile(Some(&mut new), Some(&mut same), container, None).unwrap();
        assert_eq!(native::mutation_count(id), 1);
        assert_eq!(same.native(), Some(id));
    }

    #[test]
    fn test_replace_keeps_position() {
        let container = setup();
        let mut old = mounted(
            VNode::fragment([VNode::text("a"), VNode::element("b"), VNode::text("c")]),
            container,
        );

        let mut new = VNode::fragment([VNode::text("a"), VNode::element("i"), VNode::text("c")]);
        reconcile(Some(&mut old), Some(&mut new), container, None).unwrap();
        assert_eq!(native::inner_markup(container), "a<i></i>c");
    }

    #[test]
    fn test_unmount_clears_refs_and_nodes() {
        let container = setup();
        let node_ref = NodeRef::new();
        let mut old = mounted(
            VNode::element("div").child(VNode::element("span").node_ref(&node_ref)),
            container,
        );
        assert!(node_ref.is_set());
        let span = node_ref.native().unwrap();

        reconcile(Some(&mut old), None, container, None).unwrap();
        assert!(!node_ref.is_set());
        assert!(!native::exists(span));
        assert!(native::children(container).is_empty());
    }

    #[test]
    fn test_round_trip_is_silent() {
        let container = setup();
        let tree = VNode::element("section")
            .prop("id", "main")
            .style(Style::new().with("color", "red"))
            .child(VNode::element("p").key("p").child("hello"))
            .child(VNode::fragment(["x", "y"]))
            .child(VNode::element("p").key("q").props(Props::new().with("hidden", true)));
        let mut old = mounted(tree.clone(), container);

        let before = native::total_mutations();
        let mut copy = tree;
        reconcile(Some(&mut old), Some(&mut copy), container, None).unwrap();
        assert_eq!(native::total_mutations(), before);
        assert_eq!(copy.find_native(), old.find_native());
    }
}
