//! Mount - Turn a virtual node into native nodes.
//!
//! `mount` builds the native subtree for a vnode and records mount state on
//! it, but never attaches the result anywhere. Class instances created along
//! the way are pushed onto the caller's post-mount queue (innermost first);
//! the caller runs `did_mount` for them once the subtree is attached.

use crate::component::{instance, Updater};
use crate::error::Result;
use crate::native::{self, NativeId};
use crate::types::Props;
use crate::vnode::{NodeRef, RefTarget, VKind, VNode};

use super::props::sync_props;

/// Build the native subtree for `vnode`.
///
/// Returns the node to insert: a text or element node, or a transient
/// fragment holding several top-level nodes.
pub(crate) fn mount(vnode: &mut VNode, mounted: &mut Vec<Updater>) -> Result<NativeId> {
    tracing::trace!(kind = vnode.kind.label(), "mount");

    let id = match &vnode.kind {
        VKind::Text(text) => {
            let id = native::create_text(text);
            vnode.native = Some(id);
            attach_ref(vnode.node_ref.as_ref(), RefTarget::Native(id));
            id
        }

        VKind::Element(tag) => {
            let id = native::create_element(tag);
            sync_props(id, &Props::new(), &vnode.props)?;
            mount_children(id, &mut vnode.children, mounted)?;
            vnode.native = Some(id);
            attach_ref(vnode.node_ref.as_ref(), RefTarget::Native(id));
            id
        }

        VKind::Fragment => {
            let id = native::create_fragment();
            mount_children(id, &mut vnode.children, mounted)?;
            id
        }

        VKind::Function(function) => {
            let mut rendered = (function.render)(&vnode.props, &vnode.children);
            let id = mount(&mut rendered, mounted)?;
            vnode.rendered = Some(Box::new(rendered));
            id
        }

        VKind::ForwardRef(forward) => {
            let mut rendered = (forward.render)(&vnode.props, &vnode.children, vnode.node_ref.as_ref());
            let id = mount(&mut rendered, mounted)?;
            vnode.rendered = Some(Box::new(rendered));
            id
        }

        VKind::Class(class) => {
            let component = (class.create)(&vnode.props);
            let cell = instance::allocate(
                class.name,
                component,
                vnode.props.clone(),
                vnode.children.clone(),
            );
            vnode.instance = Some(cell.id);
            let updater = Updater::new(cell.id);

            cell.with_ctx(|component, ctx| component.will_mount(ctx));
            // Requests from will_mount land before the first render
            if !cell.pending_state.borrow().is_empty() {
                let state = cell.next_state();
                cell.state.replace(state);
            }
            cell.force.set(false);

            attach_ref(vnode.node_ref.as_ref(), RefTarget::Instance(updater.clone()));

            let mut rendered = cell.render();
            let id = mount(&mut rendered, mounted)?;
            cell.rendered.replace(Some(rendered));
            mounted.push(updater);
            tracing::debug!(instance = %cell.id, name = cell.name, "mounted component");
            id
        }
    };

    Ok(id)
}

/// Mount `children` in order and append them to `parent`.
pub(crate) fn mount_children(
    parent: NativeId,
    children: &mut [VNode],
    mounted: &mut Vec<Updater>,
) -> Result<()> {
    for (index, child) in children.iter_mut().enumerate() {
        child.mount_index = index;
        let id = mount(child, mounted)?;
        native::append_child(parent, id)?;
    }
    Ok(())
}

pub(crate) fn attach_ref(node_ref: Option<&NodeRef>, target: RefTarget) {
    if let Some(node_ref) = node_ref {
        node_ref.set(Some(target));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn badge(props: &Props, _children: &[VNode]) -> VNode {
        VNode::element("b").child(props.get_str("label").unwrap_or("?"))
    }

    #[test]
    fn test_mount_element_tree() {
        native::reset_tree();

        let mut vnode = VNode::element("ul")
            .prop("id", "list")
            .child(VNode::element("li").child("one"))
            .child(VNode::element("li").child("two"));
        let mut mounted = Vec::new();
        let id = mount(&mut vnode, &mut mounted).unwrap();

        assert_eq!(vnode.native(), Some(id));
        assert_eq!(native::markup(id), r#"<ul id="list"><li>one</li><li>two</li></ul>"#);
        assert_eq!(vnode.get_children()[1].mount_index(), 1);
        assert!(mounted.is_empty());
    }

    #[test]
    fn test_mount_fragment_splices() {
        native::reset_tree();

        let container = native::create_container();
        let mut vnode = VNode::fragment(["a", "b"]);
        let id = mount(&mut vnode, &mut Vec::new()).unwrap();
        native::append_child(container, id).unwrap();

        assert!(!native::exists(id));
        assert_eq!(native::inner_markup(container), "ab");
        assert_eq!(vnode.native_nodes().len(), 2);
        assert!(vnode.native().is_none());
    }

    #[test]
    fn test_mount_function_and_ref() {
        native::reset_tree();

        let node_ref = NodeRef::new();
        let mut vnode = VNode::element("div")
            .node_ref(&node_ref)
            .child(VNode::function(badge).prop("label", "new"));
        let id = mount(&mut vnode, &mut Vec::new()).unwrap();

        assert_eq!(node_ref.native(), Some(id));
        assert_eq!(native::markup(id), "<div><b>new</b></div>");
        let function = &vnode.get_children()[0];
        assert!(function.native().is_none());
        assert!(function.rendered().is_some());
        assert_eq!(function.find_native(), native::children(id).first().copied());
    }
}
