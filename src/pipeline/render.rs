//! Render API - Mount a tree into a container.
//!
//! # Example
//!
//! ```
//! use spark_vdom::{native, render, VNode};
//!
//! let container = native::create_container();
//! let root = render(VNode::element("p").child("hello"), container)?;
//!
//! assert_eq!(native::inner_markup(container), "<p>hello</p>");
//! assert!(root.native().is_some());
//! # Ok::<(), spark_vdom::Error>(())
//! ```

use crate::component::{self, instance};
use crate::config;
use crate::error::Result;
use crate::native::{self, NativeId};
use crate::reconciler::mount_into;
use crate::vnode::VNode;

/// Mount `vnode` and append it to `container`.
///
/// Existing children of `container` are kept; rendering twice appends twice.
/// Post-mount hooks and any updates they request have run by the time this
/// returns. The returned tree carries the mount state needed to reconcile it
/// later.
pub fn render(vnode: VNode, container: NativeId) -> Result<VNode> {
    tracing::debug!(%container, kind = vnode.kind().label(), "render");
    component::batch(|| {
        let mut vnode = vnode;
        mount_into(&mut vnode, container, None)?;
        Ok(vnode)
    })
}

/// First native node a mounted vnode maps to.
pub fn find_native(vnode: &VNode) -> Option<NativeId> {
    vnode.find_native()
}

/// Drop all runtime state on this thread: native nodes, handlers, instances,
/// queued updates and configuration.
pub fn reset_runtime() {
    native::reset_tree();
    instance::reset_instances();
    component::reset_scheduler();
    config::reset_config();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_appends() {
        reset_runtime();
        let container = native::create_container();

        let first = render(VNode::text("a"), container).unwrap();
        render(VNode::text("b"), container).unwrap();

        assert_eq!(native::inner_markup(container), "ab");
        assert_eq!(find_native(&first), native::children(container).first().copied());
    }

    #[test]
    fn test_render_into_text_fails() {
        reset_runtime();
        let text = native::create_text("leaf");

        let err = render(VNode::element("div"), text).unwrap_err();
        assert_eq!(err, crate::error::Error::NotAnElement(text));
    }
}
