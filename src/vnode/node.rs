//! Virtual nodes and their builder.

use std::any::TypeId;
use std::fmt;

use crate::component::{instance, Component, InstanceId};
use crate::native::NativeId;
use crate::types::{Handler, Key, PropValue, Props, Style};

use super::node_ref::NodeRef;

// =============================================================================
// Kinds
// =============================================================================

/// Render function of a function component.
pub type RenderFn = fn(&Props, &[VNode]) -> VNode;

/// Render function of a forwarded-ref component; receives the ref given to it.
pub type ForwardRenderFn = fn(&Props, &[VNode], Option<&NodeRef>) -> VNode;

/// A stateless component: props in, tree out.
#[derive(Clone, Copy)]
pub struct FunctionComponent {
    pub render: RenderFn,
}

/// A class component type. Two vnodes have the same class when their
/// component types are the same Rust type.
#[derive(Clone, Copy)]
pub struct ClassComponent {
    pub name: &'static str,
    pub type_id: TypeId,
    pub create: fn(&Props) -> Box<dyn Component>,
}

/// A component that forwards its ref to something it renders.
#[derive(Clone, Copy)]
pub struct ForwardRef {
    pub render: ForwardRenderFn,
}

/// What a virtual node describes. Never changes once the node is created.
#[derive(Clone)]
pub enum VKind {
    Text(String),
    Fragment,
    Element(String),
    Function(FunctionComponent),
    Class(ClassComponent),
    ForwardRef(ForwardRef),
}

impl VKind {
    /// Whether two kinds may be diffed in place. Text payloads and props do
    /// not matter; tags, component functions and component types do.
    pub fn same_kind(&self, other: &VKind) -> bool {
        match (self, other) {
            (Self::Text(_), Self::Text(_)) => true,
            (Self::Fragment, Self::Fragment) => true,
            (Self::Element(a), Self::Element(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => std::ptr::fn_addr_eq(a.render, b.render),
            (Self::Class(a), Self::Class(b)) => a.type_id == b.type_id,
            (Self::ForwardRef(a), Self::ForwardRef(b)) => std::ptr::fn_addr_eq(a.render, b.render),
            _ => false,
        }
    }

    /// Short label for logs and errors.
    pub fn label(&self) -> &str {
        match self {
            Self::Text(_) => "#text",
            Self::Fragment => "#fragment",
            Self::Element(tag) => tag,
            Self::Function(_) => "function component",
            Self::Class(class) => class.name,
            Self::ForwardRef(_) => "forward ref",
        }
    }
}

impl fmt::Debug for VKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Fragment => f.write_str("Fragment"),
            Self::Element(tag) => f.debug_tuple("Element").field(tag).finish(),
            Self::Function(_) => f.write_str("Function"),
            Self::Class(class) => f.debug_tuple("Class").field(&class.name).finish(),
            Self::ForwardRef(_) => f.write_str("ForwardRef"),
        }
    }
}

fn create_boxed<C: Component>(props: &Props) -> Box<dyn Component> {
    Box::new(C::create(props))
}

// =============================================================================
// VNode
// =============================================================================

/// A description of what to render, plus the mount state the runtime fills
/// in when the description is mounted or diffed.
///
/// Cloning yields a fresh, unmounted description: mount state is not copied.
pub struct VNode {
    pub(crate) kind: VKind,
    pub(crate) props: Props,
    pub(crate) children: Vec<VNode>,
    pub(crate) key: Option<Key>,
    pub(crate) node_ref: Option<NodeRef>,
    pub(crate) native: Option<NativeId>,
    pub(crate) rendered: Option<Box<VNode>>,
    pub(crate) instance: Option<InstanceId>,
    pub(crate) mount_index: usize,
}

impl VNode {
    fn new(kind: VKind) -> Self {
        Self {
            kind,
            props: Props::new(),
            children: Vec::new(),
            key: None,
            node_ref: None,
            native: None,
            rendered: None,
            instance: None,
            mount_index: 0,
        }
    }

    /// A native element with the given tag.
    pub fn element(tag: impl Into<String>) -> Self {
        Self::new(VKind::Element(tag.into()))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(VKind::Text(text.into()))
    }

    /// A grouping of children with no native node of its own.
    pub fn fragment<I>(children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<VNode>,
    {
        Self::new(VKind::Fragment).children(children)
    }

    pub fn function(render: RenderFn) -> Self {
        Self::new(VKind::Function(FunctionComponent { render }))
    }

    pub fn class<C: Component>() -> Self {
        Self::new(VKind::Class(ClassComponent {
            name: std::any::type_name::<C>(),
            type_id: TypeId::of::<C>(),
            create: create_boxed::<C>,
        }))
    }

    pub fn forward_ref(render: ForwardRenderFn) -> Self {
        Self::new(VKind::ForwardRef(ForwardRef { render }))
    }

    // -------------------------------------------------------------------------
    // Builder
    // -------------------------------------------------------------------------

    pub fn prop(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.insert(key, value);
        self
    }

    /// Merge `props` into the current props.
    pub fn props(mut self, props: Props) -> Self {
        self.props.merge(props);
        self
    }

    pub fn style(self, style: Style) -> Self {
        self.prop("style", style)
    }

    /// Attach an event handler prop, e.g. `.on("onClick", handler)`.
    pub fn on(self, event: impl Into<String>, handler: Handler) -> Self {
        self.prop(event, handler)
    }

    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn node_ref(mut self, node_ref: &NodeRef) -> Self {
        self.node_ref = Some(node_ref.clone());
        self
    }

    pub fn child(mut self, child: impl Into<VNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<VNode>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn kind(&self) -> &VKind {
        &self.kind
    }

    pub fn get_props(&self) -> &Props {
        &self.props
    }

    pub fn get_children(&self) -> &[VNode] {
        &self.children
    }

    pub fn get_key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    pub fn get_ref(&self) -> Option<&NodeRef> {
        self.node_ref.as_ref()
    }

    /// Native node produced by a mounted text or element vnode.
    pub fn native(&self) -> Option<NativeId> {
        self.native
    }

    /// Tree a mounted function or forwarded-ref component expanded into.
    pub fn rendered(&self) -> Option<&VNode> {
        self.rendered.as_deref()
    }

    /// Instance created for a mounted class component.
    pub fn instance(&self) -> Option<InstanceId> {
        self.instance
    }

    /// Position among siblings at the last mount or reconciliation.
    pub fn mount_index(&self) -> usize {
        self.mount_index
    }

    // -------------------------------------------------------------------------
    // Native lookup
    // -------------------------------------------------------------------------

    /// First native node this mounted vnode maps to.
    pub fn find_native(&self) -> Option<NativeId> {
        self.native_nodes().first().copied()
    }

    /// Last native node this mounted vnode maps to.
    pub fn last_native(&self) -> Option<NativeId> {
        self.native_nodes().last().copied()
    }

    /// All top-level native nodes of this vnode, in order. One for text and
    /// elements, any number for fragments and components.
    pub fn native_nodes(&self) -> Vec<NativeId> {
        let mut out = Vec::new();
        self.collect_native(&mut out);
        out
    }

    fn collect_native(&self, out: &mut Vec<NativeId>) {
        match &self.kind {
            VKind::Text(_) | VKind::Element(_) => out.extend(self.native),
            VKind::Fragment => {
                for child in &self.children {
                    child.collect_native(out);
                }
            }
            VKind::Function(_) | VKind::ForwardRef(_) => {
                if let Some(rendered) = &self.rendered {
                    rendered.collect_native(out);
                }
            }
            VKind::Class(_) => {
                if let Some(id) = self.instance {
                    instance::with_rendered(id, |rendered| {
                        if let Some(rendered) = rendered {
                            rendered.collect_native(out);
                        }
                    });
                }
            }
        }
    }
}

impl Clone for VNode {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            props: self.props.clone(),
            children: self.children.clone(),
            key: self.key.clone(),
            node_ref: self.node_ref.clone(),
            ..Self::new(VKind::Fragment)
        }
    }
}

impl fmt::Debug for VNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("VNode");
        s.field("kind", &self.kind);
        if let Some(key) = &self.key {
            s.field("key", key);
        }
        if !self.props.is_empty() {
            s.field("props", &self.props);
        }
        if !self.children.is_empty() {
            s.field("children", &self.children);
        }
        s.finish_non_exhaustive()
    }
}

// Bare strings and numbers become text nodes.

impl From<&str> for VNode {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for VNode {
    fn from(value: String) -> Self {
        Self::text(value)
    }
}

impl From<&String> for VNode {
    fn from(value: &String) -> Self {
        Self::text(value.as_str())
    }
}

impl From<i64> for VNode {
    fn from(value: i64) -> Self {
        Self::text(value.to_string())
    }
}

impl From<i32> for VNode {
    fn from(value: i32) -> Self {
        Self::text(value.to_string())
    }
}

impl From<&PropValue> for VNode {
    fn from(value: &PropValue) -> Self {
        Self::text(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(props: &Props, _children: &[VNode]) -> VNode {
        VNode::element("li").child(props.get_str("label").unwrap_or_default())
    }

    fn other(_props: &Props, _children: &[VNode]) -> VNode {
        VNode::fragment(Vec::<VNode>::new())
    }

    #[test]
    fn test_builder() {
        let node = VNode::element("ul")
            .prop("id", "list")
            .key("k")
            .child("a")
            .children(["b", "c"]);

        assert_eq!(node.get_props().get_str("id"), Some("list"));
        assert_eq!(node.get_key(), Some(&Key::from("k")));
        assert_eq!(node.get_children().len(), 3);
        assert!(matches!(node.get_children()[0].kind(), VKind::Text(t) if t == "a"));
    }

    #[test]
    fn test_same_kind() {
        assert!(VKind::Text("a".into()).same_kind(&VKind::Text("b".into())));
        assert!(VKind::Element("div".into()).same_kind(&VKind::Element("div".into())));
        assert!(!VKind::Element("div".into()).same_kind(&VKind::Element("span".into())));
        assert!(!VKind::Fragment.same_kind(&VKind::Element("div".into())));

        let a = VNode::function(item);
        let b = VNode::function(item);
        let c = VNode::function(other);
        assert!(a.kind().same_kind(b.kind()));
        assert!(!a.kind().same_kind(c.kind()));
    }

    #[test]
    fn test_clone_drops_mount_state() {
        let mut node = VNode::text("x");
        node.mount_index = 4;
        let copy = node.clone();
        assert_eq!(copy.mount_index(), 0);
        assert!(copy.native().is_none());
    }
}
