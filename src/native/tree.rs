//! Native Tree - Arena of retained UI nodes.
//!
//! Nodes are addressed by [`NativeId`] and live in a thread-local arena:
//! - Parent/children links are ids, never owning references
//! - Every node has exactly one parent (or none while detached)
//! - Released ids are never reused, so a stale id fails loudly
//!
//! Each node records which categories of its state were mutated
//! ([`Mutations`]) and how many mutations it has seen in total. Writing a value
//! equal to the current one is not a mutation.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::{Error, Result};
use crate::types::{PropValue, Style};

use super::events;

// =============================================================================
// Ids and kinds
// =============================================================================

/// Handle to a node in the native arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeId(u64);

impl fmt::Display for NativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a native node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeKind {
    /// Root container that trees are rendered into.
    Container,
    /// Element with a tag name.
    Element(String),
    /// Text leaf.
    Text(String),
    /// Transient grouping node; its children are spliced into whatever it is
    /// inserted into.
    Fragment,
}

bitflags::bitflags! {
    /// Categories of native mutation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Mutations: u8 {
        const NONE = 0;
        const TEXT = 1 << 0;
        const ATTRIBUTES = 1 << 1;
        const STYLE = 1 << 2;
        const HANDLERS = 1 << 3;
        const CHILDREN = 1 << 4;
    }
}

#[derive(Debug)]
struct NativeNode {
    kind: NativeKind,
    parent: Option<NativeId>,
    children: Vec<NativeId>,
    attributes: BTreeMap<String, PropValue>,
    style: Style,
    mutations: Mutations,
    mutation_count: u32,
}

impl NativeNode {
    fn new(kind: NativeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
            style: Style::new(),
            mutations: Mutations::NONE,
            mutation_count: 0,
        }
    }

    fn accepts_children(&self) -> bool {
        !matches!(self.kind, NativeKind::Text(_))
    }
}

// =============================================================================
// Arena State
// =============================================================================

#[derive(Default)]
struct Arena {
    nodes: HashMap<NativeId, NativeNode>,
    next_id: u64,
    total_mutations: u64,
}

impl Arena {
    fn create(&mut self, kind: NativeKind) -> NativeId {
        let id = NativeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, NativeNode::new(kind));
        id
    }

    fn node(&self, id: NativeId) -> Result<&NativeNode> {
        self.nodes.get(&id).ok_or(Error::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NativeId) -> Result<&mut NativeNode> {
        self.nodes.get_mut(&id).ok_or(Error::UnknownNode(id))
    }

    fn mark(&mut self, id: NativeId, what: Mutations) -> Result<()> {
        let node = self.node_mut(id)?;
        node.mutations |= what;
        node.mutation_count += 1;
        self.total_mutations += 1;
        Ok(())
    }

    fn detach(&mut self, child: NativeId) -> Result<()> {
        let Some(parent) = self.node(child)?.parent else {
            return Ok(());
        };
        self.node_mut(parent)?.children.retain(|&c| c != child);
        self.node_mut(child)?.parent = None;
        self.mark(parent, Mutations::CHILDREN)
    }

    fn position_of(&self, parent: NativeId, anchor: Option<NativeId>) -> Result<usize> {
        let siblings = &self.node(parent)?.children;
        match anchor {
            None => Ok(siblings.len()),
            Some(anchor) => siblings
                .iter()
                .position(|&c| c == anchor)
                .ok_or(Error::NotAChild { parent, child: anchor }),
        }
    }

    fn insert(&mut self, parent: NativeId, child: NativeId, anchor: Option<NativeId>) -> Result<()> {
        if !self.node(parent)?.accepts_children() {
            return Err(Error::NotAnElement(parent));
        }

        // Fragments splice their children in and are released afterwards
        if self.node(child)?.kind == NativeKind::Fragment {
            let spliced = std::mem::take(&mut self.node_mut(child)?.children);
            let mut at = self.position_of(parent, anchor)?;
            for grandchild in &spliced {
                self.node_mut(*grandchild)?.parent = Some(parent);
            }
            let count = spliced.len();
            let siblings = &mut self.node_mut(parent)?.children;
            for grandchild in spliced {
                siblings.insert(at, grandchild);
                at += 1;
            }
            self.nodes.remove(&child);
            if count > 0 {
                self.mark(parent, Mutations::CHILDREN)?;
            }
            return Ok(());
        }

        self.detach(child)?;
        let at = self.position_of(parent, anchor)?;
        self.node_mut(parent)?.children.insert(at, child);
        self.node_mut(child)?.parent = Some(parent);
        self.mark(parent, Mutations::CHILDREN)
    }

    fn release(&mut self, id: NativeId, released: &mut Vec<NativeId>) -> Result<()> {
        let node = self.nodes.remove(&id).ok_or(Error::UnknownNode(id))?;
        released.push(id);
        for child in node.children {
            self.release(child, released)?;
        }
        Ok(())
    }
}

thread_local! {
    static ARENA: RefCell<Arena> = RefCell::new(Arena::default());
}

fn with_arena<R>(f: impl FnOnce(&mut Arena) -> R) -> R {
    ARENA.with(|arena| f(&mut arena.borrow_mut()))
}

// =============================================================================
// Creation / Destruction
// =============================================================================

/// Create a root container.
pub fn create_container() -> NativeId {
    with_arena(|arena| arena.create(NativeKind::Container))
}

/// Create a detached element.
pub fn create_element(tag: &str) -> NativeId {
    with_arena(|arena| arena.create(NativeKind::Element(tag.to_string())))
}

/// Create a detached text node.
pub fn create_text(text: &str) -> NativeId {
    with_arena(|arena| arena.create(NativeKind::Text(text.to_string())))
}

/// Create a detached fragment.
pub fn create_fragment() -> NativeId {
    with_arena(|arena| arena.create(NativeKind::Fragment))
}

/// Detach `id` and drop it together with its whole subtree.
///
/// Handlers registered on any released node are dropped as well.
pub fn release(id: NativeId) -> Result<()> {
    let released = with_arena(|arena| {
        arena.detach(id)?;
        let mut released = Vec::new();
        arena.release(id, &mut released)?;
        Ok::<_, Error>(released)
    })?;
    for node in released {
        events::clear_handlers(node);
    }
    Ok(())
}

/// Check whether `id` is still alive.
pub fn exists(id: NativeId) -> bool {
    with_arena(|arena| arena.nodes.contains_key(&id))
}

// =============================================================================
// Structure
// =============================================================================

/// Append `child` as the last child of `parent`.
pub fn append_child(parent: NativeId, child: NativeId) -> Result<()> {
    insert_before(parent, child, None)
}

/// Insert `child` into `parent` before `anchor`, or at the end when `anchor`
/// is `None`. An attached child is moved. A fragment child is spliced.
pub fn insert_before(parent: NativeId, child: NativeId, anchor: Option<NativeId>) -> Result<()> {
    with_arena(|arena| arena.insert(parent, child, anchor))
}

/// Remove `child` from its parent without destroying it.
pub fn detach(child: NativeId) -> Result<()> {
    with_arena(|arena| arena.detach(child))
}

pub fn parent(id: NativeId) -> Option<NativeId> {
    with_arena(|arena| arena.nodes.get(&id).and_then(|n| n.parent))
}

pub fn children(id: NativeId) -> Vec<NativeId> {
    with_arena(|arena| {
        arena
            .nodes
            .get(&id)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    })
}

/// The sibling following `id` in its parent, if any.
pub fn next_sibling(id: NativeId) -> Option<NativeId> {
    with_arena(|arena| {
        let parent = arena.nodes.get(&id)?.parent?;
        let siblings = &arena.nodes.get(&parent)?.children;
        let at = siblings.iter().position(|&c| c == id)?;
        siblings.get(at + 1).copied()
    })
}

// =============================================================================
// Content
// =============================================================================

pub fn kind(id: NativeId) -> Option<NativeKind> {
    with_arena(|arena| arena.nodes.get(&id).map(|n| n.kind.clone()))
}

/// Tag name for elements.
pub fn tag(id: NativeId) -> Option<String> {
    match kind(id)? {
        NativeKind::Element(tag) => Some(tag),
        _ => None,
    }
}

/// Content of a text node.
pub fn text(id: NativeId) -> Option<String> {
    match kind(id)? {
        NativeKind::Text(text) => Some(text),
        _ => None,
    }
}

/// Replace the content of a text node.
pub fn set_text(id: NativeId, content: &str) -> Result<()> {
    with_arena(|arena| {
        match &mut arena.node_mut(id)?.kind {
            NativeKind::Text(current) if current.as_str() == content => return Ok(()),
            NativeKind::Text(current) => *current = content.to_string(),
            _ => return Err(Error::NotAText(id)),
        }
        arena.mark(id, Mutations::TEXT)
    })
}

pub fn attribute(id: NativeId, name: &str) -> Option<PropValue> {
    with_arena(|arena| arena.nodes.get(&id)?.attributes.get(name).cloned())
}

pub fn attributes(id: NativeId) -> Vec<(String, PropValue)> {
    with_arena(|arena| {
        arena
            .nodes
            .get(&id)
            .map(|n| n.attributes.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    })
}

pub fn set_attribute(id: NativeId, name: &str, value: PropValue) -> Result<()> {
    with_arena(|arena| {
        let node = arena.node_mut(id)?;
        if !node.accepts_children() {
            return Err(Error::NotAnElement(id));
        }
        if node.attributes.get(name) == Some(&value) {
            return Ok(());
        }
        node.attributes.insert(name.to_string(), value);
        arena.mark(id, Mutations::ATTRIBUTES)
    })
}

pub fn remove_attribute(id: NativeId, name: &str) -> Result<()> {
    with_arena(|arena| {
        if arena.node_mut(id)?.attributes.remove(name).is_none() {
            return Ok(());
        }
        arena.mark(id, Mutations::ATTRIBUTES)
    })
}

pub fn style(id: NativeId) -> Style {
    with_arena(|arena| arena.nodes.get(&id).map(|n| n.style.clone()).unwrap_or_default())
}

pub fn style_value(id: NativeId, name: &str) -> Option<String> {
    with_arena(|arena| arena.nodes.get(&id)?.style.get(name).map(str::to_string))
}

pub fn set_style(id: NativeId, name: &str, value: &str) -> Result<()> {
    with_arena(|arena| {
        let node = arena.node_mut(id)?;
        if !node.accepts_children() {
            return Err(Error::NotAnElement(id));
        }
        if node.style.get(name) == Some(value) {
            return Ok(());
        }
        node.style.set(name, value);
        arena.mark(id, Mutations::STYLE)
    })
}

pub fn remove_style(id: NativeId, name: &str) -> Result<()> {
    with_arena(|arena| {
        if arena.node_mut(id)?.style.remove(name).is_none() {
            return Ok(());
        }
        arena.mark(id, Mutations::STYLE)
    })
}

// =============================================================================
// Mutation tracking
// =============================================================================

/// Record a mutation made outside the arena (handler registration).
pub(crate) fn note_mutation(id: NativeId, what: Mutations) -> Result<()> {
    with_arena(|arena| arena.mark(id, what))
}

/// Number of mutations `id` has seen since creation.
pub fn mutation_count(id: NativeId) -> u32 {
    with_arena(|arena| arena.nodes.get(&id).map_or(0, |n| n.mutation_count))
}

/// Categories mutated since the last [`take_mutations`].
pub fn mutations(id: NativeId) -> Mutations {
    with_arena(|arena| arena.nodes.get(&id).map_or(Mutations::NONE, |n| n.mutations))
}

/// Read and clear the mutation categories of `id`.
pub fn take_mutations(id: NativeId) -> Mutations {
    with_arena(|arena| {
        arena
            .nodes
            .get_mut(&id)
            .map_or(Mutations::NONE, |n| std::mem::take(&mut n.mutations))
    })
}

/// Total mutations across all nodes on this thread.
pub fn total_mutations() -> u64 {
    with_arena(|arena| arena.total_mutations)
}

/// Number of live nodes.
pub fn node_count() -> usize {
    with_arena(|arena| arena.nodes.len())
}

/// Drop every node (for testing).
pub fn reset_tree() {
    with_arena(|arena| *arena = Arena::default());
    events::reset_handlers();
}

// =============================================================================
// Markup
// =============================================================================

/// Serialize the children of `id` as compact markup.
///
/// Elements print as `<tag a="1" style="k:v;">…</tag>`, text prints as-is.
/// Handlers are not serialized.
pub fn inner_markup(id: NativeId) -> String {
    let mut out = String::new();
    for child in children(id) {
        write_markup(child, &mut out);
    }
    out
}

/// Serialize `id` and its subtree.
pub fn markup(id: NativeId) -> String {
    let mut out = String::new();
    write_markup(id, &mut out);
    out
}

fn write_markup(id: NativeId, out: &mut String) {
    match kind(id) {
        Some(NativeKind::Text(text)) => out.push_str(&text),
        Some(NativeKind::Element(tag)) => {
            out.push('<');
            out.push_str(&tag);
            for (name, value) in attributes(id) {
                out.push_str(&format!(" {name}=\"{value}\""));
            }
            let style = style(id);
            if !style.is_empty() {
                out.push_str(&format!(" style=\"{}\"", PropValue::Style(style)));
            }
            out.push('>');
            for child in children(id) {
                write_markup(child, out);
            }
            out.push_str("</");
            out.push_str(&tag);
            out.push('>');
        }
        Some(NativeKind::Container | NativeKind::Fragment) => {
            for child in children(id) {
                write_markup(child, out);
            }
        }
        None => {}
    }
}
