//! Ref cells - out-parameters filled in once a node is mounted.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::component::Updater;
use crate::native::NativeId;

/// What a ref points at once mounted.
#[derive(Debug, Clone, PartialEq)]
pub enum RefTarget {
    /// Native node produced by a text or element vnode.
    Native(NativeId),
    /// Handle to a class component instance.
    Instance(Updater),
}

/// Shared cell receiving the mounted target of a vnode.
///
/// Cleared back to empty when the vnode is unmounted. Clones share the cell.
#[derive(Clone, Default)]
pub struct NodeRef(Rc<RefCell<Option<RefTarget>>>);

impl NodeRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<RefTarget> {
        self.0.borrow().clone()
    }

    /// The native node, if the ref points at one.
    pub fn native(&self) -> Option<NativeId> {
        match &*self.0.borrow() {
            Some(RefTarget::Native(id)) => Some(*id),
            _ => None,
        }
    }

    /// The component instance handle, if the ref points at one.
    pub fn instance(&self) -> Option<Updater> {
        match &*self.0.borrow() {
            Some(RefTarget::Instance(updater)) => Some(updater.clone()),
            _ => None,
        }
    }

    pub fn is_set(&self) -> bool {
        self.0.borrow().is_some()
    }

    pub(crate) fn set(&self, target: Option<RefTarget>) {
        *self.0.borrow_mut() = target;
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeRef").field(&*self.0.borrow()).finish()
    }
}

/// Create an empty ref.
pub fn create_ref() -> NodeRef {
    NodeRef::new()
}
