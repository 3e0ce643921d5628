//! Reconciler - Mounting, diffing and native property sync.
//!
//! - `mount` builds native nodes for a fresh vnode
//! - [`reconcile`] diffs a mounted vnode against the next description
//! - [`plan_children`] matches child lists by key or position
//! - [`sync_props`] applies prop changes to one native element

mod children;
mod mount;
mod props;
mod reconcile;

pub use children::{plan_children, ChildPlan, Patch, PatchKind};
pub use props::{sync_props, CHILDREN_KEY, STYLE_KEY};
pub use reconcile::reconcile;

pub(crate) use reconcile::{mount_into, reconcile_in};
