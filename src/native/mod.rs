//! Native UI tree.
//!
//! The retained tree the reconciler mutates:
//! - [`tree`]: arena of nodes, structure and content operations, markup
//! - [`events`]: handler registry and direct dispatch
//!
//! Every node is a [`NativeId`] into a thread-local arena. The reconciler only
//! stores ids; ownership of a node belongs to its parent in this tree.

pub mod events;
pub mod tree;

pub use events::{dispatch, register_handler, unregister_handler, Event};
pub use tree::*;
