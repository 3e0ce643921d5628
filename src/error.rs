//! Error type shared by the native tree, the reconciler and the updater.
//!
//! There is no recovery path: every error propagates with `?` up to whoever
//! started the mount or update, and the operation is abandoned where it stood.

use thiserror::Error;

use crate::native::NativeId;

/// Errors raised while mounting, reconciling or updating.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The native node was released or never existed.
    #[error("native node {0} does not exist")]
    UnknownNode(NativeId),

    /// An element-only operation was applied to another kind of node.
    #[error("native node {0} is not an element")]
    NotAnElement(NativeId),

    /// The anchor passed to an insertion is not a child of the parent.
    #[error("native node {child} is not a child of {parent}")]
    NotAChild { parent: NativeId, child: NativeId },

    /// A text-only operation was applied to another kind of node.
    #[error("native node {0} is not a text node")]
    NotAText(NativeId),

    /// A mounted subtree has no native node attached to a parent.
    #[error("component `{0}` has no attached native node")]
    Detached(&'static str),

    /// A prop value does not have the shape its key requires.
    #[error("prop `{key}` expects {expected}")]
    InvalidProp {
        key: String,
        expected: &'static str,
    },

    /// Queued state updates kept scheduling more updates.
    #[error("update queue did not settle after {0} passes")]
    UpdateLoop(usize),

    /// An event was dispatched to a node with no handler for it.
    #[error("native node {node} has no `{event}` handler")]
    NoHandler { node: NativeId, event: String },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
