//! Virtual tree.
//!
//! A [`VNode`] describes what should exist for one render pass. The runtime
//! writes mount state back into it (native id, rendered subtree, instance,
//! sibling position) so the next pass can diff against it.
//!
//! # Example
//!
//! ```
//! use spark_vdom::{VNode, Style};
//!
//! let list = VNode::element("ul")
//!     .prop("id", "fruits")
//!     .style(Style::new().with("color", "red"))
//!     .children(["apple", "banana"].map(|f| VNode::element("li").key(f).child(f)));
//! assert_eq!(list.get_children().len(), 2);
//! ```

mod node;
mod node_ref;

pub use node::*;
pub use node_ref::*;
