//! Renderer - Inspect a native tree on the terminal.
//!
//! The native tree is the runtime's output; this module only reads it.

mod terminal;

pub use terminal::{paint, print_tree};
