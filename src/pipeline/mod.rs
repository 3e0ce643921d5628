//! Render entry point and runtime reset.
//!
//! ```text
//! VNode → render() → mount → native tree (container)
//!            ↑                     │
//!    reconcile() ← next VNode      └→ renderer::paint
//! ```

mod render;

pub use render::{find_native, render, reset_runtime};
