//! # spark-vdom
//!
//! Retained-mode virtual tree runtime for Rust.
//!
//! Describe the UI as a tree of [`VNode`]s, [`render`] it into a native
//! container, then [`reconcile`] each new description against the mounted
//! one. Only what changed touches the native tree.
//!
//! ## Architecture
//!
//! ```text
//! VNode tree → mount → native arena (NativeId handles)
//!     ↓
//! next VNode tree → reconcile → keyed child diff → sync_props
//!                        ↑
//!        Updater (set_state / force_update) → class re-render
//! ```
//!
//! All runtime state (native arena, event handlers, component instances,
//! update queue, configuration) is thread-local. Each thread is an
//! independent runtime.
//!
//! ## Modules
//!
//! - [`vnode`] - Virtual nodes, kinds, refs
//! - [`component`] - Class components, instances, the updater
//! - [`reconciler`] - Mount, reconcile, keyed child diff, property sync
//! - [`native`] - Native tree arena and event handlers
//! - [`pipeline`] - `render` entry point
//! - [`renderer`] - Terminal painter for native trees
//! - [`types`] - Props, state, style, keys, colors
//! - [`error`] - Error type and `Result` alias
//! - `config` - Runtime settings

pub mod component;
pub mod config;
pub mod error;
pub mod native;
pub mod pipeline;
pub mod reconciler;
pub mod renderer;
pub mod types;
pub mod vnode;

// Re-export commonly used items
pub use types::{Handler, Key, PropValue, Props, Rgba, State, Style};

pub use error::{Error, Result};

pub use config::{config, reset_config, set_config, RuntimeConfig};

pub use vnode::{create_ref, NodeRef, RefTarget, VKind, VNode};

pub use component::{instance_count, Component, Ctx, InstanceId, Updater};

pub use reconciler::{plan_children, reconcile, sync_props, ChildPlan, Patch, PatchKind};

pub use native::{dispatch, Event, NativeId};

pub use pipeline::{find_native, render, reset_runtime};
