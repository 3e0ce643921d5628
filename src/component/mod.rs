//! Class-style components.
//!
//! A [`Component`] is constructed once per logical slot, keeps its state in
//! the runtime's instance registry, and re-renders through its [`Updater`].
//!
//! # Lifecycle
//!
//! Mount:
//! ```text
//! create → initial_state → will_mount → render → (native construction)
//!        → did_mount (after the subtree is attached)
//! ```
//!
//! Update (state request, force, or new props from the parent):
//! ```text
//! will_receive_props (parent props only) → should_update → will_update
//!        → render → reconcile → did_update
//! ```
//! A `false` from `should_update` stops after committing the new state/props.
//!
//! Unmount: descendants first, then `will_unmount`, then native removal.
//!
//! # Example
//!
//! ```
//! use spark_vdom::{Component, Ctx, Handler, Props, State, VNode};
//!
//! struct Counter;
//!
//! impl Component for Counter {
//!     fn create(_props: &Props) -> Self {
//!         Counter
//!     }
//!
//!     fn initial_state(&self, _props: &Props) -> State {
//!         State::new().with("count", 0)
//!     }
//!
//!     fn render(&self, ctx: &Ctx<'_>) -> VNode {
//!         let count = ctx.state.get_int("count").unwrap_or(0);
//!         let updater = ctx.updater.clone();
//!         VNode::element("button")
//!             .on("onClick", Handler::new(move |_| {
//!                 updater.set_state(State::new().with("count", count + 1))
//!             }))
//!             .child(count)
//!     }
//! }
//! ```

pub(crate) mod instance;
mod updater;

pub use instance::{instance_count, InstanceId};
pub use updater::Updater;

pub(crate) use updater::{batch, receive_props, reset_scheduler, retire, run_post_mount};

use crate::types::{Props, State};
use crate::vnode::VNode;

/// What hooks and `render` see of their instance.
pub struct Ctx<'a> {
    /// Current props.
    pub props: &'a Props,
    /// Children passed by the parent.
    pub children: &'a [VNode],
    /// Current (committed) state.
    pub state: &'a State,
    /// Handle for requesting updates.
    pub updater: &'a Updater,
}

/// A stateful component with lifecycle hooks. Every hook is optional.
pub trait Component: 'static {
    /// Construct the component for a newly mounted slot.
    fn create(props: &Props) -> Self
    where
        Self: Sized;

    /// State the instance starts with.
    fn initial_state(&self, _props: &Props) -> State {
        State::new()
    }

    fn render(&self, ctx: &Ctx<'_>) -> VNode;

    /// Before the first render. State requested here is merged before it.
    fn will_mount(&mut self, _ctx: &Ctx<'_>) {}

    /// After the mounted subtree has been attached to its container.
    fn did_mount(&mut self, _ctx: &Ctx<'_>) {}

    /// New props are arriving from the parent.
    fn will_receive_props(&mut self, _ctx: &Ctx<'_>, _next_props: &Props) {}

    /// Return `false` to skip rendering. State and props are still committed.
    fn should_update(&self, _ctx: &Ctx<'_>, _next_props: &Props, _next_state: &State) -> bool {
        true
    }

    /// Before re-rendering, with `ctx` still showing the old values.
    fn will_update(&mut self, _ctx: &Ctx<'_>, _next_props: &Props, _next_state: &State) {}

    /// After the re-rendered subtree has been reconciled.
    fn did_update(&mut self, _ctx: &Ctx<'_>, _prev_props: &Props, _prev_state: &State) {}

    /// Before the instance's native nodes are removed.
    fn will_unmount(&mut self, _ctx: &Ctx<'_>) {}
}
