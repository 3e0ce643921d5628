//! Updater - Update requests and the batching scheduler.
//!
//! Every class instance gets an [`Updater`]: a cheap handle that can be
//! cloned into event handlers and refs. Requests go through one scheduler:
//!
//! - Outside any mount or update, a request runs the update cycle at once
//! - While a mount or update is in progress, the instance is queued and the
//!   queue is drained after the outermost operation finishes
//!
//! Draining is bounded by [`RuntimeConfig::max_update_passes`]; an update
//! that keeps scheduling itself ends in [`Error::UpdateLoop`].
//!
//! [`RuntimeConfig::max_update_passes`]: crate::config::RuntimeConfig

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::config;
use crate::error::{Error, Result};
use crate::native;
use crate::reconciler::reconcile_in;
use crate::types::{Props, State};
use crate::vnode::VNode;

use super::instance::{self, InstanceCell, InstanceId, StateUpdate};

// =============================================================================
// Scheduler State
// =============================================================================

thread_local! {
    /// Nesting depth of mounts/updates in progress.
    static DEPTH: Cell<usize> = const { Cell::new(0) };

    /// Instances waiting for an update cycle, in request order.
    static QUEUE: RefCell<Vec<InstanceId>> = const { RefCell::new(Vec::new()) };
}

struct DepthGuard;

impl DepthGuard {
    fn enter() -> (Self, bool) {
        let outermost = DEPTH.with(|depth| {
            let current = depth.get();
            depth.set(current + 1);
            current == 0
        });
        (DepthGuard, outermost)
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

fn in_progress() -> bool {
    DEPTH.with(|depth| depth.get() > 0)
}

fn enqueue(id: InstanceId) {
    QUEUE.with(|queue| {
        let mut queue = queue.borrow_mut();
        if !queue.contains(&id) {
            queue.push(id);
        }
    });
}

fn clear_queue() {
    QUEUE.with(|queue| queue.borrow_mut().clear());
}

/// Run `f` as one operation. When it is the outermost one, queued updates
/// are drained before returning.
pub(crate) fn batch<R>(f: impl FnOnce() -> Result<R>) -> Result<R> {
    let (guard, outermost) = DepthGuard::enter();
    let result = f();
    if !outermost {
        return result;
    }

    let result = result.and_then(|value| drain().map(|()| value));
    drop(guard);
    if result.is_err() {
        clear_queue();
    }
    result
}

fn drain() -> Result<()> {
    let limit = config().max_update_passes;
    for pass in 0..limit {
        let ids = QUEUE.with(|queue| std::mem::take(&mut *queue.borrow_mut()));
        if ids.is_empty() {
            return Ok(());
        }
        tracing::trace!(pass, queued = ids.len(), "draining update queue");
        for id in ids {
            if let Some(cell) = instance::get(id) {
                if cell.mounted.get() {
                    flush(&cell)?;
                }
            }
        }
    }

    if QUEUE.with(|queue| queue.borrow().is_empty()) {
        Ok(())
    } else {
        tracing::error!(limit, "update queue did not settle");
        Err(Error::UpdateLoop(limit))
    }
}

/// Route a request: queue it during an operation, run it otherwise.
fn schedule(cell: &Rc<InstanceCell>) -> Result<()> {
    if !cell.mounted.get() {
        // Still mounting; picked up before the first render or after did_mount
        return Ok(());
    }
    if in_progress() {
        enqueue(cell.id);
        Ok(())
    } else {
        batch(|| flush(cell))
    }
}

/// Reset the scheduler (for testing).
pub(crate) fn reset_scheduler() {
    DEPTH.with(|depth| depth.set(0));
    clear_queue();
}

// =============================================================================
// Update cycle
// =============================================================================

/// Run one update cycle if anything is pending.
pub(crate) fn flush(cell: &Rc<InstanceCell>) -> Result<()> {
    if !cell.has_pending() {
        return Ok(());
    }

    let incoming = cell.pending_props.borrow_mut().take();
    let force = cell.force.replace(false);

    if let Some((next_props, _)) = &incoming {
        cell.with_ctx(|component, ctx| component.will_receive_props(ctx, next_props));
    }

    let next_state = cell.next_state();
    let (next_props, next_children) = match incoming {
        Some((props, children)) => (props, Some(children)),
        None => (cell.props.borrow().clone(), None),
    };

    let proceed = force
        || cell.with_ctx(|component, ctx| component.should_update(ctx, &next_props, &next_state));

    if !proceed {
        tracing::trace!(instance = %cell.id, name = cell.name, "update skipped");
        commit(cell, next_props, next_children, next_state);
        return Ok(());
    }

    cell.with_ctx(|component, ctx| component.will_update(ctx, &next_props, &next_state));
    let (prev_props, prev_state) = commit(cell, next_props, next_children, next_state);

    let parent = cell
        .rendered
        .borrow()
        .as_ref()
        .and_then(VNode::find_native)
        .and_then(native::parent)
        .ok_or(Error::Detached(cell.name))?;

    let mut next = cell.render();
    let mut prev = cell.rendered.borrow_mut().take();
    tracing::debug!(instance = %cell.id, name = cell.name, "re-rendering");
    let result = reconcile_in(prev.as_mut(), Some(&mut next), parent, None);
    *cell.rendered.borrow_mut() = Some(next);
    result?;

    cell.with_ctx(|component, ctx| component.did_update(ctx, &prev_props, &prev_state));
    Ok(())
}

/// Install the next props/state, returning the previous ones.
fn commit(
    cell: &InstanceCell,
    props: Props,
    children: Option<Vec<VNode>>,
    state: State,
) -> (Props, State) {
    if let Some(children) = children {
        *cell.children.borrow_mut() = children;
    }
    let prev_props = cell.props.replace(props);
    let prev_state = cell.state.replace(state);
    (prev_props, prev_state)
}

/// Deliver new props from a re-rendering parent. Runs inline.
pub(crate) fn receive_props(cell: &Rc<InstanceCell>, props: Props, children: Vec<VNode>) -> Result<()> {
    *cell.pending_props.borrow_mut() = Some((props, children));
    flush(cell)
}

/// Mark freshly attached instances mounted and run `did_mount`, innermost
/// first. Requests made before this point are scheduled now.
pub(crate) fn run_post_mount(mounted: Vec<Updater>) -> Result<()> {
    for updater in mounted {
        let Some(cell) = instance::get(updater.id) else {
            continue;
        };
        cell.mounted.set(true);
        cell.with_ctx(|component, ctx| component.did_mount(ctx));
        if cell.has_pending() {
            schedule(&cell)?;
        }
    }
    Ok(())
}

/// Run `will_unmount` and drop the instance. Its rendered subtree must
/// already be torn down.
pub(crate) fn retire(cell: &InstanceCell) {
    cell.with_ctx(|component, ctx| component.will_unmount(ctx));
    cell.mounted.set(false);
    cell.pending_state.borrow_mut().clear();
    cell.pending_props.borrow_mut().take();
    instance::release(cell.id);
}

// =============================================================================
// Updater
// =============================================================================

/// Handle through which a class instance requests updates.
///
/// Requests against an instance that has been unmounted are ignored with a
/// warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Updater {
    id: InstanceId,
}

impl Updater {
    pub(crate) fn new(id: InstanceId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Merge `partial` into the state and update.
    pub fn set_state(&self, partial: State) -> Result<()> {
        self.request(StateUpdate::Merge(partial))
    }

    /// Merge the result of `f`, applied to the state as of the previous
    /// pending request, and update.
    pub fn update_state(&self, f: impl FnOnce(&State) -> State + 'static) -> Result<()> {
        self.request(StateUpdate::Apply(Box::new(f)))
    }

    /// Re-render even if `should_update` would say no.
    pub fn force_update(&self) -> Result<()> {
        let Some(cell) = self.live("force_update") else {
            return Ok(());
        };
        cell.force.set(true);
        schedule(&cell)
    }

    /// Update with new props, keeping the current children.
    pub fn schedule_update(&self, next_props: Props) -> Result<()> {
        let Some(cell) = self.live("schedule_update") else {
            return Ok(());
        };
        let children = cell.children.borrow().clone();
        *cell.pending_props.borrow_mut() = Some((next_props, children));
        schedule(&cell)
    }

    /// Committed state, if the instance is alive.
    pub fn state(&self) -> Option<State> {
        instance::get(self.id).map(|cell| cell.state.borrow().clone())
    }

    /// Committed props, if the instance is alive.
    pub fn props(&self) -> Option<Props> {
        instance::get(self.id).map(|cell| cell.props.borrow().clone())
    }

    pub fn is_mounted(&self) -> bool {
        instance::get(self.id).is_some_and(|cell| cell.mounted.get())
    }

    fn request(&self, update: StateUpdate) -> Result<()> {
        let Some(cell) = self.live("set_state") else {
            return Ok(());
        };
        cell.pending_state.borrow_mut().push(update);
        schedule(&cell)
    }

    fn live(&self, op: &str) -> Option<Rc<InstanceCell>> {
        let cell = instance::get(self.id);
        if cell.is_none() {
            tracing::warn!(instance = %self.id, op, "update requested on an unmounted component");
        }
        cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Component, Ctx};

    struct Idle;

    impl Component for Idle {
        fn create(_props: &Props) -> Self {
            Idle
        }

        fn render(&self, _ctx: &Ctx<'_>) -> VNode {
            VNode::text("idle")
        }
    }

    #[test]
    fn test_batch_queues_and_drains() {
        reset_scheduler();
        instance::reset_instances();

        // Allocated but not mounted: requests wait for did_mount
        let cell = instance::allocate("Idle", Box::new(Idle), Props::new(), Vec::new());
        let updater = Updater::new(cell.id);

        let result = batch(|| {
            assert!(in_progress());
            updater.set_state(State::new().with("n", 1))?;
            // Not yet mounted: the request waits
            assert!(QUEUE.with(|q| q.borrow().is_empty()));
            Ok(7)
        });
        assert_eq!(result, Ok(7));
        assert!(!in_progress());
        assert!(cell.has_pending());
    }

    #[test]
    fn test_stale_updater_is_ignored() {
        reset_scheduler();
        instance::reset_instances();

        let cell = instance::allocate("Idle", Box::new(Idle), Props::new(), Vec::new());
        let updater = Updater::new(cell.id);
        instance::release(cell.id);

        assert_eq!(updater.set_state(State::new().with("n", 1)), Ok(()));
        assert_eq!(updater.force_update(), Ok(()));
        assert!(!updater.is_mounted());
        assert!(updater.state().is_none());
    }

    #[test]
    fn test_depth_restored_after_error() {
        reset_scheduler();

        let result: Result<()> = batch(|| Err(Error::Detached("x")));
        assert_eq!(result, Err(Error::Detached("x")));
        assert!(!in_progress());
    }
}
