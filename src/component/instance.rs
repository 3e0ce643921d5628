//! Instance Registry - Live class component instances.
//!
//! Manages the lifecycle of instance ids:
//! - Allocation when a class vnode is first mounted
//! - Lookup by id from updaters and refs
//! - Release when the slot is unmounted
//!
//! Ids are never reused, so an updater that outlives its instance finds
//! nothing instead of someone else's component.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::types::{Props, State};
use crate::vnode::VNode;

use super::updater::Updater;
use super::{Component, Ctx};

// =============================================================================
// Instance
// =============================================================================

/// Id of a class component instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// A pending state request.
pub(crate) enum StateUpdate {
    Merge(State),
    Apply(Box<dyn FnOnce(&State) -> State>),
}

/// Runtime side of a class component.
///
/// Each field has its own cell so hooks can read props/state while the
/// component itself is mutably borrowed, and so requests issued from hooks
/// only touch the pending queue.
pub(crate) struct InstanceCell {
    pub(crate) id: InstanceId,
    pub(crate) name: &'static str,
    component: RefCell<Box<dyn Component>>,
    pub(crate) props: RefCell<Props>,
    pub(crate) children: RefCell<Vec<VNode>>,
    pub(crate) state: RefCell<State>,
    pub(crate) rendered: RefCell<Option<VNode>>,
    pub(crate) pending_state: RefCell<Vec<StateUpdate>>,
    pub(crate) pending_props: RefCell<Option<(Props, Vec<VNode>)>>,
    pub(crate) force: Cell<bool>,
    pub(crate) mounted: Cell<bool>,
}

impl InstanceCell {
    /// Run `f` with the component and a context over the current values.
    pub(crate) fn with_ctx<R>(&self, f: impl FnOnce(&mut dyn Component, &Ctx<'_>) -> R) -> R {
        let props = self.props.borrow();
        let children = self.children.borrow();
        let state = self.state.borrow();
        let updater = Updater::new(self.id);
        let ctx = Ctx {
            props: &props,
            children: &children,
            state: &state,
            updater: &updater,
        };
        let mut component = self.component.borrow_mut();
        f(component.as_mut(), &ctx)
    }

    pub(crate) fn render(&self) -> VNode {
        self.with_ctx(|component, ctx| component.render(ctx))
    }

    pub(crate) fn has_pending(&self) -> bool {
        self.pending_props.borrow().is_some()
            || !self.pending_state.borrow().is_empty()
            || self.force.get()
    }

    /// Apply pending state requests, in order, to a copy of the state.
    pub(crate) fn next_state(&self) -> State {
        let updates = std::mem::take(&mut *self.pending_state.borrow_mut());
        let mut state = self.state.borrow().clone();
        for update in updates {
            match update {
                StateUpdate::Merge(partial) => state.merge(partial),
                StateUpdate::Apply(f) => {
                    let partial = f(&state);
                    state.merge(partial);
                }
            }
        }
        state
    }
}

// =============================================================================
// Registry State
// =============================================================================

thread_local! {
    static INSTANCES: RefCell<HashMap<InstanceId, Rc<InstanceCell>>> = RefCell::new(HashMap::new());

    static NEXT_ID: Cell<u64> = const { Cell::new(0) };
}

/// Register a freshly constructed component.
pub(crate) fn allocate(
    name: &'static str,
    component: Box<dyn Component>,
    props: Props,
    children: Vec<VNode>,
) -> Rc<InstanceCell> {
    let id = InstanceId(NEXT_ID.with(|next| {
        let id = next.get();
        next.set(id + 1);
        id
    }));
    let state = component.initial_state(&props);
    let cell = Rc::new(InstanceCell {
        id,
        name,
        component: RefCell::new(component),
        props: RefCell::new(props),
        children: RefCell::new(children),
        state: RefCell::new(state),
        rendered: RefCell::new(None),
        pending_state: RefCell::new(Vec::new()),
        pending_props: RefCell::new(None),
        force: Cell::new(false),
        mounted: Cell::new(false),
    });
    INSTANCES.with(|map| map.borrow_mut().insert(id, cell.clone()));
    cell
}

pub(crate) fn get(id: InstanceId) -> Option<Rc<InstanceCell>> {
    INSTANCES.with(|map| map.borrow().get(&id).cloned())
}

/// Drop an instance from the registry.
pub(crate) fn release(id: InstanceId) {
    INSTANCES.with(|map| {
        map.borrow_mut().remove(&id);
    });
}

/// Run `f` over the instance's last rendered subtree.
pub(crate) fn with_rendered<R>(id: InstanceId, f: impl FnOnce(Option<&VNode>) -> R) -> R {
    match get(id) {
        Some(cell) => f(cell.rendered.borrow().as_ref()),
        None => f(None),
    }
}

/// Number of live instances.
pub fn instance_count() -> usize {
    INSTANCES.with(|map| map.borrow().len())
}

/// Drop every instance (for testing).
pub(crate) fn reset_instances() {
    INSTANCES.with(|map| map.borrow_mut().clear());
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe;

    impl Component for Probe {
        fn create(_props: &Props) -> Self {
            Probe
        }

        fn initial_state(&self, props: &Props) -> State {
            State::new().with("seed", props.get_int("seed").unwrap_or(0))
        }

        fn render(&self, _ctx: &Ctx<'_>) -> VNode {
            VNode::text("probe")
        }
    }

    #[test]
    fn test_allocate_and_release() {
        reset_instances();

        let props = Props::new().with("seed", 7);
        let a = allocate("Probe", Box::new(Probe::create(&props)), props.clone(), Vec::new());
        let b = allocate("Probe", Box::new(Probe::create(&props)), props, Vec::new());

        assert_ne!(a.id, b.id);
        assert_eq!(instance_count(), 2);
        assert_eq!(a.state.borrow().get_int("seed"), Some(7));

        release(a.id);
        assert!(get(a.id).is_none());
        assert!(get(b.id).is_some());
        assert_eq!(instance_count(), 1);
    }

    #[test]
    fn test_next_state_applies_in_order() {
        reset_instances();

        let cell = allocate("Probe", Box::new(Probe), Props::new(), Vec::new());
        cell.pending_state
            .borrow_mut()
            .push(StateUpdate::Merge(State::new().with("n", 1)));
        cell.pending_state.borrow_mut().push(StateUpdate::Apply(Box::new(|s| {
            State::new().with("n", s.get_int("n").unwrap_or(0) + 10)
        })));

        assert!(cell.has_pending());
        let next = cell.next_state();
        assert_eq!(next.get_int("n"), Some(11));
        assert_eq!(next.get_int("seed"), Some(0));
        assert!(!cell.has_pending());
        // Committed state is untouched until the update cycle commits
        assert_eq!(cell.state.borrow().get_int("n"), None);
    }
}
