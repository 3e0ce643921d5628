//! Event Registry - Handlers attached to native nodes.
//!
//! Property sync registers handler props here under their lowercased name
//! (`onClick` → `onclick`). Dispatch invokes the target node's handler
//! directly; there is no capture or bubbling.
//!
//! # Example
//!
//! ```ignore
//! use spark_vdom::native::{self, events};
//!
//! events::register_handler(button, "onclick", Handler::new(|event| {
//!     println!("clicked {}", event.target);
//!     Ok(())
//! }))?;
//! events::dispatch(button, "onclick")?;
//! ```

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::types::Handler;

use super::tree::{self, Mutations, NativeId};

// =============================================================================
// TYPES
// =============================================================================

/// Event passed to handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Lowercased event name, e.g. `onclick`.
    pub name: String,
    /// Node the event was dispatched to.
    pub target: NativeId,
}

// =============================================================================
// STATE
// =============================================================================

thread_local! {
    static HANDLERS: RefCell<HashMap<NativeId, HashMap<String, Handler>>> =
        RefCell::new(HashMap::new());
}

// =============================================================================
// REGISTRATION
// =============================================================================

/// Register `handler` for `event` on `node`, replacing any previous one.
///
/// Re-registering the same handler is not a mutation.
pub fn register_handler(node: NativeId, event: &str, handler: Handler) -> Result<()> {
    if !tree::exists(node) {
        return Err(Error::UnknownNode(node));
    }
    let changed = HANDLERS.with(|handlers| {
        let mut handlers = handlers.borrow_mut();
        let slot = handlers.entry(node).or_default();
        if slot.get(event) == Some(&handler) {
            return false;
        }
        slot.insert(event.to_string(), handler);
        true
    });
    if changed {
        tree::note_mutation(node, Mutations::HANDLERS)?;
    }
    Ok(())
}

/// Remove the handler for `event` on `node`, if any.
pub fn unregister_handler(node: NativeId, event: &str) -> Result<()> {
    let removed = HANDLERS.with(|handlers| {
        handlers
            .borrow_mut()
            .get_mut(&node)
            .and_then(|slot| slot.remove(event))
            .is_some()
    });
    if removed {
        tree::note_mutation(node, Mutations::HANDLERS)?;
    }
    Ok(())
}

/// Handler currently registered for `event` on `node`.
pub fn handler(node: NativeId, event: &str) -> Option<Handler> {
    HANDLERS.with(|handlers| handlers.borrow().get(&node)?.get(event).cloned())
}

/// Drop every handler on `node`.
pub(crate) fn clear_handlers(node: NativeId) {
    HANDLERS.with(|handlers| {
        handlers.borrow_mut().remove(&node);
    });
}

/// Drop all handlers (for testing).
pub fn reset_handlers() {
    HANDLERS.with(|handlers| handlers.borrow_mut().clear());
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Invoke the `event` handler of `node`.
///
/// The handler runs with no registry borrow held, so it may register or
/// remove handlers and trigger updates freely. Its result is returned as-is.
pub fn dispatch(node: NativeId, event: &str) -> Result<()> {
    let Some(handler) = handler(node, event) else {
        return Err(Error::NoHandler {
            node,
            event: event.to_string(),
        });
    };
    handler.call(&Event {
        name: event.to_string(),
        target: node,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_register_and_dispatch() {
        tree::reset_tree();

        let button = tree::create_element("button");
        let clicks = Rc::new(Cell::new(0));
        let clicks_clone = clicks.clone();

        register_handler(
            button,
            "onclick",
            Handler::new(move |event| {
                assert_eq!(event.name, "onclick");
                clicks_clone.set(clicks_clone.get() + 1);
                Ok(())
            }),
        )
        .unwrap();

        dispatch(button, "onclick").unwrap();
        dispatch(button, "onclick").unwrap();
        assert_eq!(clicks.get(), 2);
        assert_eq!(tree::mutations(button), Mutations::HANDLERS);
    }

    #[test]
    fn test_same_handler_is_not_a_mutation() {
        tree::reset_tree();

        let button = tree::create_element("button");
        let h = Handler::new(|_| Ok(()));
        register_handler(button, "onclick", h.clone()).unwrap();
        register_handler(button, "onclick", h).unwrap();
        assert_eq!(tree::mutation_count(button), 1);
    }

    #[test]
    fn test_unregister_and_missing_handler() {
        tree::reset_tree();

        let button = tree::create_element("button");
        register_handler(button, "onclick", Handler::new(|_| Ok(()))).unwrap();
        unregister_handler(button, "onclick").unwrap();

        assert!(handler(button, "onclick").is_none());
        assert!(matches!(
            dispatch(button, "onclick"),
            Err(Error::NoHandler { .. })
        ));
    }

    #[test]
    fn test_release_drops_handlers() {
        tree::reset_tree();

        let button = tree::create_element("button");
        register_handler(button, "onclick", Handler::new(|_| Ok(()))).unwrap();
        tree::release(button).unwrap();
        assert!(handler(button, "onclick").is_none());
        assert_eq!(
            register_handler(button, "onclick", Handler::new(|_| Ok(()))),
            Err(Error::UnknownNode(button))
        );
    }
}
