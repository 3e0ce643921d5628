//! Native property sync.
//!
//! Applies the difference between two prop maps to one native element:
//! - `children` is never a property
//! - `style` merges field by field onto the node's style
//! - handler keys (`onClick`) register under their lowercased name
//! - everything else is a plain attribute
//!
//! Keys only present in the old map are cleared.

use crate::config::config;
use crate::error::{Error, Result};
use crate::native::{self, NativeId};
use crate::types::{PropValue, Props, Style};

/// Reserved key holding children; skipped by sync.
pub const CHILDREN_KEY: &str = "children";

/// Key whose value is merged onto the style surface.
pub const STYLE_KEY: &str = "style";

/// Bring `node`'s attributes, style and handlers from `old` to `new`.
pub fn sync_props(node: NativeId, old: &Props, new: &Props) -> Result<()> {
    let config = config();

    for (key, value) in new.iter() {
        if key == CHILDREN_KEY {
            continue;
        }

        if key == STYLE_KEY {
            let PropValue::Style(style) = value else {
                return Err(invalid(key, "a style map"));
            };
            merge_style(node, style)?;
        } else if config.is_handler_key(key) {
            let PropValue::Handler(handler) = value else {
                return Err(invalid(key, "an event handler"));
            };
            native::register_handler(node, &key.to_lowercase(), handler.clone())?;
        } else {
            native::set_attribute(node, key, value.clone())?;
        }
    }

    for (key, value) in old.iter() {
        if key == CHILDREN_KEY || new.contains_key(key) {
            continue;
        }

        if key == STYLE_KEY {
            if let PropValue::Style(style) = value {
                clear_style(node, style)?;
            }
        } else if config.is_handler_key(key) {
            native::unregister_handler(node, &key.to_lowercase())?;
        } else {
            native::remove_attribute(node, key)?;
        }
    }

    Ok(())
}

fn merge_style(node: NativeId, style: &Style) -> Result<()> {
    for (name, value) in style.iter() {
        native::set_style(node, name, value)?;
    }
    Ok(())
}

fn clear_style(node: NativeId, style: &Style) -> Result<()> {
    for (name, _) in style.iter() {
        native::remove_style(node, name)?;
    }
    Ok(())
}

fn invalid(key: &str, expected: &'static str) -> Error {
    Error::InvalidProp {
        key: key.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::native::Mutations;
    use crate::types::Handler;

    fn setup() -> NativeId {
        native::reset_tree();
        crate::config::reset_config();
        native::create_element("div")
    }

    #[test]
    fn test_id_and_style_scenario() {
        let node = setup();
        let old = Props::new()
            .with("id", "x")
            .with("style", Style::new().with("color", "red"));
        sync_props(node, &Props::new(), &old).unwrap();
        assert_eq!(native::attribute(node, "id"), Some(PropValue::from("x")));
        native::take_mutations(node);

        let new = Props::new().with("style", Style::new().with("color", "blue"));
        sync_props(node, &old, &new).unwrap();

        assert_eq!(native::attribute(node, "id"), None);
        assert_eq!(native::style_value(node, "color").as_deref(), Some("blue"));
        assert_eq!(native::take_mutations(node), Mutations::ATTRIBUTES | Mutations::STYLE);
    }

    #[test]
    fn test_style_merges_fields() {
        let node = setup();
        let old = Props::new().with("style", Style::new().with("color", "red").with("width", "4"));
        sync_props(node, &Props::new(), &old).unwrap();

        let new = Props::new().with("style", Style::new().with("color", "red"));
        let before = native::mutation_count(node);
        sync_props(node, &old, &new).unwrap();

        // Same value is not a write; fields missing from the new map stay
        assert_eq!(native::mutation_count(node), before);
        assert_eq!(native::style_value(node, "width").as_deref(), Some("4"));
    }

    #[test]
    fn test_removed_style_is_cleared() {
        let node = setup();
        let old = Props::new().with("style", Style::new().with("color", "red"));
        sync_props(node, &Props::new(), &old).unwrap();
        sync_props(node, &old, &Props::new()).unwrap();
        assert!(native::style(node).is_empty());
    }

    #[test]
    fn test_handlers_register_lowercased() {
        let node = setup();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let handler = Handler::new(move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });

        let props = Props::new().with("onClick", handler).with("online", true);
        sync_props(node, &Props::new(), &props).unwrap();

        native::dispatch(node, "onclick").unwrap();
        assert_eq!(hits.get(), 1);
        // `online` has no uppercase letter after the prefix
        assert_eq!(native::attribute(node, "online"), Some(PropValue::Bool(true)));

        sync_props(node, &props, &Props::new()).unwrap();
        assert!(native::events::handler(node, "onclick").is_none());
        assert_eq!(native::attribute(node, "online"), None);
    }

    #[test]
    fn test_children_key_skipped() {
        let node = setup();
        let props = Props::new().with("children", "ignored");
        sync_props(node, &Props::new(), &props).unwrap();
        assert!(native::attributes(node).is_empty());
    }

    #[test]
    fn test_invalid_shapes() {
        let node = setup();
        let err = sync_props(node, &Props::new(), &Props::new().with("style", "color:red"));
        assert_eq!(
            err,
            Err(Error::InvalidProp {
                key: "style".into(),
                expected: "a style map",
            })
        );

        let err = sync_props(node, &Props::new(), &Props::new().with("onClick", 3));
        assert!(matches!(err, Err(Error::InvalidProp { .. })));
    }
}
