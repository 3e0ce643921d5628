//! Terminal painter - Print a native subtree as a colored outline.
//!
//! One line per node, two spaces of indent per level:
//!
//! ```text
//! <ul id="list">
//!   <li>
//!     "one"
//! ```
//!
//! The `color` and `background` style fields are parsed with
//! [`Rgba::parse`] and inherited by descendants that don't set their own.

use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};

use crate::native::{self, NativeId, NativeKind};
use crate::types::{PropValue, Rgba};

#[derive(Debug, Clone, Copy, Default)]
struct Colors {
    fg: Option<Rgba>,
    bg: Option<Rgba>,
}

impl Colors {
    fn inherit(self, node: NativeId) -> Self {
        let style = native::style(node);
        Self {
            fg: style.get("color").and_then(Rgba::parse).or(self.fg),
            bg: style.get("background").and_then(Rgba::parse).or(self.bg),
        }
    }
}

fn to_color(rgba: Rgba) -> Color {
    Color::Rgb {
        r: rgba.r,
        g: rgba.g,
        b: rgba.b,
    }
}

/// Write the outline of `root` and its subtree to `out`.
pub fn paint<W: Write>(out: &mut W, root: NativeId) -> io::Result<()> {
    paint_node(out, root, 0, Colors::default())?;
    out.flush()
}

/// Paint `root` to stdout.
pub fn print_tree(root: NativeId) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    paint(&mut out, root)
}

fn paint_node<W: Write>(out: &mut W, node: NativeId, depth: usize, colors: Colors) -> io::Result<()> {
    let Some(kind) = native::kind(node) else {
        return Ok(());
    };
    let colors = colors.inherit(node);
    let line = match &kind {
        NativeKind::Container => "<root>".to_string(),
        NativeKind::Fragment => "<>".to_string(),
        NativeKind::Text(text) => format!("{text:?}"),
        NativeKind::Element(tag) => open_tag(node, tag),
    };

    queue!(out, Print("  ".repeat(depth)))?;
    if let Some(fg) = colors.fg {
        queue!(out, SetForegroundColor(to_color(fg)))?;
    }
    if let Some(bg) = colors.bg {
        queue!(out, SetBackgroundColor(to_color(bg)))?;
    }
    queue!(out, Print(line))?;
    if colors.fg.is_some() || colors.bg.is_some() {
        queue!(out, ResetColor)?;
    }
    queue!(out, Print("\n"))?;

    for child in native::children(node) {
        paint_node(out, child, depth + 1, colors)?;
    }
    Ok(())
}

fn open_tag(node: NativeId, tag: &str) -> String {
    let mut line = format!("<{tag}");
    for (name, value) in native::attributes(node) {
        match value {
            PropValue::Bool(true) => line.push_str(&format!(" {name}")),
            value => line.push_str(&format!(" {name}=\"{value}\"")),
        }
    }
    line.push('>');
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn painted(root: NativeId) -> String {
        let mut out = Vec::new();
        paint(&mut out, root).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_plain_outline() {
        native::reset_tree();
        let root = native::create_container();
        let list = native::create_element("ul");
        native::set_attribute(list, "id", PropValue::from("list")).unwrap();
        native::set_attribute(list, "open", PropValue::Bool(true)).unwrap();
        let item = native::create_element("li");
        native::append_child(item, native::create_text("one")).unwrap();
        native::append_child(list, item).unwrap();
        native::append_child(root, list).unwrap();

        assert_eq!(
            painted(root),
            "<root>\n  <ul id=\"list\" open>\n    <li>\n      \"one\"\n"
        );
    }

    #[test]
    fn test_colors_inherit() {
        native::reset_tree();
        let root = native::create_container();
        let p = native::create_element("p");
        native::set_style(p, "color", "red").unwrap();
        native::append_child(p, native::create_text("hot")).unwrap();
        native::append_child(root, p).unwrap();

        let out = painted(root);
        // Element and its text child are both painted red
        assert_eq!(out.matches("\x1b[38;2;255;0;0m").count(), 2);
        assert!(out.starts_with("<root>\n"));
    }
}
