//! Keyed list demo.
//!
//! A list of counters you can reorder. Each counter keeps its count across
//! reorders because its slot is matched by key.
//!
//! Keys: `1`-`4` click a counter, `r` reverses the list, `d` drops the first
//! item, `q` quits.
//!
//! ```sh
//! cargo run --example keyed_list
//! ```

use std::io::{self, Write};

use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEventKind};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{cursor, execute};

use spark_vdom::{
    dispatch, native, reconcile, render, renderer, Component, Ctx, Handler, NativeId, Props,
    State, Style, VNode,
};

struct Counter;

impl Component for Counter {
    fn create(_props: &Props) -> Self {
        Counter
    }

    fn render(&self, ctx: &Ctx<'_>) -> VNode {
        let label = ctx.props.get_str("label").unwrap_or_default().to_string();
        let count = ctx.state.get_int("count").unwrap_or(0);
        let updater = ctx.updater.clone();
        let color = if count > 0 { "green" } else { "gray" };

        VNode::element("button")
            .style(Style::new().with("color", color))
            .on(
                "onClick",
                Handler::new(move |_| {
                    updater.update_state(|s| {
                        State::new().with("count", s.get_int("count").unwrap_or(0) + 1)
                    })
                }),
            )
            .child(format!("{label}: {count}"))
    }
}

fn list(labels: &[String]) -> VNode {
    VNode::element("ul").children(labels.iter().map(|label| {
        VNode::element("li")
            .key(label.as_str())
            .child(VNode::class::<Counter>().prop("label", label.as_str()))
    }))
}

fn draw(container: NativeId) -> io::Result<()> {
    let mut buffer = Vec::new();
    renderer::paint(&mut buffer, container)?;
    let text = String::from_utf8_lossy(&buffer).replace('\n', "\r\n");

    let mut out = io::stdout();
    execute!(out, Clear(ClearType::All), cursor::MoveTo(0, 0))?;
    write!(out, "{text}\r\n[1-4] click  [r] reverse  [d] drop  [q] quit\r\n")?;
    out.flush()
}

/// Button of the `index`-th list item.
fn button(container: NativeId, index: usize) -> Option<NativeId> {
    let ul = native::children(container).first().copied()?;
    let li = native::children(ul).get(index).copied()?;
    native::children(li).first().copied()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let container = native::create_container();
    let mut labels: Vec<String> = ["alpha", "beta", "gamma", "delta"].map(String::from).to_vec();
    let mut tree = render(list(&labels), container)?;

    terminal::enable_raw_mode()?;
    let result = (|| -> Result<(), Box<dyn std::error::Error>> {
        loop {
            draw(container)?;

            let TermEvent::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char(c @ '1'..='4') => {
                    let index = (c as u8 - b'1') as usize;
                    if let Some(button) = button(container, index) {
                        dispatch(button, "onclick")?;
                    }
                }
                KeyCode::Char('r') => labels.reverse(),
                KeyCode::Char('d') if !labels.is_empty() => {
                    labels.remove(0);
                }
                _ => continue,
            }

            let mut next = list(&labels);
            reconcile(Some(&mut tree), Some(&mut next), container, None)?;
            tree = next;
        }
    })();
    terminal::disable_raw_mode()?;
    result
}
