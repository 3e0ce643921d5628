//! Keyed child-list diff.
//!
//! Runs in two passes so removals never shift the indices insertions rely on:
//!
//! 1. **Plan** ([`plan_children`]): match each new child to an old one by its
//!    identity token (key, else position) and record MOVE / PLACEMENT patches
//!    against a high-water mark of old positions already placed.
//! 2. **Apply**: diff matched pairs in place, unmount unmatched old children,
//!    detach moved ones, then insert moved and fresh children in new order.
//!
//! The high-water mark is not a longest-common-subsequence: moving the last
//! child to the front moves every other child instead. It is O(n) and stable for
//! appends, removals and the usual reorders.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::error::Result;
use crate::native::{self, NativeId};
use crate::types::Key;
use crate::vnode::VNode;

use super::reconcile::{mount_into, reconcile_in, unmount};

// =============================================================================
// Plan
// =============================================================================

/// What happens to a new child that is not stationary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchKind {
    /// Existing native nodes re-inserted at a new position.
    Move,
    /// Freshly mounted.
    Placement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub kind: PatchKind,
    /// Index of the matched old child (moves only).
    pub old_index: Option<usize>,
    /// Target position among the new children.
    pub mount_index: usize,
}

/// Result of matching an old child list against a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildPlan {
    /// For each new child, the old child it continues.
    pub matches: Vec<Option<usize>>,
    /// Moves and placements, in new-child order.
    pub patches: Vec<Patch>,
    /// Old children to unmount, in old order.
    pub removals: Vec<usize>,
}

impl ChildPlan {
    /// True when no child is moved, placed or removed.
    pub fn is_noop(&self) -> bool {
        self.patches.is_empty() && self.removals.is_empty()
    }

    /// Per new child: matched and not patched, so its native nodes stay put.
    fn stationary(&self) -> Vec<bool> {
        let mut stationary: Vec<bool> = self.matches.iter().map(Option::is_some).collect();
        for patch in &self.patches {
            stationary[patch.mount_index] = false;
        }
        stationary
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Identity<'a> {
    Key(&'a Key),
    Index(usize),
}

fn identity(child: &VNode, index: usize) -> Identity<'_> {
    match child.get_key() {
        Some(key) => Identity::Key(key),
        None => Identity::Index(index),
    }
}

/// Match `new` against `old` without touching the native tree.
///
/// A matched pair whose kinds differ is still a match: it is replaced in place
/// during the apply pass and takes part in the MOVE rule like any other pair.
pub fn plan_children(old: &[VNode], new: &[VNode]) -> ChildPlan {
    let mut plan = ChildPlan::default();

    let mut lookup: HashMap<Identity<'_>, usize> = HashMap::with_capacity(old.len());
    for (index, child) in old.iter().enumerate() {
        match lookup.entry(identity(child, index)) {
            Entry::Vacant(slot) => {
                slot.insert(index);
            }
            Entry::Occupied(_) => {
                tracing::warn!(key = ?child.get_key(), index, "duplicate key among siblings");
                plan.removals.push(index);
            }
        }
    }

    let mut last_placed = 0;
    for (index, child) in new.iter().enumerate() {
        let found = lookup.remove(&identity(child, index));

        match found {
            Some(old_index) => {
                let previous = old[old_index].mount_index;
                if previous < last_placed {
                    plan.patches.push(Patch {
                        kind: PatchKind::Move,
                        old_index: Some(old_index),
                        mount_index: index,
                    });
                }
                last_placed = last_placed.max(previous);
                plan.matches.push(Some(old_index));
            }
            None => {
                plan.patches.push(Patch {
                    kind: PatchKind::Placement,
                    old_index: None,
                    mount_index: index,
                });
                plan.matches.push(None);
            }
        }
    }

    plan.removals.extend(lookup.into_values());
    plan.removals.sort_unstable();
    plan
}

// =============================================================================
// Apply
// =============================================================================

/// Reconcile `old` into `new` under `parent`. `end` is the native node the
/// list must stay in front of (`None` for the end of `parent`).
pub(crate) fn reconcile_children(
    parent: NativeId,
    old: &mut [VNode],
    new: &mut [VNode],
    end: Option<NativeId>,
) -> Result<()> {
    let plan = plan_children(old, new);

    for (index, child) in new.iter_mut().enumerate() {
        child.mount_index = index;
    }

    let mut owner = vec![None; old.len()];
    for (index, matched) in plan.matches.iter().enumerate() {
        if let Some(old_index) = *matched {
            owner[old_index] = Some(index);
        }
    }

    // Diff matched pairs in place. Natives are still in old order here.
    let mut diffed = vec![false; old.len()];
    for (index, matched) in plan.matches.iter().enumerate() {
        let Some(old_index) = *matched else {
            continue;
        };
        let anchor = if old[old_index].find_native().is_some() {
            end
        } else {
            following_native(old, new, &owner, &diffed, old_index).or(end)
        };
        reconcile_in(Some(&mut old[old_index]), Some(&mut new[index]), parent, anchor)?;
        diffed[old_index] = true;
    }

    if plan.is_noop() {
        return Ok(());
    }

    for &old_index in &plan.removals {
        tracing::trace!(old_index, "remove child");
        unmount(&mut old[old_index])?;
    }

    for patch in &plan.patches {
        if patch.kind == PatchKind::Move {
            for id in new[patch.mount_index].native_nodes() {
                native::detach(id)?;
            }
        }
    }

    // Each patched child goes in front of the nearest stationary sibling after it
    let stationary = plan.stationary();
    let mut anchors = vec![end; new.len()];
    let mut anchor = end;
    for index in (0..new.len()).rev() {
        anchors[index] = anchor;
        if stationary[index] {
            if let Some(first) = new[index].find_native() {
                anchor = Some(first);
            }
        }
    }

    for patch in &plan.patches {
        let index = patch.mount_index;
        let anchor = anchors[index];
        tracing::trace!(kind = ?patch.kind, index, ?anchor, "apply patch");
        match patch.kind {
            PatchKind::Placement => mount_into(&mut new[index], parent, anchor)?,
            PatchKind::Move => {
                for id in new[index].native_nodes() {
                    native::insert_before(parent, id, anchor)?;
                }
            }
        }
    }

    Ok(())
}

/// First native node after old child `old_index` in the native tree, before
/// any moves. Siblings already diffed are read from their new vnode.
fn following_native(
    old: &[VNode],
    new: &[VNode],
    owner: &[Option<usize>],
    diffed: &[bool],
    old_index: usize,
) -> Option<NativeId> {
    (old_index + 1..old.len()).find_map(|k| match owner[k] {
        Some(index) if diffed[k] => new[index].find_native(),
        _ => old[k].find_native(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed(keys: &[&str]) -> Vec<VNode> {
        keys.iter().map(|k| VNode::text(*k).key(*k)).collect()
    }

    fn placed(mut children: Vec<VNode>) -> Vec<VNode> {
        for (index, child) in children.iter_mut().enumerate() {
            child.mount_index = index;
        }
        children
    }

    #[test]
    fn test_plan_reorder_scenario() {
        let old = placed(keyed(&["A", "B", "C", "D", "E", "F"]));
        let new = keyed(&["A", "C", "E", "B", "G"]);
        let plan = plan_children(&old, &new);

        assert_eq!(plan.matches, vec![Some(0), Some(2), Some(4), Some(1), None]);
        assert_eq!(
            plan.patches,
            vec![
                Patch {
                    kind: PatchKind::Move,
                    old_index: Some(1),
                    mount_index: 3,
                },
                Patch {
                    kind: PatchKind::Placement,
                    old_index: None,
                    mount_index: 4,
                },
            ]
        );
        assert_eq!(plan.removals, vec![3, 5]);
    }

    #[test]
    fn test_plan_identical_is_noop() {
        let old = placed(keyed(&["a", "b", "c"]));
        let plan = plan_children(&old, &old.clone());
        assert!(plan.is_noop());
    }

    #[test]
    fn test_plan_positional_identity() {
        let old = placed(vec![VNode::text("x"), VNode::text("y")]);
        let new = vec![VNode::text("y"), VNode::text("x")];
        let plan = plan_children(&old, &new);
        assert_eq!(plan.matches, vec![Some(0), Some(1)]);
        assert!(plan.is_noop());
    }

    #[test]
    fn test_plan_keys_do_not_collide_with_indices() {
        // Key "0" on the new child must not match the unkeyed child at index 0
        let old = placed(vec![VNode::text("plain")]);
        let new = vec![VNode::text("keyed").key(0usize)];
        let plan = plan_children(&old, &new);
        assert_eq!(plan.matches, vec![None]);
        assert_eq!(plan.removals, vec![0]);
    }

    #[test]
    fn test_plan_kind_change_stays_matched() {
        let old = placed(vec![VNode::element("div").key("k"), VNode::text("t").key("t")]);
        let new = vec![VNode::text("t").key("t"), VNode::element("span").key("k")];
        let plan = plan_children(&old, &new);
        assert_eq!(plan.matches, vec![Some(1), Some(0)]);
        assert!(plan.removals.is_empty());
        assert_eq!(
            plan.patches,
            vec![Patch {
                kind: PatchKind::Move,
                old_index: Some(0),
                mount_index: 1,
            }]
        );
    }

    #[test]
    fn test_apply_kind_change_with_move() {
        native::reset_tree();
        let parent = native::create_element("div");

        let mut old = vec![VNode::element("b").key("k"), VNode::text("t").key("t")];
        super::super::mount::mount_children(parent, &mut old, &mut Vec::new()).unwrap();

        let mut new = vec![VNode::text("t").key("t"), VNode::element("i").key("k")];
        reconcile_children(parent, &mut old, &mut new, None).unwrap();
        assert_eq!(native::inner_markup(parent), "t<i></i>");
    }

    #[test]
    fn test_empty_child_gains_content_in_place() {
        native::reset_tree();
        let parent = native::create_element("div");

        let mut old = vec![VNode::text("["), VNode::fragment(Vec::<VNode>::new()), VNode::text("]")];
        super::super::mount::mount_children(parent, &mut old, &mut Vec::new()).unwrap();

        let mut new = vec![VNode::text("["), VNode::fragment(["a", "b"]), VNode::text("]")];
        reconcile_children(parent, &mut old, &mut new, None).unwrap();
        assert_eq!(native::inner_markup(parent), "[ab]");
    }

    #[test]
    fn test_plan_duplicate_keys_first_wins() {
        let old = placed(keyed(&["a", "a", "b"]));
        let new = keyed(&["a", "b"]);
        let plan = plan_children(&old, &new);
        assert_eq!(plan.matches, vec![Some(0), Some(2)]);
        assert_eq!(plan.removals, vec![1]);
    }

    #[test]
    fn test_plan_move_first_to_end() {
        let old = placed(keyed(&["a", "b", "c"]));
        let new = keyed(&["b", "c", "a"]);
        let plan = plan_children(&old, &new);
        // b and c keep their order; only a moves
        assert_eq!(plan.patches.len(), 1);
        assert_eq!(plan.patches[0].old_index, Some(0));
    }

    #[test]
    fn test_apply_reorder_in_native_tree() {
        native::reset_tree();
        let parent = native::create_element("ul");

        let mut old = keyed(&["A", "B", "C", "D", "E", "F"]);
        super::super::mount::mount_children(parent, &mut old, &mut Vec::new()).unwrap();
        let b = old[1].native().unwrap();
        let a = old[0].native().unwrap();

        let mut new = keyed(&["A", "C", "E", "B", "G"]);
        reconcile_children(parent, &mut old, &mut new, None).unwrap();

        assert_eq!(native::inner_markup(parent), "ACEBG");
        assert_eq!(new[3].native(), Some(b));
        assert_eq!(new[0].native(), Some(a));
        assert_eq!(native::mutation_count(a), 0);
        assert_eq!(new[4].mount_index(), 4);
    }
}
