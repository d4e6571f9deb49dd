//! Cycle detection over parent links.
//!
//! Every walk is iterative; stack depth never grows with tree depth.

use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;

/// Returns whether giving `id` the parent `new_parent` would close a cycle.
///
/// `parent_of` resolves the current parent of a node (`None` at a root).
/// Runs in O(depth of `new_parent`). A walk that revisits a node reports
/// `true`, since the existing links are already cyclic.
pub fn would_create_cycle<Id, F>(id: Id, new_parent: Option<Id>, mut parent_of: F) -> bool
where
    Id: Copy + Ord,
    F: FnMut(Id) -> Option<Id>,
{
    match try_would_create_cycle(id, new_parent, |current| {
        Ok::<_, Infallible>(parent_of(current))
    }) {
        Ok(found) => found,
        Err(never) => match never {},
    }
}

/// Same walk as [`would_create_cycle`] for lookups that can fail, such as
/// point reads against the store. The first lookup error stops the walk.
pub fn try_would_create_cycle<Id, E, F>(
    id: Id,
    new_parent: Option<Id>,
    mut parent_of: F,
) -> Result<bool, E>
where
    Id: Copy + Ord,
    F: FnMut(Id) -> Result<Option<Id>, E>,
{
    let mut visited = BTreeSet::new();
    let mut cursor = new_parent;
    while let Some(current) = cursor {
        if current == id {
            return Ok(true);
        }
        if !visited.insert(current) {
            return Ok(true);
        }
        cursor = parent_of(current)?;
    }
    Ok(false)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    OnStack,
    Done,
}

/// Returns every node that lies on a cycle reachable from `nodes`.
///
/// Depth-first search with an explicit stack: reaching a child still on the
/// stack marks the whole stack segment from that child upward. O(V+E).
pub fn detect_cycles<Id, N, F, I>(nodes: N, mut children: F) -> BTreeSet<Id>
where
    Id: Copy + Ord,
    N: IntoIterator<Item = Id>,
    F: FnMut(Id) -> I,
    I: IntoIterator<Item = Id>,
{
    let mut marks: BTreeMap<Id, Mark> = BTreeMap::new();
    let mut cyclic = BTreeSet::new();

    for start in nodes {
        if marks.contains_key(&start) {
            continue;
        }
        marks.insert(start, Mark::OnStack);
        let mut stack = vec![(start, children(start).into_iter())];

        while let Some((node, pending)) = stack.last_mut() {
            let node = *node;
            match pending.next() {
                Some(child) => match marks.get(&child).copied() {
                    None => {
                        marks.insert(child, Mark::OnStack);
                        stack.push((child, children(child).into_iter()));
                    }
                    Some(Mark::OnStack) => {
                        if let Some(pos) = stack.iter().position(|(entry, _)| *entry == child) {
                            cyclic.extend(stack[pos..].iter().map(|(entry, _)| *entry));
                        }
                    }
                    Some(Mark::Done) => {}
                },
                None => {
                    marks.insert(node, Mark::Done);
                    stack.pop();
                }
            }
        }
    }

    cyclic
}

#[cfg(test)]
mod tests {
    use super::{detect_cycles, try_would_create_cycle, would_create_cycle};
    use std::collections::{BTreeMap, BTreeSet};

    fn parents(pairs: &[(u32, u32)]) -> BTreeMap<u32, u32> {
        pairs.iter().copied().collect()
    }

    fn children_of(parents: &BTreeMap<u32, u32>, id: u32) -> Vec<u32> {
        parents
            .iter()
            .filter(|(_, parent)| **parent == id)
            .map(|(child, _)| *child)
            .collect()
    }

    #[test]
    fn moving_to_root_is_always_safe() {
        let links = parents(&[(2, 1)]);
        assert!(!would_create_cycle(1, None, |id| links.get(&id).copied()));
    }

    #[test]
    fn fallible_walk_stops_at_first_lookup_error() {
        // 1 -> 2 -> 3, lookup of 2 fails
        let links = parents(&[(2, 1), (3, 2)]);
        let mut lookups = Vec::new();
        let result = try_would_create_cycle(1, Some(3), |id| {
            lookups.push(id);
            if id == 2 {
                Err("store offline")
            } else {
                Ok(links.get(&id).copied())
            }
        });
        assert_eq!(result, Err("store offline"));
        assert_eq!(lookups, vec![3, 2]);

        let ok: Result<bool, ()> =
            try_would_create_cycle(1, Some(3), |id| Ok(links.get(&id).copied()));
        assert_eq!(ok, Ok(true));
    }

    #[test]
    fn self_parent_is_a_cycle() {
        assert!(would_create_cycle(7, Some(7), |_| None));
    }

    #[test]
    fn descendant_as_parent_is_a_cycle() {
        // 1 -> 2 -> 3
        let links = parents(&[(2, 1), (3, 2)]);
        assert!(would_create_cycle(1, Some(3), |id| links.get(&id).copied()));
        assert!(!would_create_cycle(3, Some(1), |id| links.get(&id).copied()));
    }

    #[test]
    fn walk_stops_on_existing_loop() {
        // 2 <-> 3 already cyclic; 1 is unrelated.
        let links = parents(&[(2, 3), (3, 2)]);
        assert!(would_create_cycle(1, Some(2), |id| links.get(&id).copied()));
    }

    #[test]
    fn forest_has_no_cycles() {
        let links = parents(&[(2, 1), (3, 1), (4, 3), (6, 5)]);
        let found = detect_cycles(1..=6, |id| children_of(&links, id));
        assert!(found.is_empty());
    }

    #[test]
    fn reports_only_nodes_on_the_loop() {
        // 1 -> 2 -> 3 -> 1, with 4 hanging under 3 and 5 standalone.
        let links = parents(&[(2, 1), (3, 2), (1, 3), (4, 3)]);
        let found = detect_cycles(1..=5, |id| children_of(&links, id));
        assert_eq!(found, BTreeSet::from([1, 2, 3]));
    }

    #[test]
    fn self_loop_is_reported() {
        let links = parents(&[(9, 9)]);
        let found = detect_cycles([9], |id| children_of(&links, id));
        assert_eq!(found, BTreeSet::from([9]));
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let depth = 100_000u32;
        let links: BTreeMap<u32, u32> = (1..depth).map(|id| (id, id - 1)).collect();
        let mut kids: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
        for (child, parent) in &links {
            kids.entry(*parent).or_default().push(*child);
        }
        let found = detect_cycles(0..depth, |id| kids.get(&id).cloned().unwrap_or_default());
        assert!(found.is_empty());
        assert!(would_create_cycle(0, Some(depth - 1), |id| links.get(&id).copied()));
    }
}
