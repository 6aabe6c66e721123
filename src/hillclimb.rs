//! This module implements the greedy hill-climbing search with backtracking used by
//! [RoutingGrid](crate::RoutingGrid). Like
//! [pathfinding's astar function](https://docs.rs/pathfinding/latest/pathfinding/directed/astar/index.html)
//! it is generic over the node type so it can be tested away from the grid.

use fxhash::FxBuildHasher;
use indexmap::IndexSet;
use itertools::Itertools;

use std::hash::Hash;

type FxIndexSet<T> = IndexSet<T, FxBuildHasher>;

/// Searches for a path from `start` to a node satisfying `success` by greedily
/// descending on `heuristic`. When descent stalls on a local maximum, every
/// remaining candidate is explored recursively and the shortest successful branch
/// is kept. Returns the nodes of the path in order, `start` first, or [None] when
/// every branch dead-ends.
///
/// The visited set lives for exactly one call and is shared across all recursive
/// branches: a node rejected in one branch is never retried by a sibling. This
/// bounds total work by the node count but can prune branches that would have
/// succeeded through an abandoned node, so the search is not complete.
pub fn hillclimb<N, C, FN, IN, FH, FS>(
    start: &N,
    mut successors: FN,
    mut heuristic: FH,
    mut success: FS,
) -> Option<Vec<N>>
where
    N: Eq + Hash + Clone,
    C: Ord + Copy,
    FN: FnMut(&N) -> IN,
    IN: IntoIterator<Item = N>,
    FH: FnMut(&N) -> C,
    FS: FnMut(&N) -> bool,
{
    let mut visited = FxIndexSet::default();
    climb(
        start.clone(),
        &mut successors,
        &mut heuristic,
        &mut success,
        &mut visited,
    )
}

fn climb<N, C, FN, IN, FH, FS>(
    start: N,
    successors: &mut FN,
    heuristic: &mut FH,
    success: &mut FS,
    visited: &mut FxIndexSet<N>,
) -> Option<Vec<N>>
where
    N: Eq + Hash + Clone,
    C: Ord + Copy,
    FN: FnMut(&N) -> IN,
    IN: IntoIterator<Item = N>,
    FH: FnMut(&N) -> C,
    FS: FnMut(&N) -> bool,
{
    let mut current = start;
    let mut path = vec![current.clone()];
    loop {
        if success(&current) {
            return Some(path);
        }
        visited.insert(current.clone());
        let mut candidates: Vec<N> = successors(&current)
            .into_iter()
            .filter(|n| !visited.contains(n))
            .collect();
        if candidates.is_empty() {
            // Dead end, this branch is abandoned
            return None;
        }
        // The first of several equally good candidates wins, so the successor
        // enumeration order decides ties
        let best_ix = candidates
            .iter()
            .position_min_by_key(|n| heuristic(n))
            .unwrap();
        if heuristic(&candidates[best_ix]) < heuristic(&current) {
            let next = candidates.swap_remove(best_ix);
            path.push(next.clone());
            current = next;
        } else {
            // Local maximum: no candidate is strictly closer. Explore every
            // candidate in order and keep the branch with the fewest nodes,
            // ties again going to the earliest branch.
            let mut branches: Vec<Vec<N>> = Vec::new();
            for candidate in candidates {
                if let Some(branch) = climb(candidate, successors, heuristic, success, visited) {
                    branches.push(branch);
                }
            }
            return branches
                .iter()
                .position_min_by_key(|branch| branch.len())
                .map(|ix| {
                    path.extend(branches.swap_remove(ix));
                    path
                });
        }
    }
}
