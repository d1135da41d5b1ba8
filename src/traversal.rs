//! Marking and flood-fill over the vertex graph.
//!
//! The vertex graph is full of cycles (every finite vertex has four neighbours and
//! the graph closes up around each site), so every walk keeps a visited set. The
//! set lives with the traversal rather than on the vertices, which keeps read-only
//! queries free of shared mutable state.

use rustc_hash::FxHashSet;

use crate::vertex::VertexKey;

/// Visited set keyed by vertex.
#[derive(Debug, Default, Clone)]
pub struct Marks {
    visited: FxHashSet<VertexKey>,
}

impl Marks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key`, returning false if it was already marked.
    #[inline]
    pub fn mark(&mut self, key: VertexKey) -> bool {
        self.visited.insert(key)
    }

    #[inline]
    pub fn is_marked(&self, key: VertexKey) -> bool {
        self.visited.contains(&key)
    }

    /// Clears every mark so the next traversal starts from a clean slate.
    pub fn reset(&mut self) {
        self.visited.clear();
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}

/// Flood fill from `start`, expanding only through vertices that satisfy `accept`.
///
/// `neighbours` resolves a key to its four neighbours, or `None` if the key is stale.
/// Every reachable vertex is tested at most once; the accepted ones are returned
/// in visiting order. Marks left in `marks` by the caller are respected, so a vertex
/// that is already marked is neither tested nor expanded.
pub fn flood<N, F>(start: VertexKey, marks: &mut Marks, mut neighbours: N, mut accept: F) -> Vec<VertexKey>
where
    N: FnMut(VertexKey) -> Option<[VertexKey; 4]>,
    F: FnMut(VertexKey) -> bool,
{
    let mut accepted = Vec::new();
    let mut stack = vec![start];

    while let Some(key) = stack.pop() {
        if !marks.mark(key) {
            continue;
        }
        let Some(adjacent) = neighbours(key) else {
            continue;
        };
        if !accept(key) {
            continue;
        }
        accepted.push(key);
        for n in adjacent {
            if !marks.is_marked(n) {
                stack.push(n);
            }
        }
    }

    accepted
}
