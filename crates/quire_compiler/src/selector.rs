//! Orders reps so each is compiled after the reps whose content it reads.
//!
//! The order is discovered while compiling: a rep that needs another rep's
//! compiled content reports [`Attempt::Pending`], the selector records a
//! "must be compiled before" edge and moves on to another root.

use std::collections::BTreeSet;
use std::hash::Hash;

use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use tracing::{debug, trace};

/// The outcome of one compilation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt<N> {
    /// The node is done.
    Ready,
    /// The node needs this other node compiled first.
    Pending(N),
}

/// Why selection stopped.
#[derive(Debug)]
pub enum SelectError<N, E> {
    /// An attempt failed.
    Compile(E),
    /// The remaining nodes all wait on each other. Sorted.
    Recursive(Vec<N>),
    /// A node waited on a node that was already done.
    AlreadyCompiled(N),
}

/// Demand-driven scheduler over a growing "compile before" graph.
pub struct ItemRepSelector<N: Copy + Ord + Hash> {
    graph: DiGraphMap<N, ()>,
    done: BTreeSet<N>,
}

impl<N: Copy + Ord + Hash + std::fmt::Debug> ItemRepSelector<N> {
    /// Seeds the graph with every node and no edges.
    pub fn new(nodes: impl IntoIterator<Item = N>) -> Self {
        let mut graph = DiGraphMap::new();
        for node in nodes {
            graph.add_node(node);
        }
        Self {
            graph,
            done: BTreeSet::new(),
        }
    }

    /// Calls `attempt` on the smallest root until the graph is empty.
    ///
    /// A [`Pending`](Attempt::Pending) result adds an edge from the awaited
    /// node to the attempted one, inserting the awaited node if needed.
    pub fn run<E>(
        mut self,
        mut attempt: impl FnMut(N) -> Result<Attempt<N>, E>,
    ) -> Result<(), SelectError<N, E>> {
        while let Some(node) = self.next_root() {
            match attempt(node).map_err(SelectError::Compile)? {
                Attempt::Ready => {
                    self.graph.remove_node(node);
                    self.done.insert(node);
                }
                Attempt::Pending(other) => {
                    if self.done.contains(&other) {
                        return Err(SelectError::AlreadyCompiled(other));
                    }
                    trace!(?node, awaits = ?other, "rep deferred");
                    self.graph.add_edge(other, node, ());
                }
            }
        }

        if self.graph.node_count() > 0 {
            let mut stuck: Vec<N> = self.graph.nodes().collect();
            stuck.sort();
            debug!(count = stuck.len(), "no rep can be compiled");
            return Err(SelectError::Recursive(stuck));
        }
        Ok(())
    }

    fn next_root(&self) -> Option<N> {
        self.graph
            .nodes()
            .filter(|n| {
                self.graph
                    .neighbors_directed(*n, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Runs the selector where node `k` needs every node in `needs[k]`.
    fn order(nodes: &[u32], needs: &[(u32, u32)]) -> Result<Vec<u32>, SelectError<u32, ()>> {
        let mut wants: HashMap<u32, Vec<u32>> = HashMap::new();
        for (a, b) in needs {
            wants.entry(*a).or_default().push(*b);
        }
        let mut done = Vec::new();
        ItemRepSelector::new(nodes.iter().copied()).run(|n| -> Result<Attempt<u32>, ()> {
            let missing = wants
                .get(&n)
                .into_iter()
                .flatten()
                .find(|dep| !done.contains(*dep));
            match missing {
                Some(dep) => Ok(Attempt::Pending(*dep)),
                None => {
                    done.push(n);
                    Ok(Attempt::Ready)
                }
            }
        })?;
        Ok(done)
    }

    #[test]
    fn independent_nodes_in_order() {
        assert_eq!(order(&[2, 0, 1], &[]).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn dependencies_come_first() {
        let done = order(&[0, 1, 2], &[(0, 2), (2, 1)]).unwrap();
        assert_eq!(done, vec![1, 2, 0]);
    }

    #[test]
    fn each_node_is_yielded_once() {
        let done = order(&[0, 1, 2, 3], &[(0, 3), (1, 3), (2, 3)]).unwrap();
        assert_eq!(done.len(), 4);
        assert_eq!(done[0], 3);
    }

    #[test]
    fn mutual_dependency_is_recursive() {
        match order(&[0, 1, 2], &[(0, 1), (1, 0)]) {
            Err(SelectError::Recursive(stuck)) => assert_eq!(stuck, vec![0, 1]),
            other => panic!("expected recursion, got {other:?}"),
        }
    }

    #[test]
    fn unknown_node_is_inserted() {
        let done = order(&[0], &[(0, 7)]).unwrap();
        assert_eq!(done, vec![7, 0]);
    }

    #[test]
    fn errors_abort() {
        let result: Result<(), SelectError<u32, &str>> = ItemRepSelector::new([0, 1]).run(|n| {
            if n == 1 {
                Err("boom")
            } else {
                Ok(Attempt::Ready)
            }
        });
        assert!(matches!(result, Err(SelectError::Compile("boom"))));
    }

    #[test]
    fn pending_on_done_node_is_rejected() {
        let result: Result<(), SelectError<u32, ()>> = ItemRepSelector::new([0, 1]).run(|n| {
            if n == 1 {
                Ok(Attempt::Pending(0))
            } else {
                Ok(Attempt::Ready)
            }
        });
        assert!(matches!(result, Err(SelectError::AlreadyCompiled(0))));
    }
}
