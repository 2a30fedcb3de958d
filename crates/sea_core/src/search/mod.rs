use std::cmp::Ordering;

use crate::constants::Distance;
use crate::graph::{DefaultIdx, NodeIndex};

pub mod ch_dijkstra;
pub mod dijkstra;
pub mod shortest_path;

pub use ch_dijkstra::CHDijkstra;
pub use dijkstra::Dijkstra;
pub use shortest_path::ShortestPath;

/// Queue entry ordered so that `BinaryHeap` pops the smallest weight first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate<Idx = DefaultIdx> {
    pub(crate) node_idx: NodeIndex<Idx>,
    pub(crate) weight: Distance,
}

impl Candidate {
    pub(crate) fn new(node_idx: NodeIndex, weight: Distance) -> Self {
        Self { node_idx, weight }
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .weight
            .cmp(&self.weight)
            .then_with(|| other.node_idx.cmp(&self.node_idx))
    }
}

#[cfg(test)]
pub(crate) fn assert_path(expected: Vec<usize>, weight: Distance, sp: Option<ShortestPath>) {
    let sp = sp.expect("expected a path but none was found");
    let nodes: Vec<usize> = sp.nodes.iter().map(|n| n.index()).collect();
    assert_eq!(nodes, expected);
    assert_eq!(sp.weight, weight);
}

#[cfg(test)]
pub(crate) fn assert_no_path(sp: Option<ShortestPath>) {
    assert!(sp.is_none(), "expected no path but found {:?}", sp);
}

#[cfg(test)]
mod tests {
    use std::collections::BinaryHeap;

    use super::*;
    use crate::graph::node_index;

    #[test]
    fn heap_pops_smallest_first() {
        let mut queue = BinaryHeap::new();
        queue.push(Candidate::new(node_index(0), 30));
        queue.push(Candidate::new(node_index(1), 10));
        queue.push(Candidate::new(node_index(2), 20));

        let order: Vec<u64> = std::iter::from_fn(|| queue.pop().map(|c| c.weight)).collect();
        assert_eq!(order, vec![10, 20, 30]);
    }
}
