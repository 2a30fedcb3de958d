use std::collections::BinaryHeap;

use crate::constants::{Distance, UNREACHABLE};
use crate::graph::*;
use crate::search::shortest_path::ShortestPath;
use crate::search::Candidate;
use crate::statistics::SearchStats;
use log::debug;

/// What the explored search tree was grown for. A request with a different
/// key cannot reuse the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKey {
    /// Plain search over the base graph
    Route { source: NodeIndex },
    /// Witness search on the remaining graph around `excluded`
    Witness {
        source: NodeIndex,
        excluded: NodeIndex,
    },
}

impl SearchKey {
    fn source(&self) -> NodeIndex {
        match *self {
            SearchKey::Route { source } | SearchKey::Witness { source, .. } => source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    /// Queue holds the frontier of a partially explored tree
    Seeded(SearchKey),
    /// Every node reachable under the key is settled
    Exhausted(SearchKey),
}

impl SearchState {
    pub fn key(&self) -> Option<SearchKey> {
        match *self {
            SearchState::Idle => None,
            SearchState::Seeded(key) | SearchState::Exhausted(key) => Some(key),
        }
    }
}

/// Why the relaxation loop stopped
enum Halt {
    Target(Distance),
    Bound,
    Limit,
    Exhausted,
}

/// Single source Dijkstra which keeps its search tree between queries.
///
/// Subsequent queries from the same source continue where the last one
/// stopped. Scratch arrays are sized to the graph once and reset only over
/// the touched nodes.
pub struct Dijkstra<'a> {
    pub stats: SearchStats,
    g: &'a Graph,
    distances: Vec<Distance>,
    settled: Vec<bool>,
    previous: Vec<NodeIndex>,
    touched: Vec<NodeIndex>,
    queue: BinaryHeap<Candidate>,
    state: SearchState,
    blocked: Vec<bool>,
    witness_limit: Option<usize>,
    /// Nodes settled since the last reset
    settled_in_search: usize,
}

impl<'a> Dijkstra<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        let num_nodes = graph.num_nodes();
        Dijkstra {
            stats: SearchStats::default(),
            g: graph,
            distances: vec![UNREACHABLE; num_nodes],
            settled: vec![false; num_nodes],
            previous: vec![NodeIndex::end(); num_nodes],
            touched: Vec::new(),
            queue: BinaryHeap::new(),
            state: SearchState::Idle,
            blocked: Vec::new(),
            witness_limit: None,
            settled_in_search: 0,
        }
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Maximum number of nodes a single witness search may settle
    pub fn set_witness_limit(&mut self, limit: Option<usize>) {
        self.witness_limit = limit;
    }

    /// Witness searches treat `nodes` as removed from the graph
    pub fn block(&mut self, nodes: &[NodeIndex]) {
        self.blocked = vec![false; self.g.num_nodes()];
        for node in nodes {
            self.blocked[node.index()] = true;
        }
        self.reset_to_idle();
    }

    #[inline]
    fn is_blocked(&self, node: NodeIndex) -> bool {
        self.blocked.get(node.index()).copied().unwrap_or(false)
    }

    /// Tentative or final distance of `node` in the current search tree
    pub fn distance_to(&self, node: NodeIndex) -> Option<Distance> {
        match self.distances[node.index()] {
            UNREACHABLE => None,
            d => Some(d),
        }
    }

    fn reset_to_idle(&mut self) {
        for node in self.touched.drain(..) {
            self.distances[node.index()] = UNREACHABLE;
            self.settled[node.index()] = false;
            self.previous[node.index()] = NodeIndex::end();
        }
        self.queue.clear();
        self.settled_in_search = 0;
        self.state = SearchState::Idle;
    }

    /// Clears the old tree and seeds the queue for `key`
    pub fn reset(&mut self, key: SearchKey) {
        self.reset_to_idle();

        let source = key.source();
        self.distances[source.index()] = 0;
        self.touched.push(source);
        self.queue.push(Candidate::new(source, 0));
        self.state = SearchState::Seeded(key);
    }

    /// Brings the search tree to a state where `target` is settled (or known
    /// to be unreachable).
    fn prepare(&mut self, key: SearchKey, target: NodeIndex) {
        if self.state.key() != Some(key) {
            self.reset(key);
        }

        match self.state {
            _ if self.settled[target.index()] => {
                debug!("Reusing search tree of {:?} for {}", key, target);
            }
            SearchState::Exhausted(_) => {}
            _ => {
                self.settle_until(target, None);
            }
        }
    }

    /// Shortest path from `source` to `target` on the base graph
    pub fn find_route(&mut self, source: NodeIndex, target: NodeIndex) -> Option<ShortestPath> {
        self.stats.init();
        self.prepare(SearchKey::Route { source }, target);
        self.stats.finish();

        let sp = self.reconstruct_path(source, target);
        debug!(
            "Dijkstra {} -> {}: {:?} / {}",
            source,
            target,
            sp.as_ref().map(|sp| sp.weight),
            self.stats
        );
        sp
    }

    /// Like [`Dijkstra::find_route`] without building the path
    pub fn find_distance(&mut self, source: NodeIndex, target: NodeIndex) -> Option<Distance> {
        self.stats.init();
        self.prepare(SearchKey::Route { source }, target);
        self.stats.finish();

        if self.settled[target.index()] {
            Some(self.distances[target.index()])
        } else {
            None
        }
    }

    /// Witness search used during contraction.
    ///
    /// Returns `true` if no path from `source` to `target` avoiding
    /// `excluded` (and every contracted or blocked node) is at most `bound`
    /// long, i.e. the path over `excluded` needs a shortcut.
    pub fn shortest_path_contains_u(
        &mut self,
        source: NodeIndex,
        target: NodeIndex,
        excluded: NodeIndex,
        bound: Distance,
    ) -> bool {
        let key = SearchKey::Witness { source, excluded };
        if self.state.key() != Some(key) {
            self.reset(key);
        }

        if self.settled[target.index()] {
            return self.distances[target.index()] > bound;
        }
        if let SearchState::Exhausted(_) = self.state {
            return true;
        }

        match self.settle_until(target, Some(bound)) {
            Halt::Target(distance) => distance > bound,
            Halt::Bound | Halt::Limit | Halt::Exhausted => true,
        }
    }

    /// Runs the relaxation loop until `target` is popped, the frontier
    /// exceeds `bound`, the witness limit is hit or the queue runs empty.
    /// `target` stays in the queue so a later query can resume.
    fn settle_until(&mut self, target: NodeIndex, bound: Option<Distance>) -> Halt {
        let key = match self.state.key() {
            Some(key) => key,
            None => return Halt::Exhausted,
        };
        let limit = match key {
            SearchKey::Witness { .. } => self.witness_limit,
            SearchKey::Route { .. } => None,
        };

        while let Some(&Candidate { node_idx, weight }) = self.queue.peek() {
            if weight > self.distances[node_idx.index()] {
                // Outdated entry
                self.queue.pop();
                continue;
            }
            self.settled[node_idx.index()] = true;

            if node_idx == target {
                return Halt::Target(weight);
            }
            if let Some(bound) = bound {
                if weight > bound {
                    return Halt::Bound;
                }
            }
            if let Some(limit) = limit {
                if self.settled_in_search >= limit {
                    return Halt::Limit;
                }
            }

            self.queue.pop();
            self.stats.nodes_settled += 1;
            self.settled_in_search += 1;
            self.relax(node_idx, weight, key);
        }

        self.state = SearchState::Exhausted(key);
        Halt::Exhausted
    }

    fn relax(&mut self, node_idx: NodeIndex, weight: Distance, key: SearchKey) {
        let g = self.g;
        for &edge_idx in g.relax_edge_ids(node_idx) {
            let edge = g.edge(edge_idx);
            let skip = match key {
                SearchKey::Route { .. } => edge.is_shortcut(),
                SearchKey::Witness { excluded, .. } => {
                    edge.target == excluded
                        || g.node_contracted(edge.target)
                        || self.is_blocked(edge.target)
                }
            };
            if skip {
                continue;
            }

            let target = edge.target.index();
            let new_distance = weight + edge.weight;
            if new_distance < self.distances[target] {
                if self.distances[target] == UNREACHABLE {
                    self.touched.push(edge.target);
                }
                self.distances[target] = new_distance;
                self.previous[target] = node_idx;
                self.queue.push(Candidate::new(edge.target, new_distance));
            }
        }
    }

    fn reconstruct_path(&self, source: NodeIndex, target: NodeIndex) -> Option<ShortestPath> {
        if !self.settled[target.index()] {
            return None;
        }

        let mut path = vec![target];
        let mut current = target;
        while current != source {
            current = self.previous[current.index()];
            path.push(current);
        }
        path.reverse();

        Some(ShortestPath::new(
            path,
            self.distances[target.index()],
            self.stats.nodes_settled,
        ))
    }
}
