use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::{debug, warn};

use crate::constants::{Distance, UNREACHABLE};
use crate::graph::{EdgeIndex, Graph, NodeIndex};
use crate::search::shortest_path::ShortestPath;
use crate::statistics::SearchStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    #[inline]
    fn index(self) -> usize {
        match self {
            Direction::Forward => 0,
            Direction::Backward => 1,
        }
    }

    #[inline]
    fn opposite(self) -> Direction {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// Entry of the queue shared by both directions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CHCandidate {
    node_idx: NodeIndex,
    weight: Distance,
    direction: Direction,
}

impl CHCandidate {
    fn new(node_idx: NodeIndex, weight: Distance, direction: Direction) -> Self {
        Self {
            node_idx,
            weight,
            direction,
        }
    }
}

impl PartialOrd for CHCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CHCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .weight
            .cmp(&self.weight)
            .then_with(|| other.direction.cmp(&self.direction))
            .then_with(|| other.node_idx.cmp(&self.node_idx))
    }
}

/// Bidirectional search on a contracted graph. Both directions only follow
/// edges leading to a higher level.
pub struct CHDijkstra<'a> {
    pub stats: SearchStats,
    g: &'a Graph,
    distances: [Vec<Distance>; 2],
    previous: [Vec<EdgeIndex>; 2],
    touched: Vec<NodeIndex>,
    queue: BinaryHeap<CHCandidate>,
    done: [bool; 2],
    meeting_node: NodeIndex,
    best_distance: Distance,
}

impl<'a> CHDijkstra<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        if !graph.is_fully_contracted() {
            warn!("CHDijkstra on a graph that is not fully contracted");
        }
        let num_nodes = graph.num_nodes();
        CHDijkstra {
            stats: SearchStats::default(),
            g: graph,
            distances: [vec![UNREACHABLE; num_nodes], vec![UNREACHABLE; num_nodes]],
            previous: [
                vec![EdgeIndex::end(); num_nodes],
                vec![EdgeIndex::end(); num_nodes],
            ],
            touched: Vec::new(),
            queue: BinaryHeap::new(),
            done: [false; 2],
            meeting_node: NodeIndex::end(),
            best_distance: UNREACHABLE,
        }
    }

    fn reset(&mut self) {
        for node in self.touched.drain(..) {
            for dir in 0..2 {
                self.distances[dir][node.index()] = UNREACHABLE;
                self.previous[dir][node.index()] = EdgeIndex::end();
            }
        }
        self.queue.clear();
        self.done = [false; 2];
        self.meeting_node = NodeIndex::end();
        self.best_distance = UNREACHABLE;
    }

    fn seed(&mut self, node: NodeIndex, direction: Direction) {
        let dir = direction.index();
        if self.distances[direction.opposite().index()][node.index()] == UNREACHABLE {
            self.touched.push(node);
        }
        self.distances[dir][node.index()] = 0;
        self.queue.push(CHCandidate::new(node, 0, direction));
    }

    pub fn find_route(&mut self, source: NodeIndex, target: NodeIndex) -> Option<ShortestPath> {
        self.stats.init();
        self.reset();

        self.seed(source, Direction::Forward);
        self.seed(target, Direction::Backward);
        if source == target {
            self.meeting_node = source;
            self.best_distance = 0;
        }

        while let Some(CHCandidate {
            node_idx,
            weight,
            direction,
        }) = self.queue.pop()
        {
            self.stats.nodes_settled += 1;
            let dir = direction.index();

            if self.done[dir] {
                continue;
            }
            if weight > self.best_distance {
                self.done[dir] = true;
                if self.done[direction.opposite().index()] {
                    break;
                }
                continue;
            }
            if weight > self.distances[dir][node_idx.index()] {
                // Outdated entry
                continue;
            }

            self.relax(node_idx, weight, direction);
        }
        self.stats.finish();

        if self.best_distance == UNREACHABLE {
            debug!("CH {} -> {}: no path / {}", source, target, self.stats);
            return None;
        }

        let nodes = self.reconstruct_path(source, target);
        debug!(
            "CH {} -> {}: {} / {}",
            source, target, self.best_distance, self.stats
        );
        Some(ShortestPath::new(
            nodes,
            self.best_distance,
            self.stats.nodes_settled,
        ))
    }

    /// Distance of the last query
    pub fn distance(&self) -> Option<Distance> {
        match self.best_distance {
            UNREACHABLE => None,
            d => Some(d),
        }
    }

    fn relax(&mut self, node_idx: NodeIndex, weight: Distance, direction: Direction) {
        let g = self.g;
        let dir = direction.index();
        let other = direction.opposite().index();

        for (edge_idx, edge) in g.neighbors_outgoing(node_idx) {
            if g.level(edge.source) >= g.level(edge.target) {
                continue;
            }

            let target = edge.target.index();
            let new_distance = weight + edge.weight;
            if new_distance < self.distances[dir][target] {
                if self.distances[dir][target] == UNREACHABLE
                    && self.distances[other][target] == UNREACHABLE
                {
                    self.touched.push(edge.target);
                }
                self.distances[dir][target] = new_distance;
                self.previous[dir][target] = edge_idx;
                self.queue
                    .push(CHCandidate::new(edge.target, new_distance, direction));

                let other_distance = self.distances[other][target];
                if other_distance != UNREACHABLE && new_distance + other_distance < self.best_distance
                {
                    self.meeting_node = edge.target;
                    self.best_distance = new_distance + other_distance;
                }
            }
        }
    }

    /// Unwraps both halves of the route at the meeting node into base nodes
    fn reconstruct_path(&self, source: NodeIndex, target: NodeIndex) -> Vec<NodeIndex> {
        let forward = Direction::Forward.index();
        let backward = Direction::Backward.index();

        // Collected from the meeting node back to the source
        let mut path = Vec::new();
        let mut current = self.meeting_node;
        loop {
            let edge_idx = self.previous[forward][current.index()];
            if edge_idx == EdgeIndex::end() {
                break;
            }
            path.extend(self.g.unwrap_edge(edge_idx, current).into_iter().rev());
            current = self.g.edge(edge_idx).source;
        }
        debug_assert_eq!(current, source);
        path.reverse();
        path.push(self.meeting_node);

        let mut current = self.meeting_node;
        loop {
            let edge_idx = self.previous[backward][current.index()];
            if edge_idx == EdgeIndex::end() {
                break;
            }
            // The backward search walked the edge from its source to `current`,
            // the route uses it the other way round.
            path.extend(self.g.unwrap_edge(edge_idx, current).into_iter().rev());
            current = self.g.edge(edge_idx).source;
        }
        debug_assert_eq!(current, target);

        path
    }
}
