use crate::constants::{Distance, Level};
use crate::grid::Grid;
use anyhow::bail;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{fmt, hash::Hash};

/// Default integer typer for node and edge indices
/// Needs to be increased vor very large graphs > u32::max
pub type DefaultIdx = u32;

pub trait IndexType: Copy + Default + Hash + Ord + fmt::Debug {
    fn new(idx: usize) -> Self;
    fn index(&self) -> usize;
    fn max() -> Self;
}

impl IndexType for usize {
    #[inline(always)]
    fn new(x: usize) -> Self {
        x
    }
    #[inline(always)]
    fn index(&self) -> Self {
        *self
    }
    #[inline(always)]
    fn max() -> Self {
        ::std::usize::MAX
    }
}

impl IndexType for u32 {
    #[inline(always)]
    fn new(x: usize) -> Self {
        x as u32
    }
    #[inline(always)]
    fn index(&self) -> usize {
        *self as usize
    }
    #[inline(always)]
    fn max() -> Self {
        ::std::u32::MAX
    }
}

/// Node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub struct NodeIndex<Idx = DefaultIdx>(Idx);

impl NodeIndex {
    #[inline]
    pub fn new(x: usize) -> Self {
        NodeIndex(IndexType::new(x))
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0.index()
    }

    /// An invalid `NodeIndex` used to denote a missing predecessor
    #[inline]
    pub fn end() -> Self {
        NodeIndex(IndexType::max())
    }
}

impl<Idx: IndexType> From<Idx> for NodeIndex<Idx> {
    fn from(ix: Idx) -> Self {
        NodeIndex(ix)
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Short version of `NodeIndex::new`
pub fn node_index(index: usize) -> NodeIndex {
    NodeIndex::new(index)
}

/// Edge identifier.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, PartialOrd, Eq, Ord, Hash, Deserialize, Serialize,
)]
pub struct EdgeIndex<Idx = DefaultIdx>(Idx);

impl<Idx: IndexType> From<Idx> for EdgeIndex<Idx> {
    fn from(ix: Idx) -> Self {
        EdgeIndex(ix)
    }
}

impl<Idx: IndexType> EdgeIndex<Idx> {
    #[inline]
    pub fn new(x: usize) -> Self {
        EdgeIndex(IndexType::new(x))
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0.index()
    }

    /// An invalid `EdgeIndex` used to denote absence of an edge, for example
    /// to end a predecessor chain.
    #[inline]
    pub fn end() -> Self {
        EdgeIndex(IndexType::max())
    }
}

/// Directed edge. A shortcut remembers the two edges it replaces,
/// `[source -> via, via -> target]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Edge<Idx = DefaultIdx> {
    pub source: NodeIndex<Idx>,
    pub target: NodeIndex<Idx>,
    pub weight: Distance,
    #[serde(default = "Default::default")]
    pub shortcut_for: Option<[EdgeIndex<Idx>; 2]>,
}

impl Edge {
    pub fn new(source: NodeIndex, target: NodeIndex, weight: Distance) -> Self {
        Edge {
            source,
            target,
            weight,
            shortcut_for: None,
        }
    }

    pub fn shortcut(
        source: NodeIndex,
        target: NodeIndex,
        weight: Distance,
        replaces: [EdgeIndex; 2],
    ) -> Self {
        Edge {
            source,
            target,
            weight,
            shortcut_for: Some(replaces),
        }
    }

    #[inline]
    pub fn is_shortcut(&self) -> bool {
        self.shortcut_for.is_some()
    }
}

/// Sea graph stored as offset array.
///
/// The edges of node `n` are `sorted_edge_ids[offsets[n]..offsets[n + 1]]`.
/// Shortcuts are appended to `edges` during contraction, so base edges always
/// keep the lower edge ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    num_nodes: usize,
    pub edges: Vec<Edge>,
    offsets: Vec<usize>,
    sorted_edge_ids: Vec<EdgeIndex>,
    pub(crate) levels: Vec<Level>,
    pub(crate) current_level: Level,
    pub(crate) fully_contracted: bool,
    pub num_shortcuts: usize,
}

impl Graph {
    /// Builds the graph from a discretized sphere. Every water node gets an
    /// edge to each water neighbour, land nodes stay isolated.
    ///
    /// Fails if an edge has no inverse edge of the same weight.
    pub fn from_grid<G: Grid>(grid: &G) -> anyhow::Result<Self> {
        let num_nodes = grid.size();
        info!("BEGIN building graph from grid with {} nodes", num_nodes);

        assert!(
            num_nodes < DefaultIdx::MAX as usize,
            "Maximum number of nodes for index type {} exceeded",
            std::any::type_name::<DefaultIdx>()
        );

        let mut edges = Vec::new();
        let mut offsets = Vec::with_capacity(num_nodes + 1);
        offsets.push(0);

        for id in 0..num_nodes {
            let node = node_index(id);
            if !grid.is_land(node) {
                let mut neighbours = grid.neighbours(node);
                neighbours.sort_unstable();
                neighbours.dedup();
                for neighbour in neighbours {
                    if neighbour == node || grid.is_land(neighbour) {
                        continue;
                    }
                    edges.push(Edge::new(node, neighbour, grid.distance(node, neighbour)));
                }
            }
            offsets.push(edges.len());
        }

        let sorted_edge_ids = (0..edges.len()).map(EdgeIndex::new).collect();
        let g = Graph {
            num_nodes,
            edges,
            offsets,
            sorted_edge_ids,
            levels: vec![0; num_nodes],
            current_level: 0,
            fully_contracted: false,
            num_shortcuts: 0,
        };
        g.check_inverse_edges()?;

        info!(
            "FINISHED building graph: {} nodes, {} edges",
            g.num_nodes,
            g.edges.len()
        );
        Ok(g)
    }

    /// Builds the graph from a list of directed edges in any order
    pub fn from_edges(num_nodes: usize, edges: Vec<Edge>) -> anyhow::Result<Self> {
        for edge in &edges {
            if edge.source.index() >= num_nodes || edge.target.index() >= num_nodes {
                bail!(
                    "Edge {} -> {} references a node outside of 0..{}",
                    edge.source,
                    edge.target,
                    num_nodes
                );
            }
        }

        let mut g = Graph {
            num_nodes,
            edges,
            offsets: Vec::new(),
            sorted_edge_ids: Vec::new(),
            levels: vec![0; num_nodes],
            current_level: 0,
            fully_contracted: false,
            num_shortcuts: 0,
        };
        g.rebuild_adjacency();
        g.check_inverse_edges()?;
        Ok(g)
    }

    fn check_inverse_edges(&self) -> anyhow::Result<()> {
        for (idx, edge) in self.edges.iter().enumerate() {
            if self.inverse_edge(EdgeIndex::new(idx)).is_none() {
                bail!(
                    "Edge {} ({} -> {}, {}) has no inverse edge",
                    idx,
                    edge.source,
                    edge.target,
                    edge.weight
                );
            }
        }
        Ok(())
    }

    /// Counting sort of all edge ids by their source node. Stable, so the
    /// edges of a node stay in insertion order.
    pub(crate) fn rebuild_adjacency(&mut self) {
        let mut offsets = vec![0; self.num_nodes + 1];
        for edge in &self.edges {
            offsets[edge.source.index() + 1] += 1;
        }
        for i in 1..offsets.len() {
            offsets[i] += offsets[i - 1];
        }

        let mut next = offsets.clone();
        let mut sorted_edge_ids = vec![EdgeIndex::end(); self.edges.len()];
        for (idx, edge) in self.edges.iter().enumerate() {
            let slot = &mut next[edge.source.index()];
            sorted_edge_ids[*slot] = EdgeIndex::new(idx);
            *slot += 1;
        }

        self.offsets = offsets;
        self.sorted_edge_ids = sorted_edge_ids;
    }

    /// Appends `edges` and rebuilds the offset array once
    pub(crate) fn insert_edges(&mut self, edges: Vec<Edge>) {
        if edges.is_empty() {
            return;
        }
        assert!(
            self.edges.len() + edges.len() < DefaultIdx::MAX as usize,
            "Maximum number of edges for index type {} exceeded",
            std::any::type_name::<DefaultIdx>()
        );
        debug!("Inserting {} edges", edges.len());

        self.num_shortcuts += edges.iter().filter(|e| e.is_shortcut()).count();
        self.edges.extend(edges);
        self.rebuild_adjacency();
    }

    /// Ids of all edges leaving `node_idx`
    #[inline]
    pub fn relax_edge_ids(&self, node_idx: NodeIndex) -> &[EdgeIndex] {
        let node = node_idx.index();
        &self.sorted_edge_ids[self.offsets[node]..self.offsets[node + 1]]
    }

    pub fn neighbors_outgoing(
        &self,
        node_idx: NodeIndex,
    ) -> impl Iterator<Item = (EdgeIndex, &Edge)> + '_ {
        self.relax_edge_ids(node_idx)
            .iter()
            .map(move |edge_idx| (*edge_idx, &self.edges[edge_idx.index()]))
    }

    #[inline]
    pub fn edge(&self, edge_idx: EdgeIndex) -> &Edge {
        &self.edges[edge_idx.index()]
    }

    /// Returns an iterator over all edges of the graph
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn degree(&self, node_idx: NodeIndex) -> usize {
        self.relax_edge_ids(node_idx).len()
    }

    #[inline]
    pub fn level(&self, node_idx: NodeIndex) -> Level {
        self.levels[node_idx.index()]
    }

    #[inline]
    pub fn node_contracted(&self, node_idx: NodeIndex) -> bool {
        self.levels[node_idx.index()] > 0
    }

    /// Highest level handed out so far
    pub fn num_levels(&self) -> Level {
        self.current_level
    }

    pub fn is_fully_contracted(&self) -> bool {
        self.fully_contracted
    }

    /// Edge `target -> source` with the same weight as `edge_idx`
    pub fn inverse_edge(&self, edge_idx: EdgeIndex) -> Option<EdgeIndex> {
        let edge = self.edge(edge_idx);
        self.relax_edge_ids(edge.target)
            .iter()
            .copied()
            .find(|candidate| {
                let candidate = self.edge(*candidate);
                candidate.target == edge.source && candidate.weight == edge.weight
            })
    }

    /// Resolves `edge_idx` recursively into the chain of base edges it stands
    /// for, ordered from `source` to `target`.
    pub fn unpack_edge(&self, edge_idx: EdgeIndex) -> Vec<EdgeIndex> {
        let mut unpacked = Vec::new();
        let mut stack = vec![edge_idx];

        while let Some(idx) = stack.pop() {
            match self.edge(idx).shortcut_for {
                Some([first, second]) => {
                    stack.push(second);
                    stack.push(first);
                }
                None => unpacked.push(idx),
            }
        }

        unpacked
    }

    /// Nodes travelled along `edge_idx` towards `target`, which has to be one
    /// of the endpoints of the edge. The result starts at the opposite
    /// endpoint and stops right before `target`.
    pub fn unwrap_edge(&self, edge_idx: EdgeIndex, target: NodeIndex) -> Vec<NodeIndex> {
        let edge = self.edge(edge_idx);
        assert!(
            target == edge.source || target == edge.target,
            "Node {} is not an endpoint of edge {:?}",
            target,
            edge_idx
        );

        let unpacked = self.unpack_edge(edge_idx);
        if target == edge.target {
            unpacked.iter().map(|e| self.edge(*e).source).collect()
        } else {
            unpacked.iter().rev().map(|e| self.edge(*e).target).collect()
        }
    }

    pub fn print_info(&self) {
        println!(
            "Graph:\t#Nodes: {}, #Edges: {}, #Shortcuts: {}, #Levels: {}",
            self.num_nodes,
            self.edges.len() - self.num_shortcuts,
            self.num_shortcuts,
            self.current_level
        );
    }
}

/// Macro to create a edge from source to target with a weight
///
/// edge!(0 , 1, 3) Returns edge in both directions
///
/// edge!(0 => 1, 3) Returns directed edge
#[macro_export]
macro_rules! edge {
    ($source:expr => $target:expr, $weight:expr) => {
        $crate::graph::Edge::new(
            $crate::graph::node_index($source),
            $crate::graph::node_index($target),
            $weight,
        )
    };
    ($source:expr , $target:expr, $weight:expr) => {
        vec![
            $crate::graph::Edge::new(
                $crate::graph::node_index($source),
                $crate::graph::node_index($target),
                $weight,
            ),
            $crate::graph::Edge::new(
                $crate::graph::node_index($target),
                $crate::graph::node_index($source),
                $weight,
            ),
        ]
    };
}

#[cfg(test)]
mod tests {
    use crate::util::test_graphs::{generate_complex_graph, line_grid, TestGrid};

    use super::*;

    #[test]
    fn build_from_grid() {
        let g = Graph::from_grid(&line_grid()).unwrap();

        assert_eq!(g.num_nodes(), 4);
        assert_eq!(g.num_edges(), 6);
        assert_eq!(g.degree(0.into()), 1);
        assert_eq!(g.degree(1.into()), 2);

        for (edge_idx, edge) in g.neighbors_outgoing(1.into()) {
            assert_eq!(edge.source, node_index(1));
            assert_eq!(edge.weight, 100);
            let inverse = g.inverse_edge(edge_idx).unwrap();
            assert_eq!(g.edge(inverse).source, edge.target);
            assert_eq!(g.edge(inverse).target, node_index(1));
        }
    }

    #[test]
    fn land_nodes_have_no_edges() {
        // 0 - 1 - 2 with 1 on land
        let grid = TestGrid::new(3).connect(0, 1, 5).connect(1, 2, 5).land(1);
        let g = Graph::from_grid(&grid).unwrap();

        assert_eq!(g.num_edges(), 0);
        for node in 0..3 {
            assert!(g.relax_edge_ids(node_index(node)).is_empty());
        }
    }

    #[test]
    fn missing_inverse_edge_is_rejected() {
        let grid = TestGrid::new(2).connect_directed(0, 1, 5);
        assert!(Graph::from_grid(&grid).is_err());

        // Same endpoints, different weight
        let edges = vec![edge!(0 => 1, 5), edge!(1 => 0, 6)];
        assert!(Graph::from_edges(2, edges).is_err());
    }

    #[test]
    fn from_edges_sorts_by_source() {
        let mut edges = edge!(2, 0, 1);
        edges.extend(edge!(0, 1, 2));
        edges.extend(edge!(1, 2, 3));
        let g = Graph::from_edges(3, edges).unwrap();

        for node in 0..3 {
            assert_eq!(g.degree(node_index(node)), 2);
            for (_, edge) in g.neighbors_outgoing(node_index(node)) {
                assert_eq!(edge.source, node_index(node));
            }
        }
        assert!(Graph::from_edges(2, vec![edge!(0 => 5, 1)]).is_err());
    }

    #[test]
    fn unwrap_shortcut_in_both_directions() {
        // 0 - 1 - 2 - 3, contracting 1 and 2 by hand
        let mut edges = edge!(0, 1, 1);
        edges.extend(edge!(1, 2, 1));
        edges.extend(edge!(2, 3, 1));
        let mut g = Graph::from_edges(4, edges).unwrap();

        let e01 = EdgeIndex::new(0);
        let e12 = EdgeIndex::new(2);
        let e23 = EdgeIndex::new(4);
        let s02 = EdgeIndex::new(6);

        g.insert_edges(vec![
            Edge::shortcut(0.into(), 2.into(), 2, [e01, e12]),
            Edge::shortcut(2.into(), 0.into(), 2, [EdgeIndex::new(3), EdgeIndex::new(1)]),
        ]);
        g.insert_edges(vec![Edge::shortcut(0.into(), 3.into(), 3, [s02, e23])]);
        let s03 = EdgeIndex::new(8);

        assert_eq!(g.num_shortcuts, 3);
        assert_eq!(g.unpack_edge(s03), vec![e01, e12, e23]);

        let to_target: Vec<usize> = g
            .unwrap_edge(s03, 3.into())
            .iter()
            .map(|n| n.index())
            .collect();
        assert_eq!(to_target, vec![0, 1, 2]);

        let to_source: Vec<usize> = g
            .unwrap_edge(s03, 0.into())
            .iter()
            .map(|n| n.index())
            .collect();
        assert_eq!(to_source, vec![3, 2, 1]);

        // Base edge
        assert_eq!(g.unwrap_edge(e01, 1.into()), vec![node_index(0)]);
        assert_eq!(g.unwrap_edge(e01, 0.into()), vec![node_index(1)]);
    }

    #[test]
    fn complex_graph_has_inverse_edges() {
        let g = generate_complex_graph();
        assert_eq!(g.num_nodes(), 11);
        assert_eq!(g.num_edges(), 40);
        for idx in 0..g.num_edges() {
            let inverse = g.inverse_edge(EdgeIndex::new(idx)).unwrap();
            assert_eq!(g.inverse_edge(inverse), Some(EdgeIndex::new(idx)));
        }
    }
}
