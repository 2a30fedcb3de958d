//! Builds a contraction hierarchy in place on a [`Graph`].
//!
//! Every round contracts the cheaper half of an independent set of the
//! remaining nodes and assigns them the next level.
//!
//! # Examples
//! ```
//! use sea_core::prelude::*;
//! use sea_core::util::test_graphs::line_grid;
//!
//! let mut g = Graph::from_grid(&line_grid()).unwrap();
//! g.contract();
//!
//! let mut ch = CHDijkstra::new(&g);
//! let sp = ch.find_route(node_index(0), node_index(3)).unwrap();
//! assert_eq!(sp.weight, 300);
//! ```
//! [`Graph`]: crate::graph::Graph
use std::time::Instant;

use log::{debug, info};

use crate::{
    contraction_params::ContractionParams,
    graph::{node_index, Edge, EdgeIndex, Graph, NodeIndex},
    search::dijkstra::Dijkstra,
};

/// Contraction result of a single node, evaluated before anything changes
struct Candidate {
    node: NodeIndex,
    edge_difference: i64,
    shortcuts: Vec<Edge>,
}

impl Graph {
    /// Contracts the graph with default parameters
    pub fn contract(&mut self) {
        self.contract_with_params(ContractionParams::default());
    }

    pub fn contract_with_params(&mut self, params: ContractionParams) {
        if self.fully_contracted {
            debug!("Graph is already contracted");
            return;
        }

        info!(
            "BEGIN contracting {} nodes with {:?}",
            self.num_nodes(),
            params
        );
        let now = Instant::now();

        let mut rounds = 0;
        while self.contraction_step(&params) {
            rounds += 1;
            assert!(
                rounds <= self.num_nodes(),
                "Contraction did not make progress after {} rounds",
                rounds
            );
        }
        self.fully_contracted = true;

        info!("Contracting nodes took {:?}", now.elapsed());
        info!(
            "Added shortcuts: {} in {} levels",
            self.num_shortcuts, self.current_level
        );
    }

    /// Runs one round. Returns `false` once every node is contracted.
    fn contraction_step(&mut self, params: &ContractionParams) -> bool {
        let independent_set = self.independent_set();
        if independent_set.is_empty() {
            return false;
        }

        let mut candidates = {
            let graph: &Graph = self;
            let mut dijkstra = Dijkstra::new(graph);
            dijkstra.set_witness_limit(params.witness_search_limit);
            dijkstra.block(&independent_set);

            independent_set
                .iter()
                .map(|&node| graph.evaluate_node(node, &mut dijkstra))
                .collect::<Vec<_>>()
        };

        // Stable, ties keep node order
        candidates.sort_by_key(|c| c.edge_difference);
        let median = candidates[candidates.len() / 2].edge_difference;

        self.current_level += 1;
        let mut contracted = 0;
        let mut shortcuts = Vec::new();
        for candidate in candidates {
            if candidate.edge_difference <= median {
                self.levels[candidate.node.index()] = self.current_level;
                shortcuts.extend(candidate.shortcuts);
                contracted += 1;
            }
        }

        info!(
            "Level {}: independent set {}, contracted {}, shortcuts {}",
            self.current_level,
            independent_set.len(),
            contracted,
            shortcuts.len()
        );
        self.insert_edges(shortcuts);

        let done = self.levels.iter().filter(|l| **l > 0).count();
        info!(
            "Progress: {:.2}%",
            done as f64 / self.num_nodes().max(1) as f64 * 100.0
        );
        true
    }

    /// Greedy independent set of the uncontracted nodes
    fn independent_set(&self) -> Vec<NodeIndex> {
        let mut visited = vec![false; self.num_nodes()];
        let mut independent_set = Vec::new();

        for id in 0..self.num_nodes() {
            let node = node_index(id);
            if self.node_contracted(node) || visited[id] {
                continue;
            }
            independent_set.push(node);
            for (_, edge) in self.neighbors_outgoing(node) {
                visited[edge.target.index()] = true;
            }
        }

        independent_set
    }

    /// Shortcuts needed to contract `node` and the resulting edge difference
    fn evaluate_node(&self, node: NodeIndex, dijkstra: &mut Dijkstra) -> Candidate {
        let edge_ids = self.relax_edge_ids(node);
        let mut shortcuts = Vec::new();

        for (i, &first) in edge_ids.iter().enumerate() {
            let source = self.edge(first).target;
            if self.node_contracted(source) {
                continue;
            }

            for &second in &edge_ids[i + 1..] {
                let target = self.edge(second).target;
                if target == source || self.node_contracted(target) {
                    continue;
                }

                let cost = self.edge(first).weight + self.edge(second).weight;
                if dijkstra.shortest_path_contains_u(source, target, node, cost) {
                    let into_node = self.inverse_of(first);
                    let back_into_node = self.inverse_of(second);
                    shortcuts.push(Edge::shortcut(source, target, cost, [into_node, second]));
                    shortcuts.push(Edge::shortcut(target, source, cost, [back_into_node, first]));
                }
            }
        }

        let edge_difference = shortcuts.len() as i64 - edge_ids.len() as i64;
        debug!("{node:?}: ({}, {})", edge_ids.len(), shortcuts.len());
        Candidate {
            node,
            edge_difference,
            shortcuts,
        }
    }

    fn inverse_of(&self, edge_idx: EdgeIndex) -> EdgeIndex {
        self.inverse_edge(edge_idx)
            .unwrap_or_else(|| panic!("Graph lost the inverse of edge {:?}", edge_idx))
    }
}

#[cfg(test)]
mod tests {
    use crate::contraction_params::ContractionParams;
    use crate::edge;
    use crate::graph::{node_index, EdgeIndex, Graph};
    use crate::search::ch_dijkstra::CHDijkstra;
    use crate::search::dijkstra::Dijkstra;
    use crate::util::test_graphs::{generate_complex_graph, line_grid, small_sphere, square_grid};

    fn init_log() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn assert_shortcuts_sound(g: &Graph) {
        for (idx, edge) in g.edges().enumerate() {
            if let Some([first, second]) = edge.shortcut_for {
                let first = g.edge(first);
                let second = g.edge(second);
                assert_eq!(edge.weight, first.weight + second.weight);
                assert_eq!(first.source, edge.source);
                assert_eq!(first.target, second.source);
                assert_eq!(second.target, edge.target);
            }

            let unpacked = g.unpack_edge(EdgeIndex::new(idx));
            let sum: u64 = unpacked.iter().map(|e| g.edge(*e).weight).sum();
            assert_eq!(sum, edge.weight);
            assert!(unpacked.iter().all(|e| !g.edge(*e).is_shortcut()));
            for pair in unpacked.windows(2) {
                assert_eq!(g.edge(pair[0]).target, g.edge(pair[1]).source);
            }
        }
    }

    fn assert_matches_dijkstra(base: &Graph, g: &Graph) {
        let mut d = Dijkstra::new(base);
        let mut ch = CHDijkstra::new(g);
        for s in 0..g.num_nodes() {
            for t in 0..g.num_nodes() {
                let expected = d.find_distance(node_index(s), node_index(t));
                let got = ch.find_route(node_index(s), node_index(t)).map(|sp| sp.weight);
                assert_eq!(got, expected, "{} -> {}", s, t);
            }
        }
    }

    #[test]
    fn contract_straight_line_of_nodes() {
        init_log();
        let mut g = Graph::from_grid(&line_grid()).unwrap();
        g.contract();

        assert!(g.is_fully_contracted());
        for node in 0..4 {
            assert!(g.node_contracted(node_index(node)));
        }
        assert_shortcuts_sound(&g);
    }

    #[test]
    fn contract_twice_is_noop() {
        let mut g = generate_complex_graph();
        g.contract();
        let edges = g.num_edges();
        let levels: Vec<u32> = (0..g.num_nodes()).map(|n| g.level(node_index(n))).collect();

        g.contract();
        assert_eq!(g.num_edges(), edges);
        for (n, level) in levels.iter().enumerate() {
            assert_eq!(g.level(node_index(n)), *level);
        }
    }

    #[test]
    fn contract_complex_graph() {
        init_log();
        let base = generate_complex_graph();
        let mut g = base.clone();
        g.contract();

        assert_shortcuts_sound(&g);
        assert_matches_dijkstra(&base, &g);
    }

    #[test]
    fn adjacent_nodes_get_different_levels() {
        let mut g = Graph::from_grid(&square_grid(6, 6)).unwrap();
        g.contract();

        for edge in g.edges() {
            assert_ne!(g.level(edge.source), g.level(edge.target));
        }
        for node in 0..g.num_nodes() {
            let level = g.level(node_index(node));
            assert!(level > 0 && level <= g.num_levels());
        }
    }

    #[test]
    fn parallel_paths_keep_connection() {
        // 0 - 1 - 2 and 0 - 3 - 2, every edge costs 1
        let mut edges = edge!(0, 1, 1);
        edges.extend(edge!(1, 2, 1));
        edges.extend(edge!(0, 3, 1));
        edges.extend(edge!(3, 2, 1));
        let base = Graph::from_edges(4, edges).unwrap();
        let mut g = base.clone();
        g.contract();

        assert_shortcuts_sound(&g);
        assert_matches_dijkstra(&base, &g);
    }

    #[test]
    fn square_grid_with_ties() {
        let base = Graph::from_grid(&square_grid(7, 5)).unwrap();
        let mut g = base.clone();
        g.contract();

        assert_shortcuts_sound(&g);
        assert_matches_dijkstra(&base, &g);
    }

    #[test]
    fn witness_limit_stays_correct() {
        let base = Graph::from_grid(&square_grid(6, 6)).unwrap();

        let mut limited = base.clone();
        limited.contract_with_params(ContractionParams::new().witness_search_limit(2));

        assert!(limited.is_fully_contracted());
        assert_shortcuts_sound(&limited);
        assert_matches_dijkstra(&base, &limited);
    }

    #[test]
    fn contract_sphere() {
        init_log();
        let base = Graph::from_grid(&small_sphere(300)).unwrap();
        let mut g = base.clone();
        g.contract();

        assert!(g.is_fully_contracted());
        assert_shortcuts_sound(&g);
        assert_matches_dijkstra(&base, &g);
    }
}
