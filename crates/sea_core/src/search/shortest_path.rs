use crate::{constants::Distance, graph::NodeIndex};

#[derive(Debug, PartialEq, Clone)]
pub struct ShortestPath {
    pub nodes: Vec<NodeIndex>,
    pub weight: Distance,
    /// Queue pops needed to answer the query
    pub pops: usize,
}

impl ShortestPath {
    pub fn new(nodes: Vec<NodeIndex>, weight: Distance, pops: usize) -> Self {
        ShortestPath {
            nodes,
            weight,
            pops,
        }
    }

    /// Path rendered as `a->b->c`
    pub fn to_arrow_string(&self) -> String {
        self.nodes
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join("->")
    }
}
