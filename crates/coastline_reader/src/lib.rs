use anyhow::Context;
use log::{debug, info};
use osmpbf::{Element, IndexedReader};
use rustc_hash::FxHashMap;
use std::path::Path;

/// Coastline ways and the positions of their nodes as read from OSM
#[derive(Debug, Default)]
pub struct Coastlines {
    nodes: FxHashMap<i64, [f64; 2]>,
    ways: Vec<Vec<i64>>,
}

impl Coastlines {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_node(&mut self, id: i64, lat: f64, lon: f64) {
        self.nodes.insert(id, [lat, lon]);
    }

    pub fn add_way(&mut self, refs: Vec<i64>) {
        self.ways.push(refs);
    }

    pub fn get_nodes(&self) -> &FxHashMap<i64, [f64; 2]> {
        &self.nodes
    }

    pub fn get_ways(&self) -> &Vec<Vec<i64>> {
        &self.ways
    }

    /// Reads all ways tagged `natural=coastline` together with their nodes
    pub fn from_pbf(pbf_path: &Path) -> anyhow::Result<Coastlines> {
        let mut coastlines = Coastlines::new();

        let mut reader = IndexedReader::from_path(pbf_path)
            .with_context(|| format!("Could not open {}", pbf_path.display()))?;

        let coastline_filter = |way: &osmpbf::Way| {
            way.tags()
                .any(|(key, value)| key == "natural" && value == "coastline")
        };

        let now = std::time::Instant::now();
        info!("BEGIN parsing {}", pbf_path.display());
        reader
            .read_ways_and_deps(coastline_filter, |element| match element {
                Element::Way(way) => {
                    coastlines.add_way(way.refs().collect());
                }
                Element::Node(node) => {
                    coastlines.add_node(node.id(), node.lat(), node.lon());
                }
                Element::DenseNode(dense_node) => {
                    coastlines.add_node(dense_node.id(), dense_node.lat(), dense_node.lon());
                }
                Element::Relation(_) => {}
            })
            .with_context(|| format!("Could not parse {}", pbf_path.display()))?;
        info!(
            "FINISHED parsing {} ways with {} nodes. Took {:?}",
            coastlines.ways.len(),
            coastlines.nodes.len(),
            now.elapsed()
        );

        Ok(coastlines)
    }

    /// Chains the ways to closed rings of `[lat, lon]`.
    ///
    /// A ring is continued with the way starting at its last node until it
    /// is closed. Rings without continuation are closed with their first
    /// node.
    pub fn merge_rings(&self) -> Vec<Vec<[f64; 2]>> {
        let now = std::time::Instant::now();

        let ways: Vec<&[i64]> = self
            .ways
            .iter()
            .filter(|way| way.len() >= 2)
            .map(|way| way.as_slice())
            .collect();

        // Ways starting at a node, latest first so `pop` yields the earliest
        let mut by_first: FxHashMap<i64, Vec<usize>> = FxHashMap::default();
        for (idx, way) in ways.iter().enumerate().rev() {
            by_first.entry(way[0]).or_default().push(idx);
        }
        let mut used = vec![false; ways.len()];

        let mut rings = Vec::new();
        let mut artificially_closed = 0;
        for (idx, way) in ways.iter().enumerate() {
            if used[idx] {
                // Already part of another ring
                continue;
            }
            used[idx] = true;

            let mut line = way.to_vec();
            while line.first() != line.last() {
                let last = line[line.len() - 1];
                match next_unused(&mut by_first, &used, last) {
                    Some(next) => {
                        used[next] = true;
                        line.extend_from_slice(&ways[next][1..]);
                    }
                    None => {
                        line.push(line[0]);
                        artificially_closed += 1;
                    }
                }
            }

            rings.push(
                line.iter()
                    .filter_map(|id| self.nodes.get(id).copied())
                    .collect(),
            );
        }

        debug!("{} rings had to be closed artificially", artificially_closed);
        info!(
            "Merged {} ways into {} rings. Took {:?}",
            self.ways.len(),
            rings.len(),
            now.elapsed()
        );
        rings
    }
}

/// Earliest unused way starting at `node`
fn next_unused(
    by_first: &mut FxHashMap<i64, Vec<usize>>,
    used: &[bool],
    node: i64,
) -> Option<usize> {
    let candidates = by_first.get_mut(&node)?;
    while let Some(idx) = candidates.pop() {
        if !used[idx] {
            return Some(idx);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coastlines(ways: Vec<Vec<i64>>) -> Coastlines {
        let mut c = Coastlines::new();
        for id in 0..10 {
            c.add_node(id, id as f64, -(id as f64));
        }
        for way in ways {
            c.add_way(way);
        }
        c
    }

    #[test]
    fn chains_ways_into_ring() {
        let c = coastlines(vec![vec![0, 1, 2], vec![2, 3, 4], vec![4, 5, 0]]);
        let rings = c.merge_rings();

        assert_eq!(rings.len(), 1);
        let ids: Vec<i64> = rings[0].iter().map(|[lat, _]| *lat as i64).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4, 5, 0]);
    }

    #[test]
    fn closed_way_is_own_ring() {
        let c = coastlines(vec![vec![0, 1, 2, 0], vec![3, 4, 5], vec![5, 6, 3]]);
        let rings = c.merge_rings();

        assert_eq!(rings.len(), 2);
        assert_eq!(rings[0].len(), 4);
        assert_eq!(rings[1].len(), 5);
    }

    #[test]
    fn open_line_is_closed_artificially() {
        let c = coastlines(vec![vec![0, 1, 2, 3]]);
        let rings = c.merge_rings();

        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].first(), rings[0].last());
        assert_eq!(rings[0].len(), 5);
    }

    #[test]
    fn missing_nodes_are_skipped() {
        let c = coastlines(vec![vec![0, 1, 42, 2, 0]]);
        let rings = c.merge_rings();

        assert_eq!(rings[0].len(), 4);
        assert_eq!(rings[0][1], [1.0, -1.0]);
    }

    #[test]
    fn ways_with_same_first_node_are_kept() {
        let c = coastlines(vec![vec![0, 1, 2, 0], vec![0, 3, 4]]);
        let rings = c.merge_rings();

        assert_eq!(rings.len(), 2);
        let ids: Vec<Vec<i64>> = rings
            .iter()
            .map(|ring| ring.iter().map(|[lat, _]| *lat as i64).collect())
            .collect();
        assert_eq!(ids[0], vec![0, 1, 2, 0]);
        assert_eq!(ids[1], vec![0, 3, 4, 0]);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Coastlines::from_pbf(Path::new("does/not/exist.osm.pbf")).is_err());
    }
}
