//! Discretization of the sphere into (roughly) equal area cells.
use std::f64::consts::PI;
use std::time::Instant;

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::{Distance, ANTARCTIC_LATITUDE};
use crate::geometry::{LatLng, Vector3D};
use crate::graph::{node_index, NodeIndex};
use crate::polygon::Polygon;

/// Everything the graph needs to know about the underlying node set
pub trait Grid {
    /// Number of nodes
    fn size(&self) -> usize;

    fn is_land(&self, node: NodeIndex) -> bool;

    /// Water neighbours of `node`, sorted and without duplicates
    fn neighbours(&self, node: NodeIndex) -> Vec<NodeIndex>;

    /// Symmetric distance between two neighbouring nodes
    fn distance(&self, from: NodeIndex, to: NodeIndex) -> Distance;

    fn coordinate(&self, node: NodeIndex) -> LatLng;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SphericalGrid {
    n_rows: usize,
    d_phi: f64,
    first_index_of: Vec<usize>,
    lats: Vec<f64>,
    lngs: Vec<f64>,
    /// Cell neighbours (land and water) as offset array
    neighbour_offsets: Vec<usize>,
    cell_neighbours: Vec<u32>,
    is_water: Vec<bool>,
}

impl SphericalGrid {
    /// Creates a grid with approximately `number_of_nodes` cells, all of them
    /// water until [`SphericalGrid::filter`] runs.
    pub fn new(number_of_nodes: usize) -> Self {
        assert!(number_of_nodes > 0, "A grid needs at least one node");
        let now = Instant::now();

        let a = 4.0 * PI / number_of_nodes as f64;
        let d = a.sqrt();
        let n_rows = ((PI / d).round() as usize).max(1);
        let d_theta = PI / n_rows as f64;
        let d_phi = a / d_theta;

        let mut first_index_of = Vec::with_capacity(n_rows + 1);
        let mut lats = Vec::with_capacity(number_of_nodes);
        let mut lngs = Vec::with_capacity(number_of_nodes);

        for m in 0..n_rows {
            first_index_of.push(lats.len());
            let theta = PI * (m as f64 + 0.5) / n_rows as f64;
            let n_cols = Self::cols_for(theta, d_phi);
            for n in 0..n_cols {
                let phi = 2.0 * PI * n as f64 / n_cols as f64;
                lats.push(theta.to_degrees() - 90.0);
                lngs.push(phi.to_degrees() - 180.0);
            }
        }
        first_index_of.push(lats.len());

        let size = lats.len();
        let mut grid = SphericalGrid {
            n_rows,
            d_phi,
            first_index_of,
            lats,
            lngs,
            neighbour_offsets: Vec::new(),
            cell_neighbours: Vec::new(),
            is_water: vec![true; size],
        };
        grid.build_neighbours();

        info!(
            "Created spherical grid with {} nodes in {} rows in {:?}",
            size,
            n_rows,
            now.elapsed()
        );
        grid
    }

    fn cols_for(theta: f64, d_phi: f64) -> usize {
        ((2.0 * PI * theta.sin() / d_phi).round() as usize).max(1)
    }

    /// Collects the raw cell neighbours of every cell and makes the relation
    /// symmetric.
    fn build_neighbours(&mut self) {
        let size = self.lats.len();
        let mut pairs: Vec<(u32, u32)> = Vec::with_capacity(size * 8);

        for id in 0..size {
            let (m, n) = self.id_to_grid(id);
            for neighbour in self.raw_neighbours(m, n) {
                if neighbour != id {
                    pairs.push((id as u32, neighbour as u32));
                    pairs.push((neighbour as u32, id as u32));
                }
            }
        }
        pairs.par_sort_unstable();
        pairs.dedup();

        let mut offsets = vec![0; size + 1];
        for (from, _) in &pairs {
            offsets[*from as usize + 1] += 1;
        }
        for i in 1..offsets.len() {
            offsets[i] += offsets[i - 1];
        }

        debug!("Grid has {} neighbour relations", pairs.len());
        self.cell_neighbours = pairs.into_iter().map(|(_, to)| to).collect();
        self.neighbour_offsets = offsets;
    }

    fn raw_neighbours(&self, m: usize, n: usize) -> Vec<usize> {
        let cols = self.cols_in_row(m);
        let mut neighbours = vec![
            self.grid_to_id(m, (n + cols - 1) % cols),
            self.grid_to_id(m, (n + 1) % cols),
        ];

        // Lower row, the southern cap connects the whole first row
        if m == 0 {
            neighbours.extend((0..cols).map(|i| self.grid_to_id(0, i)));
        } else {
            self.extend_with_row(&mut neighbours, m, n, m - 1);
        }

        // Upper row, the northern cap connects the whole last row
        if m == self.n_rows - 1 {
            neighbours.extend((0..cols).map(|i| self.grid_to_id(m, i)));
        } else {
            self.extend_with_row(&mut neighbours, m, n, m + 1);
        }

        neighbours
    }

    /// Cells of `other_row` overlapping cell `n` of row `m` (plus one on
    /// each side)
    fn extend_with_row(&self, neighbours: &mut Vec<usize>, m: usize, n: usize, other_row: usize) {
        let cols = self.cols_in_row(m) as f64;
        let other_cols = self.cols_in_row(other_row);
        let ratio = other_cols as f64 / cols;

        let from = ((n as f64 - 1.0) * ratio).floor() as i64;
        let to = ((n as f64 + 1.0) * ratio).ceil() as i64;
        for i in from..=to {
            let col = i.rem_euclid(other_cols as i64) as usize;
            neighbours.push(self.grid_to_id(other_row, col));
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn d_phi(&self) -> f64 {
        self.d_phi
    }

    pub fn cols_in_row(&self, m: usize) -> usize {
        self.first_index_of[m + 1] - self.first_index_of[m]
    }

    pub fn first_index_of(&self, m: usize) -> usize {
        self.first_index_of[m]
    }

    #[inline]
    pub fn grid_to_id(&self, m: usize, n: usize) -> usize {
        self.first_index_of[m] + n
    }

    /// Row and column of a node
    pub fn id_to_grid(&self, id: usize) -> (usize, usize) {
        // Index of the last row start <= id
        let m = self.first_index_of[..self.n_rows].partition_point(|&first| first <= id) - 1;
        (m, id - self.first_index_of[m])
    }

    /// Row and column of the cell containing `position`
    pub fn spherical_to_grid(&self, position: LatLng) -> (usize, usize) {
        let theta = (position.lat + 90.0).to_radians();
        let m = (theta * self.n_rows as f64 / PI - 0.5).round().max(0.0) as usize;
        let m = m.min(self.n_rows - 1);

        let cols = self.cols_in_row(m);
        let phi = (position.lng + 180.0).to_radians();
        let n = (phi * cols as f64 / (2.0 * PI)).round() as usize % cols;
        (m, n)
    }

    /// Node whose cell contains `position`
    pub fn node_at(&self, position: LatLng) -> NodeIndex {
        let (m, n) = self.spherical_to_grid(position);
        node_index(self.grid_to_id(m, n))
    }

    /// All cell neighbours of `node`, water or land
    pub fn cell_neighbours(&self, node: NodeIndex) -> &[u32] {
        let id = node.index();
        &self.cell_neighbours[self.neighbour_offsets[id]..self.neighbour_offsets[id + 1]]
    }

    pub fn num_water(&self) -> usize {
        self.is_water.iter().filter(|w| **w).count()
    }

    /// Classifies every cell as land or water
    pub fn filter(&mut self, polygons: &[Polygon]) {
        let now = Instant::now();
        info!(
            "BEGIN filtering {} nodes against {} polygons",
            self.lats.len(),
            polygons.len()
        );

        self.is_water = self
            .lats
            .par_iter()
            .zip(self.lngs.par_iter())
            .map(|(&lat, &lng)| {
                if lat < ANTARCTIC_LATITUDE {
                    return false;
                }
                let position = LatLng::new(lat, lng);
                !polygons.iter().any(|polygon| polygon.contains(position))
            })
            .collect();

        info!(
            "FINISHED filtering: {} water nodes in {:?}",
            self.num_water(),
            now.elapsed()
        );
    }

    /// Replaces the land/water classification. `true` marks water.
    pub fn set_water_mask(&mut self, is_water: Vec<bool>) {
        assert_eq!(
            is_water.len(),
            self.lats.len(),
            "Water mask has to cover every node"
        );
        self.is_water = is_water;
    }

    fn vector(&self, node: NodeIndex) -> Vector3D {
        Vector3D::from_lat_lng(self.coordinate(node))
    }
}

impl Grid for SphericalGrid {
    fn size(&self) -> usize {
        self.lats.len()
    }

    fn is_land(&self, node: NodeIndex) -> bool {
        !self.is_water[node.index()]
    }

    fn neighbours(&self, node: NodeIndex) -> Vec<NodeIndex> {
        // Already sorted and unique
        self.cell_neighbours(node)
            .iter()
            .map(|&id| node_index(id as usize))
            .filter(|&neighbour| !self.is_land(neighbour))
            .collect()
    }

    fn distance(&self, from: NodeIndex, to: NodeIndex) -> Distance {
        (self.vector(from).distance_to(&self.vector(to)) * 100.0).round() as Distance
    }

    fn coordinate(&self, node: NodeIndex) -> LatLng {
        LatLng::new(self.lats[node.index()], self.lngs[node.index()])
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn roughly_requested_size() {
        for requested in [100, 1_000, 10_000] {
            let grid = SphericalGrid::new(requested);
            let size = grid.size() as f64;
            assert!(
                (size - requested as f64).abs() / (requested as f64) < 0.1,
                "requested {} got {}",
                requested,
                size
            );
        }
    }

    #[test]
    fn id_round_trip() {
        let grid = SphericalGrid::new(500);
        for id in 0..grid.size() {
            let (m, n) = grid.id_to_grid(id);
            assert!(n < grid.cols_in_row(m));
            assert_eq!(grid.grid_to_id(m, n), id);
        }
    }

    #[test]
    fn cell_of_own_centre() {
        let grid = SphericalGrid::new(2_000);
        for id in 0..grid.size() {
            let node = node_index(id);
            assert_eq!(grid.node_at(grid.coordinate(node)), node);
        }
    }

    #[test]
    fn coordinates_are_in_range() {
        let grid = SphericalGrid::new(1_000);
        for id in 0..grid.size() {
            let LatLng { lat, lng } = grid.coordinate(node_index(id));
            assert!((-90.0..=90.0).contains(&lat));
            assert!((-180.0..180.0).contains(&lng));
        }
    }

    #[test]
    fn neighbours_are_symmetric() {
        let grid = SphericalGrid::new(1_000);
        for id in 0..grid.size() {
            let node = node_index(id);
            let neighbours = grid.neighbours(node);
            assert!(neighbours.len() >= 2);
            assert!(!neighbours.contains(&node));
            assert!(neighbours.windows(2).all(|w| w[0] < w[1]));
            for neighbour in neighbours {
                assert!(grid.neighbours(neighbour).contains(&node));
                assert_eq!(grid.distance(node, neighbour), grid.distance(neighbour, node));
            }
        }
    }

    #[test]
    fn neighbour_distance_matches_cell_size() {
        let grid = SphericalGrid::new(10_000);
        // Side length of a cell ~ sqrt(4 pi / N) * R
        let side = (4.0 * PI / grid.size() as f64).sqrt() * 6_371_000.0 * 100.0;

        let node = grid.node_at(LatLng::new(0.0, 0.0));
        for neighbour in grid.neighbours(node) {
            let d = grid.distance(node, neighbour) as f64;
            assert!(d < 3.0 * side, "{} vs {}", d, side);
        }
    }

    #[test]
    fn water_mask_hides_land() {
        let mut grid = SphericalGrid::new(200);
        let mut mask = vec![true; grid.size()];
        mask[0] = false;
        grid.set_water_mask(mask);

        assert!(grid.is_land(node_index(0)));
        assert_eq!(grid.num_water(), grid.size() - 1);
        for id in 1..grid.size() {
            assert!(!grid.neighbours(node_index(id)).contains(&node_index(0)));
        }
    }

    #[test]
    fn filter_marks_polygon_and_antarctica() {
        let mut grid = SphericalGrid::new(5_000);
        let square = Polygon::new(&[
            LatLng::new(-20.0, -20.0),
            LatLng::new(-20.0, 20.0),
            LatLng::new(20.0, 20.0),
            LatLng::new(20.0, -20.0),
        ]);
        grid.filter(&[square]);

        assert!(grid.is_land(grid.node_at(LatLng::new(0.0, 0.0))));
        assert!(!grid.is_land(grid.node_at(LatLng::new(0.0, 90.0))));
        assert!(grid.is_land(grid.node_at(LatLng::new(-85.0, 0.0))));

        let c = grid.coordinate(grid.node_at(LatLng::new(45.0, 45.0)));
        assert_relative_eq!(c.lat, 45.0, epsilon = 3.0);
        assert_relative_eq!(c.lng, 45.0, epsilon = 3.0);
    }
}
