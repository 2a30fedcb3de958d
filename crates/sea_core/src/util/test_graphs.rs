//! Small hand-made grids for tests, demos and benchmarks.
use crate::{
    constants::Distance,
    geometry::LatLng,
    graph::{node_index, Graph, NodeIndex},
    grid::{Grid, SphericalGrid},
};

/// Grid defined by an explicit neighbour list
#[derive(Debug, Clone)]
pub struct TestGrid {
    land: Vec<bool>,
    adjacency: Vec<Vec<(NodeIndex, Distance)>>,
    coordinates: Vec<LatLng>,
}

impl TestGrid {
    pub fn new(size: usize) -> Self {
        TestGrid {
            land: vec![false; size],
            adjacency: vec![Vec::new(); size],
            coordinates: (0..size).map(|i| LatLng::new(0.0, i as f64 * 0.01)).collect(),
        }
    }

    /// Connects `a` and `b` in both directions
    pub fn connect(self, a: usize, b: usize, weight: Distance) -> Self {
        self.connect_directed(a, b, weight)
            .connect_directed(b, a, weight)
    }

    pub fn connect_directed(mut self, a: usize, b: usize, weight: Distance) -> Self {
        self.adjacency[a].push((node_index(b), weight));
        self
    }

    pub fn land(mut self, node: usize) -> Self {
        self.land[node] = true;
        self
    }

    pub fn at(mut self, node: usize, lat: f64, lng: f64) -> Self {
        self.coordinates[node] = LatLng::new(lat, lng);
        self
    }
}

impl Grid for TestGrid {
    fn size(&self) -> usize {
        self.land.len()
    }

    fn is_land(&self, node: NodeIndex) -> bool {
        self.land[node.index()]
    }

    fn neighbours(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut neighbours: Vec<NodeIndex> = self.adjacency[node.index()]
            .iter()
            .map(|(n, _)| *n)
            .filter(|n| !self.is_land(*n))
            .collect();
        neighbours.sort_unstable();
        neighbours.dedup();
        neighbours
    }

    fn distance(&self, from: NodeIndex, to: NodeIndex) -> Distance {
        self.adjacency[from.index()]
            .iter()
            .filter(|(n, _)| *n == to)
            .map(|(_, w)| *w)
            .min()
            .unwrap_or_else(|| panic!("{} and {} are no neighbours", from, to))
    }

    fn coordinate(&self, node: NodeIndex) -> LatLng {
        self.coordinates[node.index()]
    }
}

/// 0 - 1 - 2 - 3, every edge costs 100
pub fn line_grid() -> TestGrid {
    TestGrid::new(4)
        .connect(0, 1, 100)
        .connect(1, 2, 100)
        .connect(2, 3, 100)
}

/// 0 - 1 - 2    3 - 4 - 5
pub fn disconnected_grid() -> TestGrid {
    TestGrid::new(6)
        .connect(0, 1, 1)
        .connect(1, 2, 1)
        .connect(3, 4, 3)
        .connect(4, 5, 1)
}

/// `width` x `height` lattice with 4-neighbourhood, every edge costs 100.
/// Node `(x, y)` has id `y * width + x`.
pub fn square_grid(width: usize, height: usize) -> TestGrid {
    let mut grid = TestGrid::new(width * height);
    for y in 0..height {
        for x in 0..width {
            let id = y * width + x;
            grid = grid.at(id, y as f64 * 0.1, x as f64 * 0.1);
            if x + 1 < width {
                grid = grid.connect(id, id + 1, 100);
            }
            if y + 1 < height {
                grid = grid.connect(id, id + width, 100);
            }
        }
    }
    grid
}

/// Spherical grid with two rectangular continents and Antarctica
pub fn small_sphere(number_of_nodes: usize) -> SphericalGrid {
    let mut grid = SphericalGrid::new(number_of_nodes);
    let is_water = (0..grid.size())
        .map(|id| {
            let LatLng { lat, lng } = grid.coordinate(node_index(id));
            let first = (-30.0..=30.0).contains(&lat) && (-40.0..=40.0).contains(&lng);
            let second = (20.0..=60.0).contains(&lat) && (60.0..=120.0).contains(&lng);
            lat >= -79.0 && !first && !second
        })
        .collect();
    grid.set_water_mask(is_water);
    grid
}

pub fn complex_grid() -> TestGrid {
    //    A B C D E F G H I J K
    let (a, b, c, d, e, f, g, h, i, j, k) = (0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10);

    TestGrid::new(11)
        .connect(a, b, 3) // A <=> B
        .connect(a, c, 5) // A <=> C
        .connect(a, k, 3) // A <=> K
        .connect(b, d, 5) // B <=> D
        .connect(b, c, 3) // B <=> C
        .connect(c, d, 2) // C <=> D
        .connect(c, j, 2) // C <=> J
        .connect(d, j, 4) // D <=> J
        .connect(d, e, 7) // D <=> E
        .connect(e, j, 3) // E <=> J
        .connect(e, f, 6) // E <=> F
        .connect(f, h, 2) // F <=> H
        .connect(f, g, 4) // F <=> G
        .connect(g, h, 3) // G <=> H
        .connect(g, i, 5) // G <=> I
        .connect(h, i, 3) // H <=> I
        .connect(h, j, 2) // H <=> J
        .connect(i, j, 4) // I <=> J
        .connect(i, k, 6) // I <=> K
        .connect(j, k, 3) // J <=> K
}

pub fn generate_complex_graph() -> Graph {
    Graph::from_grid(&complex_grid()).expect("complex grid is symmetric")
}
