//! Re-exports of the most commonly used items in `sea_core`.
pub use crate::contraction_params::ContractionParams;

pub use crate::search;
pub use crate::search::{CHDijkstra, Dijkstra, ShortestPath};

pub use crate::geometry::LatLng;
pub use crate::graph::node_index;
pub use crate::graph::Graph;
pub use crate::graph::NodeIndex;
pub use crate::grid::{Grid, SphericalGrid};
pub use crate::polygon::Polygon;
pub use crate::snap::snap_to_water;

pub use coastline_reader::Coastlines;
