//! Crate to route ships over a discretized sphere with contraction
//! hierarchies.
//!
//! # Basic usage
//! ```no_run
//! use sea_core::prelude::*;
//! use std::path::Path;
//!
//! // Coastlines from a pbf file
//! let coastlines = Coastlines::from_pbf(Path::new("path/to/pbf/file.osm.pbf")).unwrap();
//! let polygons = Polygon::from_rings(&coastlines.merge_rings());
//!
//! // Sphere with ~100k nodes, land removed
//! let mut grid = SphericalGrid::new(100_000);
//! grid.filter(&polygons);
//!
//! // Build and contract the graph
//! let mut g = Graph::from_grid(&grid).expect("Failed to create graph from grid");
//! g.contract();
//!
//! // Search
//! let mut ch = CHDijkstra::new(&g);
//! let shortest_path = ch.find_route(node_index(3), node_index(20));
//!```
//! [`Graph`]: crate::graph::Graph
pub mod constants;
pub mod contraction_params;
pub mod geometry;
pub mod graph;
pub mod grid;
pub mod io;
pub mod node_contraction;
pub mod polygon;
pub mod prelude;
pub mod search;
pub mod snap;
pub mod statistics;
pub mod util;
