//! Binary caching of graphs and grids
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use anyhow::Context;
use log::info;
use serde::{de::DeserializeOwned, Serialize};

pub fn save<T: Serialize>(value: &T, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("Could not create {:?}", path))?;
    let mut writer = BufWriter::new(file);
    let bytes = bincode::serde::encode_into_std_write(value, &mut writer, bincode::config::standard())
        .with_context(|| format!("Could not encode {:?}", path))?;
    info!("Wrote {} bytes to {:?}", bytes, path);
    Ok(())
}

pub fn load<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let file = File::open(path).with_context(|| format!("Could not open {:?}", path))?;
    let mut reader = BufReader::new(file);
    let value = bincode::serde::decode_from_std_read(&mut reader, bincode::config::standard())
        .with_context(|| format!("Could not decode {:?}", path))?;
    info!("Loaded {:?}", path);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{node_index, Graph};
    use crate::grid::Grid;
    use crate::search::ch_dijkstra::CHDijkstra;
    use crate::util::test_graphs::{generate_complex_graph, small_sphere};

    #[test]
    fn contracted_graph_survives_cache() {
        let mut g = generate_complex_graph();
        g.contract();

        let path = std::env::temp_dir().join("sea_core_io_graph.bin");
        save(&g, &path).unwrap();
        let loaded: Graph = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(loaded.is_fully_contracted());
        assert_eq!(loaded.num_edges(), g.num_edges());
        assert_eq!(loaded.num_shortcuts, g.num_shortcuts);

        let mut ch = CHDijkstra::new(&loaded);
        let sp = ch.find_route(node_index(0), node_index(6)).unwrap();
        assert_eq!(sp.weight, 11);
    }

    #[test]
    fn grid_survives_cache() {
        let grid = small_sphere(300);
        let path = std::env::temp_dir().join("sea_core_io_grid.bin");
        save(&grid, &path).unwrap();
        let loaded: crate::grid::SphericalGrid = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.size(), grid.size());
        for id in 0..grid.size() {
            let node = node_index(id);
            assert_eq!(loaded.is_land(node), grid.is_land(node));
            assert_eq!(loaded.neighbours(node), grid.neighbours(node));
        }
    }

    #[test]
    fn missing_file_is_an_error() {
        let result: anyhow::Result<Graph> = load(Path::new("does/not/exist.bin"));
        assert!(result.is_err());
    }
}
