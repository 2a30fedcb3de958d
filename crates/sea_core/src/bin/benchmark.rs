use std::{fs, path::Path, time::Instant};

use anyhow::Context;
use indicatif::ProgressBar;
use log::info;
use rand::{rngs::StdRng, Rng};
use sea_core::{
    graph::{node_index, NodeIndex},
    io,
    prelude::*,
    statistics::{average_out_degree, level_count},
    util::cli,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cfg = cli::parse();

    fs::create_dir_all(&cfg.out_dir)
        .with_context(|| format!("Could not create {:?}", cfg.out_dir))?;

    let cached = match &cfg.cache {
        Some(path) if path.exists() => Some(io::load::<(SphericalGrid, Graph)>(path)?),
        _ => None,
    };

    let (grid, mut g) = match cached {
        Some(cached) => cached,
        None => {
            let coastlines = Coastlines::from_pbf(&cfg.datafile)?;
            let polygons = Polygon::from_rings(&coastlines.merge_rings());

            let mut grid = SphericalGrid::new(cfg.number_of_nodes);
            let now = Instant::now();
            grid.filter(&polygons);
            println!("Filtering took {:?}", now.elapsed());

            let g = Graph::from_grid(&grid)?;
            (grid, g)
        }
    };
    g.print_info();
    println!("Average out degree: {:.2}", average_out_degree(&g));

    let mut rng: StdRng = rand::SeedableRng::seed_from_u64(cfg.seed);
    let pairs: Vec<(NodeIndex, NodeIndex)> = (0..cfg.pairs)
        .map(|_| {
            (
                node_index(rng.gen_range(0..grid.size())),
                node_index(rng.gen_range(0..grid.size())),
            )
        })
        .collect();

    // Plain searches ignore shortcuts, so a cached graph works for both
    let mut dijkstra = Dijkstra::new(&g);
    benchmark(&cfg.out_dir.join("normal.csv"), &pairs, |s, t| {
        dijkstra.find_route(s, t)
    })?;
    drop(dijkstra);

    if !g.is_fully_contracted() {
        let now = Instant::now();
        g.contract_with_params(cfg.params);
        println!("Contracting took {:?}", now.elapsed());

        if let Some(path) = &cfg.cache {
            io::save(&(&grid, &g), path)?;
        }
    }
    g.print_info();
    info!("Nodes per level: {:?}", level_count(&g));

    let mut ch = CHDijkstra::new(&g);
    benchmark(&cfg.out_dir.join("ch.csv"), &pairs, |s, t| ch.find_route(s, t))?;

    Ok(())
}

/// Runs `search` for every pair and writes one csv row per query
fn benchmark<F>(path: &Path, pairs: &[(NodeIndex, NodeIndex)], mut search: F) -> anyhow::Result<()>
where
    F: FnMut(NodeIndex, NodeIndex) -> Option<ShortestPath>,
{
    println!("Starting benchmark for {:?}", path);
    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("Could not create {:?}", path))?;
    wtr.write_record(["source", "target", "query_time", "q_pops", "distance", "path"])?;

    let pb = ProgressBar::new(pairs.len() as u64);
    let mut total_time = 0;
    for &(source, target) in pairs {
        let now = Instant::now();
        let sp = search(source, target);
        let query_time = now.elapsed().as_micros();
        total_time += query_time;

        match sp {
            Some(sp) => wtr.write_record(&[
                source.to_string(),
                target.to_string(),
                query_time.to_string(),
                sp.pops.to_string(),
                sp.weight.to_string(),
                sp.to_arrow_string(),
            ])?,
            None => wtr.write_record(&[
                source.to_string(),
                target.to_string(),
                query_time.to_string(),
                String::new(),
                String::new(),
                String::new(),
            ])?,
        }
        pb.inc(1);
    }
    pb.finish();
    wtr.flush()?;

    println!(
        "avg time: {:.2}ys",
        total_time as f64 / pairs.len().max(1) as f64
    );
    Ok(())
}
