//! Interactive shell to snap positions and run searches on a contracted sea graph
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::info;
use reedline_repl_rs::clap::{value_parser, Arg, ArgMatches, Command};
use reedline_repl_rs::{Repl, Result};
use sea_core::prelude::*;
use sea_core::statistics::average_out_degree;

struct Context {
    grid: SphericalGrid,
    graph: Graph,
}

impl Context {
    fn new(grid: SphericalGrid, graph: Graph) -> Self {
        Self { grid, graph }
    }

    /// Parses `name` as node id, `None` if it is out of range
    fn node(&self, args: &ArgMatches, name: &str) -> Option<NodeIndex> {
        let id = *args.get_one::<usize>(name)?;
        (id < self.grid.size()).then(|| node_index(id))
    }
}

/// Print graph info
fn info(_args: ArgMatches, context: &mut Context) -> Result<Option<String>> {
    let g = &context.graph;
    Ok(Some(format!(
        "Grid has {} cells ({} water)\nGraph has {} nodes, {} edges ({} shortcuts) and {} levels\nAverage out degree: {:.2}",
        context.grid.size(),
        context.grid.num_water(),
        g.num_nodes(),
        g.num_edges(),
        g.num_shortcuts,
        g.num_levels(),
        average_out_degree(g)
    )))
}

fn snap(args: ArgMatches, context: &mut Context) -> Result<Option<String>> {
    let lat = *args.get_one::<f64>("lat").unwrap();
    let lng = *args.get_one::<f64>("lng").unwrap();

    match snap_to_water(&context.grid, &context.graph, LatLng::new(lat, lng)) {
        Some(node) => {
            let LatLng { lat, lng } = context.grid.coordinate(node);
            Ok(Some(format!("{} at ({:.4}, {:.4})", node, lat, lng)))
        }
        None => Ok(Some("Grid has no water".to_string())),
    }
}

fn format_path(context: &Context, sp: Option<ShortestPath>, took: std::time::Duration) -> String {
    match sp {
        Some(sp) => {
            let mut path = String::new();
            for node in &sp.nodes {
                let LatLng { lat, lng } = context.grid.coordinate(*node);
                path.push_str(&format!("{} ({:.4}, {:.4})\n", node, lat, lng));
            }
            path.push_str(&format!(
                "Distance: {:.2} km, pops: {}, took: {:?}",
                sp.weight as f64 / 100_000.0,
                sp.pops,
                took
            ));
            path
        }
        None => "No path found".to_string(),
    }
}

fn run_ch(args: ArgMatches, context: &mut Context) -> Result<Option<String>> {
    let (Some(src), Some(dst)) = (context.node(&args, "src"), context.node(&args, "dst")) else {
        return Ok(Some(format!("Node ids must be below {}", context.grid.size())));
    };

    let mut ch = CHDijkstra::new(&context.graph);
    let now = Instant::now();
    let sp = ch.find_route(src, dst);
    Ok(Some(format_path(context, sp, now.elapsed())))
}

fn run_dijkstra(args: ArgMatches, context: &mut Context) -> Result<Option<String>> {
    let (Some(src), Some(dst)) = (context.node(&args, "src"), context.node(&args, "dst")) else {
        return Ok(Some(format!("Node ids must be below {}", context.grid.size())));
    };

    let mut dijkstra = Dijkstra::new(&context.graph);
    let now = Instant::now();
    let sp = dijkstra.find_route(src, dst);
    Ok(Some(format_path(context, sp, now.elapsed())))
}

fn measure(args: ArgMatches, context: &mut Context) -> Result<Option<String>> {
    use rand::Rng;

    let n = *args.get_one::<usize>("n").unwrap_or(&10);
    let size = context.grid.size();

    // Select n random start and end nodes
    let mut rng = rand::thread_rng();
    let pairs: Vec<(NodeIndex, NodeIndex)> = (0..n)
        .map(|_| {
            (
                node_index(rng.gen_range(0..size)),
                node_index(rng.gen_range(0..size)),
            )
        })
        .collect();

    let mut dijkstra_pops = 0;
    let mut ch_pops = 0;
    let mut found = 0;
    let mut res = String::new();
    let mut ch = CHDijkstra::new(&context.graph);
    for (src, dst) in pairs {
        let mut dijkstra = Dijkstra::new(&context.graph);
        let expected = dijkstra.find_distance(src, dst);
        let sp = ch.find_route(src, dst);
        if sp.as_ref().map(|sp| sp.weight) != expected {
            res.push_str(&format!("Mismatch for {} -> {}\n", src, dst));
        }
        if let Some(sp) = sp {
            found += 1;
            dijkstra_pops += dijkstra.stats.nodes_settled;
            ch_pops += sp.pops;
            res.push_str(&format!(
                "{} -> {}: Dijkstra {:?}, CH {:?}\n",
                src, dst, dijkstra.stats.duration, ch.stats.duration
            ));
        }
    }

    let found_div = found.max(1) as f64;
    res.push_str(&format!(
        "{} of {} pairs connected, avg pops Dijkstra: {:.2}, CH: {:.2}",
        found,
        n,
        dijkstra_pops as f64 / found_div,
        ch_pops as f64 / found_div
    ));
    Ok(Some(res))
}

fn node_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .value_parser(value_parser!(usize))
        .required(true)
        .help(help)
}

fn coordinate_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .value_parser(value_parser!(f64))
        .allow_negative_numbers(true)
        .required(true)
        .help(help)
}

fn main() -> Result<()> {
    env_logger::init();

    let path_to_pbf = std::env::args().nth(1).expect("No path to PBF file given");
    let number_of_nodes = std::env::args()
        .nth(2)
        .map(|n| n.parse().expect("Number of nodes must be an integer"))
        .unwrap_or(100_000);

    let coastlines = Coastlines::from_pbf(Path::new(&path_to_pbf)).expect("Could not read PBF file");
    let polygons = Polygon::from_rings(&coastlines.merge_rings());

    let mut grid = SphericalGrid::new(number_of_nodes);
    grid.filter(&polygons);

    let mut graph = Graph::from_grid(&grid).expect("Failed to create graph from grid");
    let now = Instant::now();
    graph.contract();
    info!("Contraction took {:?}", now.elapsed());

    let context = Context::new(grid, graph);

    let mut repl = Repl::new(context)
        .with_name("Seafarer")
        .with_version("v0.1.0")
        .with_description("REPL to route ships between water cells")
        .with_banner("Welcome to Seafarer")
        .with_history(PathBuf::from("history"), 100)
        .with_command(Command::new("info").about("Print grid and graph info"), info)
        .with_command(
            Command::new("snap")
                .arg(coordinate_arg("lat", "Latitude in degrees"))
                .arg(coordinate_arg("lng", "Longitude in degrees"))
                .about("Find the closest water node"),
            snap,
        )
        .with_command(
            Command::new("route")
                .arg(node_arg("src", "ID of source node"))
                .arg(node_arg("dst", "ID of destination node"))
                .about("Calculate shortest path using the contraction hierarchy"),
            run_ch,
        )
        .with_command(
            Command::new("dijk")
                .arg(node_arg("src", "ID of source node"))
                .arg(node_arg("dst", "ID of destination node"))
                .about("Calculate shortest path using Dijkstra's algorithm"),
            run_dijkstra,
        )
        .with_command(
            Command::new("bench")
                .arg(
                    Arg::new("n")
                        .value_parser(value_parser!(usize))
                        .required(false)
                        .help("Number of random pairs"),
                )
                .about("Compare `n` random queries of Dijkstra and CH"),
            measure,
        );

    repl.run()
}
