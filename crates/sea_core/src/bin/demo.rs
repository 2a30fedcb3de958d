use anyhow::Context;
use sea_core::prelude::*;
use sea_core::util::test_graphs::small_sphere;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Sphere with two artificial continents
    let grid = small_sphere(20_000);

    // Create a new graph and contract it
    let mut g = Graph::from_grid(&grid)?;
    g.contract();

    // Snap two positions on both sides of the first continent
    let s = snap_to_water(&grid, &g, LatLng::new(0.0, -50.0)).context("No water on the sphere")?;
    let t = snap_to_water(&grid, &g, LatLng::new(0.0, 50.0)).context("No water on the sphere")?;

    // Search
    let mut ch = CHDijkstra::new(&g);
    match ch.find_route(s, t) {
        Some(shortest_path) => {
            println!("Costs: {:.2} km", shortest_path.weight as f64 / 100_000.0);
            for node in &shortest_path.nodes {
                let LatLng { lat, lng } = grid.coordinate(*node);
                println!("{:.3},{:.3}", lat, lng);
            }
        }
        None => println!("No route from {} to {}", s, t),
    }
    Ok(())
}
