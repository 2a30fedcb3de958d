use std::path::Path;

use coastline_reader::*;

fn main() -> anyhow::Result<()> {
    let now = std::time::Instant::now();
    // Read path to file from command line
    let pbf_path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("No path to PBF file given"))?;

    let coastlines = Coastlines::from_pbf(Path::new(&pbf_path))?;
    let rings = coastlines.merge_rings();

    let elapsed = now.elapsed();

    println!(
        "Finished reading PBF file in {}.{:03} seconds",
        elapsed.as_secs(),
        elapsed.subsec_millis()
    );
    println!(
        "Coastlines have {} nodes and {} ways",
        coastlines.get_nodes().len(),
        coastlines.get_ways().len()
    );
    println!(
        "Merged into {} rings, the largest has {} nodes",
        rings.len(),
        rings.iter().map(|r| r.len()).max().unwrap_or(0)
    );
    Ok(())
}
