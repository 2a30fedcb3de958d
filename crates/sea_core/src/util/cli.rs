use std::path::PathBuf;

use clap::Parser;

use crate::contraction_params::ContractionParams;

#[derive(Parser)]
#[command(author = "Daniel Holzner", version, about, long_about = None)]
struct Cli {
    /// Path to the .pbf file with the coastlines
    #[arg(long, env = "DATAFILE", default_value = "data/antarctica-latest.osm.pbf")]
    datafile: PathBuf,

    /// Approximate number of nodes on the sphere
    #[arg(short, long, env = "NUMBER_OF_SPHERE_NODES", default_value_t = 100_000)]
    nodes: usize,

    /// Number of random source/target pairs
    #[arg(short, long, default_value_t = 100)]
    pairs: usize,

    /// Seed for drawing the pairs
    #[arg(long, default_value_t = 187)]
    seed: u64,

    /// Directory for the result files
    #[arg(short, long, value_name = "dir", default_value = "results")]
    out_dir: PathBuf,

    /// Cache file for the contracted graph. Created if missing
    #[arg(long, value_name = "file")]
    cache: Option<PathBuf>,

    /// Maximum number of nodes settled per witness search
    #[arg(long, value_name = "nodes")]
    witness_limit: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Cfg {
    pub datafile: PathBuf,
    pub number_of_nodes: usize,
    pub pairs: usize,
    pub seed: u64,
    pub out_dir: PathBuf,
    pub cache: Option<PathBuf>,
    pub params: ContractionParams,
}

impl From<Cli> for Cfg {
    fn from(cli: Cli) -> Self {
        let mut params = ContractionParams::new();
        if let Some(limit) = cli.witness_limit {
            params = params.witness_search_limit(limit);
        }

        Cfg {
            datafile: cli.datafile,
            number_of_nodes: cli.nodes,
            pairs: cli.pairs,
            seed: cli.seed,
            out_dir: cli.out_dir,
            cache: cli.cache,
            params,
        }
    }
}

pub fn parse() -> Cfg {
    Cli::parse().into()
}
