//! Gas-camera cluster reconstruction tool
//!
//! Reads a rebinned image (and optionally a weight image) from CSV, runs the
//! DDBSCAN + poly reclustering chain and writes one row per cluster pixel.

use clap::Parser;
use csv::{ReaderBuilder, WriterBuilder};
use log::{error, info};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use snakes_cluster::{Cluster, ClusteringConfig, Grid, PolyCriterion, RecoConfig, SnakesFactory, Weighting};

#[cfg(test)]
mod main_test;

#[derive(Parser)]
#[command(name = "snakes_cluster")]
#[command(about = "Photon-hit cluster reconstruction for gas-camera images", long_about = None)]
struct Args {
    /// Rebinned image as a headerless CSV matrix (rows of values)
    #[arg(short, long)]
    grid: PathBuf,

    /// Image the sample weights are read from (default: the rebinned image)
    #[arg(short, long)]
    weights: Option<PathBuf>,

    /// Clustering configuration (JSON with dbscan_eps, dbscan_minsamples, ...)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Noise reduction cut on the 3x3 mean
    #[arg(short = 'n', long, default_value_t = 0.75)]
    min_neighbors_average: f64,

    /// Give every point weight 1
    #[arg(long)]
    uniform_weights: bool,

    /// Skip the reclustering of poly-flagged points
    #[arg(long)]
    no_poly: bool,

    /// Output CSV file with cluster pixels (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

/// Used when no configuration file is given
const DEFAULT_EPS: f64 = 5.0;
const DEFAULT_MIN_SAMPLES: f64 = 30.0;

fn main() {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(args)?;
    let factory = SnakesFactory::new(config)?;

    let grid = read_grid(&args.grid)?;
    let weights = match &args.weights {
        Some(path) => read_grid(path)?,
        None => grid.clone(),
    };
    info!("read {:?} grid from {:?}", grid.shape(), args.grid);

    let reco = factory.reconstruct(&grid, &weights)?;
    for tie in &reco.ties {
        info!(
            "fragment {} parent chosen from tie {:?}: {}",
            tie.fragment, tie.candidates, tie.chosen
        );
    }

    match &args.output {
        None => write_clusters(std::io::stdout().lock(), &reco.clusters)?,
        Some(path) => {
            write_clusters(File::create(path)?, &reco.clusters)?;
            info!("clusters written to {:?}", path);
        }
    }
    Ok(())
}

/// Assembles the reconstruction settings from the command line
fn build_config(args: &Args) -> Result<RecoConfig, Box<dyn std::error::Error>> {
    let clustering = match &args.config {
        Some(path) => ClusteringConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => ClusteringConfig::new(DEFAULT_EPS, DEFAULT_MIN_SAMPLES),
    };

    let mut config = RecoConfig::new(clustering);
    config.min_neighbors_average = args.min_neighbors_average;
    if args.uniform_weights {
        config.weighting = Weighting::Uniform;
    }
    if args.no_poly {
        config.reclustering = false;
        config.poly = PolyCriterion::disabled();
    }
    Ok(config)
}

/// Reads a headerless numeric CSV matrix into a grid
///
/// Blank cells count as zero; every row must have the same length.
fn read_grid(path: &PathBuf) -> Result<Grid, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut rows = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result?;
        let row = record
            .iter()
            .map(|cell| if cell.is_empty() { Ok(0.0) } else { cell.parse::<f64>() })
            .collect::<Result<Vec<f64>, _>>()
            .map_err(|e| format!("{:?} line {}: {}", path, line + 1, e))?;
        rows.push(row);
    }

    Ok(Grid::from_rows(rows)?)
}

/// Writes `cluster_id,polycluster,row,col,weight`, one line per cluster pixel
fn write_clusters<W: Write>(out: W, clusters: &[Cluster]) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = WriterBuilder::new().from_writer(out);
    writer.write_record(["cluster_id", "polycluster", "row", "col", "weight"])?;

    for cluster in clusters {
        for (pixel, weight) in cluster.points.iter().zip(&cluster.weights) {
            writer.write_record(&[
                cluster.id.to_string(),
                cluster.polycluster_pointer.to_string(),
                pixel.row().to_string(),
                pixel.col().to_string(),
                weight.to_string(),
            ])?;
        }
    }

    writer.flush()?;
    Ok(())
}
