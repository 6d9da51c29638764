//! Cluster reconstruction for gas-camera photon images.
//!
//! A rebinned image is denoised, turned into a weighted pixel cloud and
//! clustered with a weighted DBSCAN ("DDBSCAN") that also flags compound
//! sub-regions. Flagged points are reclustered into fragments that keep a
//! pointer to the primary cluster they came from.
//!
//! ```no_run
//! use snakes_cluster::{ClusteringConfig, Grid, RecoConfig, SnakesFactory};
//!
//! # fn main() -> snakes_cluster::Result<()> {
//! let factory = SnakesFactory::new(RecoConfig::new(ClusteringConfig::new(5.0, 30.0)))?;
//! let image = Grid::new(256, 256);
//! let reco = factory.reconstruct(&image, &image)?;
//! assert!(reco.clusters.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod cluster;
pub mod config;
pub mod error;
pub mod extract;
pub mod grid;
pub mod noise;
pub mod pipeline;


pub use cluster::{Cluster, Labels, Pixel, PointSet};
pub use config::{ClusteringConfig, Metric, NeighborAlgorithm, Parallelism, PolyCriterion, RecoConfig, Weighting};
pub use error::{ClusterError, Result};
pub use grid::Grid;
pub use pipeline::{Reconstruction, SnakesFactory, Timings};
