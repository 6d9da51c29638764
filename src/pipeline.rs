//! Per-image cluster reconstruction.
//!
//! Control flow for one image:
//! rebinned grid -> noise reduction -> weighted points -> DDBSCAN ->
//! (poly reclustering if anything is flagged) -> cluster assembly.

use std::time::{Duration, Instant};

use log::{debug, info};
use rayon::prelude::*;

use crate::cluster::{Cluster, ReclusterOutcome, VoteTie, assemble, ddbscan, reclique};
use crate::config::RecoConfig;
use crate::error::{ClusterError, Result};
use crate::extract::extract;
use crate::grid::Grid;
use crate::noise;

/// Wall-clock time spent in each stage
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Timings {
    pub noise_reduction: Duration,
    pub clustering: Duration,
    pub subclustering: Duration,
}

/// Clusters of one image plus bookkeeping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconstruction {
    pub clusters: Vec<Cluster>,
    /// Points left after noise reduction
    pub n_points: usize,
    /// Fragments whose parent was picked from a tied vote
    pub ties: Vec<VoteTie>,
    pub timings: Timings,
}

impl Reconstruction {
    pub fn n_fragments(&self) -> usize {
        self.clusters.iter().filter(|c| c.is_fragment()).count()
    }
}

/// Reconstructs clusters ("snakes") from rebinned camera images
pub struct SnakesFactory {
    config: RecoConfig,
}

impl SnakesFactory {
    /// Validates the configuration once, before any image is processed.
    pub fn new(config: RecoConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RecoConfig {
        &self.config
    }

    /// Runs the full clustering chain on one image
    ///
    /// `rebinned` must be square; `weight_image` must have the same shape.
    /// An image with no surviving points yields an empty reconstruction.
    /// On error no clusters are returned at all.
    pub fn reconstruct(&self, rebinned: &Grid, weight_image: &Grid) -> Result<Reconstruction> {
        let config = &self.config;
        let mut timings = Timings::default();

        let t0 = Instant::now();
        let denoised = noise::reduce(rebinned, rebinned.rows(), config.min_neighbors_average)?;
        timings.noise_reduction = t0.elapsed();

        // clustering an empty point set is invalid, so stop here
        let points = match extract(&denoised, weight_image, config.weighting) {
            Ok(points) => points,
            Err(ClusterError::EmptyInput) => {
                debug!("no points survived noise reduction");
                return Ok(Reconstruction {
                    timings,
                    ..Default::default()
                });
            }
            Err(e) => return Err(e),
        };

        let t1 = Instant::now();
        let labels = ddbscan(&points, &config.clustering, &config.poly)?;
        timings.clustering = t1.elapsed();

        let t2 = Instant::now();
        let outcome = if config.reclustering && labels.any_poly() {
            reclique(&points, &labels, config.poly_clustering())?
        } else {
            ReclusterOutcome::unchanged(&labels)
        };
        timings.subclustering = t2.elapsed();

        let clusters = assemble(&points, &outcome.final_labels, &outcome.remap, config.min_cluster_size)?;

        let reco = Reconstruction {
            clusters,
            n_points: points.len(),
            ties: outcome.ties,
            timings,
        };
        info!(
            "{} clusters ({} fragments) from {} points",
            reco.clusters.len(),
            reco.n_fragments(),
            reco.n_points
        );
        debug!(
            "noise reduction {:?}, clustering {:?}, subclustering {:?}",
            timings.noise_reduction, timings.clustering, timings.subclustering
        );
        Ok(reco)
    }

    /// Reconstructs many images in parallel, one result per `(rebinned, weights)` pair
    pub fn reconstruct_batch(&self, images: &[(Grid, Grid)]) -> Vec<Result<Reconstruction>> {
        images
            .par_iter()
            .map(|(rebinned, weights)| self.reconstruct(rebinned, weights))
            .collect()
    }
}
