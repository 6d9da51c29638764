use bitvec::prelude::*;
use log::debug;
use rayon::prelude::*;

use super::distance::Distance;
use super::kdtree::KDTree;
use super::point::{Pixel, PointSet};
use crate::config::{ClusteringConfig, NeighborAlgorithm, Parallelism, PolyCriterion};
use crate::error::{ClusterError, Result};

// Weighted DBSCAN, after the classic formulation
// (<http://en.wikipedia.org/wiki/DBSCAN>), with the density of a point being
// the summed sample weight of its eps-neighbourhood (itself included):
//
// DDBSCAN(D, W, eps, MinPts)
//    for each point P: N(P) = regionQuery(P, eps), density(P) = sum W[N(P)]
//    core(P) = density(P) >= MinPts
//    C = 0
//    for each P in index order
//       if P is labelled or not core: continue
//       label P with C, queue = [P]
//       for each Q taken from queue
//          if core(Q)
//             for each R in N(Q) not yet labelled
//                label R with C
//                if core(R): push R
//       C = next cluster
//
// Border points keep the first cluster that reaches them. The poly flag is
// computed afterwards from the cached densities (see `poly_flags`).

/// Label of points that belong to no cluster
pub const NOISE: i32 = -1;

/// Primary label and poly flag of one point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelPair {
    pub label: i32,
    pub poly: bool,
}

/// Per-point output of [`ddbscan`], in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Labels(pub Vec<LabelPair>);

impl Labels {
    /// Builds labels from parallel slices, mostly for callers that force flags.
    pub fn from_parts(labels: &[i32], poly: &[bool]) -> Result<Self> {
        if labels.len() != poly.len() {
            return Err(ClusterError::LengthMismatch {
                points: poly.len(),
                labels: labels.len(),
            });
        }
        Ok(Labels(
            labels
                .iter()
                .zip(poly)
                .map(|(&label, &poly)| LabelPair { label, poly })
                .collect(),
        ))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn primary(&self) -> Vec<i32> {
        self.0.iter().map(|p| p.label).collect()
    }

    /// Largest primary label, `NOISE` when everything is noise
    pub fn max_label(&self) -> i32 {
        self.0.iter().map(|p| p.label).max().unwrap_or(NOISE)
    }

    pub fn n_clusters(&self) -> usize {
        (self.max_label() + 1) as usize
    }

    pub fn any_poly(&self) -> bool {
        self.0.iter().any(|p| p.poly)
    }

    pub fn poly_indices(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, p)| p.poly)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Clusters weighted points and flags compound sub-regions in one pass
///
/// # Arguments
///
/// * `points` - Pixels and their sample weights
/// * `config` - Radius, density threshold, metric and search backend
/// * `poly` - Rule deciding which points of a cluster need reclustering
///
/// # Returns
///
/// One [`LabelPair`] per point, in input order. Noise is `(-1, false)`.
///
/// # Errors
///
/// `EmptyInput` for an empty point set, `InvalidConfiguration` for a bad
/// configuration, `ThreadPool` if the requested pool cannot be built.
pub fn ddbscan(points: &PointSet, config: &ClusteringConfig, poly: &PolyCriterion) -> Result<Labels> {
    if points.is_empty() {
        return Err(ClusterError::EmptyInput);
    }
    config.validate()?;

    let neighbors = neighborhoods(&points.pixels, config)?;
    let density: Vec<f64> = neighbors
        .iter()
        .map(|n| n.iter().map(|&j| f64::from(points.weights[j])).sum())
        .collect();
    let min_samples = config.min_samples();
    let core: BitVec = density.iter().map(|&d| d >= min_samples).collect();

    let labels = expand_clusters(&neighbors, &core);
    let flags = if poly.enabled {
        poly_flags(&neighbors, &density, &core, &labels, &points.weights, min_samples, poly)
    } else {
        bitvec![0; points.len()]
    };

    let pairs: Vec<LabelPair> = labels
        .iter()
        .zip(flags.iter().by_vals())
        .map(|(&label, poly)| LabelPair { label, poly })
        .collect();
    let result = Labels(pairs);

    debug!(
        "ddbscan: {} points, {} core, {} clusters, {} poly-flagged",
        points.len(),
        core.count_ones(),
        result.n_clusters(),
        result.0.iter().filter(|p| p.poly).count()
    );
    Ok(result)
}

/// Plain weighted DBSCAN labels, without poly flags
pub fn dbscan(points: &PointSet, config: &ClusteringConfig) -> Result<Vec<i32>> {
    Ok(ddbscan(points, config, &PolyCriterion::disabled())?.primary())
}

/// Grows clusters from core points in index order
fn expand_clusters(neighbors: &[Vec<usize>], core: &BitSlice) -> Vec<i32> {
    let mut labels = vec![NOISE; neighbors.len()];
    let mut queue = Vec::new();
    let mut c = 0;

    for i in 0..neighbors.len() {
        if labels[i] != NOISE || !core[i] {
            continue;
        }
        labels[i] = c;
        queue.clear();
        queue.push(i);

        // Use while loop to handle dynamic growth of the queue during iteration
        let mut j = 0;
        while j < queue.len() {
            let k = queue[j];
            j += 1;
            for &p in &neighbors[k] {
                if labels[p] != NOISE {
                    continue;
                }
                labels[p] = c;
                if core[p] {
                    queue.push(p);
                }
            }
        }
        c += 1;
    }

    labels
}

/// Flags the dense lobes of clusters that contain several of them
fn poly_flags(
    neighbors: &[Vec<usize>],
    density: &[f64],
    core: &BitSlice,
    labels: &[i32],
    weights: &[u32],
    min_samples: f64,
    poly: &PolyCriterion,
) -> BitVec {
    let n = neighbors.len();
    let dense_cut = poly.density_factor * min_samples;
    let lobe_cut = poly.min_lobe_weight.max(min_samples);
    let dense: BitVec = (0..n).map(|i| core[i] && density[i] >= dense_cut).collect();

    // Lobes: eps-connected components of dense points within one cluster
    let mut seen = bitvec![0; n];
    let n_clusters = (labels.iter().copied().max().unwrap_or(NOISE) + 1) as usize;
    let mut lobes_by_label: Vec<Vec<Vec<usize>>> = vec![Vec::new(); n_clusters];
    for i in dense.iter_ones() {
        if seen[i] {
            continue;
        }
        seen.set(i, true);
        let mut lobe = vec![i];
        let mut j = 0;
        while j < lobe.len() {
            let k = lobe[j];
            j += 1;
            for &p in &neighbors[k] {
                if dense[p] && !seen[p] && labels[p] == labels[i] {
                    seen.set(p, true);
                    lobe.push(p);
                }
            }
        }
        let weight: f64 = lobe.iter().map(|&k| f64::from(weights[k])).sum();
        if weight >= lobe_cut {
            lobes_by_label[labels[i] as usize].push(lobe);
        }
    }

    let mut flags = bitvec![0; n];
    for lobes in lobes_by_label.iter().filter(|l| l.len() >= poly.min_lobes) {
        for &k in lobes.iter().flatten() {
            flags.set(k, true);
        }
    }
    flags
}

/// Eps-neighbourhood of every point, each sorted by index
fn neighborhoods(pixels: &[Pixel], config: &ClusteringConfig) -> Result<Vec<Vec<usize>>> {
    let distance = config.distance();
    let radius = distance.reduce_radius(config.eps());
    let tree = match config.algorithm().resolve(pixels.len()) {
        NeighborAlgorithm::Brute => None,
        _ => Some(KDTree::new(pixels, distance, config.leaf_size())),
    };

    let query = |p: &Pixel| {
        let mut found = match &tree {
            Some(tree) => tree.in_range(p, radius, Vec::new()),
            None => region_query(pixels, p, radius, distance),
        };
        found.sort_unstable();
        found
    };

    let result: Vec<Vec<usize>> = match config.parallelism() {
        Parallelism::Sequential => pixels.iter().map(query).collect(),
        Parallelism::AllCores => pixels.par_iter().map(query).collect(),
        Parallelism::Threads(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| ClusterError::ThreadPool(e.to_string()))?;
            pool.install(|| pixels.par_iter().map(query).collect::<Vec<_>>())
        }
    };
    Ok(result)
}

/// Simple O(N) way to find points in neighbourhood
///
/// `radius` is on the reduced scale of `distance`. This is equivalent to
/// `KDTree::in_range` up to result order.
pub fn region_query(pixels: &[Pixel], p: &Pixel, radius: f64, distance: Distance) -> Vec<usize> {
    pixels
        .iter()
        .enumerate()
        .filter(|(_, q)| distance.reduced(q, p) <= radius)
        .map(|(i, _)| i)
        .collect()
}
