use std::collections::BTreeMap;

use log::debug;

use super::dbscan::NOISE;
use super::point::{Cluster, NOT_A_FRAGMENT, Pixel, PointSet};
use crate::error::{ClusterError, Result};

/// Builds one cluster per surviving label
///
/// Points are grouped by `labels[i]`, coincident pixels within a label are
/// merged (their weights summed), and labels with fewer than
/// `min_cluster_size` distinct pixels are dropped. Clusters come out in
/// ascending label order; fragment labels found in `remap` get their parent
/// as `polycluster_pointer`, all others get -1.
pub fn assemble(
    points: &PointSet,
    labels: &[i32],
    remap: &BTreeMap<i32, i32>,
    min_cluster_size: usize,
) -> Result<Vec<Cluster>> {
    if labels.len() != points.len() {
        return Err(ClusterError::LengthMismatch {
            points: points.len(),
            labels: labels.len(),
        });
    }

    let mut members: BTreeMap<i32, BTreeMap<Pixel, u32>> = BTreeMap::new();
    for ((&label, &pixel), &weight) in labels.iter().zip(&points.pixels).zip(&points.weights) {
        if label == NOISE {
            continue;
        }
        let total = members.entry(label).or_default().entry(pixel).or_insert(0);
        *total = total.saturating_add(weight);
    }

    let n_labels = members.len();
    let clusters: Vec<Cluster> = members
        .into_iter()
        .filter(|(_, pixels)| pixels.len() >= min_cluster_size)
        .map(|(id, pixels)| {
            let (points, weights): (Vec<Pixel>, Vec<u32>) = pixels.into_iter().unzip();
            Cluster {
                id,
                iteration: 0,
                polycluster_pointer: remap.get(&id).copied().unwrap_or(NOT_A_FRAGMENT),
                points,
                weights,
                calibration: None,
            }
        })
        .collect();

    debug!(
        "assembled {} clusters from {} labels (min size {})",
        clusters.len(),
        n_labels,
        min_cluster_size
    );
    Ok(clusters)
}
