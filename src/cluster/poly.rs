//! Reclustering of poly-flagged points into fragments.
//!
//! The flagged subset is clustered again on its own. Each resulting
//! sub-cluster becomes a fragment whose parent is the primary label most of
//! its points came from; fragment labels are shifted past the largest primary
//! label so both label ranges can live in one label space.

use std::collections::BTreeMap;

use log::{debug, trace, warn};

use super::dbscan::{Labels, NOISE, dbscan};
use super::point::PointSet;
use crate::config::ClusteringConfig;
use crate::error::Result;

/// Tie in the majority vote that picks a fragment's parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteTie {
    /// Shifted fragment label
    pub fragment: i32,
    /// Primary labels sharing the top count, in order of first appearance
    pub candidates: Vec<i32>,
    pub chosen: i32,
}

/// Result of reclustering the poly-flagged subset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReclusterOutcome {
    /// Indices (into the full point set) of the reclustered points
    pub poly_indices: Vec<usize>,
    /// Shifted fragment label per entry of `poly_indices`; `-1` for noise
    pub new_labels: Vec<i32>,
    /// Fragment label -> parent primary label
    pub remap: BTreeMap<i32, i32>,
    pub ties: Vec<VoteTie>,
    /// Combined label of every point of the full set
    pub final_labels: Vec<i32>,
}

impl ReclusterOutcome {
    /// Outcome that keeps every primary label
    pub fn unchanged(labels: &Labels) -> Self {
        ReclusterOutcome {
            final_labels: labels.primary(),
            ..Default::default()
        }
    }

    pub fn n_fragments(&self) -> usize {
        self.remap.len()
    }
}

/// Most frequent value, ties going to the one seen first
///
/// Returns `None` for an empty input. The second element lists every value
/// sharing the top count when there is more than one.
pub fn majority_vote<I>(values: I) -> Option<(i32, Vec<i32>)>
where
    I: IntoIterator<Item = i32>,
{
    // (value, count) in order of first appearance
    let mut counts: Vec<(i32, usize)> = Vec::new();
    for v in values {
        match counts.iter_mut().find(|(c, _)| *c == v) {
            Some((_, n)) => *n += 1,
            None => counts.push((v, 1)),
        }
    }

    let top = counts.iter().map(|&(_, n)| n).max()?;
    let leaders: Vec<i32> = counts
        .iter()
        .filter(|&&(_, n)| n == top)
        .map(|&(v, _)| v)
        .collect();
    let winner = leaders[0];
    let tied = if leaders.len() > 1 { leaders } else { Vec::new() };
    Some((winner, tied))
}

/// Reclusters the flagged points and reattributes the fragments
///
/// Flagged points that end up in a fragment leave their primary cluster;
/// flagged points that are noise in the second pass keep their primary
/// label. Flags on noise points are ignored. No point is ever carried under
/// two labels.
pub fn reclique(points: &PointSet, labels: &Labels, config: &ClusteringConfig) -> Result<ReclusterOutcome> {
    let poly_indices: Vec<usize> = labels
        .0
        .iter()
        .enumerate()
        .filter(|(_, p)| p.poly && p.label != NOISE)
        .map(|(i, _)| i)
        .collect();
    if poly_indices.is_empty() {
        return Ok(ReclusterOutcome::unchanged(labels));
    }

    let subset = points.subset(&poly_indices);
    let sub_labels = dbscan(&subset, config)?;
    let offset = labels.max_label() + 1;

    let mut remap = BTreeMap::new();
    let mut ties = Vec::new();
    let n_sub = sub_labels.iter().copied().max().unwrap_or(NOISE) + 1;
    for s in 0..n_sub {
        let parents = sub_labels
            .iter()
            .zip(&poly_indices)
            .filter(|&(&l, _)| l == s)
            .map(|(_, &i)| labels.0[i].label);
        let Some((parent, tied)) = majority_vote(parents) else {
            continue;
        };
        let fragment = s + offset;
        if !tied.is_empty() {
            warn!(
                "fragment {} has a tied parent vote between {:?}, picking {}",
                fragment, tied, parent
            );
            ties.push(VoteTie {
                fragment,
                candidates: tied,
                chosen: parent,
            });
        }
        trace!("fragment {} -> primary cluster {}", fragment, parent);
        remap.insert(fragment, parent);
    }

    let new_labels: Vec<i32> = sub_labels
        .iter()
        .map(|&l| if l == NOISE { NOISE } else { l + offset })
        .collect();

    let mut final_labels = labels.primary();
    for (&i, &l) in poly_indices.iter().zip(&new_labels) {
        if l != NOISE {
            final_labels[i] = l;
        }
    }

    debug!(
        "reclustered {} flagged points into {} fragments",
        poly_indices.len(),
        remap.len()
    );
    Ok(ReclusterOutcome {
        poly_indices,
        new_labels,
        remap,
        ties,
        final_labels,
    })
}
