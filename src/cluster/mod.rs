//! Density clustering of weighted pixels: DDBSCAN, poly reclustering and
//! cluster assembly, with a bucketed K-D tree for neighbour queries.
pub mod assemble;
pub mod dbscan;
pub mod distance;
pub mod kdtree;
pub mod point;
pub mod poly;

#[cfg(test)]
mod assemble_test;
#[cfg(test)]
mod kdtree_test;
#[cfg(test)]
mod point_test;

pub use assemble::assemble;
pub use dbscan::{LabelPair, Labels, NOISE, dbscan, ddbscan, region_query};
pub use distance::Distance;
pub use kdtree::KDTree;
pub use point::{Calibration, Cluster, NOT_A_FRAGMENT, Pixel, PointSet};
pub use poly::{ReclusterOutcome, VoteTie, majority_vote, reclique};
