//! Bucketed K-D tree over pixel coordinates.
//!
//! Inner nodes split on the median along alternating axes; subtrees with at
//! most `leaf_size` points are kept as flat buckets and scanned linearly.

use super::distance::Distance;
use super::point::Pixel;

/// KD-Tree for radius queries
///
/// Points are separated from nodes. Nodes hold only indices into the points slice.
pub struct KDTree<'a> {
    /// All points in the tree
    pub points: &'a [Pixel],
    /// Root node of the tree
    pub root: Option<Box<KDTreeNode>>,
    distance: Distance,
}

/// A node in the K-D tree
pub enum KDTreeNode {
    Leaf(Vec<usize>),
    Split {
        axis: usize,
        /// Left subtree holds coordinates `<= value`, right holds `>= value`
        value: i32,
        left: Box<KDTreeNode>,
        right: Box<KDTreeNode>,
    },
}

impl<'a> KDTree<'a> {
    /// Builds a tree over `points` with buckets of at most `leaf_size` points.
    pub fn new(points: &'a [Pixel], distance: Distance, leaf_size: usize) -> Self {
        let root = if points.is_empty() {
            None
        } else {
            let ids: Vec<usize> = (0..points.len()).collect();
            Some(Box::new(build_tree(points, ids, 0, leaf_size.max(1))))
        };
        KDTree {
            points,
            root,
            distance,
        }
    }

    /// Finds all points within reduced distance `dist` (inclusive) of `pt`
    ///
    /// To avoid allocation, the `nodes` vector can be pre-allocated with a larger
    /// capacity and re-used across multiple calls. Result order is unspecified.
    pub fn in_range(&self, pt: &Pixel, dist: f64, mut nodes: Vec<usize>) -> Vec<usize> {
        if dist < 0.0 {
            return nodes;
        }
        self.in_range_recursive(self.root.as_deref(), pt, dist, &mut nodes);
        nodes
    }

    fn in_range_recursive(&self, t: Option<&KDTreeNode>, pt: &Pixel, r: f64, nodes: &mut Vec<usize>) {
        let Some(t) = t else {
            return;
        };

        match t {
            KDTreeNode::Leaf(ids) => {
                nodes.extend(
                    ids.iter()
                        .copied()
                        .filter(|&i| self.distance.reduced(&self.points[i], pt) <= r),
                );
            }
            KDTreeNode::Split {
                axis,
                value,
                left,
                right,
            } => {
                let diff = f64::from(pt.0[*axis] - *value);
                let (this_side, other_side) = if diff < 0.0 {
                    (left.as_ref(), right.as_ref())
                } else {
                    (right.as_ref(), left.as_ref())
                };

                self.in_range_recursive(Some(this_side), pt, r, nodes);
                if self.distance.reduced_axis(diff) <= r {
                    self.in_range_recursive(Some(other_side), pt, r, nodes);
                }
            }
        }
    }

    /// Returns the height of the K-D tree
    pub fn height(&self) -> usize {
        self.root.as_ref().map_or(0, |r| r.height())
    }
}

impl KDTreeNode {
    fn height(&self) -> usize {
        match self {
            KDTreeNode::Leaf(_) => 1,
            KDTreeNode::Split { left, right, .. } => left.height().max(right.height()) + 1,
        }
    }
}

/// Builds a node by splitting `ids` at the median of the depth's axis
fn build_tree(points: &[Pixel], mut ids: Vec<usize>, depth: usize, leaf_size: usize) -> KDTreeNode {
    if ids.len() <= leaf_size {
        return KDTreeNode::Leaf(ids);
    }

    let axis = depth % 2;
    // For equal values, sort by the other axis to keep the build deterministic
    ids.sort_unstable_by_key(|&i| (points[i].0[axis], points[i].0[1 - axis], i));

    let m = ids.len() / 2;
    let value = points[ids[m]].0[axis];
    let right_ids = ids.split_off(m);

    KDTreeNode::Split {
        axis,
        value,
        left: Box::new(build_tree(points, ids, depth + 1, leaf_size)),
        right: Box::new(build_tree(points, right_ids, depth + 1, leaf_size)),
    }
}
