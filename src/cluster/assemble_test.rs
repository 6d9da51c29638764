#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::cluster::{NOISE, NOT_A_FRAGMENT, Pixel, PointSet, assemble};
    use crate::error::ClusterError;

    #[test]
    fn test_empty_points_give_no_clusters() {
        let clusters = assemble(&PointSet::new(), &[], &BTreeMap::new(), 2).unwrap();
        assert!(clusters.is_empty());
    }

    #[test]
    fn test_clusters_in_label_order_with_pointers() {
        let points = PointSet::unweighted(vec![
            Pixel::new(5, 5),
            Pixel::new(0, 1),
            Pixel::new(0, 0),
            Pixel::new(5, 6),
            Pixel::new(9, 9),
            Pixel::new(3, 3),
            Pixel::new(3, 4),
        ]);
        let labels = [2, 0, 0, 2, NOISE, 1, 1];
        let remap = BTreeMap::from([(2, 0)]);

        let clusters = assemble(&points, &labels, &remap, 2).unwrap();

        let ids: Vec<i32> = clusters.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(clusters[0].points, vec![Pixel::new(0, 0), Pixel::new(0, 1)]);
        assert_eq!(clusters[0].polycluster_pointer, NOT_A_FRAGMENT);
        assert_eq!(clusters[1].polycluster_pointer, NOT_A_FRAGMENT);
        assert_eq!(clusters[2].polycluster_pointer, 0);
        assert!(clusters.iter().all(|c| c.iteration == 0 && c.calibration.is_none()));
    }

    #[test]
    fn test_coincident_points_are_merged() {
        let points = PointSet {
            pixels: vec![Pixel::new(1, 1), Pixel::new(1, 1), Pixel::new(1, 2)],
            weights: vec![2, 3, 1],
        };
        let clusters = assemble(&points, &[0, 0, 0], &BTreeMap::new(), 2).unwrap();

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].points, vec![Pixel::new(1, 1), Pixel::new(1, 2)]);
        assert_eq!(clusters[0].weights, vec![5, 1]);
    }

    #[test]
    fn test_small_clusters_are_dropped() {
        let points = PointSet::unweighted(vec![
            Pixel::new(0, 0),
            Pixel::new(0, 0),
            Pixel::new(4, 4),
            Pixel::new(4, 5),
        ]);
        // label 0 has two points but one distinct pixel
        let clusters = assemble(&points, &[0, 0, 1, 1], &BTreeMap::new(), 2).unwrap();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].id, 1);

        let clusters = assemble(&points, &[0, 0, 1, 1], &BTreeMap::new(), 3).unwrap();
        assert!(clusters.is_empty());
    }

    #[test]
    fn test_misaligned_labels_are_rejected() {
        let points = PointSet::unweighted(vec![Pixel::new(0, 0)]);
        let result = assemble(&points, &[0, 0], &BTreeMap::new(), 2);
        assert!(matches!(
            result,
            Err(ClusterError::LengthMismatch { points: 1, labels: 2 })
        ));
    }
}
