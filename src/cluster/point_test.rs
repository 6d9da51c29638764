#[cfg(test)]
mod tests {
    use super::super::*;

    fn cluster(points: Vec<Pixel>, weights: Vec<u32>) -> Cluster {
        Cluster {
            id: 0,
            iteration: 0,
            polycluster_pointer: NOT_A_FRAGMENT,
            points,
            weights,
            calibration: None,
        }
    }

    #[test]
    fn test_centroid_and_bounds() {
        let c1 = cluster(
            vec![Pixel::new(2, 3), Pixel::new(4, 1), Pixel::new(3, 8)],
            vec![1, 1, 1],
        );

        let (center, min, max) = c1.centroid_and_bounds().unwrap();
        assert_eq!(center, [3.0, 4.0]);
        assert_eq!(min, Pixel::new(2, 1));
        assert_eq!(max, Pixel::new(4, 8));
    }

    #[test]
    fn test_empty_cluster_has_no_centroid() {
        assert!(cluster(Vec::new(), Vec::new()).centroid_and_bounds().is_none());
    }

    #[test]
    fn test_integral_and_fragment() {
        let mut c = cluster(vec![Pixel::new(0, 0), Pixel::new(0, 1)], vec![7, u32::MAX]);
        assert_eq!(c.integral(), 7 + u64::from(u32::MAX));
        assert!(!c.is_fragment());
        c.polycluster_pointer = 3;
        assert!(c.is_fragment());
    }

    #[test]
    fn test_calibration_keeps_membership() {
        let mut c = cluster(vec![Pixel::new(0, 0), Pixel::new(0, 1)], vec![1, 2]);
        let before = c.points.clone();
        c.attach_calibration(Calibration {
            calibrated_energy: 5.9,
            nslices: 2,
            energy_profile: vec![2.0, 3.9],
            centers: vec![[0.0, 0.0], [0.0, 1.0]],
            pathlength: 1.0,
        });
        assert_eq!(c.points, before);
        assert_eq!(c.calibration.as_ref().map(|cal| cal.nslices), Some(2));
    }

    #[test]
    fn test_point_set_clamps_zero_weight() {
        let mut set = PointSet::new();
        set.push(Pixel::new(1, 1), 0);
        set.push(Pixel::new(1, 2), 4);
        assert_eq!(set.weights, vec![1, 4]);

        let sub = set.subset(&[1]);
        assert_eq!(sub.pixels, vec![Pixel::new(1, 2)]);
        assert_eq!(sub.weights, vec![4]);
    }

    #[test]
    fn test_pixel_order_is_row_major() {
        let mut pixels = vec![Pixel::new(1, 0), Pixel::new(0, 5), Pixel::new(0, 1)];
        pixels.sort();
        assert_eq!(pixels, vec![Pixel::new(0, 1), Pixel::new(0, 5), Pixel::new(1, 0)]);
    }
}
