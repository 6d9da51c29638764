#[cfg(test)]
mod tests {
    use crate::cluster::{Distance, KDTree, Pixel, region_query};

    fn grid_pixels(n: i32) -> Vec<Pixel> {
        (0..n).flat_map(|r| (0..n).map(move |c| Pixel::new(r, c))).collect()
    }

    #[test]
    fn test_empty_tree() {
        let pixels: Vec<Pixel> = Vec::new();
        let tree = KDTree::new(&pixels, Distance::Euclidean, 4);
        assert_eq!(tree.height(), 0);
        assert!(tree.in_range(&Pixel::new(0, 0), 10.0, Vec::new()).is_empty());
    }

    #[test]
    fn test_leaf_size_bounds_height() {
        let pixels = grid_pixels(8);
        let flat = KDTree::new(&pixels, Distance::Euclidean, 64);
        assert_eq!(flat.height(), 1);

        let deep = KDTree::new(&pixels, Distance::Euclidean, 1);
        // 64 points halved down to single-point buckets
        assert_eq!(deep.height(), 7);
    }

    #[test]
    fn test_radius_is_inclusive() {
        let pixels = vec![Pixel::new(0, 0), Pixel::new(0, 2), Pixel::new(2, 2)];
        let tree = KDTree::new(&pixels, Distance::Euclidean, 1);
        let mut found = tree.in_range(&Pixel::new(0, 0), Distance::Euclidean.reduce_radius(2.0), Vec::new());
        found.sort();
        assert_eq!(found, vec![0, 1]);
    }

    #[test]
    fn test_duplicates_are_all_returned() {
        let pixels = vec![Pixel::new(3, 3); 5];
        let tree = KDTree::new(&pixels, Distance::Chebyshev, 2);
        let found = tree.in_range(&Pixel::new(3, 3), 0.0, Vec::new());
        assert_eq!(found.len(), 5);
    }

    #[test]
    fn test_negative_radius_finds_nothing() {
        let pixels = grid_pixels(3);
        let tree = KDTree::new(&pixels, Distance::Manhattan, 2);
        let reused = Vec::with_capacity(16);
        assert!(tree.in_range(&Pixel::new(1, 1), -1.0, reused).is_empty());
    }

    #[test]
    fn test_matches_region_query_on_grid() {
        let pixels = grid_pixels(10);
        for distance in [
            Distance::Euclidean,
            Distance::Manhattan,
            Distance::Chebyshev,
            Distance::Minkowski(1.5),
        ] {
            let tree = KDTree::new(&pixels, distance, 3);
            let radius = distance.reduce_radius(2.0);
            for pt in [Pixel::new(0, 0), Pixel::new(4, 5), Pixel::new(9, 9), Pixel::new(-3, 4)] {
                let mut a = tree.in_range(&pt, radius, Vec::new());
                let mut b = region_query(&pixels, &pt, radius, distance);
                a.sort();
                b.sort();
                assert_eq!(a, b, "{:?} at {:?}", distance, pt);
            }
        }
    }
}
