#[cfg(test)]
mod tests {
    use crate::{Args, build_config, read_grid, write_clusters};
    use clap::Parser;
    use snakes_cluster::{Pixel, SnakesFactory, Weighting};
    use std::fs;
    use std::path::PathBuf;

    #[test]
    fn test_main_program() {
        // Two 3x3 blocks in an 8x8 rebinned image
        let test_csv = "0,0,0,0,0,0,0,0
0,1,1,1,0,0,0,0
0,1,1,1,0,0,0,0
0,1,1,1,0,0,0,0
0,0,0,0,0,0,0,0
0,0,0,0,2,2,2,0
0,0,0,0,2,2,2,0
0,0,0,0,2,2,2,0";

        let test_file = PathBuf::from("test_grid_snakes.csv");
        fs::write(&test_file, test_csv).expect("Failed to create test CSV");

        let grid = read_grid(&test_file).expect("Failed to read CSV");
        assert_eq!(grid.shape(), (8, 8));
        assert_eq!(grid.get(5, 4), 2.0);

        let args = Args::parse_from(["snakes_cluster", "--grid", "test_grid_snakes.csv", "-n", "0.3"]);
        let mut config = build_config(&args).expect("Failed to build config");
        config.clustering = snakes_cluster::ClusteringConfig::new(1.5, 1.0);
        let reco = SnakesFactory::new(config)
            .and_then(|f| f.reconstruct(&grid, &grid))
            .expect("Reconstruction failed");

        assert_eq!(reco.clusters.len(), 2);
        assert_eq!(reco.clusters[0].points[0], Pixel::new(1, 1));
        assert_eq!(reco.clusters[1].integral(), 18);

        let mut out = Vec::new();
        write_clusters(&mut out, &reco.clusters).expect("Failed to write clusters");
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "cluster_id,polycluster,row,col,weight");
        assert_eq!(lines[1], "0,-1,1,1,1");
        assert_eq!(lines.len(), 1 + 18);
        assert_eq!(lines[18], "1,-1,7,6,2");

        // Clean up
        fs::remove_file(&test_file).ok();
    }

    #[test]
    fn test_read_grid_rejects_bad_cells() {
        let test_file = PathBuf::from("test_grid_snakes_bad.csv");
        fs::write(&test_file, "1,2\n3,x\n").expect("Failed to create test CSV");
        assert!(read_grid(&test_file).is_err());

        fs::write(&test_file, "1,2\n3\n").expect("Failed to create test CSV");
        assert!(read_grid(&test_file).is_err());

        fs::remove_file(&test_file).ok();
    }

    #[test]
    fn test_build_config_flags() {
        let args = Args::parse_from(["snakes_cluster", "-g", "x.csv", "--uniform-weights", "--no-poly"]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.weighting, Weighting::Uniform);
        assert!(!config.reclustering);
        assert!(!config.poly.enabled);
        assert_eq!(config.min_neighbors_average, 0.75);
        assert_eq!(config.clustering.eps(), crate::DEFAULT_EPS);
    }

    #[test]
    fn test_build_config_from_json() {
        let test_file = PathBuf::from("test_config_snakes.json");
        fs::write(&test_file, r#"{"dbscan_eps": 2.5, "dbscan_minsamples": 4, "metric": "chebyshev"}"#)
            .expect("Failed to create config");

        let args = Args::parse_from(["snakes_cluster", "-g", "x.csv", "-c", "test_config_snakes.json"]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.clustering.eps(), 2.5);
        assert_eq!(config.clustering.min_samples(), 4.0);

        fs::write(&test_file, r#"{"dbscan_eps": 2.5, "dbscan_minsamples": 4, "metric": "bogus"}"#)
            .expect("Failed to create config");
        assert!(build_config(&args).is_err());

        fs::remove_file(&test_file).ok();
    }
}
