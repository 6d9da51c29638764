//! Immutable configuration records for the clustering stages.
//!
//! [`ClusteringConfig`] mirrors the key-value file the reconstruction used to
//! read at runtime (`dbscan_eps`, `dbscan_minsamples`, `metric`, ...), but is
//! validated once and then passed by reference into every clustering call.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::cluster::distance::Distance;
use crate::error::{ClusterError, Result};

/// Supported distance metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Metric {
    #[default]
    Euclidean,
    Manhattan,
    Chebyshev,
    Minkowski,
}

impl FromStr for Metric {
    type Err = ClusterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euclidean" | "l2" => Ok(Metric::Euclidean),
            "manhattan" | "cityblock" | "l1" => Ok(Metric::Manhattan),
            "chebyshev" | "infinity" => Ok(Metric::Chebyshev),
            "minkowski" => Ok(Metric::Minkowski),
            other => Err(ClusterError::config(format!("unsupported metric '{other}'"))),
        }
    }
}

impl TryFrom<String> for Metric {
    type Error = ClusterError;

    fn try_from(name: String) -> Result<Self> {
        name.parse()
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Euclidean => "euclidean",
            Metric::Manhattan => "manhattan",
            Metric::Chebyshev => "chebyshev",
            Metric::Minkowski => "minkowski",
        };
        f.write_str(name)
    }
}

/// Neighbour-search backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum NeighborAlgorithm {
    /// Kd-tree for anything but tiny inputs
    #[default]
    Auto,
    KdTree,
    Brute,
}

/// Below this many points `Auto` scans linearly.
pub const AUTO_BRUTE_LIMIT: usize = 32;

impl FromStr for NeighborAlgorithm {
    type Err = ClusterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(NeighborAlgorithm::Auto),
            "kd_tree" | "kdtree" => Ok(NeighborAlgorithm::KdTree),
            "brute" => Ok(NeighborAlgorithm::Brute),
            other => Err(ClusterError::config(format!(
                "unsupported neighbour algorithm '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for NeighborAlgorithm {
    type Error = ClusterError;

    fn try_from(name: String) -> Result<Self> {
        name.parse()
    }
}

impl NeighborAlgorithm {
    /// Resolves `Auto` for a point set of the given size.
    pub fn resolve(self, n_points: usize) -> NeighborAlgorithm {
        match self {
            NeighborAlgorithm::Auto if n_points <= AUTO_BRUTE_LIMIT => NeighborAlgorithm::Brute,
            NeighborAlgorithm::Auto => NeighborAlgorithm::KdTree,
            other => other,
        }
    }
}

/// How many threads the neighbour search may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parallelism {
    #[default]
    Sequential,
    AllCores,
    Threads(usize),
}

impl Parallelism {
    /// Interprets an `n_jobs` value (`None`/1 sequential, -1 all cores, n > 1 threads).
    pub fn from_n_jobs(n_jobs: Option<i32>) -> Result<Self> {
        match n_jobs {
            None | Some(1) => Ok(Parallelism::Sequential),
            Some(-1) => Ok(Parallelism::AllCores),
            Some(n) if n > 1 => Ok(Parallelism::Threads(n as usize)),
            Some(n) => Err(ClusterError::config(format!("n_jobs must be -1 or >= 1, got {n}"))),
        }
    }
}

/// Parameters of one density-clustering pass
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawClusteringConfig")]
pub struct ClusteringConfig {
    eps: f64,
    min_samples: f64,
    metric: Metric,
    metric_params: BTreeMap<String, f64>,
    algorithm: NeighborAlgorithm,
    leaf_size: usize,
    p: f64,
    parallelism: Parallelism,
}

/// Leaf size used when the configuration does not name one
pub const DEFAULT_LEAF_SIZE: usize = 30;

impl ClusteringConfig {
    /// Euclidean metric, automatic backend, sequential search.
    pub fn new(eps: f64, min_samples: f64) -> Self {
        Self {
            eps,
            min_samples,
            metric: Metric::Euclidean,
            metric_params: BTreeMap::new(),
            algorithm: NeighborAlgorithm::Auto,
            leaf_size: DEFAULT_LEAF_SIZE,
            p: 2.0,
            parallelism: Parallelism::Sequential,
        }
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_metric_params(mut self, params: BTreeMap<String, f64>) -> Self {
        self.metric_params = params;
        self
    }

    pub fn with_algorithm(mut self, algorithm: NeighborAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_leaf_size(mut self, leaf_size: usize) -> Self {
        self.leaf_size = leaf_size;
        self
    }

    /// Minkowski power
    pub fn with_p(mut self, p: f64) -> Self {
        self.p = p;
        self
    }

    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Thread budget in the `n_jobs` convention, see [`Parallelism::from_n_jobs`].
    pub fn with_n_jobs(self, n_jobs: i32) -> Result<Self> {
        Ok(self.with_parallelism(Parallelism::from_n_jobs(Some(n_jobs))?))
    }

    /// Parses the JSON form of the configuration and validates it.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: RawClusteringConfig =
            serde_json::from_str(text).map_err(|e| ClusterError::config(e.to_string()))?;
        ClusteringConfig::try_from(raw)
    }

    /// Checks every value; nothing is defaulted silently.
    pub fn validate(&self) -> Result<()> {
        if !self.eps.is_finite() || self.eps <= 0.0 {
            return Err(ClusterError::config(format!("eps must be > 0, got {}", self.eps)));
        }
        if !self.min_samples.is_finite() || self.min_samples <= 0.0 {
            return Err(ClusterError::config(format!(
                "min_samples must be > 0, got {}",
                self.min_samples
            )));
        }
        if self.leaf_size == 0 {
            return Err(ClusterError::config("leaf_size must be >= 1"));
        }
        if let Some(key) = self.metric_params.keys().find(|k| k.as_str() != "p") {
            return Err(ClusterError::config(format!("unsupported metric parameter '{key}'")));
        }
        if self.metric == Metric::Minkowski {
            let p = self.minkowski_p();
            if p.is_nan() || p < 1.0 {
                return Err(ClusterError::config(format!("minkowski p must be >= 1, got {p}")));
            }
        }
        if let Parallelism::Threads(0) = self.parallelism {
            return Err(ClusterError::config("thread count must be >= 1"));
        }
        Ok(())
    }

    pub fn eps(&self) -> f64 {
        self.eps
    }

    pub fn min_samples(&self) -> f64 {
        self.min_samples
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn algorithm(&self) -> NeighborAlgorithm {
        self.algorithm
    }

    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }

    pub fn parallelism(&self) -> Parallelism {
        self.parallelism
    }

    /// Effective Minkowski power: `metric_params["p"]` wins over `p`.
    pub fn minkowski_p(&self) -> f64 {
        self.metric_params.get("p").copied().unwrap_or(self.p)
    }

    /// Distance function selected by the metric and its parameters
    pub fn distance(&self) -> Distance {
        match self.metric {
            Metric::Euclidean => Distance::Euclidean,
            Metric::Manhattan => Distance::Manhattan,
            Metric::Chebyshev => Distance::Chebyshev,
            Metric::Minkowski => Distance::minkowski(self.minkowski_p()),
        }
    }
}

/// Wire form of [`ClusteringConfig`], keyed like the reconstruction's config file
#[derive(Debug, Deserialize)]
struct RawClusteringConfig {
    dbscan_eps: f64,
    dbscan_minsamples: f64,
    #[serde(default)]
    metric: Metric,
    #[serde(default)]
    metric_params: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    algorithm: NeighborAlgorithm,
    #[serde(default = "default_leaf_size")]
    leaf_size: usize,
    #[serde(default)]
    p: Option<f64>,
    #[serde(default)]
    n_jobs: Option<i32>,
}

fn default_leaf_size() -> usize {
    DEFAULT_LEAF_SIZE
}

impl TryFrom<RawClusteringConfig> for ClusteringConfig {
    type Error = ClusterError;

    fn try_from(raw: RawClusteringConfig) -> Result<Self> {
        let config = ClusteringConfig::new(raw.dbscan_eps, raw.dbscan_minsamples)
            .with_metric(raw.metric)
            .with_metric_params(raw.metric_params.unwrap_or_default())
            .with_algorithm(raw.algorithm)
            .with_leaf_size(raw.leaf_size)
            .with_p(raw.p.unwrap_or(2.0))
            .with_parallelism(Parallelism::from_n_jobs(raw.n_jobs)?);
        config.validate()?;
        Ok(config)
    }
}

/// Rule that marks points of compound ("polynomial") clusters
///
/// A point is dense when it is core and its weighted density reaches
/// `density_factor * min_samples`. Dense points of one cluster split into
/// eps-connected lobes; a cluster with at least `min_lobes` lobes of weight
/// `max(min_lobe_weight, min_samples)` or more has those lobes flagged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolyCriterion {
    pub enabled: bool,
    pub density_factor: f64,
    pub min_lobes: usize,
    pub min_lobe_weight: f64,
}

impl Default for PolyCriterion {
    fn default() -> Self {
        Self {
            enabled: true,
            density_factor: 2.0,
            min_lobes: 2,
            min_lobe_weight: 0.0,
        }
    }
}

impl PolyCriterion {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.density_factor.is_finite() || self.density_factor < 1.0 {
            return Err(ClusterError::config(format!(
                "poly density_factor must be >= 1, got {}",
                self.density_factor
            )));
        }
        if self.min_lobes < 2 {
            return Err(ClusterError::config("poly min_lobes must be >= 2"));
        }
        if self.min_lobe_weight.is_nan() || self.min_lobe_weight < 0.0 {
            return Err(ClusterError::config("poly min_lobe_weight must be >= 0"));
        }
        Ok(())
    }
}

/// Source of the per-point sample weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Weighting {
    /// Weight from the intensity image ("3D" mode)
    #[default]
    Intensity,
    /// Every point weighs 1
    Uniform,
}

/// Everything needed to reconstruct clusters from one image
#[derive(Debug, Clone, PartialEq)]
pub struct RecoConfig {
    pub clustering: ClusteringConfig,
    /// Configuration of the reclustering pass; `None` reuses `clustering`
    pub poly_clustering: Option<ClusteringConfig>,
    pub poly: PolyCriterion,
    pub min_neighbors_average: f64,
    pub weighting: Weighting,
    pub min_cluster_size: usize,
    /// Re-split flagged points into fragments
    pub reclustering: bool,
}

impl RecoConfig {
    pub fn new(clustering: ClusteringConfig) -> Self {
        Self {
            clustering,
            poly_clustering: None,
            poly: PolyCriterion::default(),
            min_neighbors_average: 0.75,
            weighting: Weighting::Intensity,
            min_cluster_size: 2,
            reclustering: true,
        }
    }

    pub fn poly_clustering(&self) -> &ClusteringConfig {
        self.poly_clustering.as_ref().unwrap_or(&self.clustering)
    }

    pub fn validate(&self) -> Result<()> {
        self.clustering.validate()?;
        if let Some(poly) = &self.poly_clustering {
            poly.validate()?;
        }
        self.poly.validate()?;
        if !self.min_neighbors_average.is_finite() {
            return Err(ClusterError::config("min_neighbors_average must be finite"));
        }
        if self.min_cluster_size == 0 {
            return Err(ClusterError::config("min_cluster_size must be >= 1"));
        }
        Ok(())
    }
}
