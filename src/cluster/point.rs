//! Pixel coordinates, weighted point sets and reconstructed clusters.

/// Pixel coordinate on the rebinned grid
///
/// The pixel is stored as [row, col] where:
/// - `[0]` is the row
/// - `[1]` is the column
///
/// Ordering is lexicographic on (row, col).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pixel(pub [i32; 2]);

impl Pixel {
    pub fn new(row: i32, col: i32) -> Self {
        Pixel([row, col])
    }

    #[inline]
    pub fn row(&self) -> i32 {
        self.0[0]
    }

    #[inline]
    pub fn col(&self) -> i32 {
        self.0[1]
    }
}

/// Point cloud handed to the clusterer: pixels plus their sample weights
///
/// `weights[i]` belongs to `pixels[i]`; every weight is at least 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    pub pixels: Vec<Pixel>,
    pub weights: Vec<u32>,
}

impl PointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points with unit weight
    pub fn unweighted(pixels: Vec<Pixel>) -> Self {
        let weights = vec![1; pixels.len()];
        Self { pixels, weights }
    }

    /// Adds a point, clamping a zero weight to 1.
    pub fn push(&mut self, pixel: Pixel, weight: u32) {
        self.pixels.push(pixel);
        self.weights.push(weight.max(1));
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Copies the points at `indices`, in that order.
    pub fn subset(&self, indices: &[usize]) -> PointSet {
        PointSet {
            pixels: indices.iter().map(|&i| self.pixels[i]).collect(),
            weights: indices.iter().map(|&i| self.weights[i]).collect(),
        }
    }
}

/// Energy attributes attached by downstream calibration
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Calibration {
    pub calibrated_energy: f64,
    pub nslices: usize,
    pub energy_profile: Vec<f64>,
    pub centers: Vec<[f64; 2]>,
    pub pathlength: f64,
}

/// Polycluster pointer of a cluster found by the primary pass
pub const NOT_A_FRAGMENT: i32 = -1;

/// Cluster ("snake") produced by one reconstruction
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Final label
    pub id: i32,
    /// Reconstruction iteration; always 0 for density clustering
    pub iteration: u32,
    /// Primary cluster this fragment was carved out of, or -1
    pub polycluster_pointer: i32,
    /// Unique member pixels, sorted
    pub points: Vec<Pixel>,
    /// Summed sample weight of each member pixel
    pub weights: Vec<u32>,
    pub calibration: Option<Calibration>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_fragment(&self) -> bool {
        self.polycluster_pointer != NOT_A_FRAGMENT
    }

    /// Total sample weight
    pub fn integral(&self) -> u64 {
        self.weights.iter().map(|&w| u64::from(w)).sum()
    }

    /// Attaches calibration output; membership is not affected.
    pub fn attach_calibration(&mut self, calibration: Calibration) {
        self.calibration = Some(calibration);
    }

    /// Calculates center and cluster bounds
    ///
    /// Returns `(center, min, max)` where:
    /// - `center` is the unweighted centroid as `[row, col]`
    /// - `min` is the smallest (row, col) corner
    /// - `max` is the largest (row, col) corner
    ///
    /// Returns `None` for an empty cluster.
    pub fn centroid_and_bounds(&self) -> Option<([f64; 2], Pixel, Pixel)> {
        if self.points.is_empty() {
            return None;
        }

        let mut min = Pixel([i32::MAX, i32::MAX]);
        let mut max = Pixel([i32::MIN, i32::MIN]);
        let mut center = [0.0; 2];

        for pt in &self.points {
            for j in 0..2 {
                center[j] += f64::from(pt.0[j]);
                min.0[j] = min.0[j].min(pt.0[j]);
                max.0[j] = max.0[j].max(pt.0[j]);
            }
        }

        for c in &mut center {
            *c /= self.points.len() as f64;
        }

        Some((center, min, max))
    }
}

