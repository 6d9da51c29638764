use super::point::Pixel;

/// Distance function over pixel coordinates
///
/// Comparisons are done on the *reduced* distance (no root taken), so a
/// radius has to go through [`Distance::reduce_radius`] first. For the
/// Euclidean metric this is the squared distance. Minkowski keeps the true
/// distance, scaled by the larger gap so `powf` cannot overflow for large `p`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distance {
    Euclidean,
    Manhattan,
    Chebyshev,
    /// Minkowski with a power other than 1, 2 or infinity
    Minkowski(f64),
}

impl Distance {
    /// Minkowski distance with power `p`, specialised where possible
    pub fn minkowski(p: f64) -> Distance {
        if p == 1.0 {
            Distance::Manhattan
        } else if p == 2.0 {
            Distance::Euclidean
        } else if p.is_infinite() {
            Distance::Chebyshev
        } else {
            Distance::Minkowski(p)
        }
    }

    /// Reduced distance of a per-axis gap `(dr, dc)`
    #[inline]
    fn reduced_gap(&self, dr: f64, dc: f64) -> f64 {
        match *self {
            Distance::Euclidean => dr * dr + dc * dc,
            Distance::Manhattan => dr + dc,
            Distance::Chebyshev => dr.max(dc),
            Distance::Minkowski(p) => {
                let m = dr.max(dc);
                if m == 0.0 {
                    return 0.0;
                }
                m * ((dr / m).powf(p) + (dc / m).powf(p)).powf(1.0 / p)
            }
        }
    }

    /// Reduced distance between two pixels
    #[inline]
    pub fn reduced(&self, a: &Pixel, b: &Pixel) -> f64 {
        let dr = f64::from(a.row() - b.row()).abs();
        let dc = f64::from(a.col() - b.col()).abs();
        self.reduced_gap(dr, dc)
    }

    /// Reduced distance of a gap along a single axis
    ///
    /// Never larger than the reduced distance between two points that are
    /// at least `gap` apart on that axis, which makes it a valid pruning
    /// bound for the kd-tree.
    #[inline]
    pub fn reduced_axis(&self, gap: f64) -> f64 {
        self.reduced_gap(gap.abs(), 0.0)
    }

    /// Converts a true radius to the reduced scale.
    pub fn reduce_radius(&self, r: f64) -> f64 {
        match *self {
            Distance::Euclidean => r * r,
            Distance::Manhattan | Distance::Chebyshev | Distance::Minkowski(_) => r,
        }
    }

    /// True distance between two pixels
    pub fn distance(&self, a: &Pixel, b: &Pixel) -> f64 {
        let reduced = self.reduced(a, b);
        match *self {
            Distance::Euclidean => reduced.sqrt(),
            Distance::Manhattan | Distance::Chebyshev | Distance::Minkowski(_) => reduced,
        }
    }
}
