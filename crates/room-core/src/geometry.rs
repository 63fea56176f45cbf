use tracing::warn;

use crate::constants::DEFAULT_DIMENSIONS;

/// Interior dimensions of a rectangular room, in metres.
///
/// Always holds three positive finite values whose volume, surface area and
/// diagonals are finite too: construction substitutes [`DEFAULT_DIMENSIONS`]
/// for the whole triple when any value is unusable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomGeometry {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl RoomGeometry {
    pub fn new(length: f64, width: f64, height: f64) -> Self {
        let candidate = Self {
            length,
            width,
            height,
        };
        if candidate.is_usable() {
            candidate
        } else {
            warn!(
                length,
                width, height, "non-physical room dimensions, substituting default geometry"
            );
            Self::default()
        }
    }

    /// Build from a loosely shaped slice; fewer than three values counts as
    /// missing geometry. Values past the third are ignored.
    pub fn from_slice(dims: &[f64]) -> Self {
        match dims {
            [l, w, h, ..] => Self::new(*l, *w, *h),
            _ => {
                warn!(supplied = dims.len(), "missing room dimensions, substituting default geometry");
                Self::default()
            }
        }
    }

    fn is_usable(&self) -> bool {
        let dims = self.as_array();
        let squares = dims.iter().map(|d| d * d).sum::<f64>();
        dims.iter().all(|d| d.is_finite() && *d > 0.0)
            && self.volume().is_finite()
            && self.volume() > 0.0
            && self.surface_area().is_finite()
            && squares.is_finite()
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.length, self.width, self.height]
    }

    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }

    pub fn surface_area(&self) -> f64 {
        2.0 * (self.length * self.width + self.length * self.height + self.width * self.height)
    }

    pub fn largest_dimension(&self) -> f64 {
        self.length.max(self.width).max(self.height)
    }

    /// Middle value of the three dimensions.
    pub fn second_largest_dimension(&self) -> f64 {
        let mut dims = self.as_array();
        dims.sort_by(|a, b| a.total_cmp(b));
        dims[1]
    }
}

impl Default for RoomGeometry {
    fn default() -> Self {
        let [length, width, height] = DEFAULT_DIMENSIONS;
        Self {
            length,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_dimensions_kept() {
        let g = RoomGeometry::new(10.47, 5.235, 5.827);
        assert_eq!(g.as_array(), [10.47, 5.235, 5.827]);
    }

    #[test]
    fn test_non_positive_dimension_substitutes_default() {
        for dims in [[0.0, 5.0, 5.0], [4.0, -1.0, 3.0], [4.0, 3.0, f64::NAN]] {
            let g = RoomGeometry::new(dims[0], dims[1], dims[2]);
            assert_eq!(g, RoomGeometry::default(), "dims {dims:?}");
        }
    }

    #[test]
    fn test_overflowing_dimensions_substitute_default() {
        for dims in [[1e200, 1e200, 1e200], [1e200, 1e-100, 1.0], [1e-200, 1e-200, 1e-200]] {
            let g = RoomGeometry::new(dims[0], dims[1], dims[2]);
            assert_eq!(g, RoomGeometry::default(), "dims {dims:?}");
        }
        // Large but representable rooms are kept.
        assert_eq!(RoomGeometry::new(1e6, 1e6, 1e6).as_array(), [1e6, 1e6, 1e6]);
    }

    #[test]
    fn test_missing_dimensions_substitute_default() {
        assert_eq!(RoomGeometry::from_slice(&[3.0, 4.0]), RoomGeometry::default());
        assert_eq!(RoomGeometry::from_slice(&[]), RoomGeometry::default());
        assert_eq!(
            RoomGeometry::from_slice(&[3.0, 4.0, 5.0, 6.0]).as_array(),
            [3.0, 4.0, 5.0]
        );
    }

    #[test]
    fn test_second_largest_dimension() {
        let g = RoomGeometry::new(46.68, 2.09, 8.68);
        assert_eq!(g.largest_dimension(), 46.68);
        assert_eq!(g.second_largest_dimension(), 8.68);
    }
}
