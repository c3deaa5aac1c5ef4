//! Distance and speed unit conversions.

use crate::geometry::{CoordinateSpace, Point};

/// Meters per second → kilometres per hour.
pub const MPS_TO_KMH: f64 = 3.6;

/// Euclidean distance between two points of the same coordinate space.
pub fn measure_distance<S: CoordinateSpace>(a: &Point<S>, b: &Point<S>) -> f64 {
    a.distance_to(b)
}

/// Convert a pixel distance to meters given a reference length known in both units.
pub fn pixels_to_meters(pixels: f64, reference_meters: f64, reference_pixels: f64) -> f64 {
    pixels * reference_meters / reference_pixels
}

/// Convert meters to a pixel distance given a reference length known in both units.
pub fn meters_to_pixels(meters: f64, reference_meters: f64, reference_pixels: f64) -> f64 {
    meters * reference_pixels / reference_meters
}

/// Average speed in km/h for `meters` covered in `seconds`.
pub fn speed_kmh(meters: f64, seconds: f64) -> f64 {
    meters / seconds * MPS_TO_KMH
}

/// Constant canonical-pixel → meter scale for one analysis run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelScale {
    meters_per_pixel: f64,
}

impl PixelScale {
    /// Build the scale from a reference length (e.g. the doubles court width).
    ///
    /// Returns `None` when either length is non-finite or not strictly positive.
    pub fn from_reference(reference_meters: f64, reference_pixels: f64) -> Option<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(reference_meters) || !valid(reference_pixels) {
            return None;
        }
        Some(Self {
            meters_per_pixel: reference_meters / reference_pixels,
        })
    }

    pub fn meters_per_pixel(self) -> f64 {
        self.meters_per_pixel
    }

    pub fn to_meters(self, pixels: f64) -> f64 {
        pixels * self.meters_per_pixel
    }

    pub fn to_pixels(self, meters: f64) -> f64 {
        meters / self.meters_per_pixel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn conversions_are_inverse() {
        let px = meters_to_pixels(5.48, 10.97, 210.0);
        assert_relative_eq!(pixels_to_meters(px, 10.97, 210.0), 5.48, epsilon = 1e-12);
    }

    #[test]
    fn scale_rejects_degenerate_reference() {
        assert!(PixelScale::from_reference(10.97, 0.0).is_none());
        assert!(PixelScale::from_reference(0.0, 100.0).is_none());
        assert!(PixelScale::from_reference(f64::NAN, 100.0).is_none());
        let s = PixelScale::from_reference(10.97, 219.4).unwrap();
        assert_relative_eq!(s.to_meters(219.4), 10.97, epsilon = 1e-12);
        assert_relative_eq!(s.to_pixels(10.97), 219.4, epsilon = 1e-9);
    }

    #[test]
    fn one_court_width_per_second() {
        assert_relative_eq!(speed_kmh(10.97, 1.0), 39.492, epsilon = 1e-9);
    }
}
