//! Frame-tagged 2D points.
//!
//! Camera pixels and canonical court pixels are both plain `(x, y)` pairs, but
//! mixing them is always a bug. [`Point`] carries its coordinate space as a
//! zero-sized type parameter so the compiler rejects e.g. measuring a distance
//! between a raw detection and a mini-court position.

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Marker trait for coordinate spaces.
pub trait CoordinateSpace:
    fmt::Debug + Clone + Copy + PartialEq + Default + Send + Sync + 'static
{
    /// Short human-readable label used in log messages.
    const NAME: &'static str;
}

/// Raw pixel coordinates of the original video frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CameraSpace;

/// Top-down canonical court (mini court) pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CourtSpace;

impl CoordinateSpace for CameraSpace {
    const NAME: &'static str = "camera";
}

impl CoordinateSpace for CourtSpace {
    const NAME: &'static str = "court";
}

/// A 2D point in coordinate space `S`.
///
/// Serializes as a plain `[x, y]` array.
#[derive(Clone, Copy, PartialEq)]
pub struct Point<S> {
    pub x: f64,
    pub y: f64,
    space: PhantomData<S>,
}

/// Point in camera (video pixel) space.
pub type CameraPoint = Point<CameraSpace>;
/// Point in canonical court space.
pub type CourtPoint = Point<CourtSpace>;

impl<S: CoordinateSpace> Point<S> {
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            space: PhantomData,
        }
    }

    pub fn from_array(xy: [f64; 2]) -> Self {
        Self::new(xy[0], xy[1])
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }

    /// Euclidean distance to another point of the same space.
    pub fn distance_to(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(&self, other: &Self) -> Self {
        Self::new(0.5 * (self.x + other.x), 0.5 * (self.y + other.y))
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl<S: CoordinateSpace> fmt::Debug for Point<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:.3}, {:.3})", S::NAME, self.x, self.y)
    }
}

impl<S: CoordinateSpace> From<[f64; 2]> for Point<S> {
    fn from(xy: [f64; 2]) -> Self {
        Self::from_array(xy)
    }
}

impl<S: CoordinateSpace> From<Point<S>> for [f64; 2] {
    fn from(p: Point<S>) -> Self {
        p.to_array()
    }
}

impl<S: CoordinateSpace> Serialize for Point<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        self.to_array().serialize(serializer)
    }
}

impl<'de, S: CoordinateSpace> Deserialize<'de> for Point<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <[f64; 2]>::deserialize(deserializer).map(Self::from_array)
    }
}
