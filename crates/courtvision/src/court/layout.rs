//! Canonical top-down court layout.
//!
//! The layout is derived once from a drawing region and never mutated. All
//! 14 keypoints are exact affine combinations of the padded region bounds and
//! real-world distances scaled by `pixels_per_meter = court_width_px /
//! double_line_width`.

use std::ops::Index;

use crate::geometry::CourtPoint;
use crate::units;

use super::dimensions::CourtDimensions;

/// Number of canonical court keypoints.
pub const N_KEYPOINTS: usize = 14;

/// Semantic index of a canonical court keypoint.
///
/// Discriminants match the keypoint detector's index convention.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum CourtKeypoint {
    NearLeftCorner = 0,
    NearRightCorner = 1,
    FarLeftCorner = 2,
    FarRightCorner = 3,
    NearLeftSingles = 4,
    FarLeftSingles = 5,
    NearRightSingles = 6,
    FarRightSingles = 7,
    NearServiceLeft = 8,
    NearServiceRight = 9,
    FarServiceLeft = 10,
    FarServiceRight = 11,
    NearServiceCenter = 12,
    FarServiceCenter = 13,
}

impl CourtKeypoint {
    pub const ALL: [Self; N_KEYPOINTS] = [
        Self::NearLeftCorner,
        Self::NearRightCorner,
        Self::FarLeftCorner,
        Self::FarRightCorner,
        Self::NearLeftSingles,
        Self::FarLeftSingles,
        Self::NearRightSingles,
        Self::FarRightSingles,
        Self::NearServiceLeft,
        Self::NearServiceRight,
        Self::FarServiceLeft,
        Self::FarServiceRight,
        Self::NearServiceCenter,
        Self::FarServiceCenter,
    ];

    /// Outer doubles corners in homography order: top-left, top-right,
    /// bottom-right, bottom-left.
    pub const CORNER_QUAD: [Self; 4] = [
        Self::NearLeftCorner,
        Self::NearRightCorner,
        Self::FarRightCorner,
        Self::FarLeftCorner,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// The 14 canonical keypoints, addressed by [`CourtKeypoint`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct CourtKeypoints {
    points: [CourtPoint; N_KEYPOINTS],
}

impl CourtKeypoints {
    pub fn new(points: [CourtPoint; N_KEYPOINTS]) -> Self {
        Self { points }
    }

    pub fn get(&self, kp: CourtKeypoint) -> CourtPoint {
        self.points[kp.index()]
    }

    /// Iterate keypoints in index order.
    pub fn iter(&self) -> impl Iterator<Item = (CourtKeypoint, CourtPoint)> + '_ {
        CourtKeypoint::ALL.iter().map(|&kp| (kp, self.get(kp)))
    }

    pub fn as_slice(&self) -> &[CourtPoint] {
        &self.points
    }

    /// Flat `[x0, y0, x1, y1, ...]` form (28 values).
    pub fn to_flat(&self) -> [f64; 2 * N_KEYPOINTS] {
        let mut flat = [0.0; 2 * N_KEYPOINTS];
        for (i, p) in self.points.iter().enumerate() {
            flat[2 * i] = p.x;
            flat[2 * i + 1] = p.y;
        }
        flat
    }
}

impl Index<CourtKeypoint> for CourtKeypoints {
    type Output = CourtPoint;

    fn index(&self, kp: CourtKeypoint) -> &CourtPoint {
        &self.points[kp.index()]
    }
}

/// Fixed connectivity of drawn court lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourtLines {
    segments: [(CourtKeypoint, CourtKeypoint); 8],
}

impl CourtLines {
    pub const fn standard() -> Self {
        use CourtKeypoint::*;
        Self {
            segments: [
                (NearLeftCorner, FarLeftCorner),
                (NearLeftSingles, FarLeftSingles),
                (NearRightSingles, FarRightSingles),
                (NearRightCorner, FarRightCorner),
                (NearLeftCorner, NearRightCorner),
                (NearServiceLeft, NearServiceRight),
                (FarServiceLeft, FarServiceRight),
                (FarLeftCorner, FarRightCorner),
            ],
        }
    }

    pub fn segments(&self) -> &[(CourtKeypoint, CourtKeypoint)] {
        &self.segments
    }

    /// Segments as raw keypoint index pairs.
    pub fn index_pairs(&self) -> [[usize; 2]; 8] {
        self.segments.map(|(a, b)| [a.index(), b.index()])
    }
}

impl Default for CourtLines {
    fn default() -> Self {
        Self::standard()
    }
}

/// Top-down doubles court placed inside a padded drawing region.
#[derive(Debug, Clone, PartialEq)]
pub struct CourtLayout {
    start: CourtPoint,
    end: CourtPoint,
    pixels_per_meter: f64,
    dimensions: CourtDimensions,
    keypoints: CourtKeypoints,
}

impl CourtLayout {
    /// Derive the layout for the region at `top_left` with `size = [width, height]`.
    ///
    /// Precondition: `size` exceeds `2 * padding_px` in both directions.
    /// Violations are not checked; the resulting keypoints are computed anyway
    /// but are geometrically meaningless.
    pub fn derive(
        top_left: CourtPoint,
        size: [f64; 2],
        padding_px: f64,
        dimensions: &CourtDimensions,
    ) -> Self {
        let start = CourtPoint::new(top_left.x + padding_px, top_left.y + padding_px);
        let end = CourtPoint::new(
            top_left.x + size[0] - padding_px,
            top_left.y + size[1] - padding_px,
        );
        let court_width = end.x - start.x;
        let pixels_per_meter = court_width / dimensions.double_line_width;
        let m = |meters: f64| meters * pixels_per_meter;

        let p0 = start;
        let p1 = CourtPoint::new(end.x, start.y);
        let p2 = CourtPoint::new(start.x, start.y + m(dimensions.court_length()));
        let p3 = CourtPoint::new(p0.x + court_width, p2.y);

        let alley = m(dimensions.double_alley_difference);
        let p4 = CourtPoint::new(p0.x + alley, p0.y);
        let p5 = CourtPoint::new(p2.x + alley, p2.y);
        let p6 = CourtPoint::new(p1.x - alley, p1.y);
        let p7 = CourtPoint::new(p3.x - alley, p3.y);

        let service_depth = m(dimensions.no_mans_land_height);
        let singles = m(dimensions.single_line_width);
        let p8 = CourtPoint::new(p4.x, p4.y + service_depth);
        let p9 = CourtPoint::new(p8.x + singles, p8.y);
        let p10 = CourtPoint::new(p5.x, p5.y - service_depth);
        let p11 = CourtPoint::new(p10.x + singles, p10.y);

        let p12 = p8.midpoint(&p9);
        let p13 = p10.midpoint(&p11);

        Self {
            start,
            end,
            pixels_per_meter,
            dimensions: *dimensions,
            keypoints: CourtKeypoints::new([
                p0, p1, p2, p3, p4, p5, p6, p7, p8, p9, p10, p11, p12, p13,
            ]),
        }
    }

    pub fn keypoints(&self) -> &CourtKeypoints {
        &self.keypoints
    }

    pub fn keypoint(&self, kp: CourtKeypoint) -> CourtPoint {
        self.keypoints.get(kp)
    }

    pub fn lines(&self) -> CourtLines {
        CourtLines::standard()
    }

    pub fn dimensions(&self) -> &CourtDimensions {
        &self.dimensions
    }

    /// Padded court origin (top-left of the doubles outline).
    pub fn court_start(&self) -> CourtPoint {
        self.start
    }

    /// Padded region end. Its `y` bounds the drawing area, not the far baseline.
    pub fn court_end(&self) -> CourtPoint {
        self.end
    }

    /// Doubles court width in canonical pixels.
    pub fn court_width_px(&self) -> f64 {
        self.end.x - self.start.x
    }

    pub fn pixels_per_meter(&self) -> f64 {
        self.pixels_per_meter
    }

    pub fn meters_to_pixels(&self, meters: f64) -> f64 {
        units::meters_to_pixels(
            meters,
            self.dimensions.double_line_width,
            self.court_width_px(),
        )
    }

    pub fn pixels_to_meters(&self, pixels: f64) -> f64 {
        units::pixels_to_meters(
            pixels,
            self.dimensions.double_line_width,
            self.court_width_px(),
        )
    }

    /// Net line across the doubles width, halfway between the baselines.
    pub fn net_segment(&self) -> (CourtPoint, CourtPoint) {
        let near = self.keypoint(CourtKeypoint::NearLeftCorner);
        let far = self.keypoint(CourtKeypoint::FarLeftCorner);
        let y = 0.5 * (near.y + far.y);
        (
            CourtPoint::new(near.x, y),
            CourtPoint::new(self.keypoint(CourtKeypoint::NearRightCorner).x, y),
        )
    }

    /// Doubles corners ordered top-left, top-right, bottom-right, bottom-left.
    pub fn corner_quad(&self) -> [CourtPoint; 4] {
        CourtKeypoint::CORNER_QUAD.map(|kp| self.keypoint(kp))
    }
}

/// Derive the 14 canonical keypoints for a drawing region.
pub fn derive_keypoints(
    top_left: CourtPoint,
    size: [f64; 2],
    padding_px: f64,
    dimensions: &CourtDimensions,
) -> CourtKeypoints {
    CourtLayout::derive(top_left, size, padding_px, dimensions).keypoints
}

/// The fixed 8-segment line connectivity.
pub fn derive_line_segments() -> CourtLines {
    CourtLines::standard()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn layout() -> CourtLayout {
        // 250x500 region at (1620, 50) with 20px padding, the default mini court.
        CourtLayout::derive(
            CourtPoint::new(1620.0, 50.0),
            [250.0, 500.0],
            20.0,
            &CourtDimensions::default(),
        )
    }

    #[test]
    fn width_and_scale_follow_padding() {
        let l = layout();
        assert_abs_diff_eq!(l.court_width_px(), 210.0);
        assert_abs_diff_eq!(l.pixels_per_meter(), 210.0 / 10.97, epsilon = 1e-12);
        assert_abs_diff_eq!(l.meters_to_pixels(10.97), 210.0, epsilon = 1e-9);
        assert_abs_diff_eq!(l.pixels_to_meters(210.0), 10.97, epsilon = 1e-12);
    }

    #[test]
    fn outer_corners_form_a_rectangle() {
        let l = layout();
        let k = l.keypoints();
        let length_px = 23.76 * 210.0 / 10.97;

        assert_abs_diff_eq!(k[CourtKeypoint::NearLeftCorner].x, 1640.0);
        assert_abs_diff_eq!(k[CourtKeypoint::NearLeftCorner].y, 70.0);
        assert_abs_diff_eq!(k[CourtKeypoint::NearRightCorner].x, 1850.0);
        assert_abs_diff_eq!(k[CourtKeypoint::NearRightCorner].y, 70.0);
        assert_abs_diff_eq!(k[CourtKeypoint::FarLeftCorner].x, 1640.0);
        assert_abs_diff_eq!(k[CourtKeypoint::FarLeftCorner].y, 70.0 + length_px, epsilon = 1e-9);
        assert_abs_diff_eq!(k[CourtKeypoint::FarRightCorner].x, 1850.0);
        assert_abs_diff_eq!(
            k[CourtKeypoint::FarRightCorner].y,
            k[CourtKeypoint::FarLeftCorner].y
        );
    }

    #[test]
    fn singles_and_service_lines_are_inset() {
        let l = layout();
        let k = l.keypoints();
        let m = |v: f64| v * 210.0 / 10.97;

        assert_abs_diff_eq!(k[CourtKeypoint::NearLeftSingles].x, 1640.0 + m(1.37), epsilon = 1e-9);
        assert_abs_diff_eq!(k[CourtKeypoint::NearRightSingles].x, 1850.0 - m(1.37), epsilon = 1e-9);
        assert_abs_diff_eq!(
            k[CourtKeypoint::FarRightSingles].x,
            k[CourtKeypoint::NearRightSingles].x,
            epsilon = 1e-9
        );

        assert_abs_diff_eq!(k[CourtKeypoint::NearServiceLeft].y, 70.0 + m(5.48), epsilon = 1e-9);
        assert_abs_diff_eq!(
            k[CourtKeypoint::NearServiceRight].x - k[CourtKeypoint::NearServiceLeft].x,
            m(8.23),
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            k[CourtKeypoint::FarServiceLeft].y,
            k[CourtKeypoint::FarLeftCorner].y - m(5.48),
            epsilon = 1e-9
        );

        let mid = k[CourtKeypoint::NearServiceCenter];
        assert_abs_diff_eq!(
            mid.x,
            0.5 * (k[CourtKeypoint::NearServiceLeft].x + k[CourtKeypoint::NearServiceRight].x)
        );
        assert_abs_diff_eq!(
            k[CourtKeypoint::FarServiceCenter].y,
            k[CourtKeypoint::FarServiceLeft].y
        );
    }

    #[test]
    fn keypoint_indices_are_stable() {
        for (i, kp) in CourtKeypoint::ALL.iter().enumerate() {
            assert_eq!(kp.index(), i);
            assert_eq!(CourtKeypoint::from_index(i), Some(*kp));
        }
        assert_eq!(CourtKeypoint::from_index(N_KEYPOINTS), None);

        let l = layout();
        let flat = l.keypoints().to_flat();
        assert_eq!(flat[2 * 9], l.keypoint(CourtKeypoint::NearServiceRight).x);
        assert_eq!(flat[2 * 9 + 1], l.keypoint(CourtKeypoint::NearServiceRight).y);
    }

    #[test]
    fn line_connectivity_is_fixed() {
        let lines = derive_line_segments();
        assert_eq!(
            lines.index_pairs(),
            [[0, 2], [4, 5], [6, 7], [1, 3], [0, 1], [8, 9], [10, 11], [2, 3]]
        );
        assert_eq!(layout().lines(), lines);
    }

    #[test]
    fn net_is_halfway_between_baselines() {
        let l = layout();
        let (a, b) = l.net_segment();
        let near_y = l.keypoint(CourtKeypoint::NearLeftCorner).y;
        let far_y = l.keypoint(CourtKeypoint::FarLeftCorner).y;
        assert_abs_diff_eq!(a.y, 0.5 * (near_y + far_y));
        assert_abs_diff_eq!(a.y, b.y);
        assert_abs_diff_eq!(b.x - a.x, l.court_width_px());
    }

    #[test]
    fn corner_quad_is_clockwise_order() {
        let q = layout().corner_quad();
        assert!(q[0].x < q[1].x && q[0].y == q[1].y);
        assert!(q[2].x == q[1].x && q[2].y > q[1].y);
        assert!(q[3].x == q[0].x && q[3].y == q[2].y);
    }

    #[test]
    fn free_function_matches_layout() {
        let dims = CourtDimensions::default();
        let k = derive_keypoints(CourtPoint::new(0.0, 0.0), [250.0, 500.0], 20.0, &dims);
        let l = CourtLayout::derive(CourtPoint::new(0.0, 0.0), [250.0, 500.0], 20.0, &dims);
        assert_eq!(&k, l.keypoints());
    }
}
