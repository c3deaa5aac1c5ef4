//! Camera → canonical court mapping.

use nalgebra::Matrix3;

use crate::court::{CourtKeypoint, CourtLayout, N_KEYPOINTS};
use crate::geometry::{CameraPoint, CourtPoint};

use super::core::{
    estimate_homography_dlt, fit_homography_ransac, project_clamped, reprojection_error,
    try_project, HomographyError, RansacHomographyConfig,
};
use super::quad::check_convex_quad;

/// Which detected keypoints feed the homography solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HomographyMode {
    /// Exact 4-point solve on the outer doubles corners.
    #[default]
    Corners,
    /// RANSAC + least-squares refit over all 14 keypoint correspondences.
    AllKeypoints,
}

/// Homography estimation settings.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HomographyConfig {
    pub mode: HomographyMode,
    /// Used only in [`HomographyMode::AllKeypoints`]. Threshold is in canonical pixels.
    pub ransac: RansacHomographyConfig,
}

/// Court keypoints located by the keypoint detector on the reference frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedKeypoints {
    points: [CameraPoint; N_KEYPOINTS],
}

impl DetectedKeypoints {
    pub fn new(points: [CameraPoint; N_KEYPOINTS]) -> Self {
        Self { points }
    }

    /// Build from the detector's flat `[x0, y0, ..., x13, y13]` output.
    pub fn from_flat(values: &[f64]) -> Result<Self, HomographyError> {
        let needed = 2 * N_KEYPOINTS;
        if values.len() < needed {
            return Err(HomographyError::TooFewPoints {
                needed,
                got: values.len(),
            });
        }
        if values.len() > needed {
            return Err(HomographyError::DegenerateGeometry(format!(
                "expected {} keypoint coordinates, got {}",
                needed,
                values.len()
            )));
        }
        let points =
            std::array::from_fn(|i| CameraPoint::new(values[2 * i], values[2 * i + 1]));
        Ok(Self { points })
    }

    pub fn get(&self, kp: CourtKeypoint) -> CameraPoint {
        self.points[kp.index()]
    }

    /// Inverse of [`Self::from_flat`].
    pub fn to_flat(&self) -> [f64; 2 * N_KEYPOINTS] {
        std::array::from_fn(|i| {
            let p = self.points[i / 2];
            if i % 2 == 0 {
                p.x
            } else {
                p.y
            }
        })
    }

    /// Outer doubles corners ordered top-left, top-right, bottom-right, bottom-left.
    pub fn corner_quad(&self) -> [CameraPoint; 4] {
        CourtKeypoint::CORNER_QUAD.map(|kp| self.get(kp))
    }
}

/// Projective map from camera pixels to canonical court pixels.
///
/// Computed once per video (static camera) and immutable afterwards; share it
/// freely across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct CourtHomography {
    h: Matrix3<f64>,
    h_inv: Matrix3<f64>,
}

impl CourtHomography {
    /// Exact 4-point solve.
    ///
    /// Both quads must be ordered top-left, top-right, bottom-right,
    /// bottom-left. Collinear or coincident corners, non-convex quads and
    /// quads with opposite winding are rejected with
    /// [`HomographyError::DegenerateGeometry`].
    pub fn from_corners(
        src: &[CameraPoint; 4],
        dst: &[CourtPoint; 4],
    ) -> Result<Self, HomographyError> {
        let src_xy = src.map(CameraPoint::to_array);
        let dst_xy = dst.map(CourtPoint::to_array);

        let src_winding = check_convex_quad(&src_xy, "camera")?;
        let dst_winding = check_convex_quad(&dst_xy, "court")?;
        if src_winding != dst_winding {
            return Err(HomographyError::DegenerateGeometry(format!(
                "camera corners are {:?} but court corners are {:?}",
                src_winding, dst_winding
            )));
        }

        Self::from_matrix(estimate_homography_dlt(&src_xy, &dst_xy)?)
    }

    /// Build from the detector keypoints and the canonical layout.
    pub fn from_detected_keypoints(
        detected: &DetectedKeypoints,
        layout: &CourtLayout,
        config: &HomographyConfig,
    ) -> Result<Self, HomographyError> {
        match config.mode {
            HomographyMode::Corners => {
                Self::from_corners(&detected.corner_quad(), &layout.corner_quad())
            }
            HomographyMode::AllKeypoints => {
                let src: Vec<[f64; 2]> = detected.points.iter().map(|p| p.to_array()).collect();
                let dst: Vec<[f64; 2]> = layout
                    .keypoints()
                    .as_slice()
                    .iter()
                    .map(|p| p.to_array())
                    .collect();
                let result = fit_homography_ransac(&src, &dst, &config.ransac)?;
                let mean_err = mean_finite(
                    result
                        .errors
                        .iter()
                        .zip(&result.inlier_mask)
                        .filter(|&(_, &m)| m)
                        .map(|(&e, _)| e),
                );
                tracing::info!(
                    "Court homography: {}/{} keypoint inliers, mean_err={:.2}px",
                    result.n_inliers,
                    src.len(),
                    mean_err,
                );
                if result.n_inliers < src.len() {
                    let rejected: Vec<usize> = (0..src.len())
                        .filter(|&i| !result.inlier_mask[i])
                        .collect();
                    tracing::warn!("Court keypoints rejected as outliers: {:?}", rejected);
                }
                Self::from_matrix(result.h)
            }
        }
    }

    /// Wrap a precomputed camera → court matrix.
    pub fn from_matrix(h: Matrix3<f64>) -> Result<Self, HomographyError> {
        let h_inv = h.try_inverse().ok_or_else(|| {
            HomographyError::DegenerateGeometry("homography matrix is not invertible".into())
        })?;
        Ok(Self { h, h_inv })
    }

    /// Inverse of [`Self::to_array`].
    pub fn from_array(rows: [[f64; 3]; 3]) -> Result<Self, HomographyError> {
        Self::from_matrix(Matrix3::from_fn(|r, c| rows[r][c]))
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.h
    }

    /// Row-major 3×3 array, for serialization.
    pub fn to_array(&self) -> [[f64; 3]; 3] {
        let m = &self.h;
        [
            [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
            [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
            [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
        ]
    }

    /// Map camera points to the canonical court, preserving order.
    ///
    /// A point whose homogeneous `w` is near zero (on the vanishing line) is
    /// divided by a clamped `w` and a warning is logged.
    pub fn transform(&self, points: &[CameraPoint]) -> Vec<CourtPoint> {
        points.iter().map(|p| self.transform_point(*p)).collect()
    }

    pub fn transform_point(&self, p: CameraPoint) -> CourtPoint {
        let (xy, clamped) = project_clamped(&self.h, p.to_array());
        if clamped {
            tracing::warn!(
                "perspective divide clamped for {:?}: point lies on the camera vanishing line",
                p
            );
        }
        CourtPoint::from_array(xy)
    }

    /// Like [`Self::transform_point`], but fails instead of clamping.
    pub fn try_transform_point(&self, p: CameraPoint) -> Result<CourtPoint, HomographyError> {
        try_project(&self.h, p.to_array()).map(CourtPoint::from_array)
    }

    /// Map a canonical court point back into the camera frame.
    pub fn to_camera(&self, p: CourtPoint) -> Result<CameraPoint, HomographyError> {
        try_project(&self.h_inv, p.to_array()).map(CameraPoint::from_array)
    }

    /// Distance in canonical pixels between `project(src)` and `dst`.
    pub fn reprojection_error(&self, src: CameraPoint, dst: CourtPoint) -> f64 {
        reprojection_error(&self.h, &src.to_array(), &dst.to_array())
    }
}

fn mean_finite(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}
