//! Plane-to-plane homography estimation via DLT with Hartley normalization.
//!
//! Provides:
//! - Direct Linear Transform (DLT) from ≥4 point correspondences, with
//!   rank-deficiency detection.
//! - Guarded projection (near-zero homogeneous `w`).
//! - RANSAC wrapper for outlier-robust fitting over many keypoints.

use nalgebra::{Matrix3, SMatrix, SVector, SymmetricEigen, Vector3};
use rand::prelude::*;

/// Smallest accepted |w| before the perspective divide is clamped.
pub const MIN_HOMOGENEOUS_W: f64 = 1e-12;

/// Relative eigenvalue gap below which the DLT null space is not unique.
const RANK_TOLERANCE: f64 = 1e-10;

/// Minimum |det| of the unit-norm homography between normalized point sets.
const SINGULAR_TOLERANCE: f64 = 1e-10;

// ── Error type ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum HomographyError {
    /// Collinear, coincident, non-convex or inconsistently wound input, or a
    /// rank-deficient / singular solve.
    DegenerateGeometry(String),
    TooFewPoints { needed: usize, got: usize },
    /// Perspective divide by a near-zero homogeneous coordinate.
    NumericOverflow { w: f64 },
    InsufficientInliers { needed: usize, found: usize },
}

impl std::fmt::Display for HomographyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DegenerateGeometry(msg) => write!(f, "degenerate geometry: {}", msg),
            Self::TooFewPoints { needed, got } => {
                write!(f, "too few points: need {}, got {}", needed, got)
            }
            Self::NumericOverflow { w } => {
                write!(f, "numeric overflow: homogeneous w = {:e} is too close to zero", w)
            }
            Self::InsufficientInliers { needed, found } => {
                write!(f, "insufficient inliers: need {}, found {}", needed, found)
            }
        }
    }
}

impl std::error::Error for HomographyError {}

// ── Projection ───────────────────────────────────────────────────────────

/// Project through `h`, failing when |w| < [`MIN_HOMOGENEOUS_W`].
pub fn try_project(h: &Matrix3<f64>, xy: [f64; 2]) -> Result<[f64; 2], HomographyError> {
    let p = h * Vector3::new(xy[0], xy[1], 1.0);
    let w = p[2];
    if !w.is_finite() || w.abs() < MIN_HOMOGENEOUS_W {
        return Err(HomographyError::NumericOverflow { w });
    }
    Ok([p[0] / w, p[1] / w])
}

/// Project through `h`, clamping |w| to [`MIN_HOMOGENEOUS_W`] (sign kept).
///
/// Returns the projected point and whether the divisor was clamped.
pub fn project_clamped(h: &Matrix3<f64>, xy: [f64; 2]) -> ([f64; 2], bool) {
    let p = h * Vector3::new(xy[0], xy[1], 1.0);
    let mut w = p[2];
    let clamped = !(w.abs() >= MIN_HOMOGENEOUS_W);
    if clamped {
        // NaN w has no sign worth keeping.
        w = if w.is_sign_negative() && !w.is_nan() {
            -MIN_HOMOGENEOUS_W
        } else {
            MIN_HOMOGENEOUS_W
        };
    }
    ([p[0] / w, p[1] / w], clamped)
}

/// Reprojection error: ||project(H, src) - dst||; infinite if `src` maps to infinity.
pub fn reprojection_error(h: &Matrix3<f64>, src: &[f64; 2], dst: &[f64; 2]) -> f64 {
    match try_project(h, *src) {
        Ok(p) => (p[0] - dst[0]).hypot(p[1] - dst[1]),
        Err(_) => f64::INFINITY,
    }
}

// ── Hartley normalization ────────────────────────────────────────────────

/// Similarity that moves a point set's centroid to the origin and scales its
/// mean distance from there to sqrt(2).
#[derive(Debug, Clone, Copy)]
struct Conditioning {
    center: [f64; 2],
    scale: f64,
}

impl Conditioning {
    fn fit(pts: &[[f64; 2]]) -> Self {
        let n = pts.len() as f64;
        let [sum_x, sum_y] = pts
            .iter()
            .fold([0.0, 0.0], |[ax, ay], p| [ax + p[0], ay + p[1]]);
        let center = [sum_x / n, sum_y / n];
        let spread = pts
            .iter()
            .map(|p| (p[0] - center[0]).hypot(p[1] - center[1]))
            .sum::<f64>()
            / n;
        let scale = if spread > 1e-15 {
            std::f64::consts::SQRT_2 / spread
        } else {
            1.0
        };
        Self { center, scale }
    }

    fn apply(&self, p: [f64; 2]) -> [f64; 2] {
        [
            self.scale * (p[0] - self.center[0]),
            self.scale * (p[1] - self.center[1]),
        ]
    }

    fn matrix(&self) -> Matrix3<f64> {
        let [cx, cy] = self.center;
        let s = self.scale;
        Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0)
    }

    fn inverse_matrix(&self) -> Matrix3<f64> {
        let [cx, cy] = self.center;
        let r = self.scale.recip();
        Matrix3::new(r, 0.0, cx, 0.0, r, cy, 0.0, 0.0, 1.0)
    }
}

// ── DLT ──────────────────────────────────────────────────────────────────

/// The two linear constraints one correspondence puts on the row-major
/// entries of H.
fn constraint_rows(s: [f64; 2], d: [f64; 2]) -> [SVector<f64, 9>; 2] {
    let [x, y] = s;
    let [u, v] = d;
    [
        SVector::from([0.0, 0.0, 0.0, -x, -y, -1.0, v * x, v * y, v]),
        SVector::from([x, y, 1.0, 0.0, 0.0, 0.0, -u * x, -u * y, -u]),
    ]
}

/// Estimate the homography H with `dst ≈ project(H, src)` from ≥4
/// correspondences.
///
/// With exactly 4 correspondences the solve is exact. Fails with
/// [`HomographyError::DegenerateGeometry`] when the linear system does not
/// have a unique (1-D) null space or the result is singular.
pub fn estimate_homography_dlt(
    src: &[[f64; 2]],
    dst: &[[f64; 2]],
) -> Result<Matrix3<f64>, HomographyError> {
    let n = src.len();
    if n < 4 || dst.len() < 4 {
        return Err(HomographyError::TooFewPoints {
            needed: 4,
            got: n.min(dst.len()),
        });
    }
    if n != dst.len() {
        return Err(HomographyError::DegenerateGeometry(format!(
            "src and dst must have the same length ({} vs {})",
            n,
            dst.len()
        )));
    }
    if src.iter().chain(dst).any(|p| !p[0].is_finite() || !p[1].is_finite()) {
        return Err(HomographyError::DegenerateGeometry(
            "correspondences contain non-finite coordinates".into(),
        ));
    }

    let src_cond = Conditioning::fit(src);
    let dst_cond = Conditioning::fit(dst);

    // Normal matrix AᵀA, accumulated one constraint row at a time.
    let normal = src
        .iter()
        .zip(dst)
        .flat_map(|(s, d)| constraint_rows(src_cond.apply(*s), dst_cond.apply(*d)))
        .fold(SMatrix::<f64, 9, 9>::zeros(), |acc, row| {
            acc + row * row.transpose()
        });
    let eig = SymmetricEigen::new(normal);

    // H spans the null space: the eigenvector of the smallest |eigenvalue|,
    // which must be well separated from the next one.
    let mut spectrum: Vec<(f64, usize)> = eig
        .eigenvalues
        .iter()
        .map(|v| v.abs())
        .zip(0..)
        .collect();
    spectrum.sort_by(|a, b| a.0.total_cmp(&b.0));
    let (_, null_idx) = spectrum[0];
    let (second, _) = spectrum[1];
    let (largest, _) = spectrum[8];
    if !(second > RANK_TOLERANCE * largest) {
        return Err(HomographyError::DegenerateGeometry(
            "correspondences do not determine a unique homography (rank-deficient system)".into(),
        ));
    }

    let null = eig.eigenvectors.column(null_idx);
    let h_cond = Matrix3::from_fn(|r, c| null[3 * r + c]);
    if h_cond.determinant().abs() <= SINGULAR_TOLERANCE {
        return Err(HomographyError::DegenerateGeometry(
            "estimated homography is singular".into(),
        ));
    }

    let h = dst_cond.inverse_matrix() * h_cond * src_cond.matrix();
    let scale = h[(2, 2)];
    let h = if scale.abs() < 1e-15 { h } else { h / scale };
    if h.iter().any(|v| !v.is_finite()) {
        return Err(HomographyError::DegenerateGeometry(
            "estimated homography is not finite".into(),
        ));
    }
    Ok(h)
}

// ── RANSAC ───────────────────────────────────────────────────────────────

/// RANSAC configuration for homography fitting.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RansacHomographyConfig {
    /// Maximum number of RANSAC iterations.
    pub max_iters: usize,
    /// Inlier threshold (reprojection error in destination pixels).
    pub inlier_threshold: f64,
    /// Minimum number of inliers for a valid model.
    pub min_inliers: usize,
    /// Random seed.
    pub seed: u64,
}

impl Default for RansacHomographyConfig {
    fn default() -> Self {
        Self {
            max_iters: 500,
            inlier_threshold: 3.0,
            min_inliers: 8,
            seed: 0,
        }
    }
}

/// Result of RANSAC homography fitting.
#[derive(Debug, Clone)]
pub struct RansacHomographyResult {
    pub h: Matrix3<f64>,
    pub inlier_mask: Vec<bool>,
    pub n_inliers: usize,
    /// Reprojection error per correspondence under `h`.
    pub errors: Vec<f64>,
}

/// Fit a homography with RANSAC followed by a DLT refit on all inliers.
pub fn fit_homography_ransac(
    src: &[[f64; 2]],
    dst: &[[f64; 2]],
    config: &RansacHomographyConfig,
) -> Result<RansacHomographyResult, HomographyError> {
    let n = src.len().min(dst.len());
    if n < 4 {
        return Err(HomographyError::TooFewPoints { needed: 4, got: n });
    }

    let inliers_of = |h: &Matrix3<f64>| -> Vec<bool> {
        src.iter()
            .zip(dst)
            .map(|(s, d)| reprojection_error(h, s, d) < config.inlier_threshold)
            .collect()
    };

    let mut rng = StdRng::seed_from_u64(config.seed);
    let indices: Vec<usize> = (0..n).collect();
    let mut best: Option<(Matrix3<f64>, Vec<bool>, usize)> = None;

    for _ in 0..config.max_iters {
        let (s4, d4): (Vec<[f64; 2]>, Vec<[f64; 2]>) = indices
            .choose_multiple(&mut rng, 4)
            .map(|&i| (src[i], dst[i]))
            .unzip();

        // Collinear samples are common on a court (baseline, service lines).
        let Ok(h) = estimate_homography_dlt(&s4, &d4) else {
            continue;
        };

        let mask = inliers_of(&h);
        let count = mask.iter().filter(|&&m| m).count();
        if best.as_ref().map_or(count > 0, |b| count > b.2) {
            best = Some((h, mask, count));
            if count == n {
                break;
            }
        }
    }

    let found = best.as_ref().map_or(0, |b| b.2);
    let (best_h, best_mask) = match best {
        Some((h, mask, count)) if count >= config.min_inliers => (h, mask),
        _ => {
            return Err(HomographyError::InsufficientInliers {
                needed: config.min_inliers,
                found,
            })
        }
    };

    let (inlier_src, inlier_dst): (Vec<[f64; 2]>, Vec<[f64; 2]>) = src
        .iter()
        .zip(dst)
        .zip(&best_mask)
        .filter(|(_, keep)| **keep)
        .map(|((s, d), _)| (*s, *d))
        .unzip();
    let h = estimate_homography_dlt(&inlier_src, &inlier_dst).unwrap_or(best_h);

    let errors: Vec<f64> = src
        .iter()
        .zip(dst)
        .map(|(s, d)| reprojection_error(&h, s, d))
        .collect();
    let inlier_mask: Vec<bool> = errors.iter().map(|&e| e < config.inlier_threshold).collect();
    let n_inliers = inlier_mask.iter().filter(|&&m| m).count();

    Ok(RansacHomographyResult {
        h,
        inlier_mask,
        n_inliers,
        errors,
    })
}

// ── Tests ────────────────────────────────────────────────────────────────
