//! Corner-quad sanity checks run before a 4-point solve.

use super::core::HomographyError;

/// Turn-product magnitude, relative to the squared quad extent, below which
/// three consecutive corners count as collinear.
const COLLINEAR_TOLERANCE: f64 = 1e-9;

/// Orientation of a corner quad in its own pixel frame (y pointing down).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Winding {
    Clockwise,
    CounterClockwise,
}

/// Check that `quad` is a strictly convex quadrilateral and return its winding.
///
/// With four corners every triple of points is a cyclically consecutive one,
/// so the four turn products cover all collinearity cases as well as
/// self-intersecting ("bow-tie") orderings.
pub(crate) fn check_convex_quad(
    quad: &[[f64; 2]; 4],
    label: &str,
) -> Result<Winding, HomographyError> {
    if quad.iter().any(|p| !p[0].is_finite() || !p[1].is_finite()) {
        return Err(HomographyError::DegenerateGeometry(format!(
            "{label} corners contain non-finite coordinates"
        )));
    }

    let (min_x, max_x, min_y, max_y) = quad.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
        |(x0, x1, y0, y1), p| (x0.min(p[0]), x1.max(p[0]), y0.min(p[1]), y1.max(p[1])),
    );
    let extent_sq = (max_x - min_x).powi(2) + (max_y - min_y).powi(2);
    let tol = COLLINEAR_TOLERANCE * extent_sq;

    let mut positive = 0;
    let mut negative = 0;
    for i in 0..4 {
        let a = quad[i];
        let b = quad[(i + 1) % 4];
        let c = quad[(i + 2) % 4];
        let turn = (b[0] - a[0]) * (c[1] - b[1]) - (b[1] - a[1]) * (c[0] - b[0]);
        if !(turn.abs() > tol) {
            return Err(HomographyError::DegenerateGeometry(format!(
                "{label} corners {}, {}, {} are collinear or coincident",
                i,
                (i + 1) % 4,
                (i + 2) % 4
            )));
        }
        if turn > 0.0 {
            positive += 1;
        } else {
            negative += 1;
        }
    }

    match (positive, negative) {
        (4, 0) => Ok(Winding::Clockwise),
        (0, 4) => Ok(Winding::CounterClockwise),
        _ => Err(HomographyError::DegenerateGeometry(format!(
            "{label} corners do not form a convex quad in TL, TR, BR, BL order"
        ))),
    }
}
