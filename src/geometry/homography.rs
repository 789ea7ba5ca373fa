//! Planar homography from four point correspondences.
//!
//! The solver uses the "basis to points" construction: for a quad `p1..p4`
//! it builds the matrix that sends the homogeneous basis vectors to
//! `p1, p2, p3` and `(1, 1, 1)` to a multiple of `p4`. Chaining one such
//! matrix with the adjugate of another maps any quad onto any other quad.

use crate::geometry::mat3::{adjugate, determinant, mat_mul, mat_vec, Mat3, IDENTITY};
use crate::geometry::{Point, Quad};
use crate::util::math::{round_to, MATRIX_DECIMALS};
use crate::util::{FrameFitError, FrameFitResult};
use serde::Serialize;

/// Returns the matrix mapping the homogeneous basis onto `p[0..3]` with
/// `(1, 1, 1)` landing on a multiple of `p[3]`.
pub fn basis_to_points(p: &[Point; 4]) -> Mat3 {
    let m = [
        p[0].x, p[1].x, p[2].x, //
        p[0].y, p[1].y, p[2].y, //
        1.0, 1.0, 1.0,
    ];
    let v = mat_vec(&adjugate(&m), &[p[3].x, p[3].y, 1.0]);
    mat_mul(
        &m,
        &[
            v[0], 0.0, 0.0, //
            0.0, v[1], 0.0, //
            0.0, 0.0, v[2],
        ],
    )
}

/// Returns the raw (unnormalized) projective map sending `src[i]` to
/// `dst[i]` for all four corners.
///
/// Degenerate input is not rejected here: collinear corners produce a
/// singular or non-finite matrix. Use [`Homography::from_quads`] for a
/// checked, normalized result.
pub fn quad_to_quad(src: &[Point; 4], dst: &[Point; 4]) -> Mat3 {
    let s = basis_to_points(src);
    let d = basis_to_points(dst);
    mat_mul(&d, &adjugate(&s))
}

/// Scales `m` so that element `[2][2]` is 1 and rounds every entry to six
/// fractional digits. A zero `[2][2]` is treated as 1.
pub fn normalize(m: &Mat3) -> Mat3 {
    let scale = if m[8] == 0.0 { 1.0 } else { m[8] };
    m.map(|v| round_to(v / scale, MATRIX_DECIMALS))
}

/// A normalized, finite projective transform.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Homography {
    m: Mat3,
}

impl Homography {
    /// The identity transform.
    pub const IDENTITY: Self = Self { m: IDENTITY };

    /// Solves the transform mapping `src` onto `dst`.
    ///
    /// Fails with [`FrameFitError::DegenerateGeometry`] when either quad has
    /// three collinear corners or the solved matrix is not finite.
    pub fn from_quads(src: &Quad, dst: &Quad) -> FrameFitResult<Self> {
        if src.has_collinear_corners() || dst.has_collinear_corners() {
            return Err(FrameFitError::DegenerateGeometry {
                reason: "collinear corners",
            });
        }
        let raw = quad_to_quad(&src.corners(), &dst.corners());
        if raw.iter().any(|v| !v.is_finite()) {
            return Err(FrameFitError::DegenerateGeometry {
                reason: "non-finite transform",
            });
        }
        let m = normalize(&raw);
        if m.iter().any(|v| !v.is_finite()) || determinant(&m) == 0.0 {
            return Err(FrameFitError::DegenerateGeometry {
                reason: "singular transform",
            });
        }
        Ok(Self { m })
    }

    /// Solves the transform taking the unit square onto `dst`.
    pub fn from_unit_square(dst: &Quad) -> FrameFitResult<Self> {
        Self::from_quads(&Quad::unit(), dst)
    }

    /// Row-major matrix entries; element 8 is always 1 unless the solver
    /// hit the zero-scale guard.
    pub fn matrix(&self) -> &Mat3 {
        &self.m
    }

    /// True when the transform is exactly the identity.
    pub fn is_identity(&self) -> bool {
        self.m == IDENTITY
    }

    /// Applies the transform to `p`; `None` when `p` maps to infinity.
    pub fn apply(&self, p: Point) -> Option<Point> {
        let [x, y, w] = mat_vec(&self.m, &[p.x, p.y, 1.0]);
        if w == 0.0 || !w.is_finite() {
            return None;
        }
        Some(Point::new(x / w, y / w))
    }

    /// Renders the transform as a CSS `matrix3d(...)` value.
    ///
    /// CSS matrices are column-major 4x4; the 3x3 homography occupies the
    /// x, y and w rows/columns and leaves z untouched.
    pub fn to_css_matrix3d(&self) -> String {
        let m = &self.m;
        format!(
            "matrix3d({}, {}, 0, {}, {}, {}, 0, {}, 0, 0, 1, 0, {}, {}, 0, {})",
            m[0], m[3], m[6], m[1], m[4], m[7], m[2], m[5], m[8]
        )
    }
}
