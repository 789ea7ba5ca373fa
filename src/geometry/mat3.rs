//! Dense 3x3 matrix helpers in row-major order.
//!
//! Matrices are stored as `[f64; 9]` with element `(r, c)` at index
//! `3 * r + c`. No operation here checks for singularity; callers decide
//! what to do with non-finite or rank-deficient results.

/// Row-major 3x3 matrix.
pub type Mat3 = [f64; 9];

/// Column vector of length 3.
pub type Vec3 = [f64; 3];

/// The 3x3 identity matrix.
pub const IDENTITY: Mat3 = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

/// Returns the classical adjoint (transposed cofactor matrix) of `m`.
///
/// `adjugate(m) * m == det(m) * I`, so this is an inverse only up to scale.
/// The projective construction multiplies it back into a homogeneous matrix
/// where that scale cancels.
pub fn adjugate(m: &Mat3) -> Mat3 {
    [
        m[4] * m[8] - m[5] * m[7],
        m[2] * m[7] - m[1] * m[8],
        m[1] * m[5] - m[2] * m[4],
        m[5] * m[6] - m[3] * m[8],
        m[0] * m[8] - m[2] * m[6],
        m[2] * m[3] - m[0] * m[5],
        m[3] * m[7] - m[4] * m[6],
        m[1] * m[6] - m[0] * m[7],
        m[0] * m[4] - m[1] * m[3],
    ]
}

/// Returns the product `a * b`.
pub fn mat_mul(a: &Mat3, b: &Mat3) -> Mat3 {
    let mut out = [0.0; 9];
    for i in 0..3 {
        for j in 0..3 {
            let mut acc = 0.0;
            for k in 0..3 {
                acc += a[3 * i + k] * b[3 * k + j];
            }
            out[3 * i + j] = acc;
        }
    }
    out
}

/// Returns the product `m * v`.
pub fn mat_vec(m: &Mat3, v: &Vec3) -> Vec3 {
    [
        m[0] * v[0] + m[1] * v[1] + m[2] * v[2],
        m[3] * v[0] + m[4] * v[1] + m[5] * v[2],
        m[6] * v[0] + m[7] * v[1] + m[8] * v[2],
    ]
}

/// Returns the determinant of `m`.
pub fn determinant(m: &Mat3) -> f64 {
    m[0] * (m[4] * m[8] - m[5] * m[7]) - m[1] * (m[3] * m[8] - m[5] * m[6])
        + m[2] * (m[3] * m[7] - m[4] * m[6])
}
