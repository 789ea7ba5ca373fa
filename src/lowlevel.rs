//! Low-level building blocks for custom pipelines.
//!
//! These expose the raw projective kernel (unnormalized, unchecked) and the
//! scoring weights. Most users should prefer [`crate::Homography`],
//! [`crate::FrameMatcher`], and [`crate::build_overlay`].

pub use crate::geometry::homography::{basis_to_points, normalize, quad_to_quad};
pub use crate::geometry::mat3::{adjugate, determinant, mat_mul, mat_vec, Mat3, Vec3, IDENTITY};
pub use crate::matcher::{DEFAULT_TOP_N, RATIO_WEIGHT, SCALE_WEIGHT};
