//! Planar geometry: points, quads, bounding boxes, and the projective kernel.
//!
//! Quads are always stored in clockwise corner order starting at the top-left
//! (`top_left`, `top_right`, `bottom_right`, `bottom_left`), matching the
//! order the projective solver expects for its source and destination points.

pub mod homography;
pub mod mat3;

use serde::{Deserialize, Serialize};

/// Relative tolerance for treating three corners as collinear.
const COLLINEAR_EPS: f64 = 1e-9;

/// A 2D point in pixel (or normalized) coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Returns the smallest box containing all `points`, or `None` when the
    /// slice is empty or contains a non-finite coordinate.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut bbox = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in points {
            if !p.is_finite() {
                return None;
            }
            bbox.min_x = bbox.min_x.min(p.x);
            bbox.min_y = bbox.min_y.min(p.y);
            bbox.max_x = bbox.max_x.max(p.x);
            bbox.max_y = bbox.max_y.max(p.y);
        }
        Some(bbox)
    }

    /// Box width (`max_x - min_x`).
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Box height (`max_y - min_y`).
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// True when the box has non-positive width or height.
    pub fn is_empty(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Maps `p` into `[0, 1] x [0, 1]` relative to this box.
    pub fn normalize(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.min_x) / self.width(),
            (p.y - self.min_y) / self.height(),
        )
    }
}

/// Four labeled corners of a (possibly tilted) photo window.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quad {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
}

impl Quad {
    /// Builds a quad from corners in `[top_left, top_right, bottom_right,
    /// bottom_left]` order.
    pub const fn from_corners(corners: [Point; 4]) -> Self {
        Self {
            top_left: corners[0],
            top_right: corners[1],
            bottom_right: corners[2],
            bottom_left: corners[3],
        }
    }

    /// The unit square `(0,0), (1,0), (1,1), (0,1)`.
    pub const fn unit() -> Self {
        Self::from_corners([
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ])
    }

    /// Axis-aligned rectangle as a quad.
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::from_corners([
            Point::new(x, y),
            Point::new(x + width, y),
            Point::new(x + width, y + height),
            Point::new(x, y + height),
        ])
    }

    /// Corners in clockwise order starting at the top-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Bounding box of the four corners.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.corners())
    }

    /// Returns the quad expressed in the `[0, 1]` frame of `bbox`.
    pub fn normalized_to(&self, bbox: &BoundingBox) -> Self {
        Self::from_corners(self.corners().map(|p| bbox.normalize(p)))
    }

    /// True when any three consecutive corners are (nearly) collinear.
    ///
    /// A projective map between two quads only exists when no three corners
    /// of either quad lie on a line; the tolerance is relative to the squared
    /// extent of the quad.
    pub fn has_collinear_corners(&self) -> bool {
        let Some(bbox) = self.bounding_box() else {
            return true;
        };
        let extent = bbox.width().max(bbox.height());
        if extent <= 0.0 {
            return true;
        }
        let tol = COLLINEAR_EPS * extent * extent;
        let c = self.corners();
        (0..4).any(|i| {
            let a = c[i];
            let b = c[(i + 1) % 4];
            let d = c[(i + 2) % 4];
            let cross = (b.x - a.x) * (d.y - a.y) - (b.y - a.y) * (d.x - a.x);
            cross.abs() <= tol
        })
    }
}
