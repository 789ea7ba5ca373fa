//! Resolution-independent placement of a photo inside frame artwork.
//!
//! A descriptor is either an axis-aligned rectangle in percentages of the
//! artwork, or a percentage bounding box plus a homography that warps the
//! unit square onto the window's corners inside that box. Presentation code
//! applies it at any display size without recomputing geometry.

use crate::catalog::{FrameTemplate, FrameWindow, RectWindow};
use crate::geometry::homography::Homography;
use crate::geometry::{BoundingBox, Quad};
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::math::format_percent;
use crate::util::{FrameFitError, FrameFitResult};
use serde::Serialize;

/// Rectangle in percent of the artwork's width and height.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(into = "CssRect")]
pub struct PercentRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PercentRect {
    /// Covers the whole artwork.
    pub const FULL_BLEED: Self = Self {
        left: 0.0,
        top: 0.0,
        width: 100.0,
        height: 100.0,
    };

    /// Expresses a pixel rectangle relative to `image_width x image_height`.
    pub fn from_pixels(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        image_width: u32,
        image_height: u32,
    ) -> Self {
        let iw = f64::from(image_width);
        let ih = f64::from(image_height);
        Self {
            left: x * 100.0 / iw,
            top: y * 100.0 / ih,
            width: width * 100.0 / iw,
            height: height * 100.0 / ih,
        }
    }

    /// CSS strings with four fractional digits, e.g. `10.0000%`.
    pub fn to_css(&self) -> CssRect {
        CssRect {
            left: format_percent(self.left),
            top: format_percent(self.top),
            width: format_percent(self.width),
            height: format_percent(self.height),
        }
    }
}

/// Percent rectangle rendered as CSS length strings.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CssRect {
    pub left: String,
    pub top: String,
    pub width: String,
    pub height: String,
}

impl From<PercentRect> for CssRect {
    fn from(value: PercentRect) -> Self {
        value.to_css()
    }
}

/// Placement data for a tilted window.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerspectiveOverlay {
    /// Window bounding box in percent of the artwork.
    pub bounding_box: PercentRect,
    /// Maps the unit square onto `normalized_corners`.
    pub transform: Homography,
    /// Window bounding box in artwork pixels.
    pub bounding_box_pixels: BoundingBox,
    /// Window corners in the `[0, 1]` frame of the bounding box.
    pub normalized_corners: Quad,
}

impl PerspectiveOverlay {
    /// CSS `matrix3d(...)` value for `transform`.
    pub fn css_transform(&self) -> String {
        self.transform.to_css_matrix3d()
    }
}

/// How to place the photo for one template.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum OverlayDescriptor {
    Rect { rect: PercentRect },
    Perspective(PerspectiveOverlay),
}

impl OverlayDescriptor {
    /// The full-artwork fallback.
    pub const FULL_BLEED: Self = Self::Rect {
        rect: PercentRect::FULL_BLEED,
    };

    /// True for the perspective variant.
    pub fn is_perspective(&self) -> bool {
        matches!(self, Self::Perspective(_))
    }

    /// True when this is the full-artwork fallback.
    pub fn is_full_bleed(&self) -> bool {
        *self == Self::FULL_BLEED
    }

    /// The rectangle for the rect variant.
    pub fn rect(&self) -> Option<&PercentRect> {
        match self {
            Self::Rect { rect } => Some(rect),
            Self::Perspective(_) => None,
        }
    }

    /// The perspective data for the perspective variant.
    pub fn perspective(&self) -> Option<&PerspectiveOverlay> {
        match self {
            Self::Rect { .. } => None,
            Self::Perspective(p) => Some(p),
        }
    }
}

/// Builds the overlay for a template, never failing.
///
/// Degenerate quads fall back to the template's rectangle; a template with
/// no usable window yields [`OverlayDescriptor::FULL_BLEED`] and a warning.
pub fn build_overlay(key: &str, template: &FrameTemplate) -> OverlayDescriptor {
    try_build_overlay(key, template).unwrap_or_else(|err| {
        let reason = err.to_string();
        trace_warn!("overlay_full_bleed", key = key, reason = reason.as_str());
        OverlayDescriptor::FULL_BLEED
    })
}

/// Builds the overlay for a template.
///
/// Geometry problems with a quad window are absorbed by falling back to the
/// rectangle. Fails with [`FrameFitError::MissingWindowData`] only when no
/// usable rectangle remains.
pub fn try_build_overlay(key: &str, template: &FrameTemplate) -> FrameFitResult<OverlayDescriptor> {
    let _span = trace_span!("build_overlay", key = key).entered();

    if let FrameWindow::Quad { quad, .. } = &template.window {
        match perspective_overlay(quad, template) {
            Ok(overlay) => {
                trace_event!("overlay_mode", perspective = true);
                return Ok(OverlayDescriptor::Perspective(overlay));
            }
            Err(err) => {
                let reason = err.to_string();
                trace_warn!("overlay_quad_rejected", key = key, reason = reason.as_str());
            }
        }
    }

    let rect = template
        .window
        .rect()
        .filter(|rect| rect.is_valid())
        .ok_or_else(|| FrameFitError::MissingWindowData {
            key: key.to_string(),
        })?;
    trace_event!("overlay_mode", perspective = false);
    Ok(OverlayDescriptor::Rect {
        rect: rect_percent(rect, template),
    })
}

fn rect_percent(rect: &RectWindow, template: &FrameTemplate) -> PercentRect {
    PercentRect::from_pixels(
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        template.image_width,
        template.image_height,
    )
}

fn perspective_overlay(
    quad: &Quad,
    template: &FrameTemplate,
) -> FrameFitResult<PerspectiveOverlay> {
    let bbox = quad
        .bounding_box()
        .filter(|bbox| !bbox.is_empty())
        .ok_or(FrameFitError::DegenerateGeometry {
            reason: "empty bounding box",
        })?;
    let normalized = quad.normalized_to(&bbox);
    let transform = Homography::from_unit_square(&normalized)?;
    Ok(PerspectiveOverlay {
        bounding_box: PercentRect::from_pixels(
            bbox.min_x,
            bbox.min_y,
            bbox.width(),
            bbox.height(),
            template.image_width,
            template.image_height,
        ),
        transform,
        bounding_box_pixels: bbox,
        normalized_corners: normalized,
    })
}

#[cfg(test)]
mod tests {
    use super::{OverlayDescriptor, PercentRect};

    #[test]
    fn percent_rect_formats_css() {
        let rect = PercentRect::from_pixels(100.0, 100.0, 200.0, 300.0, 1000, 1000);
        let css = rect.to_css();
        assert_eq!(css.left, "10.0000%");
        assert_eq!(css.height, "30.0000%");
    }

    #[test]
    fn full_bleed_serializes_with_mode_tag() {
        let json = serde_json::to_value(OverlayDescriptor::FULL_BLEED).unwrap();
        assert_eq!(json["mode"], "rect");
        assert_eq!(json["rect"]["width"], "100.0000%");
    }
}
