//! Frame templates and the read-only catalog they live in.
//!
//! Window geometry is classified once, when the catalog is built, into
//! [`FrameWindow`]. Downstream code never inspects the raw JSON shape.

mod cache;
mod json;

pub use cache::{CatalogCache, CatalogLoader, JsonFileLoader};

use crate::geometry::{Point, Quad};
use crate::util::{FrameFitError, FrameFitResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Largest artwork side accepted from a catalog (the JPEG limit).
pub const MAX_IMAGE_SIDE: u32 = 65_535;

/// Coarse aspect bucket of a photo or frame.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
    Square,
}

impl Orientation {
    /// Classifies pixel dimensions. Only exact equality counts as square.
    pub fn classify(width: u32, height: u32) -> Self {
        if width == height {
            Self::Square
        } else if width > height {
            Self::Horizontal
        } else {
            Self::Vertical
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "horizontal" => Some(Self::Horizontal),
            "vertical" => Some(Self::Vertical),
            "square" => Some(Self::Square),
            _ => None,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
            Self::Square => "square",
        };
        f.write_str(name)
    }
}

/// Axis-aligned photo window in artwork pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RectWindow {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RectWindow {
    /// Builds a window from its top-left corner and either an explicit size
    /// or a bottom-right corner. Explicit size wins when both are present.
    pub fn from_parts(
        top_left: Point,
        size: Option<(f64, f64)>,
        bottom_right: Option<Point>,
    ) -> Option<Self> {
        let (width, height) = match (size, bottom_right) {
            (Some(size), _) => size,
            (None, Some(br)) => (br.x - top_left.x, br.y - top_left.y),
            (None, None) => return None,
        };
        Some(Self {
            x: top_left.x,
            y: top_left.y,
            width,
            height,
        })
    }

    /// True when width and height are positive and finite.
    pub fn is_valid(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }

    /// The rectangle as a clockwise quad.
    pub fn to_quad(&self) -> Quad {
        Quad::from_rect(self.x, self.y, self.width, self.height)
    }
}

/// Where the photo shows through a frame's artwork.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameWindow {
    /// Legacy axis-aligned window.
    Rect(RectWindow),
    /// Tilted window with four labeled corners; `fallback` is the rectangle
    /// used when the quad turns out to be degenerate.
    Quad {
        quad: Quad,
        fallback: Option<RectWindow>,
    },
    /// No usable window data.
    Unknown,
}

impl FrameWindow {
    /// Rectangle data carried by this window, if any.
    pub fn rect(&self) -> Option<&RectWindow> {
        match self {
            Self::Rect(rect) => Some(rect),
            Self::Quad { fallback, .. } => fallback.as_ref(),
            Self::Unknown => None,
        }
    }
}

/// A catalog entry: frame artwork dimensions, orientation and window.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameTemplate {
    pub image_width: u32,
    pub image_height: u32,
    pub orientation: Orientation,
    pub window: FrameWindow,
}

impl FrameTemplate {
    /// Creates a template, rejecting zero artwork dimensions and sides above
    /// [`MAX_IMAGE_SIDE`].
    pub fn new(
        image_width: u32,
        image_height: u32,
        orientation: Orientation,
        window: FrameWindow,
    ) -> FrameFitResult<Self> {
        let side_ok = |side: u32| (1..=MAX_IMAGE_SIDE).contains(&side);
        if !side_ok(image_width) || !side_ok(image_height) {
            return Err(FrameFitError::InvalidDimensions {
                width: image_width,
                height: image_height,
            });
        }
        Ok(Self {
            image_width,
            image_height,
            orientation,
            window,
        })
    }

    /// True when the template declares a four-corner window.
    pub fn is_perspective(&self) -> bool {
        matches!(self.window, FrameWindow::Quad { .. })
    }
}

/// Read-only mapping from template key to template.
///
/// Keys are kept sorted so iteration, and therefore tie-breaking between
/// equally scored templates, is deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameCatalog {
    frames: BTreeMap<String, FrameTemplate>,
}

impl FrameCatalog {
    /// Builds a catalog from `(key, template)` pairs.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, FrameTemplate)>,
        K: Into<String>,
    {
        Self {
            frames: entries
                .into_iter()
                .map(|(key, tpl)| (key.into(), tpl))
                .collect(),
        }
    }

    /// Parses a frame-mapping JSON document.
    ///
    /// Accepts either the `{"data": {"frames": {...}}}` envelope or a bare
    /// key-to-frame object.
    pub fn from_json_str(text: &str) -> FrameFitResult<Self> {
        json::parse_catalog(text)
    }

    /// Returns the template stored under `key`.
    pub fn get(&self, key: &str) -> Option<&FrameTemplate> {
        self.frames.get(key)
    }

    /// Iterates templates in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FrameTemplate)> {
        self.frames.iter().map(|(key, tpl)| (key.as_str(), tpl))
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True when the catalog holds no templates.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
