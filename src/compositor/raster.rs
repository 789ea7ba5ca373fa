//! Polygon-clipped drawing on an RGBA canvas.
//!
//! The photo is scaled to cover the clip polygon's bounding box, centered,
//! and drawn only where the polygon covers the pixel. Coverage is estimated
//! with a 2x2 sub-sample grid so tilted edges are softened. The frame
//! artwork is then composited over the whole canvas with source-over
//! blending.

use crate::catalog::{FrameTemplate, FrameWindow, RectWindow};
use crate::geometry::{BoundingBox, Point, Quad};
use crate::util::{FrameFitError, FrameFitResult};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

const SUBSAMPLES: [(f64, f64); 4] = [(0.25, 0.25), (0.75, 0.25), (0.25, 0.75), (0.75, 0.75)];

/// Largest canvas allocated for one composite (1 GiB of RGBA).
pub(crate) const MAX_CANVAS_PIXELS: u64 = 1 << 28;

/// Validated clip polygon for one template.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ClipRegion {
    corners: [Point; 4],
    bbox: BoundingBox,
}

impl ClipRegion {
    /// Picks the template's quad if usable, else its rectangle.
    ///
    /// Fails with [`FrameFitError::InvalidDimensions`] when the template's
    /// canvas could not be allocated, so nothing is fetched or drawn for it.
    pub(crate) fn for_template(key: &str, template: &FrameTemplate) -> FrameFitResult<Self> {
        check_canvas(template)?;
        let from_rect = |rect: Option<&RectWindow>| {
            rect.filter(|r| r.is_valid())
                .and_then(|r| Self::from_quad(&r.to_quad()))
        };
        let region = match &template.window {
            FrameWindow::Quad { quad, fallback } => Self::from_quad(quad)
                .filter(|_| !quad.has_collinear_corners())
                .or_else(|| from_rect(fallback.as_ref())),
            FrameWindow::Rect(rect) => from_rect(Some(rect)),
            FrameWindow::Unknown => None,
        };
        region.ok_or_else(|| FrameFitError::MissingWindowData {
            key: key.to_string(),
        })
    }

    fn from_quad(quad: &Quad) -> Option<Self> {
        let bbox = quad.bounding_box().filter(|b| !b.is_empty())?;
        Some(Self {
            corners: quad.corners(),
            bbox,
        })
    }

    /// Nonzero-winding containment test.
    fn contains(&self, x: f64, y: f64) -> bool {
        let mut winding = 0i32;
        for i in 0..4 {
            let a = self.corners[i];
            let b = self.corners[(i + 1) % 4];
            let side = (b.x - a.x) * (y - a.y) - (x - a.x) * (b.y - a.y);
            if a.y <= y {
                if b.y > y && side > 0.0 {
                    winding += 1;
                }
            } else if b.y <= y && side < 0.0 {
                winding -= 1;
            }
        }
        winding != 0
    }

    fn coverage(&self, px: u32, py: u32) -> f32 {
        let hits = SUBSAMPLES
            .iter()
            .filter(|(dx, dy)| self.contains(f64::from(px) + dx, f64::from(py) + dy))
            .count();
        hits as f32 / SUBSAMPLES.len() as f32
    }
}

/// Scale and offset that make the photo cover the clip bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct CoverPlacement {
    pub(crate) scale: f64,
    pub(crate) offset_x: f64,
    pub(crate) offset_y: f64,
}

impl CoverPlacement {
    pub(crate) fn new(bbox: &BoundingBox, photo_width: u32, photo_height: u32) -> Self {
        let pw = f64::from(photo_width);
        let ph = f64::from(photo_height);
        let scale = (bbox.width() / pw).max(bbox.height() / ph);
        Self {
            scale,
            offset_x: bbox.min_x + (bbox.width() - pw * scale) / 2.0,
            offset_y: bbox.min_y + (bbox.height() - ph * scale) / 2.0,
        }
    }
}

fn check_canvas(template: &FrameTemplate) -> FrameFitResult<()> {
    let pixels = u64::from(template.image_width) * u64::from(template.image_height);
    if pixels == 0 || pixels > MAX_CANVAS_PIXELS {
        return Err(FrameFitError::InvalidDimensions {
            width: template.image_width,
            height: template.image_height,
        });
    }
    Ok(())
}

/// Draws the photo clipped to `clip`, then the artwork on top.
pub(crate) fn render(
    photo: &RgbaImage,
    artwork: &RgbaImage,
    template: &FrameTemplate,
    clip: &ClipRegion,
) -> RgbaImage {
    let mut canvas = render_photo_layer(photo, template, clip);
    draw_artwork(&mut canvas, artwork);
    canvas
}

/// Transparent template-sized canvas holding only the clipped photo.
pub(crate) fn render_photo_layer(
    photo: &RgbaImage,
    template: &FrameTemplate,
    clip: &ClipRegion,
) -> RgbaImage {
    let mut canvas = RgbaImage::new(template.image_width, template.image_height);
    draw_photo_clipped(&mut canvas, photo, clip);
    canvas
}

fn draw_photo_clipped(canvas: &mut RgbaImage, photo: &RgbaImage, clip: &ClipRegion) {
    if photo.width() == 0 || photo.height() == 0 {
        return;
    }
    let place = CoverPlacement::new(&clip.bbox, photo.width(), photo.height());
    let x0 = clip.bbox.min_x.floor().max(0.0) as u32;
    let y0 = clip.bbox.min_y.floor().max(0.0) as u32;
    let x1 = (clip.bbox.max_x.ceil().max(0.0) as u32).min(canvas.width());
    let y1 = (clip.bbox.max_y.ceil().max(0.0) as u32).min(canvas.height());

    for y in y0..y1 {
        for x in x0..x1 {
            let coverage = clip.coverage(x, y);
            if coverage == 0.0 {
                continue;
            }
            let src_x = (f64::from(x) + 0.5 - place.offset_x) / place.scale - 0.5;
            let src_y = (f64::from(y) + 0.5 - place.offset_y) / place.scale - 0.5;
            let mut src = sample_bilinear(photo, src_x as f32, src_y as f32);
            src[3] *= coverage;
            let dst = canvas.get_pixel_mut(x, y);
            *dst = blend_over(*dst, src);
        }
    }
}

fn draw_artwork(canvas: &mut RgbaImage, artwork: &RgbaImage) {
    let resized;
    let artwork = if artwork.dimensions() == canvas.dimensions() {
        artwork
    } else {
        resized = imageops::resize(artwork, canvas.width(), canvas.height(), FilterType::Triangle);
        &resized
    };
    for (dst, src) in canvas.pixels_mut().zip(artwork.pixels()) {
        *dst = blend_over(*dst, to_f32(*src));
    }
}

fn to_f32(p: Rgba<u8>) -> [f32; 4] {
    [
        f32::from(p[0]),
        f32::from(p[1]),
        f32::from(p[2]),
        f32::from(p[3]) / 255.0,
    ]
}

/// Bilinear sample with edge clamping; color in `[0, 255]`, alpha in `[0, 1]`.
fn sample_bilinear(img: &RgbaImage, x: f32, y: f32) -> [f32; 4] {
    let max_x = (img.width() - 1) as f32;
    let max_y = (img.height() - 1) as f32;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);
    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(img.width() - 1);
    let y1 = (y0 + 1).min(img.height() - 1);
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let a = to_f32(*img.get_pixel(x0, y0));
    let b = to_f32(*img.get_pixel(x1, y0));
    let c = to_f32(*img.get_pixel(x0, y1));
    let d = to_f32(*img.get_pixel(x1, y1));

    let w00 = (1.0 - fx) * (1.0 - fy);
    let w10 = fx * (1.0 - fy);
    let w01 = (1.0 - fx) * fy;
    let w11 = fx * fy;
    let mut out = [0.0f32; 4];
    for ch in 0..4 {
        out[ch] = a[ch] * w00 + b[ch] * w10 + c[ch] * w01 + d[ch] * w11;
    }
    out
}

/// Source-over blend of a straight-alpha source onto a straight-alpha pixel.
fn blend_over(dst: Rgba<u8>, src: [f32; 4]) -> Rgba<u8> {
    let sa = src[3];
    if sa >= 1.0 {
        return Rgba([
            src[0].round() as u8,
            src[1].round() as u8,
            src[2].round() as u8,
            255,
        ]);
    }
    if sa <= 0.0 {
        return dst;
    }
    let d = to_f32(dst);
    let da = d[3] * (1.0 - sa);
    let out_a = sa + da;
    let mut out = [0u8; 4];
    for ch in 0..3 {
        let value = (src[ch] * sa + d[ch] * da) / out_a;
        out[ch] = value.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba(out)
}
