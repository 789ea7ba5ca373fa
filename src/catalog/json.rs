//! Frame-mapping JSON decoding.
//!
//! The remote document mixes several window encodings in one object
//! (rectangle fields, a labeled point list, or both). This module decodes
//! that loose shape and classifies each entry into a [`FrameWindow`].
//! Entries that cannot be classified are skipped with a warning; only a
//! document without a frame map fails the load.

use crate::catalog::{
    FrameCatalog, FrameTemplate, FrameWindow, Orientation, RectWindow, MAX_IMAGE_SIDE,
};
use crate::geometry::{Point, Quad};
use crate::matcher::SizeToken;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{FrameFitError, FrameFitResult};
use serde::Deserialize;
use serde_json::{Map, Value};

const CORNER_LABELS: [&str; 4] = ["topLeft", "topRight", "bottomRight", "bottomLeft"];

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFrame {
    orientation: String,
    image_width: Option<f64>,
    image_height: Option<f64>,
    top_left: Option<Point>,
    legacy_top_left: Option<Point>,
    width: Option<f64>,
    height: Option<f64>,
    bottom_right: Option<Point>,
    #[serde(rename = "is3D", default)]
    is_3d: bool,
    #[serde(default)]
    points: Vec<RawLabeledPoint>,
}

#[derive(Deserialize)]
struct RawLabeledPoint {
    label: String,
    x: f64,
    y: f64,
}

pub(crate) fn parse_catalog(text: &str) -> FrameFitResult<FrameCatalog> {
    let _span = trace_span!("catalog_load").entered();

    let doc: Value = serde_json::from_str(text).map_err(|err| FrameFitError::InvalidCatalog {
        reason: err.to_string(),
    })?;
    let raw = frame_map(doc)?;

    let mut entries = Vec::with_capacity(raw.len());
    for (key, value) in raw {
        let template = serde_json::from_value::<RawFrame>(value)
            .map_err(|err| FrameFitError::InvalidCatalog {
                reason: format!("{key}: {err}"),
            })
            .and_then(|frame| convert_frame(&key, frame));
        match template {
            Ok(template) => {
                warn_on_authoring_issues(&key, &template);
                entries.push((key, template));
            }
            Err(err) => {
                let reason = err.to_string();
                trace_warn!(
                    "catalog_entry_rejected",
                    key = key.as_str(),
                    reason = reason.as_str(),
                );
            }
        }
    }

    let catalog = FrameCatalog::from_entries(entries);
    trace_event!("catalog_loaded", frames = catalog.len());
    Ok(catalog)
}

/// Unwraps the `{"data": {"frames": {...}}}` envelope, or takes the whole
/// object as the frame map when there is no `data` key.
fn frame_map(doc: Value) -> FrameFitResult<Map<String, Value>> {
    let missing = |what: &str| FrameFitError::InvalidCatalog {
        reason: format!("expected {what}"),
    };
    let Value::Object(mut root) = doc else {
        return Err(missing("a JSON object"));
    };
    if !root.contains_key("data") {
        return Ok(root);
    }
    match root.remove("data") {
        Some(Value::Object(mut data)) => match data.remove("frames") {
            Some(Value::Object(frames)) => Ok(frames),
            _ => Err(missing("an object at data.frames")),
        },
        _ => Err(missing("an object at data")),
    }
}

fn convert_frame(key: &str, frame: RawFrame) -> FrameFitResult<FrameTemplate> {
    let orientation =
        Orientation::parse(&frame.orientation).ok_or_else(|| FrameFitError::InvalidCatalog {
            reason: format!("{key}: unknown orientation {:?}", frame.orientation),
        })?;
    let image_width = pixel_dimension(key, "imageWidth", frame.image_width)?;
    let image_height = pixel_dimension(key, "imageHeight", frame.image_height)?;

    let rect = frame
        .top_left
        .or(frame.legacy_top_left)
        .and_then(|top_left| {
            let size = frame.width.zip(frame.height);
            RectWindow::from_parts(top_left, size, frame.bottom_right)
        });

    let quad = if frame.is_3d {
        quad_from_labeled(&frame.points)
    } else {
        None
    };

    let window = match (quad, rect) {
        (Some(quad), fallback) => FrameWindow::Quad { quad, fallback },
        (None, Some(rect)) => FrameWindow::Rect(rect),
        (None, None) => FrameWindow::Unknown,
    };

    FrameTemplate::new(image_width, image_height, orientation, window)
}

fn pixel_dimension(key: &str, field: &str, value: Option<f64>) -> FrameFitResult<u32> {
    match value {
        Some(v) if (1.0..=f64::from(MAX_IMAGE_SIDE)).contains(&v) => Ok(v.round() as u32),
        _ => Err(FrameFitError::InvalidCatalog {
            reason: format!("{key}: {field} must be between 1 and {MAX_IMAGE_SIDE} pixels"),
        }),
    }
}

/// Orders exactly four labeled points as a quad; `None` when the list does
/// not name each corner exactly once.
fn quad_from_labeled(points: &[RawLabeledPoint]) -> Option<Quad> {
    if points.len() != 4 {
        return None;
    }
    let mut corners = [None; 4];
    for point in points {
        let slot = CORNER_LABELS.iter().position(|l| *l == point.label)?;
        if corners[slot].is_some() {
            return None;
        }
        corners[slot] = Some(Point::new(point.x, point.y));
    }
    Some(Quad::from_corners([
        corners[0]?,
        corners[1]?,
        corners[2]?,
        corners[3]?,
    ]))
}

fn warn_on_authoring_issues(key: &str, template: &FrameTemplate) {
    if matches!(template.window, FrameWindow::Unknown) {
        trace_warn!("catalog_missing_window", key = key);
    }
    if let Some(token) = SizeToken::from_key(key) {
        if token.orientation() != template.orientation {
            trace_warn!(
                "catalog_orientation_mismatch",
                key = key,
                token = token.as_str(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{quad_from_labeled, RawLabeledPoint};

    fn labeled(label: &str, x: f64, y: f64) -> RawLabeledPoint {
        RawLabeledPoint {
            label: label.to_string(),
            x,
            y,
        }
    }

    #[test]
    fn labeled_points_are_reordered() {
        let quad = quad_from_labeled(&[
            labeled("bottomLeft", 0.0, 10.0),
            labeled("topRight", 10.0, 0.0),
            labeled("topLeft", 0.0, 0.0),
            labeled("bottomRight", 10.0, 10.0),
        ])
        .unwrap();
        assert_eq!(quad.top_left.x, 0.0);
        assert_eq!(quad.top_right.x, 10.0);
        assert_eq!(quad.bottom_right.y, 10.0);
        assert_eq!(quad.bottom_left.y, 10.0);
    }

    #[test]
    fn duplicate_or_missing_labels_are_rejected() {
        assert!(quad_from_labeled(&[
            labeled("topLeft", 0.0, 0.0),
            labeled("topLeft", 10.0, 0.0),
            labeled("bottomRight", 10.0, 10.0),
            labeled("bottomLeft", 0.0, 10.0),
        ])
        .is_none());
        assert!(quad_from_labeled(&[
            labeled("topLeft", 0.0, 0.0),
            labeled("topRight", 10.0, 0.0),
            labeled("bottomRight", 10.0, 10.0),
        ])
        .is_none());
        assert!(quad_from_labeled(&[
            labeled("topLeft", 0.0, 0.0),
            labeled("topRight", 10.0, 0.0),
            labeled("center", 5.0, 5.0),
            labeled("bottomLeft", 0.0, 10.0),
        ])
        .is_none());
    }
}
