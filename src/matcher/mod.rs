//! Frame-size matching for a photo's pixel dimensions.
//!
//! Every catalog template with the photo's orientation and a parsable size
//! token is scored by aspect-ratio and area deviation; templates that share
//! a token collapse to their best-scoring variant, and the lowest `top_n`
//! scores are returned.

mod rank;
mod size;

pub use size::SizeToken;

use crate::catalog::{FrameCatalog, FrameTemplate, Orientation};
use crate::overlay::{build_overlay, OverlayDescriptor};
use crate::trace::{trace_event, trace_span};
use crate::util::math::gcd;
use serde::Serialize;

/// Weight of the aspect-ratio deviation term.
pub const RATIO_WEIGHT: f64 = 100.0;
/// Weight of the log-area deviation term.
pub const SCALE_WEIGHT: f64 = 10.0;
/// Default number of candidates returned.
pub const DEFAULT_TOP_N: usize = 4;

/// Configuration for frame matching.
#[derive(Clone, Copy, Debug)]
pub struct MatchConfig {
    /// Maximum number of candidates returned.
    pub top_n: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// A ranked frame template for one photo.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchCandidate {
    /// Nominal size shared by all variants of this template.
    pub size_token: SizeToken,
    /// Fit score; lower is better.
    pub score: f64,
    /// Catalog key of the winning variant.
    pub template_key: String,
    /// The winning variant.
    pub template: FrameTemplate,
}

impl MatchCandidate {
    /// Builds the overlay descriptor for this candidate's template.
    pub fn overlay(&self) -> OverlayDescriptor {
        build_overlay(&self.template_key, &self.template)
    }
}

/// A photo's aspect ratio reduced by the greatest common divisor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
    pub ratio: f64,
}

/// Reduces `width:height` to lowest terms, e.g. `4000x3000` to `4:3`.
///
/// Returns `None` for zero dimensions.
pub fn reduced_aspect(width: u32, height: u32) -> Option<AspectRatio> {
    if width == 0 || height == 0 {
        return None;
    }
    let divisor = gcd(width, height);
    Some(AspectRatio {
        width: width / divisor,
        height: height / divisor,
        ratio: f64::from(width) / f64::from(height),
    })
}

/// Scores how well a nominal frame size fits a photo; lower is better.
///
/// `100 * |photo_ratio - frame_ratio| + 10 * |ln(frame_area / photo_area)|`.
pub fn fit_score(photo_width: u32, photo_height: u32, size: &SizeToken) -> f64 {
    let photo_ratio = f64::from(photo_width) / f64::from(photo_height);
    let ratio_diff = (photo_ratio - size.ratio()).abs();
    let photo_area = f64::from(photo_width) * f64::from(photo_height);
    let scale_diff = (size.area() / photo_area).ln().abs();
    ratio_diff * RATIO_WEIGHT + scale_diff * SCALE_WEIGHT
}

/// Ranks catalog templates against a photo.
pub struct FrameMatcher<'a> {
    catalog: &'a FrameCatalog,
    cfg: MatchConfig,
}

impl<'a> FrameMatcher<'a> {
    /// Creates a matcher with default configuration.
    pub fn new(catalog: &'a FrameCatalog) -> Self {
        Self {
            catalog,
            cfg: MatchConfig::default(),
        }
    }

    /// Replaces the matcher configuration.
    pub fn with_config(mut self, cfg: MatchConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Returns up to `top_n` candidates in ascending score order.
    ///
    /// An empty result means no template fits; it is not an error.
    pub fn match_photo(&self, width: u32, height: u32) -> Vec<MatchCandidate> {
        let _span = trace_span!("match_frame_sizes", width = width, height = height).entered();
        if width == 0 || height == 0 || self.cfg.top_n == 0 {
            return Vec::new();
        }

        let orientation = Orientation::classify(width, height);
        let scored: Vec<MatchCandidate> = self
            .catalog
            .iter()
            .filter(|(_, tpl)| tpl.orientation == orientation)
            .filter_map(|(key, tpl)| {
                let size_token = SizeToken::from_key(key)?;
                let score = fit_score(width, height, &size_token);
                Some(MatchCandidate {
                    size_token,
                    score,
                    template_key: key.to_string(),
                    template: tpl.clone(),
                })
            })
            .collect();

        let ranked = rank::rank_ascending(rank::dedup_by_token(scored), self.cfg.top_n);
        trace_event!("match_candidates", count = ranked.len());
        ranked
    }
}

/// Convenience wrapper over [`FrameMatcher`].
pub fn match_frame_sizes(
    photo_width: u32,
    photo_height: u32,
    catalog: &FrameCatalog,
    top_n: usize,
) -> Vec<MatchCandidate> {
    FrameMatcher::new(catalog)
        .with_config(MatchConfig { top_n })
        .match_photo(photo_width, photo_height)
}
