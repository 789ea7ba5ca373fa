//! End-to-end preview generation for one photo.
//!
//! Matches the photo against the catalog, builds each candidate's overlay
//! descriptor for live layered previews, and composites each candidate into
//! a flattened image. Candidates are independent: one failing artwork only
//! marks its own preview as failed.

use crate::catalog::FrameCatalog;
use crate::compositor::{
    probe_dimensions, AssetSource, CancelToken, CompositeConfig, CompositeImage, Compositor,
    PhotoSource,
};
use crate::matcher::{FrameMatcher, MatchConfig, SizeToken};
use crate::overlay::{build_overlay, OverlayDescriptor};
use crate::trace::{trace_event, trace_span};
use crate::util::FrameFitResult;

/// Combined matching and compositing configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct PreviewConfig {
    pub matching: MatchConfig,
    pub composite: CompositeConfig,
}

/// One ranked frame option for the photo.
#[derive(Clone, Debug, PartialEq)]
pub struct Preview {
    pub size_token: SizeToken,
    pub template_key: String,
    pub score: f64,
    /// Placement data for a layered preview.
    pub overlay: OverlayDescriptor,
    /// Flattened composite, or why it could not be produced.
    pub outcome: FrameFitResult<CompositeImage>,
}

impl Preview {
    /// True when the overlay warps the photo into a tilted window.
    pub fn is_perspective(&self) -> bool {
        self.overlay.is_perspective()
    }
}

/// Preview generation bound to an artwork source.
pub struct PreviewPipeline<'a> {
    artwork: &'a dyn AssetSource,
    cfg: PreviewConfig,
    cancel: Option<CancelToken>,
}

impl<'a> PreviewPipeline<'a> {
    /// Creates a pipeline with default configuration.
    pub fn new(artwork: &'a dyn AssetSource) -> Self {
        Self {
            artwork,
            cfg: PreviewConfig::default(),
            cancel: None,
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, cfg: PreviewConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Attaches a cancellation token passed on to the compositor.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Generates previews for the best-fitting frame sizes.
    ///
    /// `dimensions` skips probing when the caller already knows the photo's
    /// pixel size. Fails only when the dimensions have to be probed and the
    /// photo cannot be read; an empty result means no frame fits.
    pub fn run(
        &self,
        photo: &PhotoSource<'_>,
        dimensions: Option<(u32, u32)>,
        catalog: &FrameCatalog,
    ) -> FrameFitResult<Vec<Preview>> {
        let _span = trace_span!("generate_previews").entered();
        let (width, height) = match dimensions.filter(|(w, h)| *w > 0 && *h > 0) {
            Some(dims) => dims,
            None => probe_dimensions(photo)?,
        };

        let candidates = FrameMatcher::new(catalog)
            .with_config(self.cfg.matching)
            .match_photo(width, height);
        if candidates.is_empty() {
            trace_event!("no_frame_candidates", width = width, height = height);
            return Ok(Vec::new());
        }

        let mut compositor = Compositor::new(self.artwork).with_config(self.cfg.composite);
        if let Some(token) = &self.cancel {
            compositor = compositor.with_cancel_token(token.clone());
        }
        let outcomes = compositor.composite_batch(photo, &candidates);

        let previews: Vec<Preview> = candidates
            .into_iter()
            .zip(outcomes)
            .map(|(candidate, outcome)| Preview {
                overlay: build_overlay(&candidate.template_key, &candidate.template),
                size_token: candidate.size_token,
                template_key: candidate.template_key,
                score: candidate.score,
                outcome: outcome.result,
            })
            .collect();
        trace_event!(
            "previews_ready",
            total = previews.len(),
            perspective = previews.iter().filter(|p| p.is_perspective()).count(),
        );
        Ok(previews)
    }
}

/// Convenience wrapper over [`PreviewPipeline`].
pub fn generate_previews(
    photo: &PhotoSource<'_>,
    dimensions: Option<(u32, u32)>,
    catalog: &FrameCatalog,
    artwork: &dyn AssetSource,
    cfg: PreviewConfig,
) -> FrameFitResult<Vec<Preview>> {
    PreviewPipeline::new(artwork)
        .with_config(cfg)
        .run(photo, dimensions, catalog)
}
