//! Flattened composites: the user photo clipped into a frame window with the
//! frame artwork drawn on top.
//!
//! Each call owns its decoded images and canvas, so abandoned or failed
//! calls never leak state into later ones. The photo and artwork loads are
//! independent and run under `rayon::join` when the `rayon` feature is
//! enabled and [`CompositeConfig::parallel`] is set.

mod encode;
mod raster;
mod source;

pub use encode::{CompositeImage, OutputFormat, DEFAULT_JPEG_QUALITY};
pub use source::{probe_dimensions, AssetSource, DirSource, MemorySource, PhotoSource};

use crate::catalog::FrameTemplate;
use crate::matcher::{MatchCandidate, SizeToken};
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{FrameFitError, FrameFitResult};
use image::RgbaImage;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use raster::ClipRegion;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Configuration for compositing.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompositeConfig {
    /// Encoded output format.
    pub format: OutputFormat,
    /// Run loads and batch members in parallel (requires the `rayon` feature).
    pub parallel: bool,
}

/// Shared flag that lets a caller abandon in-flight composites.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates an untriggered token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of every composite holding this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// True once [`CancelToken::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Result of compositing one candidate inside a batch.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeOutcome {
    pub size_token: SizeToken,
    pub template_key: String,
    pub result: FrameFitResult<CompositeImage>,
}

/// Renders composites using frame artwork from an [`AssetSource`].
pub struct Compositor<'a> {
    artwork: &'a dyn AssetSource,
    cfg: CompositeConfig,
    cancel: Option<CancelToken>,
}

impl<'a> Compositor<'a> {
    /// Creates a compositor fetching artwork by template key from `artwork`.
    pub fn new(artwork: &'a dyn AssetSource) -> Self {
        Self {
            artwork,
            cfg: CompositeConfig::default(),
            cancel: None,
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, cfg: CompositeConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Attaches a cancellation token.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &CompositeConfig {
        &self.cfg
    }

    /// Composites the photo into one template and encodes the result.
    ///
    /// The canvas size and window geometry are validated before anything is
    /// fetched or drawn.
    /// Load failures are reported as [`FrameFitError::PhotoUnavailable`] or
    /// [`FrameFitError::ArtworkUnavailable`].
    pub fn composite(
        &self,
        photo: &PhotoSource<'_>,
        template_key: &str,
        template: &FrameTemplate,
    ) -> FrameFitResult<CompositeImage> {
        let _span = trace_span!("composite", key = template_key).entered();
        let clip = ClipRegion::for_template(template_key, template)?;
        self.check_cancelled()?;

        let (photo_img, artwork) = self.join(
            || source::load_photo(photo),
            || source::load_artwork(self.artwork, template_key),
        );
        let photo_img = photo_img?;
        let artwork = artwork?;
        self.finish(&photo_img, &artwork, template, &clip)
    }

    /// Renders only the photo, clipped to the template's window, on a
    /// transparent canvas the size of the artwork.
    ///
    /// This is the bottom layer of a live preview that stacks the artwork on
    /// top separately, so no artwork is fetched. JPEG output flattens the
    /// area outside the window to black; [`OutputFormat::Png`] keeps it
    /// transparent.
    pub fn clip_photo(
        &self,
        photo: &PhotoSource<'_>,
        template_key: &str,
        template: &FrameTemplate,
    ) -> FrameFitResult<CompositeImage> {
        let _span = trace_span!("clip_photo", key = template_key).entered();
        let clip = ClipRegion::for_template(template_key, template)?;
        self.check_cancelled()?;
        let photo_img = source::load_photo(photo)?;
        self.check_cancelled()?;
        let canvas = raster::render_photo_layer(&photo_img, template, &clip);
        self.encode_canvas(canvas)
    }

    /// Composites the photo into every candidate.
    ///
    /// The photo is decoded once. Each candidate succeeds or fails on its
    /// own; a bad artwork never aborts its siblings. Outcomes are returned
    /// in candidate order and carry their size token.
    pub fn composite_batch(
        &self,
        photo: &PhotoSource<'_>,
        candidates: &[MatchCandidate],
    ) -> Vec<CompositeOutcome> {
        let _span = trace_span!("composite_batch", candidates = candidates.len()).entered();
        let prepare = |c: &MatchCandidate| -> FrameFitResult<(ClipRegion, RgbaImage)> {
            let clip = ClipRegion::for_template(&c.template_key, &c.template)?;
            let artwork = source::load_artwork(self.artwork, &c.template_key)?;
            Ok((clip, artwork))
        };
        let (photo_img, prepared) = self.join(
            || source::load_photo(photo),
            || self.map_jobs(candidates.iter().collect(), prepare),
        );

        let jobs: Vec<_> = candidates.iter().zip(prepared).collect();
        let outcomes = self.map_jobs(jobs, |(candidate, ready)| {
            let result = photo_img
                .as_ref()
                .map_err(Clone::clone)
                .and_then(|photo| {
                    let (clip, artwork) = ready?;
                    self.finish(photo, &artwork, &candidate.template, &clip)
                });
            if let Err(err) = &result {
                let reason = err.to_string();
                trace_warn!(
                    "composite_candidate_failed",
                    key = candidate.template_key.as_str(),
                    reason = reason.as_str(),
                );
            }
            CompositeOutcome {
                size_token: candidate.size_token.clone(),
                template_key: candidate.template_key.clone(),
                result,
            }
        });

        trace_event!(
            "composite_batch_done",
            succeeded = outcomes.iter().filter(|o| o.result.is_ok()).count(),
        );
        outcomes
    }

    fn finish(
        &self,
        photo: &RgbaImage,
        artwork: &RgbaImage,
        template: &FrameTemplate,
        clip: &ClipRegion,
    ) -> FrameFitResult<CompositeImage> {
        self.check_cancelled()?;
        let canvas = raster::render(photo, artwork, template, clip);
        self.encode_canvas(canvas)
    }

    fn encode_canvas(&self, canvas: RgbaImage) -> FrameFitResult<CompositeImage> {
        self.check_cancelled()?;
        let image = encode::encode(canvas, self.cfg.format)?;
        trace_event!("composite_encoded", bytes = image.bytes.len());
        Ok(image)
    }

    fn check_cancelled(&self) -> FrameFitResult<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(FrameFitError::Cancelled),
            _ => Ok(()),
        }
    }

    #[cfg(feature = "rayon")]
    fn join<A, B, RA, RB>(&self, a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        if self.cfg.parallel {
            rayon::join(a, b)
        } else {
            (a(), b())
        }
    }

    #[cfg(not(feature = "rayon"))]
    fn join<A, B, RA, RB>(&self, a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        (a(), b())
    }

    #[cfg(feature = "rayon")]
    fn map_jobs<J, T, F>(&self, jobs: Vec<J>, f: F) -> Vec<T>
    where
        J: Send,
        T: Send,
        F: Fn(J) -> T + Send + Sync,
    {
        if self.cfg.parallel {
            jobs.into_par_iter().map(f).collect()
        } else {
            jobs.into_iter().map(f).collect()
        }
    }

    #[cfg(not(feature = "rayon"))]
    fn map_jobs<J, T, F>(&self, jobs: Vec<J>, f: F) -> Vec<T>
    where
        J: Send,
        T: Send,
        F: Fn(J) -> T + Send + Sync,
    {
        jobs.into_iter().map(f).collect()
    }
}
