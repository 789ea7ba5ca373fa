//! Framefit fits a photo into framed-print templates.
//!
//! The crate ranks catalog frame sizes against a photo's aspect ratio,
//! describes how the photo sits inside each frame's artwork (an axis-aligned
//! window or a perspective-warped quad), and flattens photo plus artwork into
//! an encoded still image. Loads can run in parallel via the `rayon` feature;
//! spans and events are emitted via the `tracing` feature.

pub mod catalog;
pub mod compositor;
pub mod geometry;
pub mod lowlevel;
pub mod matcher;
pub mod overlay;
pub mod preview;
mod trace;
pub mod util;

pub use catalog::{
    CatalogCache, CatalogLoader, FrameCatalog, FrameTemplate, FrameWindow, JsonFileLoader,
    Orientation, RectWindow, MAX_IMAGE_SIDE,
};
pub use compositor::{
    probe_dimensions, AssetSource, CancelToken, CompositeConfig, CompositeImage, CompositeOutcome,
    Compositor, DirSource, MemorySource, OutputFormat, PhotoSource,
};
pub use geometry::homography::Homography;
pub use geometry::{BoundingBox, Point, Quad};
pub use matcher::{
    fit_score, match_frame_sizes, reduced_aspect, AspectRatio, FrameMatcher, MatchCandidate,
    MatchConfig, SizeToken,
};
pub use overlay::{
    build_overlay, try_build_overlay, CssRect, OverlayDescriptor, PercentRect, PerspectiveOverlay,
};
pub use preview::{generate_previews, Preview, PreviewConfig, PreviewPipeline};
pub use util::{FrameFitError, FrameFitResult};

