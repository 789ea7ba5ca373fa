//! Error types for framefit.

use thiserror::Error;

/// Result alias for framefit operations.
pub type FrameFitResult<T> = std::result::Result<T, FrameFitError>;

/// Errors that can occur while matching, building overlays, or compositing.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FrameFitError {
    /// Image or canvas dimensions are zero or otherwise unusable.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    /// The frame catalog could not be parsed or contains an unusable entry.
    #[error("invalid catalog: {reason}")]
    InvalidCatalog { reason: String },
    /// The photo window collapses (collinear corners, empty bounding box,
    /// or a transform with non-finite entries).
    #[error("degenerate geometry: {reason}")]
    DegenerateGeometry { reason: &'static str },
    /// The template carries neither a usable quad nor a usable rectangle.
    #[error("template {key} has no usable photo window")]
    MissingWindowData { key: String },
    /// The user photo could not be fetched or decoded.
    #[error("photo unavailable: {reason}")]
    PhotoUnavailable { reason: String },
    /// The frame artwork could not be fetched or decoded.
    #[error("frame artwork {key} unavailable: {reason}")]
    ArtworkUnavailable { key: String, reason: String },
    /// The finished canvas could not be encoded.
    #[error("encode failed: {reason}")]
    Encode { reason: String },
    /// The caller abandoned the operation.
    #[error("operation cancelled")]
    Cancelled,
}

impl FrameFitError {
    /// Returns true when the failure came from one of the two image sources.
    pub fn is_asset_error(&self) -> bool {
        matches!(
            self,
            Self::PhotoUnavailable { .. } | Self::ArtworkUnavailable { .. }
        )
    }
}
