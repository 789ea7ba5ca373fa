//! Byte sources for user photos and frame artwork.
//!
//! Both images are fetched and decoded per invocation; decoded buffers are
//! owned by the caller's stack frame and released on every exit path.

use crate::util::{FrameFitError, FrameFitResult};
use image::{ImageReader, RgbaImage};
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::{self, Cursor};
use std::path::{Component, Path, PathBuf};

/// Something that can hand out encoded image bytes by key.
pub trait AssetSource: Send + Sync {
    /// Fetches the encoded bytes stored under `key`.
    fn fetch(&self, key: &str) -> io::Result<Vec<u8>>;
}

/// Serves assets from files below a base directory.
#[derive(Clone, Debug)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    /// Creates a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Base directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for DirSource {
    fn fetch(&self, key: &str) -> io::Result<Vec<u8>> {
        let rel = Path::new(key);
        if !rel
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("asset key escapes the base directory: {key}"),
            ));
        }
        std::fs::read(self.root.join(rel))
    }
}

/// Serves assets from memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    assets: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the bytes for `key`.
    pub fn insert(&mut self, key: impl Into<String>, bytes: Vec<u8>) {
        self.assets.insert(key.into(), bytes);
    }

    /// Builder-style [`MemorySource::insert`].
    pub fn with_asset(mut self, key: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(key, bytes);
        self
    }
}

impl AssetSource for MemorySource {
    fn fetch(&self, key: &str) -> io::Result<Vec<u8>> {
        self.assets.get(key).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no asset named {key}"))
        })
    }
}

/// Where the user photo comes from.
#[derive(Clone, Copy)]
pub enum PhotoSource<'a> {
    /// Already-fetched encoded bytes.
    Bytes(&'a [u8]),
    /// Bytes fetched from `source` under `key`.
    Asset {
        source: &'a dyn AssetSource,
        key: &'a str,
    },
}

impl PhotoSource<'_> {
    fn bytes(&self) -> FrameFitResult<Cow<'_, [u8]>> {
        match self {
            Self::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
            Self::Asset { source, key } => source
                .fetch(key)
                .map(Cow::Owned)
                .map_err(|err| FrameFitError::PhotoUnavailable {
                    reason: format!("{key}: {err}"),
                }),
        }
    }
}

/// Reads the photo's natural pixel dimensions without decoding pixels.
pub fn probe_dimensions(photo: &PhotoSource<'_>) -> FrameFitResult<(u32, u32)> {
    let bytes = photo.bytes()?;
    let photo_err = |reason: String| FrameFitError::PhotoUnavailable { reason };
    ImageReader::new(Cursor::new(bytes.as_ref()))
        .with_guessed_format()
        .map_err(|err| photo_err(err.to_string()))?
        .into_dimensions()
        .map_err(|err| photo_err(format!("decode: {err}")))
}

pub(crate) fn load_photo(photo: &PhotoSource<'_>) -> FrameFitResult<RgbaImage> {
    let bytes = photo.bytes()?;
    let img = image::load_from_memory(&bytes).map_err(|err| FrameFitError::PhotoUnavailable {
        reason: format!("decode: {err}"),
    })?;
    Ok(img.to_rgba8())
}

pub(crate) fn load_artwork(source: &dyn AssetSource, key: &str) -> FrameFitResult<RgbaImage> {
    let artwork_err = |reason: String| FrameFitError::ArtworkUnavailable {
        key: key.to_string(),
        reason,
    };
    let bytes = source.fetch(key).map_err(|err| artwork_err(err.to_string()))?;
    let img = image::load_from_memory(&bytes).map_err(|err| artwork_err(format!("decode: {err}")))?;
    Ok(img.to_rgba8())
}
