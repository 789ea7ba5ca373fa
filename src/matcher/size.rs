//! Nominal frame sizes parsed from catalog keys.

use crate::catalog::Orientation;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

fn size_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d+)x(\d+)").expect("size pattern is valid"))
}

/// A `WxH` size token such as `16x20`, independent of material or color.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(into = "String")]
pub struct SizeToken {
    text: String,
    width: u32,
    height: u32,
}

impl SizeToken {
    /// Extracts the first `digits x digits` token from the last path segment
    /// of `key`.
    ///
    /// Returns `None` when no token is present or either side is zero or
    /// does not fit in a `u32`.
    pub fn from_key(key: &str) -> Option<Self> {
        let filename = key.rsplit('/').next().unwrap_or(key);
        let caps = size_pattern().captures(filename)?;
        let width: u32 = caps[1].parse().ok()?;
        let height: u32 = caps[2].parse().ok()?;
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            text: caps[0].to_string(),
            width,
            height,
        })
    }

    /// Token text exactly as it appears in the key.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Nominal width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Nominal height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width over height.
    pub fn ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Nominal area, `width * height`.
    pub fn area(&self) -> f64 {
        f64::from(self.width) * f64::from(self.height)
    }

    /// Orientation implied by the nominal size.
    pub fn orientation(&self) -> Orientation {
        Orientation::classify(self.width, self.height)
    }
}

impl fmt::Display for SizeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<SizeToken> for String {
    fn from(value: SizeToken) -> Self {
        value.text
    }
}
