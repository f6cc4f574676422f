//! Image acceptance checks
//!
//! Pure, stateless validation of a captured image against size, resolution
//! and format rules. Runs before fingerprinting; a rejected image is never
//! hashed.

use std::fmt;
use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Accepted image container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Jpeg,
    Png,
    Webp,
}

impl ImageKind {
    /// MIME type for upload parts
    pub fn mime(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::Webp => "image/webp",
        }
    }

    /// File extension for locally stored images
    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
            ImageKind::Webp => "webp",
        }
    }

    fn from_image_format(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Jpeg => Some(ImageKind::Jpeg),
            image::ImageFormat::Png => Some(ImageKind::Png),
            image::ImageFormat::WebP => Some(ImageKind::Webp),
            _ => None,
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Rejection reason, carried to the operator for retake messaging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    TooSmall,
    TooLarge,
    LowResolution,
    BadFormat,
}

impl RejectReason {
    /// Stable reason code for user-facing messaging
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::TooSmall => "too_small",
            RejectReason::TooLarge => "too_large",
            RejectReason::LowResolution => "low_resolution",
            RejectReason::BadFormat => "bad_format",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Measurable properties of a candidate image
///
/// `format` is `None` when the container was recognized but is not an
/// accepted kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageCandidate {
    pub byte_size: u64,
    pub width: u32,
    pub height: u32,
    pub format: Option<ImageKind>,
}

/// Acceptance limits applied to every captured image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceptanceLimits {
    /// Inclusive lower bound on encoded size in bytes
    pub min_bytes: u64,
    /// Exclusive upper bound on encoded size in bytes
    pub max_bytes: u64,
    /// Minimum width in pixels
    pub min_width: u32,
    /// Minimum height in pixels
    pub min_height: u32,
}

impl Default for AcceptanceLimits {
    fn default() -> Self {
        Self {
            min_bytes: 500 * 1024,
            max_bytes: 8 * 1024 * 1024,
            min_width: 800,
            min_height: 600,
        }
    }
}

impl AcceptanceLimits {
    /// Validate a candidate. Each rule is enforced independently; the first
    /// violated rule is reported.
    pub fn check(&self, candidate: &ImageCandidate) -> std::result::Result<(), RejectReason> {
        if candidate.format.is_none() {
            return Err(RejectReason::BadFormat);
        }
        if candidate.byte_size < self.min_bytes {
            return Err(RejectReason::TooSmall);
        }
        if candidate.byte_size >= self.max_bytes {
            return Err(RejectReason::TooLarge);
        }
        if candidate.width < self.min_width || candidate.height < self.min_height {
            return Err(RejectReason::LowResolution);
        }
        Ok(())
    }
}

/// Derive an [`ImageCandidate`] from raw frame bytes.
///
/// Reads only the container header (no full decode). Content that is not
/// recognizable as an image probes as `bad_format`.
pub fn probe(bytes: &[u8]) -> Result<ImageCandidate> {
    let format =
        image::guess_format(bytes).map_err(|_| Error::Validation(RejectReason::BadFormat))?;
    let kind = ImageKind::from_image_format(format);

    let reader = image::io::Reader::with_format(Cursor::new(bytes), format);
    let (width, height) = reader
        .into_dimensions()
        .map_err(|_| Error::Validation(RejectReason::BadFormat))?;

    Ok(ImageCandidate {
        byte_size: bytes.len() as u64,
        width,
        height,
        format: kind,
    })
}
