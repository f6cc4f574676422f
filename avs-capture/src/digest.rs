//! Content digest for exact-duplicate detection
//!
//! Calculates the SHA-256 hash of the encoded image bytes. This is a
//! content-addressed exact digest, not a perceptual hash: two re-encodings
//! of the same photo produce different fingerprints by design.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Hex-encoded SHA-256 fingerprint of an image's bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the content fingerprint of a captured image.
///
/// Deterministic and side-effect free: identical bytes always yield the
/// identical fingerprint, any byte difference a different one. Input that
/// cannot be recognized as image content yields a digest error.
pub fn fingerprint(bytes: &[u8]) -> Result<Fingerprint> {
    if image::guess_format(bytes).is_err() {
        return Err(Error::Digest(
            "input is not recognizable image content".to_string(),
        ));
    }

    let hash = Sha256::digest(bytes);
    Ok(Fingerprint(format!("{:x}", hash)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(shade: u8) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([shade, shade, shade]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_fingerprint_deterministic() {
        let bytes = png_bytes(128);
        let a = fingerprint(&bytes).unwrap();
        let b = fingerprint(&bytes).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_hex().len(), 64);
    }

    #[test]
    fn test_fingerprint_matches_sha256_of_bytes() {
        let bytes = png_bytes(7);
        let fp = fingerprint(&bytes).unwrap();
        let expected = format!("{:x}", Sha256::digest(&bytes));
        assert_eq!(fp.as_hex(), expected);
    }

    #[test]
    fn test_different_content_different_fingerprint() {
        let a = fingerprint(&png_bytes(0)).unwrap();
        let b = fingerprint(&png_bytes(255)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_undecodable_input_is_digest_error() {
        let err = fingerprint(b"not an image").unwrap_err();
        assert!(matches!(err, Error::Digest(_)));
    }
}
