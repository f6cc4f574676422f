//! Shared test helpers: deterministic frame generation

#![allow(dead_code)]

use std::io::Cursor;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use avs_capture::frame::RawFrame;

/// Deterministic noise PNG.
///
/// Random pixel data barely compresses, so an 800x600 RGB frame encodes to
/// roughly 1.4 MiB — comfortably inside the default [500 KiB, 8 MiB)
/// acceptance window. Different seeds give different bytes, hence different
/// fingerprints.
pub fn noise_png(seed: u64, width: u32, height: u32) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut img = image::RgbImage::new(width, height);
    for pixel in img.pixels_mut() {
        *pixel = image::Rgb([rng.gen(), rng.gen(), rng.gen()]);
    }

    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
        .unwrap();
    bytes
}

/// A valid, acceptance-passing frame unique to the seed
pub fn frame(seed: u64) -> RawFrame {
    RawFrame {
        bytes: noise_png(seed, 800, 600),
        source: format!("frame_{:02}.png", seed),
    }
}
