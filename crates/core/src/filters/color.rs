//! Per-pixel colour filters. Every filter works in place on RGBA8 data and
//! leaves the alpha channel untouched.
use crate::{frame::CHANNELS, Result, VisualiserError};

const LUMA_R: f32 = 0.2126;
const LUMA_G: f32 = 0.7152;
const LUMA_B: f32 = 0.0722;

pub const MIN_POSTERIZE_LEVELS: u32 = 2;
pub const MAX_POSTERIZE_LEVELS: u32 = 255;

/// Binarises the frame: pixels whose luma reaches `level` become white,
/// everything else black. `level` is expressed in `[0, 1]`.
pub fn threshold(pixels: &mut [u8], level: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&level) {
        return Err(VisualiserError::InvalidInput(
            "threshold level must lie within [0, 1]",
        ));
    }

    let cutoff = (level * 255.0).floor();
    for px in pixels.chunks_exact_mut(CHANNELS) {
        let luma = LUMA_R * px[0] as f32 + LUMA_G * px[1] as f32 + LUMA_B * px[2] as f32;
        let value = if luma >= cutoff { 255 } else { 0 };
        px[..3].fill(value);
    }
    Ok(())
}

/// Replaces every colour sample with its complement.
pub fn invert(pixels: &mut [u8]) {
    for px in pixels.chunks_exact_mut(CHANNELS) {
        for sample in &mut px[..3] {
            *sample = 255 - *sample;
        }
    }
}

/// Reduces each colour channel to `levels` evenly spaced values.
pub fn posterize(pixels: &mut [u8], levels: u32) -> Result<()> {
    if !(MIN_POSTERIZE_LEVELS..=MAX_POSTERIZE_LEVELS).contains(&levels) {
        return Err(VisualiserError::InvalidInput(
            "posterize levels must lie within [2, 255]",
        ));
    }

    let table = posterize_table(levels);
    for px in pixels.chunks_exact_mut(CHANNELS) {
        for sample in &mut px[..3] {
            *sample = table[*sample as usize];
        }
    }
    Ok(())
}

fn posterize_table(levels: u32) -> [u8; 256] {
    let step = (levels - 1) as f32;
    let mut table = [0u8; 256];
    for (value, slot) in table.iter_mut().enumerate() {
        let bucket = (value as u32 * levels) >> 8;
        *slot = ((bucket * 255) as f32 / step).round_ties_even().min(255.0) as u8;
    }
    table
}
