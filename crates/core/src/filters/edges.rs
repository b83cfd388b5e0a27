//! Sobel edge detection over interleaved RGBA8 frames.
//!
//! - Brightness of a pixel is the unweighted mean of its R, G and B samples.
//! - Convolves the brightness plane with the Sobel kernel pair and writes
//!   `min(sqrt(gx^2 + gy^2), 255)` into R, G and B. Alpha is never written.
//! - All reads come from a brightness snapshot taken before the write pass,
//!   so already-written neighbours never feed back into the convolution.
//!
//! Complexity: O(W·H); memory: one `i32` per pixel of scratch.
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    frame::{frame_len, CHANNELS},
    VisualiserError,
};

type Kernel3 = [[i32; 3]; 3];

/// Horizontal gradient weights (responds to vertical edges).
pub const SOBEL_KERNEL_X: Kernel3 = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
/// Vertical gradient weights (responds to horizontal edges).
pub const SOBEL_KERNEL_Y: Kernel3 = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// How pixels on the outer one-pixel ring are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeBorder {
    /// Border pixels keep their original colour; only the interior is
    /// convolved. Frames narrower or shorter than 3 pixels are left as is.
    #[default]
    Untouched,
    /// Border pixels are convolved too, sampling clamped (replicated)
    /// neighbours outside the frame.
    Replicate,
}

impl FromStr for EdgeBorder {
    type Err = VisualiserError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "untouched" => Ok(Self::Untouched),
            "replicate" => Ok(Self::Replicate),
            _ => Err(VisualiserError::InvalidInput(
                "edge border must be `untouched` or `replicate`",
            )),
        }
    }
}

/// Runs Sobel edge detection in place, leaving the border ring untouched.
///
/// # Panics
/// If `pixels.len() != width * height * 4` or that product overflows.
pub fn detect_edges(pixels: &mut [u8], width: usize, height: usize) {
    detect_edges_with_border(pixels, width, height, EdgeBorder::Untouched);
}

/// Runs Sobel edge detection in place with an explicit border policy.
///
/// # Panics
/// If `pixels.len() != width * height * 4` or that product overflows.
pub fn detect_edges_with_border(
    pixels: &mut [u8],
    width: usize,
    height: usize,
    border: EdgeBorder,
) {
    assert_eq!(
        Some(pixels.len()),
        frame_len(width, height),
        "pixel buffer length does not match a {width}x{height} RGBA frame"
    );

    let (x_range, y_range) = match border {
        EdgeBorder::Untouched => {
            if width < 3 || height < 3 {
                return;
            }
            (1..width - 1, 1..height - 1)
        }
        EdgeBorder::Replicate => {
            if width == 0 || height == 0 {
                return;
            }
            (0..width, 0..height)
        }
    };

    tracing::trace!(width, height, ?border, "sobel edge detection");

    // Sums of R+G+B, i.e. three times the brightness. Dividing once at the
    // end keeps the convolution exact.
    let sums = brightness_sums(pixels);

    for y in y_range {
        let rows = [y.saturating_sub(1), y, (y + 1).min(height - 1)];
        for x in x_range.clone() {
            let cols = [x.saturating_sub(1), x, (x + 1).min(width - 1)];

            let mut gx = 0i32;
            let mut gy = 0i32;
            for (ky, &yy) in rows.iter().enumerate() {
                let row = &sums[yy * width..(yy + 1) * width];
                for (kx, &xx) in cols.iter().enumerate() {
                    let sample = row[xx];
                    gx += sample * SOBEL_KERNEL_X[ky][kx];
                    gy += sample * SOBEL_KERNEL_Y[ky][kx];
                }
            }

            let value = gradient_to_channel(gx, gy);
            let offset = (y * width + x) * CHANNELS;
            pixels[offset..offset + 3].fill(value);
        }
    }
}

fn brightness_sums(pixels: &[u8]) -> Vec<i32> {
    pixels
        .chunks_exact(CHANNELS)
        .map(|px| px[0] as i32 + px[1] as i32 + px[2] as i32)
        .collect()
}

/// Converts gradients of channel sums to a clamped, rounded channel value.
#[inline]
fn gradient_to_channel(gx: i32, gy: i32) -> u8 {
    let (gx, gy) = (gx as f64, gy as f64);
    let magnitude = (gx * gx + gy * gy).sqrt() / 3.0;
    magnitude.clamp(0.0, 255.0).round_ties_even() as u8
}
