use crate::{filters::edges::EdgeBorder, Result, VisualiserError};

/// Number of interleaved samples per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

/// Byte length of a `width` x `height` RGBA8 frame, or `None` on overflow.
pub(crate) fn frame_len(width: usize, height: usize) -> Option<usize> {
    width.checked_mul(height)?.checked_mul(CHANNELS)
}

fn expect_frame_len(width: usize, height: usize) -> usize {
    frame_len(width, height)
        .unwrap_or_else(|| panic!("a {width}x{height} RGBA frame overflows usize"))
}

/// A single RGBA8 video frame stored as a flat, row-major pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl FrameBuffer {
    /// Creates a frame filled with transparent black.
    ///
    /// # Panics
    /// If the byte length of the frame overflows `usize`.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: vec![0u8; expect_frame_len(width, height)],
            width,
            height,
        }
    }

    /// Creates a frame where every pixel holds `rgba`.
    ///
    /// # Panics
    /// If the byte length of the frame overflows `usize`.
    pub fn solid(width: usize, height: usize, rgba: [u8; 4]) -> Self {
        let len = expect_frame_len(width, height);
        let mut data = Vec::with_capacity(len);
        for _ in 0..len / CHANNELS {
            data.extend_from_slice(&rgba);
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Wraps raw RGBA8 data, checking that its length matches the dimensions.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let expected = frame_len(width, height)
            .ok_or(VisualiserError::InvalidInput("frame dimensions overflow usize"))?;
        if data.len() != expected {
            return Err(VisualiserError::DimensionMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Returns the RGBA value at a pixel coordinate, or `None` if out of bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        let offset = self.offset(x, y)?;
        let mut rgba = [0u8; 4];
        rgba.copy_from_slice(&self.data[offset..offset + CHANNELS]);
        Some(rgba)
    }

    /// Sets the RGBA value at a pixel coordinate. No-op if out of bounds.
    pub fn set_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        if let Some(offset) = self.offset(x, y) {
            self.data[offset..offset + CHANNELS].copy_from_slice(&rgba);
        }
    }

    /// Replaces the colour channels with the Sobel gradient magnitude.
    pub fn detect_edges(&mut self, border: EdgeBorder) {
        let (width, height) = (self.width, self.height);
        crate::filters::edges::detect_edges_with_border(&mut self.data, width, height, border);
    }

    fn offset(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| (y * self.width + x) * CHANNELS)
    }
}
