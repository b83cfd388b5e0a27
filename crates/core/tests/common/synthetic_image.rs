use reactive_visualiser_core::FrameBuffer;

/// Left half black, right half white, with a per-pixel alpha pattern so
/// alpha preservation is observable.
pub fn vertical_edge(width: usize, height: usize) -> FrameBuffer {
    let mut frame = FrameBuffer::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let v = if x < width / 2 { 0 } else { 255 };
            frame.set_pixel(x, y, [v, v, v, alpha_at(x, y)]);
        }
    }
    frame
}

/// Black and white squares of `cell` pixels.
pub fn checkerboard(width: usize, height: usize, cell: usize) -> FrameBuffer {
    assert!(cell > 0, "cell size must be positive");

    let mut frame = FrameBuffer::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let v = if (x / cell + y / cell) % 2 == 0 { 0 } else { 255 };
            frame.set_pixel(x, y, [v, v, v, alpha_at(x, y)]);
        }
    }
    frame
}

/// Deterministic pseudo-random colours (LCG) for regression checks.
pub fn noise(width: usize, height: usize, seed: u32) -> FrameBuffer {
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (state >> 24) as u8
    };
    let mut frame = FrameBuffer::new(width, height);
    for y in 0..height {
        for x in 0..width {
            frame.set_pixel(x, y, [next(), next(), next(), next()]);
        }
    }
    frame
}

pub fn alpha_at(x: usize, y: usize) -> u8 {
    ((x * 31 + y * 17) % 256) as u8
}

/// True when `(x, y)` lies on the outer one-pixel ring.
pub fn on_border(frame: &FrameBuffer, x: usize, y: usize) -> bool {
    x == 0 || y == 0 || x + 1 == frame.width() || y + 1 == frame.height()
}
