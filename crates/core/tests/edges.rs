mod common;

use common::synthetic_image::{checkerboard, noise, on_border, vertical_edge};
use reactive_visualiser_core::{detect_edges, EdgeBorder, FrameBuffer};

fn interior(frame: &FrameBuffer) -> impl Iterator<Item = (usize, usize)> + '_ {
    (1..frame.height() - 1).flat_map(move |y| (1..frame.width() - 1).map(move |x| (x, y)))
}

#[test]
fn uniform_image_has_no_edges() {
    let mut frame = FrameBuffer::solid(8, 6, [37, 120, 201, 90]);
    frame.detect_edges(EdgeBorder::Untouched);

    for (x, y) in interior(&frame) {
        assert_eq!(frame.pixel(x, y), Some([0, 0, 0, 90]), "pixel ({x}, {y})");
    }
    assert_eq!(frame.pixel(0, 0), Some([37, 120, 201, 90]));
}

#[test]
fn three_by_three_frame_writes_only_its_centre() {
    let mut original = FrameBuffer::new(3, 3);
    for y in 0..3 {
        for x in 0..3 {
            let alpha = 200 + (y * 3 + x) as u8;
            let rgb = if x == 0 { 10 } else { 0 };
            original.set_pixel(x, y, [rgb, rgb, rgb, alpha]);
        }
    }
    original.set_pixel(1, 1, [90, 90, 90, 204]);

    let mut frame = original.clone();
    frame.detect_edges(EdgeBorder::Untouched);

    // gx = -(1 + 2 + 1) * 10, gy = 0.
    assert_eq!(frame.pixel(1, 1), Some([40, 40, 40, 204]));
    for y in 0..3 {
        for x in 0..3 {
            if on_border(&frame, x, y) {
                assert_eq!(frame.pixel(x, y), original.pixel(x, y), "pixel ({x}, {y})");
            }
        }
    }
}

#[test]
fn vertical_edge_lights_up_straddling_columns() {
    let mut frame = vertical_edge(8, 5);
    frame.detect_edges(EdgeBorder::Untouched);

    for y in 1..4 {
        for x in 1..7 {
            let [r, _, _, _] = frame.pixel(x, y).unwrap();
            let expected = if x == 3 || x == 4 { 255 } else { 0 };
            assert_eq!(r, expected, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn magnitude_saturates_on_high_contrast() {
    let mut frame = checkerboard(12, 12, 2);
    frame.detect_edges(EdgeBorder::Untouched);

    let mut saturated = 0;
    for (x, y) in interior(&frame) {
        let [r, g, b, _] = frame.pixel(x, y).unwrap();
        assert!(r == g && g == b, "pixel ({x}, {y}) is not grayscale");
        if r == 255 {
            saturated += 1;
        }
    }
    assert!(saturated > 0);
}

#[test]
fn single_pixel_checkerboard_cancels_out() {
    // Opposite neighbours always match, so both gradients vanish.
    let mut frame = checkerboard(9, 9, 1);
    frame.detect_edges(EdgeBorder::Untouched);

    for (x, y) in interior(&frame) {
        assert_eq!(frame.pixel(x, y).unwrap()[0], 0, "pixel ({x}, {y})");
    }
}

#[test]
fn border_ring_is_preserved_exactly() {
    let original = noise(17, 11, 7);
    let mut frame = original.clone();
    frame.detect_edges(EdgeBorder::Untouched);

    for y in 0..frame.height() {
        for x in 0..frame.width() {
            if on_border(&frame, x, y) {
                assert_eq!(frame.pixel(x, y), original.pixel(x, y), "pixel ({x}, {y})");
            }
        }
    }
}

#[test]
fn alpha_is_preserved_bit_exact() {
    for border in [EdgeBorder::Untouched, EdgeBorder::Replicate] {
        let original = noise(13, 9, 42);
        let mut frame = original.clone();
        frame.detect_edges(border);

        let alpha = |f: &FrameBuffer| -> Vec<u8> {
            f.as_raw().iter().skip(3).step_by(4).copied().collect()
        };
        assert_eq!(alpha(&frame), alpha(&original), "border mode {border:?}");
    }
}

#[test]
fn detection_is_deterministic_but_not_a_round_trip() {
    let original = noise(16, 16, 3);

    let mut first = original.clone();
    first.detect_edges(EdgeBorder::Untouched);
    let mut second = original.clone();
    second.detect_edges(EdgeBorder::Untouched);
    assert_eq!(first, second);

    let mut again = first.clone();
    again.detect_edges(EdgeBorder::Untouched);
    assert_ne!(again, original);
}

#[test]
fn raw_slice_entry_point_matches_frame_method() {
    let original = noise(10, 7, 99);

    let mut via_frame = original.clone();
    via_frame.detect_edges(EdgeBorder::Untouched);

    let mut raw = original.into_raw();
    detect_edges(&mut raw, 10, 7);
    assert_eq!(raw, via_frame.into_raw());
}

#[test]
fn independent_frames_can_be_processed_concurrently() {
    let frames: Vec<FrameBuffer> = (0..4).map(|seed| noise(32, 24, seed)).collect();
    let expected: Vec<FrameBuffer> = frames
        .iter()
        .map(|frame| {
            let mut frame = frame.clone();
            frame.detect_edges(EdgeBorder::Untouched);
            frame
        })
        .collect();

    let mut outputs = frames.clone();
    std::thread::scope(|scope| {
        for frame in outputs.iter_mut() {
            scope.spawn(move || frame.detect_edges(EdgeBorder::Untouched));
        }
    });

    assert_eq!(outputs, expected);
}
