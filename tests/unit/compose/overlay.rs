use super::*;

fn caption(width: u32, height: u32, px: [u8; 4]) -> CaptionImage {
    CaptionImage {
        width,
        height,
        rgba8_premul: px.repeat((width * height) as usize),
    }
}

#[test]
fn origin_centers_and_can_go_negative() {
    assert_eq!(centered_origin(100, 200, 20, 40), (40, 80));
    assert_eq!(centered_origin(100, 200, 120, 40), (-10, 80));
}

#[test]
fn opaque_caption_replaces_only_covered_pixels() {
    let mut frame = FrameRGBA::solid(6, 6, [10, 20, 30]);
    overlay_centered(&mut frame, &caption(2, 2, [255, 255, 255, 255]));
    assert_eq!(frame.pixel(2, 2), [255, 255, 255, 255]);
    assert_eq!(frame.pixel(3, 3), [255, 255, 255, 255]);
    assert_eq!(frame.pixel(1, 2), [10, 20, 30, 255]);
    assert_eq!(frame.pixel(4, 3), [10, 20, 30, 255]);
}

#[test]
fn transparent_pixels_leave_frame_untouched() {
    let mut frame = FrameRGBA::solid(4, 4, [10, 20, 30]);
    let before = frame.clone();
    overlay_centered(&mut frame, &caption(4, 4, [0, 0, 0, 0]));
    assert_eq!(frame, before);
}

#[test]
fn half_alpha_blends_over_background() {
    let mut frame = FrameRGBA::solid(1, 1, [200, 200, 200]);
    // 50% black, premultiplied.
    overlay_premul(&mut frame, &caption(1, 1, [0, 0, 0, 128]), 0, 0);
    assert_eq!(frame.pixel(0, 0), [100, 100, 100, 255]);
}

#[test]
fn oversized_caption_is_clipped() {
    let mut frame = FrameRGBA::solid(4, 4, [0, 0, 0]);
    overlay_centered(&mut frame, &caption(10, 2, [255, 0, 0, 255]));
    assert_eq!(frame.pixel(0, 1), [255, 0, 0, 255]);
    assert_eq!(frame.pixel(3, 2), [255, 0, 0, 255]);
    assert_eq!(frame.pixel(0, 0), [0, 0, 0, 255]);

    let mut frame = FrameRGBA::solid(4, 4, [0, 0, 0]);
    let before = frame.clone();
    overlay_premul(&mut frame, &caption(2, 2, [255, 0, 0, 255]), 10, 10);
    assert_eq!(frame, before);
}
