use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(24, 0).is_err());
    assert_eq!(Fps::new(24, 1).unwrap().as_f64(), 24.0);
}

#[test]
fn frame_time_uses_rational_fps() {
    let fps = Fps::new(24, 1).unwrap();
    assert_eq!(fps.frame_time_secs(FrameIndex(0)), 0.0);
    assert!((fps.frame_time_secs(FrameIndex(48)) - 2.0).abs() < 1e-12);
}

#[test]
fn frames_to_cover_rounds_partial_frames_up() {
    let fps = Fps::new(24, 1).unwrap();
    assert_eq!(fps.frames_to_cover(1.0), 24);
    assert_eq!(fps.frames_to_cover(1.01), 25);
    assert_eq!(fps.frames_to_cover(0.0), 0);
    assert_eq!(fps.frames_to_cover(f64::NAN), 0);

    let ntsc = Fps::new(30_000, 1001).unwrap();
    assert_eq!(ntsc.frames_to_cover(ntsc.frame_time_secs(FrameIndex(300))), 300);
}
