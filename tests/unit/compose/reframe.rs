use super::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn landscape_crops_width_centered() {
    let r = reframe_crop(1920, 1080).unwrap();
    assert_eq!(
        r,
        CropRect {
            x: 656,
            y: 0,
            width: 607,
            height: 1080
        }
    );
}

#[test]
fn tall_source_crops_height_centered() {
    let r = reframe_crop(720, 1600).unwrap();
    assert_eq!(r.width, 720);
    assert_eq!(r.height, 1280);
    assert_eq!(r.y, 160);
    assert_eq!(r.x, 0);
}

#[test]
fn exact_ratio_is_untouched() {
    let r = reframe_crop(1080, 1920).unwrap();
    assert_eq!((r.x, r.y, r.width, r.height), (0, 0, 1080, 1920));
}

#[test]
fn crop_fits_inside_source() {
    for (w, h) in [(1, 1), (3, 2), (640, 480), (1280, 720), (1000, 3000), (17, 1000)] {
        match reframe_crop(w, h) {
            Ok(r) => {
                assert!(r.x + r.width <= w && r.y + r.height <= h, "{w}x{h} -> {r:?}");
                assert!(r.width == w || r.height == h);
            }
            Err(_) => assert!(w < 16 || h < 16),
        }
    }
}

#[test]
fn zero_size_is_rejected() {
    assert!(reframe_crop(0, 1080).is_err());
}

#[test]
fn slice_starts_within_bounds() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..500 {
        let s = pick_slice(600.0, 90.0, &mut rng).unwrap();
        assert!(s.start_sec >= 0.0 && s.start_sec <= 510.0);
        assert_eq!(s.duration_sec, 90.0);
        assert!(s.end_sec() <= 600.0 + 1e-9);
    }
}

#[test]
fn short_source_starts_at_zero() {
    let mut rng = StdRng::seed_from_u64(1);
    let s = pick_slice(30.0, 45.0, &mut rng).unwrap();
    assert_eq!(s.start_sec, 0.0);
    assert_eq!(s.duration_sec, 45.0);
}

#[test]
fn non_positive_durations_fail() {
    let mut rng = StdRng::seed_from_u64(1);
    assert!(pick_slice(30.0, 0.0, &mut rng).is_err());
    assert!(pick_slice(0.0, 5.0, &mut rng).is_err());
}
