use super::*;

#[test]
fn zoom_starts_at_one_and_is_monotonic() {
    for n in [1u32, 2, 7, 8, 30] {
        assert_eq!(zoom_factor(FrameIndex(0), n), 1.0);
        let last = zoom_factor(FrameIndex(n - 1), n);
        let expected = 1.0 + 0.1 * f64::from(n - 1) / f64::from(n);
        assert!((last - expected).abs() < 1e-12, "n={n}");
        for i in 1..n {
            assert!(zoom_factor(FrameIndex(i), n) >= zoom_factor(FrameIndex(i - 1), n));
        }
    }
}

#[test]
fn reveal_is_monotonic_and_completes_by_seventy_percent() {
    for n in 1u32..=40 {
        for len in [1usize, 5, 13] {
            let mut prev = 0;
            for i in 0..n {
                let v = visible_chars(len, FrameIndex(i), n);
                assert!(v >= prev);
                assert!(v <= len);
                prev = v;
            }
            let by = ((f64::from(n) * 0.7).floor() as u32).min(n - 1);
            assert_eq!(visible_chars(len, FrameIndex(by), n), len, "n={n} len={len}");
        }
    }
}

#[test]
fn hello_world_reveal_matches_reference_timeline() {
    // progress(0) = 1 / 5.6 ~ 0.18 -> floor(5 * 0.18) = 0
    assert_eq!(visible_chars(5, FrameIndex(0), 8), 0);
    assert_eq!(visible_chars(5, FrameIndex(1), 8), 1);
    assert_eq!(visible_chars(5, FrameIndex(7), 8), 5);
    assert_eq!(reveal_progress(FrameIndex(7), 8), 1.0);
}

#[test]
fn jitter_alternates_by_parity() {
    for i in 0..16u32 {
        let j = bottom_jitter(FrameIndex(i));
        assert_eq!(j, if i % 2 == 0 { 2.0 } else { -2.0 });
    }
}

#[test]
fn char_prefix_respects_multibyte_boundaries() {
    assert_eq!(char_prefix("HELLO", 0), "");
    assert_eq!(char_prefix("HELLO", 3), "HEL");
    assert_eq!(char_prefix("HELLO", 99), "HELLO");
    assert_eq!(char_prefix("悪い言葉", 2), "悪い");
}

#[test]
fn motion_centers_the_zoomed_image() {
    let canvas = Canvas::new(100, 50).unwrap();
    let m = FrameMotion::at(FrameIndex(4), 8, canvas, 5);
    assert!((m.zoom - 1.05).abs() < 1e-12);
    assert!((m.offset.x - (-2.5)).abs() < 1e-9);
    assert!((m.offset.y - (-1.25)).abs() < 1e-9);
    assert_eq!(m.bottom_jitter_px, 2.0);

    // The canvas center stays fixed under the transform.
    let c = m.image_transform() * kurbo::Point::new(50.0, 25.0);
    assert!((c.x - 50.0).abs() < 1e-9 && (c.y - 25.0).abs() < 1e-9);

    let first = FrameMotion::at(FrameIndex(0), 8, canvas, 5);
    assert_eq!(first.image_transform(), Affine::IDENTITY);
}
