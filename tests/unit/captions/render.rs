use super::*;

fn renderer() -> Option<CaptionRenderer> {
    CaptionRenderer::from_system(&[], CAPTION_FONT_SIZE_PX)
}

fn alpha_at(img: &CaptionImage, x: u32, y: u32) -> u8 {
    img.rgba8_premul[((y * img.width + x) * 4 + 3) as usize]
}

/// Bounding box of non-transparent pixels: (min_x, min_y, max_x, max_y).
fn ink_bounds(img: &CaptionImage) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for y in 0..img.height {
        for x in 0..img.width {
            if alpha_at(img, x, y) == 0 {
                continue;
            }
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
    }
    bounds
}

#[test]
fn unpremultiply_on_export() {
    let img = CaptionImage {
        width: 2,
        height: 1,
        rgba8_premul: vec![128, 0, 0, 128, 0, 0, 0, 0],
    };
    let out = img.to_rgba_image().unwrap();
    assert_eq!(out.get_pixel(0, 0).0, [255, 0, 0, 128]);
    assert_eq!(out.get_pixel(1, 0).0, [0, 0, 0, 0]);

    let bad = CaptionImage {
        width: 3,
        height: 3,
        rgba8_premul: vec![0; 4],
    };
    assert!(bad.to_rgba_image().is_err());
}

#[test]
fn font_resolution_prefers_listed_families_then_anything() {
    let db = caption_font_db(&[]);
    if db.len() == 0 {
        assert!(resolve_caption_font(&db, &PREFERRED_FONT_FAMILIES).is_none());
        return;
    }
    let font = resolve_caption_font(&db, &["Definitely Not A Real Family"]).unwrap();
    assert!(!font.bytes.is_empty());
}

#[test]
fn blank_text_renders_nothing() {
    let Some(mut r) = renderer() else {
        return;
    };
    assert!(r.render("   ", 720, 100).is_none());
}

#[test]
fn caption_fills_requested_canvas_and_stays_inside() {
    let Some(mut r) = renderer() else {
        return;
    };
    let img = r.render("I never told anyone this.", 720, 100).unwrap();
    assert!(img.width >= 720);
    assert!(img.height >= 100);
    assert_eq!(img.rgba8_premul.len(), (img.width * img.height * 4) as usize);

    let (x0, y0, x1, y1) = ink_bounds(&img).expect("caption has visible pixels");
    // Outline never touches the canvas edge: no cropped glyphs.
    assert!(x0 > 0 && y0 > 0);
    assert!(x1 < img.width - 1 && y1 < img.height - 1);

    // Horizontally centered, up to side-bearing differences.
    let left = x0 as i64;
    let right = (img.width - 1 - x1) as i64;
    assert!((left - right).abs() <= 8, "left {left} right {right}");
}

#[test]
fn long_caption_wraps_instead_of_overflowing() {
    let Some(mut r) = renderer() else {
        return;
    };
    let text = "This sentence is deliberately long so that it cannot possibly fit on one line";
    let lines = r.wrap(text, 480.0);
    assert!(lines.len() > 1);
    assert_eq!(lines.join(" "), text);

    let img = r.render(text, 480, 80).unwrap();
    assert!(img.height > 80);
}

#[test]
fn oversized_word_is_broken_to_fit() {
    let Some(mut r) = renderer() else {
        return;
    };
    let word = "Pneumonoultramicroscopicsilicovolcanoconiosis";
    let lines = r.wrap(&format!("a {word} b"), 120.0);
    assert_eq!(lines.first().map(String::as_str), Some("a"));
    assert!(lines.len() > 3);
    for line in &lines {
        assert!(r.measure_line(line) <= 120.0, "line '{line}' too wide");
    }
    assert_eq!(lines.concat().replace(' ', ""), format!("a{word}b"));
}

#[test]
fn oversized_word_canvas_stays_frame_width() {
    let Some(mut r) = renderer() else {
        return;
    };
    let img = r
        .render("Pneumonoultramicroscopicsilicovolcanoconiosis", 200, 80)
        .unwrap();
    assert_eq!(img.width, 200);
    let (x0, _, x1, _) = ink_bounds(&img).expect("caption has visible pixels");
    assert!(x0 > 0 && x1 < img.width - 1);
}

#[test]
fn white_fill_is_drawn_over_black_outline() {
    let Some(mut r) = renderer() else {
        return;
    };
    let img = r.render("HELLO", 400, 100).unwrap();
    let mut white = 0usize;
    let mut black = 0usize;
    for px in img.rgba8_premul.chunks_exact(4) {
        if px[3] == 255 && px[0] == 255 {
            white += 1;
        }
        if px[3] == 255 && px[0] == 0 {
            black += 1;
        }
    }
    assert!(white > 0 && black > 0);
}
