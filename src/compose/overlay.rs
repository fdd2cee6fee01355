use crate::captions::render::CaptionImage;
use crate::encode::sink::FrameRGBA;

fn mul_div255(x: u16, y: u16) -> u16 {
    ((u32::from(x) * u32::from(y) + 127) / 255) as u16
}

/// Top-left position that centers a `w` x `h` image in the frame. May be negative.
pub fn centered_origin(frame_w: u32, frame_h: u32, w: u32, h: u32) -> (i64, i64) {
    (
        (i64::from(frame_w) - i64::from(w)) / 2,
        (i64::from(frame_h) - i64::from(h)) / 2,
    )
}

/// Composite a premultiplied caption over an opaque frame at `(ox, oy)`.
///
/// Parts outside the frame are clipped; fully transparent caption pixels leave the frame as is.
pub fn overlay_premul(frame: &mut FrameRGBA, img: &CaptionImage, ox: i64, oy: i64) {
    let fw = i64::from(frame.width);
    let fh = i64::from(frame.height);
    let x0 = ox.max(0);
    let y0 = oy.max(0);
    let x1 = (ox + i64::from(img.width)).min(fw);
    let y1 = (oy + i64::from(img.height)).min(fh);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let img_w = img.width as usize;
    let frame_w = frame.width as usize;
    for y in y0..y1 {
        let sy = (y - oy) as usize;
        for x in x0..x1 {
            let sx = (x - ox) as usize;
            let si = (sy * img_w + sx) * 4;
            let s = &img.rgba8_premul[si..si + 4];
            let sa = u16::from(s[3]);
            if sa == 0 {
                continue;
            }
            let di = (y as usize * frame_w + x as usize) * 4;
            let d = &mut frame.data[di..di + 4];
            let inv = 255 - sa;
            for c in 0..3 {
                d[c] = (u16::from(s[c]) + mul_div255(u16::from(d[c]), inv)).min(255) as u8;
            }
            d[3] = (sa + mul_div255(u16::from(d[3]), inv)).min(255) as u8;
        }
    }
}

/// Center `img` in the frame and composite it.
pub fn overlay_centered(frame: &mut FrameRGBA, img: &CaptionImage) {
    let (ox, oy) = centered_origin(frame.width, frame.height, img.width, img.height);
    overlay_premul(frame, img, ox, oy);
}

#[cfg(test)]
#[path = "../../tests/unit/compose/overlay.rs"]
mod tests;
