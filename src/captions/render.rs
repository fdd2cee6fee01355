use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::foundation::error::{StoryError, StoryResult};

pub const CAPTION_FONT_SIZE_PX: f32 = 48.0;
/// Horizontal room left free when wrapping (10 px per side).
pub const WRAP_MARGIN_PX: u32 = 20;
/// Minimum padding around the text block (8 px per edge).
pub const CANVAS_PADDING_PX: u32 = 16;
pub const SAFETY_MARGIN_PX: u32 = 8;
pub const OUTLINE_RADIUS_PX: i32 = 3;
/// Appended line used to measure how far descenders reach below the baseline.
pub const DESCENDER_PROBE: &str = "\npgjyq";

/// Bold/display families tried in order before generic fallbacks.
pub const PREFERRED_FONT_FAMILIES: [&str; 7] = [
    "Impact",
    "Arial Black",
    "Arial",
    "Calibri",
    "Verdana",
    "DejaVu Sans",
    "Liberation Sans",
];

/// Straight-alpha text color carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

const OUTLINE: TextBrushRgba8 = TextBrushRgba8 {
    r: 0,
    g: 0,
    b: 0,
    a: 255,
};
const FILL: TextBrushRgba8 = TextBrushRgba8 {
    r: 255,
    g: 255,
    b: 255,
    a: 255,
};

/// A rendered caption with a transparent background.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptionImage {
    pub width: u32,
    pub height: u32,
    /// Premultiplied RGBA8, row-major, `width * height * 4` bytes.
    pub rgba8_premul: Vec<u8>,
}

impl CaptionImage {
    /// Straight-alpha copy for export.
    pub fn to_rgba_image(&self) -> StoryResult<image::RgbaImage> {
        let mut straight = self.rgba8_premul.clone();
        for px in straight.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        image::RgbaImage::from_raw(self.width, self.height, straight)
            .ok_or_else(|| StoryError::validation("caption buffer does not match its dimensions"))
    }

    pub fn save_png(&self, path: &Path) -> StoryResult<()> {
        self.to_rgba_image()?
            .save(path)
            .map_err(|e| StoryError::Other(anyhow::anyhow!("failed to write '{}': {e}", path.display())))
    }
}

/// Font bytes chosen for captions.
#[derive(Clone, Debug)]
pub struct ResolvedFont {
    /// Family name as reported by the font database.
    pub family: String,
    pub bytes: Vec<u8>,
    pub index: u32,
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::debug!(path = %path.display(), error = %e, "skipping unreadable font");
        }
    }
}

/// Font database with `extra_dirs` scanned ahead of the system fonts.
pub fn caption_font_db(extra_dirs: &[PathBuf]) -> usvg::fontdb::Database {
    let mut db = usvg::fontdb::Database::new();
    for dir in extra_dirs {
        load_fonts_from_dir(&mut db, dir);
    }
    db.load_system_fonts();
    db
}

/// First preferred family present in `db`, then generic sans-serif, then any face at all.
pub fn resolve_caption_font(
    db: &usvg::fontdb::Database,
    preferred: &[&str],
) -> Option<ResolvedFont> {
    use usvg::fontdb::{Family, Query, Stretch, Style, Weight};

    let query_family = |family: Family<'_>| {
        db.query(&Query {
            families: &[family],
            weight: Weight::BOLD,
            stretch: Stretch::Normal,
            style: Style::Normal,
        })
    };

    let id = preferred
        .iter()
        .find_map(|name| query_family(Family::Name(name)))
        .or_else(|| query_family(Family::SansSerif))
        .or_else(|| db.faces().next().map(|f| f.id))?;

    let family = db
        .face(id)
        .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
        .unwrap_or_default();
    let (bytes, index) = db.with_face_data(id, |data, index| (data.to_vec(), index))?;
    Some(ResolvedFont {
        family,
        bytes,
        index,
    })
}

/// Wrapped, outlined, centered caption rasterizer.
pub struct CaptionRenderer {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
    size_px: f32,
}

impl CaptionRenderer {
    pub fn new(font: ResolvedFont, size_px: f32) -> StoryResult<Self> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(StoryError::validation(
                "caption size_px must be finite and > 0",
            ));
        }

        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font.bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            StoryError::validation(format!(
                "no font families registered from '{}'",
                font.family
            ))
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| StoryError::validation("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font: vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::from(font.bytes),
                font.index,
            ),
            size_px,
        })
    }

    /// Resolve a caption font from `font_dirs` and the system. `None` means captions are skipped.
    pub fn from_system(font_dirs: &[PathBuf], size_px: f32) -> Option<Self> {
        let db = caption_font_db(font_dirs);
        let Some(font) = resolve_caption_font(&db, &PREFERRED_FONT_FAMILIES) else {
            tracing::warn!("no usable font found; captions disabled");
            return None;
        };
        let family = font.family.clone();
        match Self::new(font, size_px) {
            Ok(renderer) => {
                tracing::info!(family = %family, size_px, "caption font resolved");
                Some(renderer)
            }
            Err(e) => {
                tracing::warn!(family = %family, error = %e, "caption font unusable; captions disabled");
                None
            }
        }
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    fn layout(
        &mut self,
        text: &str,
        brush: TextBrushRgba8,
        align_width: Option<f32>,
    ) -> parley::Layout<TextBrushRgba8> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(self.size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(
            align_width,
            parley::Alignment::Center,
            parley::AlignmentOptions::default(),
        );
        layout
    }

    /// Rendered width of `text` on a single line.
    pub fn measure_line(&mut self, text: &str) -> f32 {
        self.layout(text, FILL, None).width()
    }

    /// Greedy word wrap. A word wider than `max_width` is broken between characters.
    pub fn wrap(&mut self, text: &str, max_width: f32) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();
        for word in text.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if self.measure_line(&candidate) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if self.measure_line(word) <= max_width {
                current = word.to_string();
            } else {
                let mut pieces = self.break_word(word, max_width);
                current = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    /// Split one word into the fewest leading pieces that fit. A piece holds at least one char.
    fn break_word(&mut self, word: &str, max_width: f32) -> Vec<String> {
        let mut pieces = Vec::new();
        let mut piece = String::new();
        for ch in word.chars() {
            piece.push(ch);
            if piece.chars().count() > 1 && self.measure_line(&piece) > max_width {
                piece.pop();
                pieces.push(std::mem::take(&mut piece));
                piece.push(ch);
            }
        }
        if !piece.is_empty() {
            pieces.push(piece);
        }
        pieces
    }

    /// Rasterize `text` onto a canvas at least `max_width` x `base_height`.
    ///
    /// Returns `None` for blank text or a canvas too large to rasterize.
    pub fn render(&mut self, text: &str, max_width: u32, base_height: u32) -> Option<CaptionImage> {
        let wrap_width = max_width.saturating_sub(WRAP_MARGIN_PX).max(1) as f32;
        let lines = self.wrap(text, wrap_width);
        if lines.is_empty() {
            return None;
        }
        let wrapped = lines.join("\n");

        let block = self.layout(&wrapped, FILL, None);
        let text_w = block.width().ceil().max(0.0) as u32;
        let text_h = block.height().ceil().max(0.0) as u32;
        let probed = self.layout(&format!("{wrapped}{DESCENDER_PROBE}"), FILL, None);
        let descender = (probed.height().ceil() as u32).saturating_sub(text_h);

        let canvas_w = max_width.max(text_w + CANVAS_PADDING_PX);
        let canvas_h = base_height.max(text_h + CANVAS_PADDING_PX + descender + SAFETY_MARGIN_PX);
        let (Ok(w16), Ok(h16)) = (u16::try_from(canvas_w), u16::try_from(canvas_h)) else {
            tracing::warn!(canvas_w, canvas_h, "caption canvas too large");
            return None;
        };

        let x = f64::from((canvas_w - text_w) / 2);
        let y = f64::from(
            (canvas_h.saturating_sub(text_h + descender) / 2).max(CANVAS_PADDING_PX / 2),
        );

        let outline = self.layout(&wrapped, OUTLINE, Some(text_w as f32));
        let fill = self.layout(&wrapped, FILL, Some(text_w as f32));

        let mut ctx = vello_cpu::RenderContext::new(w16, h16);
        for dx in -OUTLINE_RADIUS_PX..=OUTLINE_RADIUS_PX {
            for dy in -OUTLINE_RADIUS_PX..=OUTLINE_RADIUS_PX {
                if dx == 0 && dy == 0 {
                    continue;
                }
                draw_layout(
                    &mut ctx,
                    &outline,
                    &self.font,
                    x + f64::from(dx),
                    y + f64::from(dy),
                );
            }
        }
        draw_layout(&mut ctx, &fill, &self.font, x, y);

        let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        tracing::debug!(lines = lines.len(), canvas_w, canvas_h, "rendered caption");
        Some(CaptionImage {
            width: canvas_w,
            height: canvas_h,
            rgba8_premul: pixmap.data_as_u8_slice().to_vec(),
        })
    }
}

fn draw_layout(
    ctx: &mut vello_cpu::RenderContext,
    layout: &parley::Layout<TextBrushRgba8>,
    font: &vello_cpu::peniko::FontData,
    dx: f64,
    dy: f64,
) {
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((dx, dy)));
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));
            let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/captions/render.rs"]
mod tests;
