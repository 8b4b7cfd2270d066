//! Surface rasterization.
//!
//! # Responsibility
//! - Define the `Rasterizer` port turning a mounted surface into a bitmap.
//! - Provide `GlyphRasterizer`, a built-in block layout painted with
//!   TrueType fonts.
//!
//! # Invariants
//! - Bitmaps are `surface.width_px * scale` pixels wide.
//! - The canvas is filled with the requested background before any drawing,
//!   so the output is opaque regardless of caller theme.

use super::markup::Block;
use super::surface::{RenderSurface, SURFACE_BACKGROUND};
use super::{ExportError, ExportResult};
use ab_glyph::{point, Font, FontVec, GlyphId, PxScale, ScaleFont};
use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};

/// Supersampling factor applied to the surface.
pub const RASTER_SCALE: f32 = 2.0;

/// Raster output; always RGB, never transparent.
pub type Bitmap = RgbImage;

const INK: Rgb<u8> = Rgb([17, 24, 39]);
const BODY: Rgb<u8> = Rgb([55, 65, 81]);
const LABEL: Rgb<u8> = Rgb([75, 85, 99]);
const MUTED: Rgb<u8> = Rgb([107, 114, 128]);
const DONE: Rgb<u8> = Rgb([156, 163, 175]);
const RULE: Rgb<u8> = Rgb([229, 231, 235]);
const ROW_RULE: Rgb<u8> = Rgb([243, 244, 246]);
const PANEL: Rgb<u8> = Rgb([249, 250, 251]);

/// Regular/bold pairs probed when no font is configured.
const FONT_CANDIDATES: &[(&str, &str)] = &[
    (
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
        "/usr/share/fonts/liberation-sans/LiberationSans-Bold.ttf",
    ),
    ("/Library/Fonts/Arial.ttf", "/Library/Fonts/Arial Bold.ttf"),
    ("C:\\Windows\\Fonts\\arial.ttf", "C:\\Windows\\Fonts\\arialbd.ttf"),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    pub scale: f32,
    pub background: Rgb<u8>,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: RASTER_SCALE,
            background: SURFACE_BACKGROUND,
        }
    }
}

/// Converts a mounted surface into pixels.
pub trait Rasterizer {
    fn rasterize(&self, surface: &RenderSurface, options: &RasterOptions) -> ExportResult<Bitmap>;
}

impl<R: Rasterizer + ?Sized> Rasterizer for &R {
    fn rasterize(&self, surface: &RenderSurface, options: &RasterOptions) -> ExportResult<Bitmap> {
        (**self).rasterize(surface, options)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy)]
struct TextStyle {
    /// CSS font size in pixels.
    size: f32,
    line_height: f32,
    face: Face,
    color: Rgb<u8>,
}

impl TextStyle {
    const fn new(size: f32, line_height: f32, face: Face, color: Rgb<u8>) -> Self {
        Self {
            size,
            line_height,
            face,
            color,
        }
    }

    fn line_px(&self) -> f32 {
        self.size * self.line_height
    }

    fn with_color(self, color: Rgb<u8>) -> Self {
        Self { color, ..self }
    }
}

const H1: TextStyle = TextStyle::new(24.0, 1.2, Face::Bold, INK);
const H2: TextStyle = TextStyle::new(18.0, 1.2, Face::Bold, INK);
const H3: TextStyle = TextStyle::new(16.0, 1.2, Face::Bold, INK);
const BODY_TEXT: TextStyle = TextStyle::new(14.0, 1.5, Face::Regular, BODY);
const META_LABEL: TextStyle = TextStyle::new(14.0, 1.5, Face::Bold, LABEL);
const ROW_NUMBER: TextStyle = TextStyle::new(14.0, 1.5, Face::Bold, BODY);
const ROW_META: TextStyle = TextStyle::new(12.0, 1.5, Face::Regular, MUTED);

#[derive(Debug, Clone)]
enum DrawOp {
    Text {
        x: f32,
        baseline: f32,
        text: String,
        style: TextStyle,
        strike: bool,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb<u8>,
    },
}

/// Built-in rasterizer laying out export blocks with TrueType fonts.
pub struct GlyphRasterizer {
    regular: FontVec,
    bold: FontVec,
}

impl GlyphRasterizer {
    /// Loads fonts from explicit files; bold falls back to regular.
    pub fn from_font_files(regular: &Path, bold: Option<&Path>) -> ExportResult<Self> {
        let regular_font = load_font(regular)?;
        let bold_font = match bold {
            Some(path) => load_font(path)?,
            None => load_font(regular)?,
        };
        Ok(Self {
            regular: regular_font,
            bold: bold_font,
        })
    }

    /// Uses the configured font when given, otherwise probes common
    /// system font locations.
    pub fn discover(regular: Option<&Path>, bold: Option<&Path>) -> ExportResult<Self> {
        if let Some(path) = regular {
            return Self::from_font_files(path, bold);
        }

        for (regular_path, bold_path) in FONT_CANDIDATES {
            let regular_path = PathBuf::from(regular_path);
            if !regular_path.is_file() {
                continue;
            }
            let bold_path = PathBuf::from(bold_path);
            let bold = bold_path.is_file().then_some(bold_path.as_path());
            return Self::from_font_files(&regular_path, bold);
        }

        Err(ExportError::Font(
            "no usable system font found; set `font_path` in the config".to_string(),
        ))
    }

    fn font(&self, face: Face) -> &FontVec {
        match face {
            Face::Regular => &self.regular,
            Face::Bold => &self.bold,
        }
    }

    fn text_width(&self, text: &str, style: &TextStyle) -> f32 {
        let font = self.font(style.face);
        let scaled = font.as_scaled(px_scale(font, style.size));
        let mut width = 0.0;
        let mut previous: Option<GlyphId> = None;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(previous) = previous {
                width += scaled.kern(previous, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }
        width
    }

    fn wrap(&self, text: &str, style: &TextStyle, max_width: f32) -> Vec<String> {
        wrap_text(text, max_width, |run| self.text_width(run, style))
    }

    /// Baseline offset from the top of a line box.
    fn baseline_offset(&self, style: &TextStyle) -> f32 {
        let font = self.font(style.face);
        let scaled = font.as_scaled(px_scale(font, style.size));
        let content = scaled.ascent() - scaled.descent();
        (style.line_px() - content) / 2.0 + scaled.ascent()
    }

    fn layout(&self, surface: &RenderSurface) -> (Vec<DrawOp>, f32) {
        let mut layout = Layout {
            fonts: self,
            left: surface.padding_px as f32,
            width: surface.content_width_px() as f32,
            y: surface.padding_px as f32,
            ops: Vec::new(),
        };

        let mut after_meta = false;
        for block in &surface.document.blocks {
            let is_meta = matches!(block, Block::Meta { .. });
            if after_meta && !is_meta {
                layout.y += 10.0;
            }
            after_meta = is_meta;
            layout.block(block);
        }

        let height = layout.y + surface.padding_px as f32;
        (layout.ops, height)
    }

    fn paint(&self, ops: &[DrawOp], width: u32, height: u32, options: &RasterOptions) -> Bitmap {
        let scale = options.scale;
        let mut canvas = RgbImage::from_pixel(width, height, options.background);
        for op in ops {
            match op {
                DrawOp::Rect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => fill_rect(
                    &mut canvas,
                    x * scale,
                    y * scale,
                    width * scale,
                    (height * scale).max(1.0),
                    *color,
                ),
                DrawOp::Text {
                    x,
                    baseline,
                    text,
                    style,
                    strike,
                } => self.draw_text(&mut canvas, text, *x, *baseline, style, *strike, scale),
            }
        }
        canvas
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_text(
        &self,
        canvas: &mut Bitmap,
        text: &str,
        x: f32,
        baseline: f32,
        style: &TextStyle,
        strike: bool,
        scale: f32,
    ) {
        let font = self.font(style.face);
        let px = px_scale(font, style.size * scale);
        let scaled = font.as_scaled(px);
        let start = x * scale;
        let baseline = baseline * scale;
        let mut caret = start;
        let mut previous: Option<GlyphId> = None;

        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(previous) = previous {
                caret += scaled.kern(previous, id);
            }
            let glyph = id.with_scale_and_position(px, point(caret, baseline));
            caret += scaled.h_advance(id);
            previous = Some(id);

            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    let px_x = bounds.min.x as i64 + i64::from(gx);
                    let px_y = bounds.min.y as i64 + i64::from(gy);
                    blend(canvas, px_x, px_y, style.color, coverage);
                });
            }
        }

        if strike {
            let y = baseline - style.size * scale * 0.3;
            fill_rect(canvas, start, y, caret - start, scale.max(1.0), style.color);
        }
    }
}

impl Rasterizer for GlyphRasterizer {
    fn rasterize(&self, surface: &RenderSurface, options: &RasterOptions) -> ExportResult<Bitmap> {
        if !(options.scale.is_finite() && options.scale > 0.0) {
            return Err(ExportError::Raster(format!(
                "invalid raster scale {}",
                options.scale
            )));
        }

        let (ops, height) = self.layout(surface);
        let width_px = (surface.width_px as f32 * options.scale).round() as u32;
        let height_px = (height * options.scale).ceil() as u32;
        if width_px == 0 || height_px == 0 {
            return Err(ExportError::EmptyBitmap);
        }
        Ok(self.paint(&ops, width_px, height_px, options))
    }
}

/// Vertical block flow in CSS pixels.
struct Layout<'a> {
    fonts: &'a GlyphRasterizer,
    left: f32,
    width: f32,
    y: f32,
    ops: Vec<DrawOp>,
}

impl Layout<'_> {
    fn block(&mut self, block: &Block) {
        match block {
            Block::Title(title) => {
                self.paragraph(title, &H1, self.left, self.width, false);
                self.y += 10.0;
            }
            Block::Meta { label, value } => {
                let label = format!("{label}: ");
                let label_width = self.fonts.text_width(&label, &META_LABEL);
                self.text_at(&label, &META_LABEL, self.left, self.y, false);
                self.paragraph(
                    value,
                    &BODY_TEXT,
                    self.left + label_width,
                    self.width - label_width,
                    false,
                );
                self.y += 10.0;
            }
            Block::SectionHeading(heading) => {
                self.y += 20.0;
                self.paragraph(heading, &H2, self.left, self.width, false);
                self.y += 5.0;
                self.rule(RULE);
                self.y += 10.0;
            }
            Block::AgendaRow {
                number,
                title,
                duration,
            } => {
                self.y += 8.0;
                let top = self.y;
                let number = format!("{number}.");
                let number_width = self.fonts.text_width(&number, &ROW_NUMBER) + 10.0;
                let duration_style = BODY_TEXT.with_color(MUTED);
                let duration_width = self.fonts.text_width(duration, &duration_style);

                self.text_at(&number, &ROW_NUMBER, self.left, top, false);
                if !duration.is_empty() {
                    let x = self.left + self.width - duration_width;
                    self.text_at(duration, &duration_style, x, top, false);
                }
                let gap = if duration.is_empty() { 0.0 } else { 10.0 };
                self.paragraph(
                    title,
                    &BODY_TEXT,
                    self.left + number_width,
                    self.width - number_width - duration_width - gap,
                    false,
                );
                self.y += 8.0;
                self.rule(ROW_RULE);
            }
            Block::Notes(text) => {
                self.paragraph(text, &BODY_TEXT, self.left, self.width, false);
                self.y += 10.0;
            }
            Block::Decisions(text) => self.decisions(text),
            Block::ActionRow {
                completed,
                task,
                owner,
                due_date,
            } => {
                self.y += 8.0;
                let top = self.y;
                let mark = if *completed { "\u{2611} " } else { "\u{2610} " };
                let mark_width = self.fonts.text_width(mark, &BODY_TEXT) + 8.0;
                self.text_at(mark, &BODY_TEXT, self.left, top, false);

                let meta = [
                    owner.as_ref().map(|owner| format!("Owner: {owner}")),
                    due_date.as_ref().map(|due| format!("Due: {due}")),
                ]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join("   ");
                let meta_width = self.fonts.text_width(&meta, &ROW_META);
                if !meta.is_empty() {
                    // Align the smaller metadata text with the task baseline.
                    let shift = self.fonts.baseline_offset(&BODY_TEXT)
                        - self.fonts.baseline_offset(&ROW_META);
                    let x = self.left + self.width - meta_width;
                    self.text_at(&meta, &ROW_META, x, top + shift, false);
                }

                let task_style = if *completed {
                    BODY_TEXT.with_color(DONE)
                } else {
                    BODY_TEXT
                };
                let gap = if meta.is_empty() { 0.0 } else { 16.0 };
                self.paragraph(
                    task,
                    &task_style,
                    self.left + mark_width,
                    self.width - mark_width - meta_width - gap,
                    *completed,
                );
                self.y += 8.0;
                self.rule(ROW_RULE);
            }
        }
    }

    fn decisions(&mut self, text: &str) {
        const PAD: f32 = 15.0;
        self.y += 20.0;
        let inner_width = self.width - 2.0 * PAD;
        let heading_lines = self.fonts.wrap("Decisions Made", &H3, inner_width);
        let body_lines = self.fonts.wrap(text, &BODY_TEXT, inner_width);
        let inner_height = heading_lines.len() as f32 * H3.line_px()
            + 10.0
            + body_lines.len() as f32 * BODY_TEXT.line_px();

        self.ops.push(DrawOp::Rect {
            x: self.left,
            y: self.y,
            width: self.width,
            height: inner_height + 2.0 * PAD,
            color: PANEL,
        });
        self.y += PAD;
        self.lines(&heading_lines, &H3, self.left + PAD, false);
        self.y += 10.0;
        self.lines(&body_lines, &BODY_TEXT, self.left + PAD, false);
        self.y += PAD;
    }

    /// Wraps and emits `text`, advancing the cursor.
    fn paragraph(&mut self, text: &str, style: &TextStyle, x: f32, max_width: f32, strike: bool) {
        let lines = self.fonts.wrap(text, style, max_width.max(1.0));
        self.lines(&lines, style, x, strike);
    }

    fn lines(&mut self, lines: &[String], style: &TextStyle, x: f32, strike: bool) {
        for line in lines {
            if !line.is_empty() {
                self.text_at(line, style, x, self.y, strike);
            }
            self.y += style.line_px();
        }
    }

    /// Emits one line with its box top at `top`; does not move the cursor.
    fn text_at(&mut self, text: &str, style: &TextStyle, x: f32, top: f32, strike: bool) {
        self.ops.push(DrawOp::Text {
            x,
            baseline: top + self.fonts.baseline_offset(style),
            text: text.to_string(),
            style: *style,
            strike,
        });
    }

    fn rule(&mut self, color: Rgb<u8>) {
        self.ops.push(DrawOp::Rect {
            x: self.left,
            y: self.y,
            width: self.width,
            height: 1.0,
            color,
        });
        self.y += 1.0;
    }
}

fn load_font(path: &Path) -> ExportResult<FontVec> {
    let bytes = std::fs::read(path).map_err(|err| {
        ExportError::Font(format!("cannot read font `{}`: {err}", path.display()))
    })?;
    FontVec::try_from_vec(bytes)
        .map_err(|err| ExportError::Font(format!("invalid font `{}`: {err}", path.display())))
}

/// Greedy word wrap; explicit newlines and runs of spaces (leading ones
/// included) are kept, and overlong words are broken between characters.
fn wrap_text(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        let mut current = String::new();
        for (index, word) in paragraph.split(' ').enumerate() {
            if index == 0 {
                current.push_str(word);
            } else {
                let candidate = format!("{current} {word}");
                if word.is_empty() || measure(&candidate) <= max_width {
                    current = candidate;
                } else {
                    lines.push(std::mem::replace(&mut current, word.to_string()));
                }
            }

            while current.chars().count() > 1 && measure(&current) > max_width {
                let split = fitting_prefix_len(&current, max_width, &measure);
                let rest = current.split_off(split);
                lines.push(std::mem::replace(&mut current, rest));
            }
        }
        lines.push(current);
    }
    lines
}

/// Byte length of the longest prefix fitting `max_width`; at least one char.
fn fitting_prefix_len(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> usize {
    let mut end = 0;
    for (index, ch) in text.char_indices() {
        let next = index + ch.len_utf8();
        if measure(&text[..next]) > max_width {
            break;
        }
        end = next;
    }
    if end == 0 {
        text.chars().next().map_or(0, char::len_utf8)
    } else {
        end
    }
}

/// Scale whose em square is `size` pixels, matching CSS font-size.
fn px_scale(font: &FontVec, size: f32) -> PxScale {
    let units_per_em = font.units_per_em().unwrap_or(1000.0);
    PxScale::from(size * font.height_unscaled() / units_per_em)
}

fn fill_rect(canvas: &mut Bitmap, x: f32, y: f32, width: f32, height: f32, color: Rgb<u8>) {
    let x0 = x.floor().max(0.0) as u32;
    let y0 = y.floor().max(0.0) as u32;
    let x1 = ((x + width).ceil().max(0.0) as u32).min(canvas.width());
    let y1 = ((y + height).ceil().max(0.0) as u32).min(canvas.height());
    for py in y0..y1 {
        for px in x0..x1 {
            canvas.put_pixel(px, py, color);
        }
    }
}

fn blend(canvas: &mut Bitmap, x: i64, y: i64, color: Rgb<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= i64::from(canvas.width()) || y >= i64::from(canvas.height()) {
        return;
    }
    let coverage = coverage.clamp(0.0, 1.0);
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    for (channel, ink) in pixel.0.iter_mut().zip(color.0) {
        let mixed = f32::from(*channel) * (1.0 - coverage) + f32::from(ink) * coverage;
        *channel = mixed.round() as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::wrap_text;

    fn char_width(text: &str) -> f32 {
        text.chars().count() as f32
    }

    #[test]
    fn leading_spaces_survive_wrapping() {
        assert_eq!(wrap_text("  indented", 40.0, char_width), vec!["  indented"]);
        assert_eq!(
            wrap_text("notes\n    - nested point", 40.0, char_width),
            vec!["notes", "    - nested point"]
        );
    }

    #[test]
    fn words_move_to_the_next_line_when_the_width_runs_out() {
        assert_eq!(
            wrap_text("alpha beta gamma", 10.0, char_width),
            vec!["alpha beta", "gamma"]
        );
        assert_eq!(wrap_text("a\n\nb", 10.0, char_width), vec!["a", "", "b"]);
    }

    #[test]
    fn overlong_words_break_between_characters() {
        assert_eq!(wrap_text("abcdefgh", 3.0, char_width), vec!["abc", "def", "gh"]);
    }
}
