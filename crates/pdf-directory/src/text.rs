//! Fonts, text measurement and text boxes
//!
//! Text is laid out the way a spreadsheet-driven form expects: a box of fixed
//! size, one padded cell per line, the baseline placed so the line sits in the
//! middle of its cell.

use crate::template::Align;
use crate::types::{DirectoryError, Result};
use printpdf::*;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Horizontal padding inside a text cell (1 mm)
pub const CELL_PADDING_PT: f32 = 72.0 / 25.4;

/// Approximate advance of built-in Helvetica, as a fraction of the font size
const HELVETICA_AVG_ADVANCE: f32 = 0.5;
const COURIER_ADVANCE: f32 = 0.6;

/// A font that text can be written in
pub enum ResolvedFont<'a> {
    External { id: &'a FontId, font: &'a ParsedFont },
    Builtin(BuiltinFont),
}

impl ResolvedFont<'_> {
    /// Width of `text` in points
    pub fn measure(&self, text: &str, size_pt: f32) -> f32 {
        match self {
            ResolvedFont::External { font, .. } => {
                let units_per_em = font.font_metrics.units_per_em.max(1) as f32;
                let mut width = 0.0;
                for ch in text.chars() {
                    if let Some(glyph_id) = font.lookup_glyph_index(ch as u32) {
                        let advance = font.get_horizontal_advance(glyph_id);
                        width += (advance as f32 / units_per_em) * size_pt;
                    }
                }
                width
            }
            ResolvedFont::Builtin(builtin) => {
                let advance = match builtin {
                    BuiltinFont::Courier
                    | BuiltinFont::CourierBold
                    | BuiltinFont::CourierOblique
                    | BuiltinFont::CourierBoldOblique => COURIER_ADVANCE,
                    _ => HELVETICA_AVG_ADVANCE,
                };
                text.chars().count() as f32 * advance * size_pt
            }
        }
    }

    /// Operations writing one line of text with its baseline at `(x_pt, y_pt)`
    pub fn write_ops(&self, text: &str, size_pt: f32, x_pt: f32, y_pt: f32) -> Vec<Op> {
        let mut ops = Vec::new();
        if text.is_empty() {
            return ops;
        }

        ops.push(Op::StartTextSection);
        match self {
            ResolvedFont::External { id, .. } => {
                ops.push(Op::SetFontSize {
                    font: (*id).clone(),
                    size: Pt(size_pt),
                });
                ops.push(Op::SetTextCursor {
                    pos: Point {
                        x: Pt(x_pt),
                        y: Pt(y_pt),
                    },
                });
                ops.push(Op::WriteText {
                    items: vec![TextItem::Text(text.to_string())],
                    font: (*id).clone(),
                });
            }
            ResolvedFont::Builtin(builtin) => {
                ops.push(Op::SetFontSizeBuiltinFont {
                    font: builtin.clone(),
                    size: Pt(size_pt),
                });
                ops.push(Op::SetTextCursor {
                    pos: Point {
                        x: Pt(x_pt),
                        y: Pt(y_pt),
                    },
                });
                ops.push(Op::WriteTextBuiltinFont {
                    items: vec![TextItem::Text(text.to_string())],
                    font: builtin.clone(),
                });
            }
        }
        ops.push(Op::EndTextSection);
        ops
    }
}

/// Fonts registered in a document, by logical name
#[derive(Default)]
pub struct FontBook {
    fonts: HashMap<String, (FontId, ParsedFont)>,
}

impl FontBook {
    /// Register every configured font file in `doc`.
    ///
    /// Fonts that are missing or unparsable are skipped with a warning; text
    /// set in them falls back to Helvetica.
    pub fn load(doc: &mut PdfDocument, fonts: &BTreeMap<String, PathBuf>) -> Self {
        let mut book = FontBook::default();
        for (name, path) in fonts {
            match Self::parse(path) {
                Ok(font) => {
                    let id = doc.add_font(&font);
                    log::debug!("Registered font '{}' from {}", name, path.display());
                    book.fonts.insert(name.clone(), (id, font));
                }
                Err(e) => log::warn!("Font '{}' unavailable, using Helvetica: {}", name, e),
            }
        }
        book
    }

    fn parse(path: &Path) -> Result<ParsedFont> {
        let bytes = std::fs::read(path)?;
        let mut warnings = Vec::new();
        ParsedFont::from_bytes(&bytes, 0, &mut warnings)
            .ok_or_else(|| DirectoryError::Pdf(format!("Failed to parse font {}", path.display())))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fonts.contains_key(name)
    }

    /// Look up a font by name, falling back to Helvetica
    pub fn resolve(&self, name: Option<&str>) -> ResolvedFont<'_> {
        match name.and_then(|n| self.fonts.get(n)) {
            Some((id, font)) => ResolvedFont::External { id, font },
            None => ResolvedFont::Builtin(BuiltinFont::Helvetica),
        }
    }
}

/// Greedy word wrap.
///
/// Explicit newlines always break. Words wider than the line are split by
/// character, which is also how unspaced CJK text wraps.
pub fn wrap_text(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        let mut line = String::new();

        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", line, word)
            };

            if measure(&candidate) <= max_width {
                line = candidate;
                continue;
            }

            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }

            if measure(word) <= max_width {
                line = word.to_string();
            } else {
                for ch in word.chars() {
                    let mut next = line.clone();
                    next.push(ch);
                    if !line.is_empty() && measure(&next) > max_width {
                        lines.push(std::mem::take(&mut line));
                        line.push(ch);
                    } else {
                        line = next;
                    }
                }
            }
        }

        lines.push(line);
    }

    lines
}

/// Longest prefix of `text` that fits in `max_width`
pub fn trim_to_width(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> String {
    let mut out = String::new();
    for ch in text.chars() {
        out.push(ch);
        if measure(&out) > max_width {
            out.pop();
            break;
        }
    }
    out
}

/// A text box in points, top-left origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBox {
    pub x: f32,
    pub top: f32,
    pub width: f32,
    pub line_height: f32,
}

/// One line of a laid-out text box
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x: f32,
    /// Baseline, measured down from the top of the page
    pub baseline: f32,
}

/// Break `text` into lines for a box and position each one.
///
/// `multiline` follows the template convention: `Some(true)` wraps,
/// `Some(false)` trims to the box, `None` writes one unclipped line.
pub fn layout_text_box(
    text: &str,
    size_pt: f32,
    bounds: TextBox,
    align: Align,
    multiline: Option<bool>,
    measure: impl Fn(&str) -> f32,
) -> Vec<PlacedLine> {
    let inner = (bounds.width - 2.0 * CELL_PADDING_PT).max(0.0);
    let lines = match multiline {
        Some(true) => wrap_text(text, inner, &measure),
        Some(false) => vec![trim_to_width(text, inner, &measure)],
        None => vec![text.replace('\n', " ")],
    };

    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let width = measure(&line);
            let x = match align {
                Align::Left => bounds.x + CELL_PADDING_PT,
                Align::Center => bounds.x + (bounds.width - width) / 2.0,
                Align::Right => bounds.x + bounds.width - CELL_PADDING_PT - width,
            };
            let cell_top = bounds.top + i as f32 * bounds.line_height;
            PlacedLine {
                text: line,
                x,
                baseline: cell_top + 0.5 * bounds.line_height + 0.3 * size_pt,
            }
        })
        .collect()
}
