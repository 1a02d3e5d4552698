//! PDF renderer – takes a [`LayoutConfig`] and produces PDF bytes using
//! `printpdf` (v0.8 ops-based API).

use std::collections::HashMap;

use printpdf::*;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::fonts::{FontFamily, FontKey, FontManager};
use crate::layout_config::{LayoutConfig, PlacedLine};

/// How one style variant is drawn.
#[derive(Clone)]
enum PdfFont {
    Builtin(BuiltinFont),
    Embedded(FontId),
}

/// Font lookup for one render pass.
struct FontTable<'a> {
    family: FontFamily,
    embedded: HashMap<FontKey, FontId>,
    metrics: &'a FontManager,
}

impl FontTable<'_> {
    fn get(&self, bold: bool, italic: bool) -> PdfFont {
        match self.embedded.get(&FontKey::new(bold, italic)) {
            Some(id) => PdfFont::Embedded(id.clone()),
            None => PdfFont::Builtin(self.family.builtin(bold, italic)),
        }
    }

    /// Ascender of the regular face, which sets the baseline of every line.
    fn ascender(&self, size: f32) -> f32 {
        if self.embedded.contains_key(&FontKey::REGULAR) {
            self.metrics.ascender_px(size, false, false)
        } else {
            size * 0.75
        }
    }
}

/// Render a LayoutConfig into PDF bytes.
///
/// Faces loaded into `fonts` are embedded; every other variant is drawn with
/// the matching built-in font, exactly as it was measured.
pub fn render_pdf(config: &LayoutConfig, fonts: &FontManager) -> Result<Vec<u8>> {
    let page_w = Mm(config.page_width_pt * 0.352778); // pt → mm
    let page_h = Mm(config.page_height_pt * 0.352778);

    let mut doc = PdfDocument::new(&config.title);
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();

    // ── Register embedded faces ───────────────────────────────────────────
    let mut table = FontTable {
        family: config.font_family,
        embedded: HashMap::new(),
        metrics: fonts,
    };
    for key in FontKey::ALL {
        let Some(bytes) = fonts.font_bytes(key) else { continue };
        match ParsedFont::from_bytes(bytes, 0, &mut warnings) {
            Some(parsed) => {
                // Fixed resource names; `add_font` would pick random ones.
                let id = FontId(embedded_font_name(key).to_string());
                doc.resources.fonts.map.insert(id.clone(), parsed);
                table.embedded.insert(key, id);
            }
            None => log::warn!(
                "Could not embed {key:?} face; drawing it with built-in {}",
                config.font_family.builtin_name()
            ),
        }
    }

    // ── Render pages ──────────────────────────────────────────────────────
    let mut unencodable = 0usize;
    let pages: Vec<PdfPage> = config
        .pages
        .iter()
        .map(|page_layout| {
            let mut ops = Vec::new();
            for line in &page_layout.lines {
                render_line(&mut ops, line, config.page_height_pt, &table, &mut unencodable);
            }
            PdfPage::new(page_w, page_h, ops)
        })
        .collect();

    if unencodable > 0 {
        log::warn!("{unencodable} characters have no WinAnsi glyph and were drawn as '?'");
    }

    doc.with_pages(pages);
    let mut bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);

    if !bytes.starts_with(b"%PDF-") {
        return Err(Error::Finalization(format!(
            "serializer produced {} bytes without a PDF header",
            bytes.len()
        )));
    }
    if !pin_document_id(&mut bytes, config) {
        log::warn!("no trailer /ID found; output is not reproducible");
    }
    Ok(bytes)
}

fn embedded_font_name(key: FontKey) -> &'static str {
    match (key.bold, key.italic) {
        (false, false) => "SforgeRegular",
        (true, false) => "SforgeBold",
        (false, true) => "SforgeItalic",
        (true, true) => "SforgeBoldItalic",
    }
}

/// Overwrite the random trailer `/ID` strings in place with hex digits of
/// the layout's SHA-256, so equal layouts give equal bytes. Lengths are
/// kept, so xref offsets stay valid. Returns whether an `/ID` was found.
fn pin_document_id(bytes: &mut [u8], config: &LayoutConfig) -> bool {
    let digest = Sha256::digest(config.to_json().as_bytes());
    let hex: Vec<u8> = digest
        .iter()
        .flat_map(|b| format!("{b:02x}").into_bytes())
        .collect();

    let Some(id_at) = bytes.windows(3).rposition(|w| w == b"/ID") else {
        return false;
    };
    let mut pos = id_at + 3;
    for _ in 0..2 {
        let Some((start, end)) = next_string_literal(&bytes[pos..]) else {
            return false;
        };
        let (start, end) = (pos + start, pos + end);
        for (i, b) in bytes[start..end].iter_mut().enumerate() {
            *b = hex[i % hex.len()];
        }
        pos = end + 1;
    }
    true
}

/// Byte range of the contents of the next `(...)` literal, which may only be
/// preceded by whitespace or the array bracket.
fn next_string_literal(bytes: &[u8]) -> Option<(usize, usize)> {
    let open = bytes.iter().position(|&b| b == b'(')?;
    if !bytes[..open]
        .iter()
        .all(|b| b.is_ascii_whitespace() || *b == b'[')
    {
        return None;
    }
    let close = open + 1 + bytes[open + 1..].iter().position(|&b| b == b')')?;
    Some((open + 1, close))
}

/// Convert a UTF-8 string to raw Windows-1252 bytes then wrap in a String so
/// printpdf writes the bytes unchanged into the PDF stream (builtin fonts use
/// WinAnsiEncoding, so each glyph is one byte 0x00–0xFF).
fn to_winlatin(s: &str, unencodable: &mut usize) -> String {
    let bytes: Vec<u8> = s
        .chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80, // euro
            '\u{201A}' => 0x82, // single low-9 quote
            '\u{201E}' => 0x84, // double low-9 quote
            '\u{2026}' => 0x85, // ellipsis
            '\u{2018}' => 0x91, // left single quote
            '\u{2019}' => 0x92, // right single quote
            '\u{201C}' => 0x93, // left double quote
            '\u{201D}' => 0x94, // right double quote
            '\u{2022}' => 0x95, // bullet
            '\u{2013}' => 0x96, // en-dash
            '\u{2014}' => 0x97, // em-dash
            '\u{2122}' => 0x99, // trademark
            '\u{00A0}' => 0x20, // non-breaking space -> space
            c if (c as u32) < 256 => c as u8,
            _ => {
                *unencodable += 1;
                b'?'
            }
        })
        .collect();
    // SAFETY: intentionally non-UTF-8 for 0x80-0x9F range; printpdf passes
    // these bytes straight to the PDF stream, decoded by WinAnsiEncoding.
    #[allow(unsafe_code)]
    unsafe {
        String::from_utf8_unchecked(bytes)
    }
}

fn black() -> Color {
    Color::Rgb(Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        icc_profile: None,
    })
}

/// Emit one placed line (marker first, then each fragment).
fn render_line(
    ops: &mut Vec<Op>,
    line: &PlacedLine,
    page_height: f32,
    fonts: &FontTable,
    unencodable: &mut usize,
) {
    // PDF coordinate system: origin at bottom-left.
    // Our layout uses origin at top-left. Glyphs are centered vertically in
    // the line box.
    let leading = (line.line_height - line.font_size) / 2.0;
    let baseline = page_height - line.y - leading - fonts.ascender(line.font_size);

    if let Some(marker) = &line.marker {
        let font = fonts.get(false, false);
        write_text(ops, &marker.text, marker.x, baseline, line.font_size, &font, unencodable);
    }

    for frag in &line.fragments {
        if frag.text.trim().is_empty() {
            continue;
        }
        let font = fonts.get(frag.bold, frag.italic);
        write_text(
            ops,
            &frag.text,
            line.x + frag.x_offset,
            baseline,
            line.font_size,
            &font,
            unencodable,
        );
    }
}

fn write_text(
    ops: &mut Vec<Op>,
    text: &str,
    x: f32,
    baseline: f32,
    size: f32,
    font: &PdfFont,
    unencodable: &mut usize,
) {
    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor {
        pos: Point {
            x: Pt(x),
            y: Pt(baseline),
        },
    });
    ops.push(Op::SetFillColor { col: black() });
    match font {
        PdfFont::Builtin(font) => {
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(size),
                font: *font,
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(to_winlatin(text, unencodable))],
                font: *font,
            });
        }
        PdfFont::Embedded(id) => {
            ops.push(Op::SetFontSize {
                size: Pt(size),
                font: id.clone(),
            });
            ops.push(Op::WriteText {
                items: vec![TextItem::Text(text.to_string())],
                font: id.clone(),
            });
        }
    }
    ops.push(Op::EndTextSection);
}
