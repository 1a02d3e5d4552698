//! Font loading and text measurement using `ttf-parser`.
//!
//! Each document uses one family (serif or sans) in up to four variants.
//! Variants backed by a loaded TTF/OTF face are measured from its glyph
//! advances and embedded when rendering. Every other variant is drawn with
//! the matching PDF built-in font and measured from the metrics of the
//! built-in face that printpdf bundles. A flat per-character heuristic is the
//! last resort when no face can be parsed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use printpdf::BuiltinFont;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Font family used for the whole document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    /// Times (built-in) or a user-supplied serif face.
    #[default]
    Serif,
    /// Helvetica (built-in) or a user-supplied sans face.
    Sans,
}

impl FontFamily {
    /// Name of the built-in family backing this choice.
    pub fn builtin_name(self) -> &'static str {
        match self {
            FontFamily::Serif => "Times",
            FontFamily::Sans => "Helvetica",
        }
    }

    /// The built-in font drawn for one style variant of this family.
    pub fn builtin(self, bold: bool, italic: bool) -> BuiltinFont {
        match (self, bold, italic) {
            (FontFamily::Serif, true, true) => BuiltinFont::TimesBoldItalic,
            (FontFamily::Serif, true, false) => BuiltinFont::TimesBold,
            (FontFamily::Serif, false, true) => BuiltinFont::TimesItalic,
            (FontFamily::Serif, false, false) => BuiltinFont::TimesRoman,
            (FontFamily::Sans, true, true) => BuiltinFont::HelveticaBoldOblique,
            (FontFamily::Sans, true, false) => BuiltinFont::HelveticaBold,
            (FontFamily::Sans, false, true) => BuiltinFont::HelveticaOblique,
            (FontFamily::Sans, false, false) => BuiltinFont::Helvetica,
        }
    }
}

/// Paths to optional font resources for each style variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontAssets {
    pub regular: Option<PathBuf>,
    pub bold: Option<PathBuf>,
    pub italic: Option<PathBuf>,
}

impl FontAssets {
    fn entries(&self) -> [(FontKey, Option<&PathBuf>); 3] {
        [
            (FontKey::REGULAR, self.regular.as_ref()),
            (FontKey::BOLD, self.bold.as_ref()),
            (FontKey::ITALIC, self.italic.as_ref()),
        ]
    }
}

/// A parsed font face with the metrics the layout needs.
#[derive(Clone)]
pub struct FontData {
    /// Raw font bytes (kept alive for ttf-parser's zero-copy API).
    pub bytes: Vec<u8>,
    pub units_per_em: f32,
    pub ascender: f32,
}

impl FontData {
    fn parse(bytes: Vec<u8>) -> std::result::Result<Self, ttf_parser::FaceParsingError> {
        let face = ttf_parser::Face::parse(&bytes, 0)?;
        Ok(Self {
            units_per_em: face.units_per_em() as f32,
            ascender: face.ascender() as f32,
            bytes,
        })
    }

    /// Sum of glyph advances; glyphs missing from the face count as half an em.
    fn advance_width(&self, text: &str, font_size: f32) -> Option<f32> {
        let face = ttf_parser::Face::parse(&self.bytes, 0).ok()?;
        let scale = font_size / self.units_per_em;
        Some(
            text.chars()
                .map(|ch| match face.glyph_index(ch) {
                    Some(gid) => face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale,
                    None => font_size * 0.5,
                })
                .sum(),
        )
    }
}

/// Style variant within the document family.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub bold: bool,
    pub italic: bool,
}

impl FontKey {
    pub const REGULAR: FontKey = FontKey { bold: false, italic: false };
    pub const BOLD: FontKey = FontKey { bold: true, italic: false };
    pub const ITALIC: FontKey = FontKey { bold: false, italic: true };
    pub const BOLD_ITALIC: FontKey = FontKey { bold: true, italic: true };

    pub const ALL: [FontKey; 4] = [Self::REGULAR, Self::BOLD, Self::ITALIC, Self::BOLD_ITALIC];

    pub fn new(bold: bool, italic: bool) -> Self {
        Self { bold, italic }
    }
}

/// Manages the faces loaded for one document.
pub struct FontManager {
    family: FontFamily,
    /// Faces loaded from font assets; these are embedded.
    fonts: HashMap<FontKey, FontData>,
    /// Metrics of the built-in faces drawn for every other variant.
    builtin: HashMap<FontKey, FontData>,
}

impl FontManager {
    /// A manager that only knows the built-in variants of `family`.
    pub fn new(family: FontFamily) -> Self {
        let builtin = FontKey::ALL
            .into_iter()
            .filter_map(|key| {
                let font = family.builtin(key.bold, key.italic);
                match FontData::parse(font.get_subset_font().bytes) {
                    Ok(data) => Some((key, data)),
                    Err(e) => {
                        log::warn!("No metrics for built-in {font:?} ({e}); estimating widths");
                        None
                    }
                }
            })
            .collect();
        Self {
            family,
            fonts: HashMap::new(),
            builtin,
        }
    }

    /// Build a manager for `family`, loading whatever `assets` can be read.
    ///
    /// Unreadable or unparsable resources are logged and skipped; the
    /// affected variant keeps using the built-in font.
    pub fn with_assets(family: FontFamily, assets: &FontAssets) -> Self {
        let mut mgr = Self::new(family);
        mgr.load_assets(assets);
        mgr
    }

    /// Load a TTF/OTF font from bytes for one variant.
    pub fn load_font(&mut self, key: FontKey, bytes: Vec<u8>, origin: &str) -> Result<()> {
        let data = FontData::parse(bytes).map_err(|e| Error::font_load(origin, e))?;
        self.fonts.insert(key, data);
        Ok(())
    }

    /// Read and load a font file for one variant.
    pub fn load_file(&mut self, key: FontKey, path: &Path) -> Result<()> {
        let origin = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|e| Error::font_load(origin.as_str(), e))?;
        self.load_font(key, bytes, &origin)
    }

    /// Load every asset that is present. Returns how many variants now use a
    /// loaded face.
    pub fn load_assets(&mut self, assets: &FontAssets) -> usize {
        for (key, path) in assets.entries() {
            let Some(path) = path else { continue };
            if let Err(e) = self.load_file(key, path) {
                log::warn!(
                    "{e}; falling back to built-in {}",
                    self.family.builtin_name()
                );
            }
        }
        self.fonts.len()
    }

    /// Loaded face for a variant, if any.
    pub fn get(&self, key: FontKey) -> Option<&FontData> {
        self.fonts.get(&key)
    }

    /// Whether `key` is drawn with an embedded face rather than a built-in.
    pub fn has_embedded(&self, key: FontKey) -> bool {
        self.fonts.contains_key(&key)
    }

    /// Measure the width of a string at a given font size (in pt), using the
    /// face that will actually draw it.
    pub fn measure_text_width(&self, text: &str, font_size: f32, bold: bool, italic: bool) -> f32 {
        let key = FontKey::new(bold, italic);
        self.get(key)
            .or_else(|| self.builtin.get(&key))
            .and_then(|data| data.advance_width(text, font_size))
            .unwrap_or_else(|| heuristic_width(text, font_size, bold))
    }

    /// Measuring callback for a fixed font size, as consumed by the line
    /// wrapper.
    pub fn measurer(&self, font_size: f32) -> impl Fn(&str, bool, bool) -> f32 + '_ {
        move |text, bold, italic| self.measure_text_width(text, font_size, bold, italic)
    }

    /// Ascender in pt; built-ins use Helvetica-like metrics.
    pub fn ascender_px(&self, font_size: f32, bold: bool, italic: bool) -> f32 {
        match self.get(FontKey::new(bold, italic)) {
            Some(data) => data.ascender * font_size / data.units_per_em,
            None => font_size * 0.75,
        }
    }

    /// Font bytes for embedding in the PDF.
    pub fn font_bytes(&self, key: FontKey) -> Option<&[u8]> {
        self.get(key).map(|d| d.bytes.as_slice())
    }
}

impl Default for FontManager {
    fn default() -> Self {
        Self::new(FontFamily::default())
    }
}

/// Average char width ≈ 0.5 × font_size for proportional fonts.
/// Bold is ~10 % wider.
fn heuristic_width(text: &str, font_size: f32, bold: bool) -> f32 {
    let avg = if bold { 0.55 } else { 0.5 };
    text.chars().count() as f32 * font_size * avg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_text_width() {
        // 5 chars × 16 × 0.5 = 40
        assert!((heuristic_width("Hello", 16.0, false) - 40.0).abs() < 0.1);
        assert!(heuristic_width("Hello", 16.0, true) > 40.0);
    }

    #[test]
    fn builtin_widths_follow_glyph_shapes() {
        let mgr = FontManager::default();
        let wide = mgr.measure_text_width("WWWWW", 12.0, false, false);
        let narrow = mgr.measure_text_width("iiiii", 12.0, false, false);
        assert!(wide > narrow * 2.0, "W={wide} i={narrow}");
        // Times-Roman W is close to one em wide.
        assert!(wide > 5.0 * 12.0 * 0.8, "W={wide}");
    }

    #[test]
    fn every_builtin_variant_has_metrics() {
        for family in [FontFamily::Serif, FontFamily::Sans] {
            let mgr = FontManager::new(family);
            for key in FontKey::ALL {
                assert!(mgr.builtin.contains_key(&key), "{family:?} {key:?}");
                assert!(!mgr.has_embedded(key));
            }
        }
    }

    #[test]
    fn families_measure_differently() {
        let serif = FontManager::new(FontFamily::Serif).measure_text_width("summary", 12.0, false, false);
        let sans = FontManager::new(FontFamily::Sans).measure_text_width("summary", 12.0, false, false);
        assert!((serif - sans).abs() > 0.1);
    }

    #[test]
    fn bold_is_wider_than_regular() {
        let mgr = FontManager::new(FontFamily::Sans);
        let regular = mgr.measure_text_width("summary", 12.0, false, false);
        let bold = mgr.measure_text_width("summary", 12.0, true, false);
        assert!(bold > regular);
    }

    #[test]
    fn builtin_font_follows_family_and_style() {
        assert_eq!(FontFamily::Serif.builtin(true, false), BuiltinFont::TimesBold);
        assert_eq!(FontFamily::Sans.builtin(false, true), BuiltinFont::HelveticaOblique);
        assert_eq!(FontFamily::Sans.builtin(true, true), BuiltinFont::HelveticaBoldOblique);
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let mut mgr = FontManager::default();
        let err = mgr
            .load_font(FontKey::REGULAR, b"not a font".to_vec(), "inline")
            .unwrap_err();
        assert!(matches!(err, Error::FontLoad { .. }));
        assert!(!mgr.has_embedded(FontKey::REGULAR));
    }

    #[test]
    fn missing_asset_falls_back_to_builtin() {
        let assets = FontAssets {
            regular: Some(PathBuf::from("/definitely/not/here.ttf")),
            bold: None,
            italic: None,
        };
        let mgr = FontManager::with_assets(FontFamily::Serif, &assets);
        assert!(!mgr.has_embedded(FontKey::REGULAR));
        assert!(mgr.font_bytes(FontKey::REGULAR).is_none());
        // Measuring uses the built-in face instead.
        let builtin = FontManager::new(FontFamily::Serif);
        let w = mgr.measure_text_width("ab", 10.0, false, false);
        assert!((w - builtin.measure_text_width("ab", 10.0, false, false)).abs() < 0.001);
    }

    #[test]
    fn builtin_ascender_is_three_quarters() {
        let mgr = FontManager::default();
        assert!((mgr.ascender_px(12.0, false, false) - 9.0).abs() < 0.01);
    }

    #[test]
    fn measurer_uses_fixed_size() {
        let mgr = FontManager::default();
        let measure = mgr.measurer(20.0);
        let expected = mgr.measure_text_width("abcd", 20.0, false, false);
        assert!((measure("abcd", false, false) - expected).abs() < 0.001);
        assert!(measure("abcd", false, false) > mgr.measure_text_width("abcd", 10.0, false, false));
    }
}
