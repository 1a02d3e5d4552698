//! Layout config – the intermediate representation between layout computation
//! and PDF rendering. This is the "frozen" structure that encodes exactly what
//! goes on each page.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fonts::FontFamily;

/// A complete document layout ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Document title embedded in the PDF metadata.
    pub title: String,
    /// Width of each page in PDF points (1 pt = 1/72 inch).
    pub page_width_pt: f32,
    /// Height of each page in PDF points.
    pub page_height_pt: f32,
    #[serde(default)]
    pub font_family: FontFamily,
    /// Ordered list of pages.
    pub pages: Vec<PageLayout>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageKind {
    Cover,
    Content,
}

/// One page of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_index: usize,
    pub kind: PageKind,
    pub lines: Vec<PlacedLine>,
}

/// What a placed line is part of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineRole {
    Title,
    Subtitle,
    DateStamp,
    /// The title repeated at the top of the first content page.
    Header,
    Heading(u8),
    Bullet,
    Paragraph,
    Footer,
}

/// A drawn line at page-absolute coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedLine {
    /// Left edge of the first fragment, from the page's left edge.
    pub x: f32,
    /// Top of the line box, from the page's top edge.
    pub y: f32,
    pub font_size: f32,
    pub line_height: f32,
    pub role: LineRole,
    pub fragments: Vec<PlacedFragment>,
    /// List bullet drawn left of the text (first line of an item only).
    pub marker: Option<Marker>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedFragment {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    /// Offset from [`PlacedLine::x`].
    pub x_offset: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub text: String,
    /// Page-absolute x of the glyph.
    pub x: f32,
}

impl LayoutConfig {
    /// Create an empty A4 layout config.
    pub fn a4(title: &str) -> Self {
        Self {
            title: title.to_string(),
            // A4: 210mm × 297mm = 595.28 × 841.89 points
            page_width_pt: 595.28,
            page_height_pt: 841.89,
            font_family: FontFamily::default(),
            pages: Vec::new(),
        }
    }

    /// Pages that carry summary content (everything after the cover).
    pub fn content_pages(&self) -> impl Iterator<Item = &PageLayout> {
        self.pages.iter().filter(|p| p.kind == PageKind::Content)
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Deserialise from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl PageLayout {
    pub fn new(page_index: usize, kind: PageKind) -> Self {
        Self {
            page_index,
            kind,
            lines: Vec::new(),
        }
    }

    /// Lines in the body area, i.e. everything except the footer.
    pub fn body_lines(&self) -> impl Iterator<Item = &PlacedLine> {
        self.lines.iter().filter(|l| l.role != LineRole::Footer)
    }
}

impl PlacedLine {
    pub fn text(&self) -> String {
        self.fragments.iter().map(|f| f.text.as_str()).collect()
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.line_height
    }
}
