//! Pipeline – ties together classification, run parsing, wrapping,
//! pagination, and rendering into a single function call.
//!
//! `(title, body)` → cover page → first content page headed by the title →
//! one block per body line → page footers → PDF bytes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::blocks::{classify_lines, Block, BlockKind, MAX_HEADING_LEVEL};
use crate::error::{Error, Result};
use crate::fonts::{FontAssets, FontFamily, FontManager};
use crate::layout_config::{LayoutConfig, LineRole, PageKind};
use crate::pagination::{
    stamp_page_numbers, Align, BlockStyle, PageFlow, PageGeometry, PAGE_MARGIN_PT,
};
use crate::render::render_pdf;
use crate::runs::StyledRun;
use crate::wrap::{wrap_runs_indented, LayoutLine};

/// Characters replaced by `-` when deriving a filename from a title.
pub const UNSAFE_FILENAME_CHARS: [char; 10] = ['/', '\\', '?', '%', '*', ':', '|', '"', '<', '>'];

/// Page orientation for the generated PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageOrientation {
    /// Portrait mode: height > width (default).
    #[default]
    Portrait,
    /// Landscape mode: width > height (short-edge binding).
    Landscape,
}

/// Font sizes in points for each block kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSizes {
    pub title: f32,
    /// Sizes for heading levels 1 through 6.
    pub headings: [f32; MAX_HEADING_LEVEL as usize],
    pub body: f32,
    pub footer: f32,
}

impl FontSizes {
    /// Size for heading `level` (clamped into `1..=6`).
    pub fn heading(&self, level: u8) -> f32 {
        let idx = level.clamp(1, MAX_HEADING_LEVEL) as usize - 1;
        self.headings[idx]
    }
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            title: 18.0,
            headings: [14.0, 13.0, 12.5, 12.0, 12.0, 12.0],
            body: 12.0,
            footer: 9.0,
        }
    }
}

/// Options for the layout engine. Every field has a default; override only
/// what you need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Page width in points (default: A4 = 595.28).
    pub page_width: f32,
    /// Page height in points (default: A4 = 841.89).
    pub page_height: f32,
    /// Page orientation; swaps effective width/height when `Landscape`.
    pub orientation: PageOrientation,
    /// Uniform page margin in points (default: 72).
    pub margin: f32,
    pub font_family: FontFamily,
    pub font_sizes: FontSizes,
    /// Line height as a multiple of the font size.
    pub line_height_multiplier: f32,
    /// Left offset of bullet item text.
    pub bullet_indent: f32,
    /// Left offset of the bullet glyph.
    pub bullet_marker_offset: f32,
    /// First-line indent of paragraphs; `0` disables it.
    pub paragraph_indent: f32,
    pub heading_space_before: f32,
    pub heading_space_after: f32,
    pub paragraph_space_after: f32,
    pub list_item_space_after: f32,
    pub title_space_after: f32,
    /// Extra space contributed by a blank source line.
    pub blank_line_space: f32,
    pub font_assets: FontAssets,
    /// Line under the title on the cover page.
    pub subtitle: String,
    /// Date printed on the cover page. `None` uses today's date.
    pub date_stamp: Option<String>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            page_width: 595.28,
            page_height: 841.89,
            orientation: PageOrientation::Portrait,
            margin: PAGE_MARGIN_PT,
            font_family: FontFamily::Serif,
            font_sizes: FontSizes::default(),
            line_height_multiplier: 1.5,
            bullet_indent: 24.0,
            bullet_marker_offset: 10.0,
            paragraph_indent: 24.0,
            heading_space_before: 24.0,
            heading_space_after: 12.0,
            paragraph_space_after: 12.0,
            list_item_space_after: 6.0,
            title_space_after: 24.0,
            blank_line_space: 6.0,
            font_assets: FontAssets::default(),
            subtitle: "Video Summary".to_string(),
            date_stamp: None,
        }
    }
}

impl LayoutOptions {
    /// Effective page width after applying orientation.
    pub fn effective_width(&self) -> f32 {
        match self.orientation {
            PageOrientation::Portrait => self.page_width,
            PageOrientation::Landscape => self.page_height,
        }
    }

    /// Effective page height after applying orientation.
    pub fn effective_height(&self) -> f32 {
        match self.orientation {
            PageOrientation::Portrait => self.page_height,
            PageOrientation::Landscape => self.page_width,
        }
    }

    /// Create an A4 landscape config.
    pub fn a4_landscape() -> Self {
        Self {
            orientation: PageOrientation::Landscape,
            ..Self::default()
        }
    }

    pub fn geometry(&self) -> PageGeometry {
        PageGeometry {
            width: self.effective_width(),
            height: self.effective_height(),
            margin: self.margin,
        }
    }

    /// The cover date: the pinned stamp, or today's local date.
    pub fn resolved_date_stamp(&self) -> String {
        self.date_stamp
            .clone()
            .unwrap_or_else(|| chrono::Local::now().format("%B %-d, %Y").to_string())
    }
}

/// A finished document.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// PDF bytes.
    pub bytes: Vec<u8>,
    /// Filesystem-safe name derived from the title.
    pub filename: String,
    /// The frozen layout the bytes were rendered from.
    pub layout: LayoutConfig,
}

impl Artifact {
    pub fn page_count(&self) -> usize {
        self.layout.pages.len()
    }

    /// Save under [`Artifact::filename`] inside `dir`, creating it if needed.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.filename);
        let write_err = |source| Error::Write {
            path: path.clone(),
            source,
        };
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).map_err(write_err)?;
        }
        std::fs::write(&path, &self.bytes).map_err(write_err)?;
        Ok(path)
    }
}

/// Full pipeline: `(title, body)` → PDF artifact.
pub fn generate_document(title: &str, body: &str, options: &LayoutOptions) -> Result<Artifact> {
    let fonts = FontManager::with_assets(options.font_family, &options.font_assets);
    let layout = compose(title, body, options, &fonts);
    let bytes = render_pdf(&layout, &fonts)?;

    log::debug!(
        "generated '{}': {} pages, {} bytes",
        layout.title,
        layout.pages.len(),
        bytes.len()
    );

    Ok(Artifact {
        bytes,
        filename: safe_filename(title),
        layout,
    })
}

/// Generate only the layout config (no PDF rendering) – useful for testing.
pub fn compute_layout(title: &str, body: &str, options: &LayoutOptions) -> LayoutConfig {
    let fonts = FontManager::with_assets(options.font_family, &options.font_assets);
    compose(title, body, options, &fonts)
}

/// Derive a filesystem-safe `.pdf` filename from a title.
pub fn safe_filename(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| if UNSAFE_FILENAME_CHARS.contains(&c) { '-' } else { c })
        .collect();
    let stem = replaced.trim();
    if stem.is_empty() {
        "summary.pdf".to_string()
    } else {
        format!("{stem}.pdf")
    }
}

/// Undo the wrapping summarizers tend to add: escaped newlines and a
/// surrounding markdown code fence.
pub fn normalize_body(body: &str) -> String {
    let unescaped = body.replace("\\n", "\n");
    let mut text = unescaped.trim();
    for fence in ["```markdown", "```md", "```"] {
        if let Some(rest) = text.strip_prefix(fence) {
            text = rest;
            break;
        }
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim().to_string()
}

fn compose(title: &str, body: &str, options: &LayoutOptions, fonts: &FontManager) -> LayoutConfig {
    let geometry = options.geometry();
    let mut flow = PageFlow::new(geometry);
    let title_block = Block::title(title);
    let title_style = BlockStyle::for_kind(BlockKind::Title, options);

    // 1. Cover page: the title starts a third of the way down, or higher
    // when it would not fit there.
    flow.start_page(PageKind::Cover);
    let title_lines = wrap_block(&flow, &title_block.runs, &title_style, fonts);
    let title_height = title_lines.len() as f32 * title_style.line_height;
    let title_top = (geometry.height / 3.0)
        .min(geometry.body_bottom() - title_height)
        .max(geometry.body_top());
    flow.advance_to(title_top);
    flow.place_block(&title_lines, &title_style);
    if !options.subtitle.trim().is_empty() {
        let subtitle = [StyledRun::italic(options.subtitle.trim())];
        place(&mut flow, &subtitle, &cover_line_style(LineRole::Subtitle, options), fonts);
    }
    let date = [StyledRun::plain(options.resolved_date_stamp())];
    place(&mut flow, &date, &cover_line_style(LineRole::DateStamp, options), fonts);

    // 2. First content page, headed by the title
    flow.start_page(PageKind::Content);
    let header_style = BlockStyle {
        role: LineRole::Header,
        ..title_style
    };
    place(&mut flow, &title_block.runs, &header_style, fonts);

    // 3. Body blocks
    let text = normalize_body(body);
    let mut previous_blank = true;
    for block in classify_lines(&text) {
        let style = BlockStyle::for_kind(block.kind, options);
        if block.is_blank() {
            if !previous_blank {
                flow.skip(style.space_after);
            }
            previous_blank = true;
            continue;
        }
        previous_blank = false;
        place(&mut flow, &block.runs, &style, fonts);
    }

    // 4. Footers
    let mut pages = flow.finish();
    stamp_page_numbers(&mut pages, &geometry, options, fonts);

    LayoutConfig {
        title: title.trim().to_string(),
        page_width_pt: geometry.width,
        page_height_pt: geometry.height,
        font_family: options.font_family,
        pages,
    }
}

/// Centered body-size line under the title on the cover.
fn cover_line_style(role: LineRole, options: &LayoutOptions) -> BlockStyle {
    BlockStyle {
        role,
        align: Align::Center,
        first_indent: 0.0,
        space_after: options.font_sizes.body,
        ..BlockStyle::for_kind(BlockKind::Paragraph, options)
    }
}

/// Wrap `runs` in `style` and hand the lines to the flow controller.
fn place(flow: &mut PageFlow, runs: &[StyledRun], style: &BlockStyle, fonts: &FontManager) {
    let lines = wrap_block(flow, runs, style, fonts);
    flow.place_block(&lines, style);
}

fn wrap_block(
    flow: &PageFlow,
    runs: &[StyledRun],
    style: &BlockStyle,
    fonts: &FontManager,
) -> Vec<LayoutLine> {
    let styled: Vec<StyledRun> = runs
        .iter()
        .map(|r| StyledRun {
            text: r.text.clone(),
            bold: r.bold || style.bold,
            italic: r.italic || style.italic,
        })
        .collect();
    let (first_width, width) = style.wrap_widths(flow.geometry());
    wrap_runs_indented(&styled, first_width, width, fonts.measurer(style.font_size))
}
